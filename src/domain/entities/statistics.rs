//! Draw statistics - Cumulative record of every token drawn for a campaign

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TokenKind;

/// One token draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub token_id: TokenKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Campaign's current scenario when the token was drawn
    pub scenario_index: usize,
}

/// Draw statistics owned by a campaign
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_draws: u64,
    /// Per-token draw counts; absent tokens have never been drawn
    pub token_draws: BTreeMap<TokenKind, u64>,
    pub draw_history: Vec<DrawRecord>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a draw
    pub fn record(&mut self, token: TokenKind, at: DateTime<Utc>, scenario_index: usize) {
        self.total_draws += 1;
        *self.token_draws.entry(token).or_insert(0) += 1;
        self.draw_history.push(DrawRecord {
            token_id: token,
            timestamp: at,
            scenario_index,
        });
    }

    pub fn draws_of(&self, token: TokenKind) -> u64 {
        self.token_draws.get(&token).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_updates_all_counters() {
        let mut stats = Statistics::new();
        let now = Utc::now();
        stats.record(TokenKind::Skull, now, 0);
        stats.record(TokenKind::Skull, now, 1);
        stats.record(TokenKind::ElderSign, now, 1);

        assert_eq!(stats.total_draws, 3);
        assert_eq!(stats.draws_of(TokenKind::Skull), 2);
        assert_eq!(stats.draws_of(TokenKind::Tablet), 0);
        assert_eq!(stats.draw_history.len(), 3);
        assert_eq!(stats.draw_history[2].scenario_index, 1);
    }

    #[test]
    fn test_token_draws_keyed_by_wire_id() {
        let mut stats = Statistics::new();
        stats.record(TokenKind::ElderThing, Utc::now(), 0);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["tokenDraws"]["elderThing"], 1);
        assert_eq!(value["drawHistory"][0]["tokenId"], "elderThing");
    }
}
