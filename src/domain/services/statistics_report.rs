//! Statistics report - Derived view over a campaign's draw statistics

use serde::Serialize;

use crate::domain::entities::{DrawRecord, Statistics};
use crate::domain::value_objects::TokenKind;

/// Number of draws shown in the recent-history strip
pub const RECENT_DRAWS: usize = 20;

/// Draw share of a single token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenShare {
    pub token: TokenKind,
    pub count: u64,
    /// Percentage of all draws, rounded to one decimal
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub total_draws: u64,
    /// Tokens drawn at least once, most frequent first
    pub breakdown: Vec<TokenShare>,
    /// Most recent draws, newest first
    pub recent: Vec<DrawRecord>,
}

impl StatisticsReport {
    pub fn from_statistics(stats: &Statistics) -> Self {
        let total = stats.total_draws;

        let mut breakdown: Vec<TokenShare> = TokenKind::ALL
            .iter()
            .map(|&token| (token, stats.draws_of(token)))
            .filter(|&(_, count)| count > 0)
            .map(|(token, count)| TokenShare {
                token,
                count,
                percentage: percentage(count, total),
            })
            .collect();
        // Stable sort keeps catalog order among ties
        breakdown.sort_by(|a, b| b.count.cmp(&a.count));

        let recent = stats
            .draw_history
            .iter()
            .rev()
            .take(RECENT_DRAWS)
            .copied()
            .collect();

        Self {
            total_draws: total,
            breakdown,
            recent,
        }
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_empty_statistics() {
        let report = StatisticsReport::from_statistics(&Statistics::new());
        assert_eq!(report.total_draws, 0);
        assert!(report.breakdown.is_empty());
        assert!(report.recent.is_empty());
    }

    #[test]
    fn test_breakdown_sorted_by_count_then_catalog() {
        let mut stats = Statistics::new();
        let now = Utc::now();
        for token in [
            TokenKind::Skull,
            TokenKind::Zero,
            TokenKind::Skull,
            TokenKind::AutoFail,
            TokenKind::Skull,
            TokenKind::Zero,
        ] {
            stats.record(token, now, 0);
        }

        let report = StatisticsReport::from_statistics(&stats);
        let order: Vec<_> = report.breakdown.iter().map(|s| s.token).collect();
        assert_eq!(
            order,
            vec![TokenKind::Skull, TokenKind::Zero, TokenKind::AutoFail]
        );
        assert_eq!(report.breakdown[0].percentage, 50.0);
        assert_eq!(report.breakdown[2].percentage, 16.7);
    }

    #[test]
    fn test_recent_is_newest_first_and_capped() {
        let mut stats = Statistics::new();
        let now = Utc::now();
        for i in 0..25 {
            let token = if i == 24 { TokenKind::ElderSign } else { TokenKind::Zero };
            stats.record(token, now, 0);
        }

        let report = StatisticsReport::from_statistics(&stats);
        assert_eq!(report.recent.len(), RECENT_DRAWS);
        assert_eq!(report.recent[0].token_id, TokenKind::ElderSign);
    }
}
