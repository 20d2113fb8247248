//! Token counts - The configured contents of a chaos bag

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::token::TokenKind;

/// Count of each catalog token in the bag
///
/// Every catalog token always has an entry (possibly zero), and tokens outside
/// the catalog cannot be represented. On the wire this is an object keyed by
/// token id with every catalog key present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenCounts([u32; TokenKind::COUNT]);

impl TokenCounts {
    /// All catalog tokens at zero
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build counts from `(token, count)` pairs; later pairs overwrite earlier ones
    pub fn from_pairs(pairs: &[(TokenKind, u32)]) -> Self {
        let mut counts = Self::empty();
        for &(kind, count) in pairs {
            counts.set(kind, count);
        }
        counts
    }

    pub fn get(&self, kind: TokenKind) -> u32 {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: TokenKind, count: u32) {
        self.0[kind.index()] = count;
    }

    pub fn increment(&mut self, kind: TokenKind) {
        self.0[kind.index()] = self.0[kind.index()].saturating_add(1);
    }

    /// Decrement, never going below zero
    pub fn decrement(&mut self, kind: TokenKind) {
        self.0[kind.index()] = self.0[kind.index()].saturating_sub(1);
    }

    /// Total number of tokens in the bag
    pub fn total(&self) -> usize {
        self.0.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// `(token, count)` for every catalog token, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (TokenKind, u32)> + '_ {
        TokenKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }

    /// Decode from a loosely-typed record, reporting keys that are not in the catalog
    ///
    /// Missing catalog keys default to zero and negative counts clamp to zero.
    pub fn from_record(record: &BTreeMap<String, i64>) -> (Self, Vec<String>) {
        let mut counts = Self::empty();
        let mut unknown = Vec::new();
        for (key, &value) in record {
            match TokenKind::from_id(key) {
                Some(kind) => counts.set(kind, value.clamp(0, u32::MAX as i64) as u32),
                None => unknown.push(key.clone()),
            }
        }
        (counts, unknown)
    }
}

impl Serialize for TokenCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(kind, count)| (kind.id(), count)))
    }
}

impl<'de> Deserialize<'de> for TokenCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = BTreeMap::<String, i64>::deserialize(deserializer)?;
        let (counts, unknown) = Self::from_record(&record);
        if !unknown.is_empty() {
            tracing::warn!(keys = ?unknown, "Dropping token counts for tokens outside the catalog");
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_saturates_at_zero() {
        let mut counts = TokenCounts::empty();
        counts.decrement(TokenKind::Skull);
        assert_eq!(counts.get(TokenKind::Skull), 0);
        counts.increment(TokenKind::Skull);
        counts.increment(TokenKind::Skull);
        counts.decrement(TokenKind::Skull);
        assert_eq!(counts.get(TokenKind::Skull), 1);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_serializes_every_catalog_key() {
        let counts = TokenCounts::from_pairs(&[(TokenKind::ElderSign, 1)]);
        let value = serde_json::to_value(counts).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), TokenKind::COUNT);
        assert_eq!(object["elderSign"], 1);
        assert_eq!(object["frost"], 0);
    }

    #[test]
    fn test_deserialize_drops_unknown_and_clamps_negative() {
        let counts: TokenCounts =
            serde_json::from_str(r#"{"skull": 2, "minus1": -3, "stale": 4}"#).unwrap();
        assert_eq!(counts.get(TokenKind::Skull), 2);
        assert_eq!(counts.get(TokenKind::MinusOne), 0);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_from_record_reports_unknown_keys() {
        let mut record = BTreeMap::new();
        record.insert("cultist".to_string(), 1);
        record.insert("moon".to_string(), 2);
        let (counts, unknown) = TokenCounts::from_record(&record);
        assert_eq!(counts.get(TokenKind::Cultist), 1);
        assert_eq!(unknown, vec!["moon".to_string()]);
    }
}
