//! Chaos bag - Bag building and drawing without replacement
//!
//! The bag is always derived from [`TokenCounts`]: it is rebuilt from scratch
//! whenever the counts change, and only shrinks through [`Bag::draw`].

use rand::Rng;
use serde::Serialize;

use crate::domain::value_objects::{TokenCounts, TokenKind};

/// The drawable tokens, one entry per unit of count
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Bag(Vec<TokenKind>);

impl Bag {
    /// Expand counts into a bag in catalog order
    pub fn from_counts(counts: &TokenCounts) -> Self {
        let mut tokens = Vec::with_capacity(counts.total());
        for (kind, count) in counts.iter() {
            tokens.extend(std::iter::repeat(kind).take(count as usize));
        }
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[TokenKind] {
        &self.0
    }

    /// Draw one token uniformly at random and remove it from the bag
    ///
    /// Returns `None` without touching the rng when the bag is empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TokenKind> {
        if self.0.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.0.len());
        Some(self.0.remove(index))
    }

    /// Put previously drawn tokens back into the bag
    pub fn return_all(&mut self, drawn: impl IntoIterator<Item = TokenKind>) {
        self.0.extend(drawn);
    }

    /// Count of each token currently in the bag
    pub fn counts(&self) -> TokenCounts {
        let mut counts = TokenCounts::empty();
        for &kind in &self.0 {
            counts.increment(kind);
        }
        counts
    }
}
