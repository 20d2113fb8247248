//! Local store port - Durable storage on the machine running the engine
//!
//! The local store has two areas:
//! - the fallback list, a single serialized list of campaigns used when no
//!   account is signed in (read and written wholesale);
//! - a per-account journal of writes that have not yet been confirmed by the
//!   remote store. Each campaign has at most one pending entry, the latest.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::Campaign;
use crate::domain::schema::SchemaError;
use crate::domain::value_objects::{AccountId, CampaignId};

#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// A write waiting to reach the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JournalEntry {
    Upsert { campaign: Campaign },
    Delete { id: CampaignId },
}

impl JournalEntry {
    pub fn campaign_id(&self) -> &CampaignId {
        match self {
            JournalEntry::Upsert { campaign } => &campaign.id,
            JournalEntry::Delete { id } => id,
        }
    }
}

#[async_trait]
pub trait LocalCampaignStorePort: Send + Sync {
    /// Read the fallback list; an absent list reads as empty
    async fn read_fallback(&self) -> Result<Vec<Campaign>, LocalStoreError>;

    /// Replace the fallback list
    async fn write_fallback(&self, campaigns: &[Campaign]) -> Result<(), LocalStoreError>;

    /// Remove the fallback list entirely
    async fn clear_fallback(&self) -> Result<(), LocalStoreError>;

    /// Record a pending write, replacing any earlier entry for the same campaign
    async fn journal_put(
        &self,
        account: &AccountId,
        entry: &JournalEntry,
    ) -> Result<(), LocalStoreError>;

    /// Drop the pending entry for a campaign if it is still exactly `entry`
    ///
    /// Returns whether an entry was removed. A newer entry written since
    /// `entry` was synced is left in place.
    async fn journal_ack(
        &self,
        account: &AccountId,
        entry: &JournalEntry,
    ) -> Result<bool, LocalStoreError>;

    /// All pending entries for an account
    async fn journal_pending(&self, account: &AccountId)
        -> Result<Vec<JournalEntry>, LocalStoreError>;
}
