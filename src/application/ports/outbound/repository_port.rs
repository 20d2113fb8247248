//! Repository ports - Interfaces for the remote campaign document store
//!
//! The remote store holds one document per (account, campaign) pair. Every
//! write is a whole-document overwrite, so the last write for a campaign wins.

use async_trait::async_trait;

use crate::domain::aggregates::Campaign;
use crate::domain::schema::SchemaError;
use crate::domain::value_objects::{AccountId, CampaignId};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Campaign Repository Port
// =============================================================================

/// Repository port for campaign documents owned by an account
#[async_trait]
pub trait CampaignRepositoryPort: Send + Sync {
    /// Load every campaign owned by the account
    async fn load_all(&self, account: &AccountId) -> Result<Vec<Campaign>, RepositoryError>;

    /// Overwrite a single campaign document
    async fn save(&self, account: &AccountId, campaign: &Campaign) -> Result<(), RepositoryError>;

    /// Overwrite several campaign documents as one batch
    async fn save_many(
        &self,
        account: &AccountId,
        campaigns: &[Campaign],
    ) -> Result<(), RepositoryError>;

    /// Delete a campaign document; deleting a missing document is not an error
    async fn delete(&self, account: &AccountId, id: &CampaignId) -> Result<(), RepositoryError>;
}
