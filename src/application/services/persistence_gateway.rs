//! Persistence gateway - Where campaigns live, depending on who is signed in
//!
//! Signed out, campaigns are kept in the local fallback list. Signed in, every
//! change is first recorded in the account's local journal and then pushed to
//! the remote store; the journal entry is acknowledged only once the remote
//! write succeeds. Pending entries are replayed the next time the account's
//! campaigns are loaded.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::application::ports::outbound::{
    CampaignRepositoryPort, JournalEntry, LocalCampaignStorePort, LocalStoreError,
    RepositoryError,
};
use crate::domain::aggregates::Campaign;
use crate::domain::value_objects::{AccountId, CampaignId};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Local store error: {0}")]
    Local(#[from] LocalStoreError),
    #[error("Remote store error: {0}")]
    Remote(#[from] RepositoryError),
}

pub struct PersistenceGateway {
    remote: Arc<dyn CampaignRepositoryPort>,
    local: Arc<dyn LocalCampaignStorePort>,
    /// Accounts whose local fallback has already been migrated this process
    migrated: Mutex<HashSet<AccountId>>,
    /// Remote writes run one at a time so an older revision never lands last
    sync_lock: Mutex<()>,
}

impl PersistenceGateway {
    pub fn new(
        remote: Arc<dyn CampaignRepositoryPort>,
        local: Arc<dyn LocalCampaignStorePort>,
    ) -> Self {
        Self {
            remote,
            local,
            migrated: Mutex::new(HashSet::new()),
            sync_lock: Mutex::new(()),
        }
    }

    /// Load every campaign for the owner
    ///
    /// Failures are logged and read as an empty list.
    #[instrument(skip(self))]
    pub async fn load_all(&self, owner: Option<&AccountId>) -> Vec<Campaign> {
        let Some(account) = owner else {
            return match self.local.read_fallback().await {
                Ok(campaigns) => campaigns,
                Err(e) => {
                    warn!(error = %e, "Failed to read local campaigns");
                    Vec::new()
                }
            };
        };

        self.ensure_migrated(account).await;
        self.replay_journal(account).await;

        let mut campaigns = match self.remote.load_all(account).await {
            Ok(campaigns) => campaigns,
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to load remote campaigns");
                return Vec::new();
            }
        };

        // Whatever is still pending is newer than the remote copy
        match self.local.journal_pending(account).await {
            Ok(pending) => apply_pending(&mut campaigns, pending),
            Err(e) => warn!(account = %account, error = %e, "Failed to read journal"),
        }
        campaigns
    }

    /// Record a change locally before it is synced
    ///
    /// Signed out, the whole `snapshot` replaces the fallback list. Signed in,
    /// `entry` becomes the pending journal entry for its campaign.
    pub async fn write_ahead(
        &self,
        owner: Option<&AccountId>,
        entry: &JournalEntry,
        snapshot: &[Campaign],
    ) {
        let result = match owner {
            None => self.local.write_fallback(snapshot).await,
            Some(account) => self.local.journal_put(account, entry).await,
        };
        if let Err(e) = result {
            warn!(campaign = %entry.campaign_id(), error = %e, "Local write failed");
        }
    }

    /// Push one journal entry to the remote store
    ///
    /// Returns false only if the remote write failed; the entry then stays
    /// pending. An entry that is no longer pending was superseded by a newer
    /// write or already synced, and is skipped.
    #[instrument(skip(self, entry), fields(campaign = %entry.campaign_id()))]
    pub async fn sync(&self, account: &AccountId, entry: &JournalEntry) -> bool {
        let _guard = self.sync_lock.lock().await;

        match self.local.journal_pending(account).await {
            Ok(pending) if !pending.contains(entry) => {
                debug!("Journal entry superseded or already synced");
                return true;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read journal, syncing anyway"),
        }

        let result = match entry {
            JournalEntry::Upsert { campaign } => self.remote.save(account, campaign).await,
            JournalEntry::Delete { id } => self.remote.delete(account, id).await,
        };
        if let Err(e) = result {
            warn!(error = %e, "Remote sync failed; change kept in journal");
            return false;
        }

        match self.local.journal_ack(account, entry).await {
            Ok(true) => debug!("Journal entry acknowledged"),
            Ok(false) => debug!("Journal entry superseded before acknowledgement"),
            Err(e) => warn!(error = %e, "Failed to acknowledge journal entry"),
        }
        true
    }

    /// Write-ahead and sync one campaign
    pub async fn save(&self, account: &AccountId, campaign: &Campaign) -> bool {
        let entry = JournalEntry::Upsert {
            campaign: campaign.clone(),
        };
        self.write_ahead(Some(account), &entry, &[]).await;
        self.sync(account, &entry).await
    }

    /// Write-ahead and sync one deletion
    pub async fn delete(&self, account: &AccountId, id: &CampaignId) -> bool {
        let entry = JournalEntry::Delete { id: id.clone() };
        self.write_ahead(Some(account), &entry, &[]).await;
        self.sync(account, &entry).await
    }

    /// Move the signed-out campaign list into the account's remote store
    ///
    /// Returns how many campaigns were moved. The fallback is cleared only
    /// after the remote batch succeeds, so a second call finds nothing left.
    #[instrument(skip(self))]
    pub async fn migrate_local_fallback(&self, account: &AccountId) -> Result<usize, GatewayError> {
        let campaigns = self.local.read_fallback().await?;
        if campaigns.is_empty() {
            return Ok(0);
        }

        self.remote.save_many(account, &campaigns).await?;
        self.local.clear_fallback().await?;

        info!(count = campaigns.len(), "Migrated local campaigns to account");
        Ok(campaigns.len())
    }

    /// Run the fallback migration at most once per account per process
    ///
    /// The gate stays locked for the whole migration, so a concurrent load for
    /// the same account waits for it to finish.
    async fn ensure_migrated(&self, account: &AccountId) {
        let mut migrated = self.migrated.lock().await;
        if migrated.contains(account) {
            return;
        }
        if let Err(e) = self.migrate_local_fallback(account).await {
            warn!(account = %account, error = %e, "Local campaign migration failed");
        }
        migrated.insert(account.clone());
    }

    async fn replay_journal(&self, account: &AccountId) {
        let pending = match self.local.journal_pending(account).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to read journal");
                return;
            }
        };
        if pending.is_empty() {
            return;
        }

        debug!(account = %account, count = pending.len(), "Replaying journal");
        for entry in &pending {
            if !self.sync(account, entry).await {
                // The remote is down; the rest would fail the same way
                break;
            }
        }
    }
}

fn apply_pending(campaigns: &mut Vec<Campaign>, pending: Vec<JournalEntry>) {
    for entry in pending {
        match entry {
            JournalEntry::Upsert { campaign } => {
                match campaigns.iter_mut().find(|c| c.id == campaign.id) {
                    Some(existing) => *existing = campaign,
                    None => campaigns.push(campaign),
                }
            }
            JournalEntry::Delete { id } => campaigns.retain(|c| c.id != id),
        }
    }
}
