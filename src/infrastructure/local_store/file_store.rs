//! JSON file local store
//!
//! Layout under the data directory:
//! - `fallback.json`: array of versioned campaign documents
//! - `journal/<account>.json`: pending writes keyed by campaign id, with
//!   upserts carrying the same versioned documents as the fallback list
//!
//! Every write goes to a temp file first and is renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::application::ports::outbound::{JournalEntry, LocalCampaignStorePort, LocalStoreError};
use crate::domain::aggregates::Campaign;
use crate::domain::schema::{
    decode_campaign, encode_campaign, SchemaError, CURRENT_SCHEMA_VERSION,
};
use crate::domain::value_objects::{AccountId, CampaignId};

const FALLBACK_FILE: &str = "fallback.json";
const JOURNAL_DIR: &str = "journal";

type Journal = BTreeMap<CampaignId, JournalEntry>;

/// A journal entry as written to disk
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum StoredEntry {
    Upsert { campaign: Value },
    Delete { id: CampaignId },
}

impl StoredEntry {
    fn encode(entry: &JournalEntry) -> Result<Self, SchemaError> {
        Ok(match entry {
            JournalEntry::Upsert { campaign } => StoredEntry::Upsert {
                campaign: encode_campaign(campaign)?,
            },
            JournalEntry::Delete { id } => StoredEntry::Delete { id: id.clone() },
        })
    }

    fn is_current(&self) -> bool {
        match self {
            StoredEntry::Upsert { campaign } => {
                campaign.get("schemaVersion").and_then(Value::as_u64)
                    == Some(CURRENT_SCHEMA_VERSION)
            }
            StoredEntry::Delete { .. } => true,
        }
    }

    fn decode(self) -> Result<JournalEntry, SchemaError> {
        Ok(match self {
            StoredEntry::Upsert { campaign } => JournalEntry::Upsert {
                campaign: decode_campaign(campaign)?,
            },
            StoredEntry::Delete { id } => JournalEntry::Delete { id },
        })
    }
}

pub struct JsonFileCampaignStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles on the files
    write_lock: Mutex<()>,
}

impl JsonFileCampaignStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn fallback_path(&self) -> PathBuf {
        self.root.join(FALLBACK_FILE)
    }

    fn journal_path(&self, account: &AccountId) -> PathBuf {
        let file_name: String = account
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(JOURNAL_DIR).join(format!("{}.json", file_name))
    }

    /// Read an account's journal
    ///
    /// The flag is set when the file held entries in an older shape or
    /// entries that could not be read, so the caller should write it back.
    async fn read_journal(&self, account: &AccountId) -> Result<(Journal, bool), LocalStoreError> {
        let Some(content) = read_if_exists(&self.journal_path(account)).await? else {
            return Ok((Journal::new(), false));
        };

        let stored: BTreeMap<CampaignId, StoredEntry> = serde_json::from_str(&content)?;
        let mut journal = Journal::new();
        let mut stale = false;
        for (id, entry) in stored {
            stale |= !entry.is_current();
            match entry.decode() {
                Ok(entry) => {
                    journal.insert(id, entry);
                }
                Err(e) => {
                    warn!(campaign = %id, error = %e, "Dropping unreadable journal entry");
                    stale = true;
                }
            }
        }
        Ok((journal, stale))
    }

    async fn write_journal(&self, account: &AccountId, journal: &Journal) -> Result<(), LocalStoreError> {
        let path = self.journal_path(account);
        if journal.is_empty() {
            return remove_if_exists(&path).await;
        }
        let stored = journal
            .iter()
            .map(|(id, entry)| StoredEntry::encode(entry).map(|stored| (id, stored)))
            .collect::<Result<BTreeMap<_, _>, SchemaError>>()?;
        write_atomic(&path, &serde_json::to_string_pretty(&stored)?).await
    }
}

async fn read_if_exists(path: &Path) -> Result<Option<String>, LocalStoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), LocalStoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(content))]
async fn write_atomic(path: &Path, content: &str) -> Result<(), LocalStoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, content).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl LocalCampaignStorePort for JsonFileCampaignStore {
    async fn read_fallback(&self) -> Result<Vec<Campaign>, LocalStoreError> {
        let Some(content) = read_if_exists(&self.fallback_path()).await? else {
            return Ok(Vec::new());
        };

        let records: Vec<Value> = serde_json::from_str(&content)?;
        let mut campaigns = Vec::with_capacity(records.len());
        for record in records {
            match decode_campaign(record) {
                Ok(campaign) => campaigns.push(campaign),
                Err(e) => warn!(error = %e, "Skipping unreadable local campaign"),
            }
        }
        Ok(campaigns)
    }

    async fn write_fallback(&self, campaigns: &[Campaign]) -> Result<(), LocalStoreError> {
        let records = campaigns
            .iter()
            .map(encode_campaign)
            .collect::<Result<Vec<_>, _>>()?;
        let content = serde_json::to_string_pretty(&records)?;

        let _guard = self.write_lock.lock().await;
        write_atomic(&self.fallback_path(), &content).await
    }

    async fn clear_fallback(&self) -> Result<(), LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        remove_if_exists(&self.fallback_path()).await
    }

    async fn journal_put(
        &self,
        account: &AccountId,
        entry: &JournalEntry,
    ) -> Result<(), LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        let (mut journal, _) = self.read_journal(account).await?;
        journal.insert(entry.campaign_id().clone(), entry.clone());
        self.write_journal(account, &journal).await
    }

    async fn journal_ack(
        &self,
        account: &AccountId,
        entry: &JournalEntry,
    ) -> Result<bool, LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        let (mut journal, _) = self.read_journal(account).await?;
        if journal.get(entry.campaign_id()) != Some(entry) {
            return Ok(false);
        }
        journal.remove(entry.campaign_id());
        self.write_journal(account, &journal).await?;
        Ok(true)
    }

    async fn journal_pending(
        &self,
        account: &AccountId,
    ) -> Result<Vec<JournalEntry>, LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        let (journal, stale) = self.read_journal(account).await?;
        // Upgraded entries are written back so later reads decode them the
        // same way and acknowledgements still match
        if stale {
            self.write_journal(account, &journal).await?;
        }
        Ok(journal.into_values().collect())
    }
}
