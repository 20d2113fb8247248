//! In-memory local store

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::outbound::{JournalEntry, LocalCampaignStorePort, LocalStoreError};
use crate::domain::aggregates::Campaign;
use crate::domain::value_objects::{AccountId, CampaignId};

#[derive(Default)]
pub struct InMemoryCampaignStore {
    fallback: Mutex<Vec<Campaign>>,
    journals: Mutex<HashMap<AccountId, BTreeMap<CampaignId, JournalEntry>>>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCampaignStorePort for InMemoryCampaignStore {
    async fn read_fallback(&self) -> Result<Vec<Campaign>, LocalStoreError> {
        Ok(self.fallback.lock().await.clone())
    }

    async fn write_fallback(&self, campaigns: &[Campaign]) -> Result<(), LocalStoreError> {
        *self.fallback.lock().await = campaigns.to_vec();
        Ok(())
    }

    async fn clear_fallback(&self) -> Result<(), LocalStoreError> {
        self.fallback.lock().await.clear();
        Ok(())
    }

    async fn journal_put(
        &self,
        account: &AccountId,
        entry: &JournalEntry,
    ) -> Result<(), LocalStoreError> {
        self.journals
            .lock()
            .await
            .entry(account.clone())
            .or_default()
            .insert(entry.campaign_id().clone(), entry.clone());
        Ok(())
    }

    async fn journal_ack(
        &self,
        account: &AccountId,
        entry: &JournalEntry,
    ) -> Result<bool, LocalStoreError> {
        let mut journals = self.journals.lock().await;
        let Some(journal) = journals.get_mut(account) else {
            return Ok(false);
        };
        if journal.get(entry.campaign_id()) == Some(entry) {
            journal.remove(entry.campaign_id());
            return Ok(true);
        }
        Ok(false)
    }

    async fn journal_pending(
        &self,
        account: &AccountId,
    ) -> Result<Vec<JournalEntry>, LocalStoreError> {
        Ok(self
            .journals
            .lock()
            .await
            .get(account)
            .map(|journal| journal.values().cloned().collect())
            .unwrap_or_default())
    }
}
