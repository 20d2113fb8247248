//! In-memory campaign repository

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{CampaignRepositoryPort, RepositoryError};
use crate::domain::aggregates::Campaign;
use crate::domain::value_objects::{AccountId, CampaignId};

/// Campaign store that lives only as long as the process
#[derive(Default)]
pub struct InMemoryCampaignRepository {
    documents: RwLock<HashMap<AccountId, Vec<Campaign>>>,
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert(list: &mut Vec<Campaign>, campaign: &Campaign) {
    match list.iter_mut().find(|c| c.id == campaign.id) {
        Some(existing) => *existing = campaign.clone(),
        None => list.push(campaign.clone()),
    }
}

#[async_trait]
impl CampaignRepositoryPort for InMemoryCampaignRepository {
    async fn load_all(&self, account: &AccountId) -> Result<Vec<Campaign>, RepositoryError> {
        Ok(self
            .documents
            .read()
            .await
            .get(account)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, account: &AccountId, campaign: &Campaign) -> Result<(), RepositoryError> {
        let mut documents = self.documents.write().await;
        upsert(documents.entry(account.clone()).or_default(), campaign);
        Ok(())
    }

    async fn save_many(
        &self,
        account: &AccountId,
        campaigns: &[Campaign],
    ) -> Result<(), RepositoryError> {
        let mut documents = self.documents.write().await;
        let list = documents.entry(account.clone()).or_default();
        for campaign in campaigns {
            upsert(list, campaign);
        }
        Ok(())
    }

    async fn delete(&self, account: &AccountId, id: &CampaignId) -> Result<(), RepositoryError> {
        if let Some(list) = self.documents.write().await.get_mut(account) {
            list.retain(|c| &c.id != id);
        }
        Ok(())
    }
}
