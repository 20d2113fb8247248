//! Campaign repository implementation for SQLite
//!
//! One row per (account, campaign). The campaign itself is stored as a
//! versioned JSON document so older rows can be migrated on read.

use async_trait::async_trait;
use sqlx::Row;

use super::connection::SqliteConnection;
use crate::application::ports::outbound::{CampaignRepositoryPort, RepositoryError};
use crate::domain::aggregates::Campaign;
use crate::domain::schema::{
    decode_campaign, encode_campaign, SchemaError, CURRENT_SCHEMA_VERSION,
};
use crate::domain::value_objects::{AccountId, CampaignId};

const UPSERT_CAMPAIGN: &str = r#"
    INSERT INTO campaigns (account_id, campaign_id, schema_version, document, updated_at)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (account_id, campaign_id) DO UPDATE SET
        schema_version = excluded.schema_version,
        document = excluded.document,
        updated_at = excluded.updated_at
"#;

/// Repository for campaign documents
pub struct SqliteCampaignRepository {
    connection: SqliteConnection,
}

impl SqliteCampaignRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn document_text(campaign: &Campaign) -> Result<String, RepositoryError> {
    Ok(encode_campaign(campaign)?.to_string())
}

#[async_trait]
impl CampaignRepositoryPort for SqliteCampaignRepository {
    async fn load_all(&self, account: &AccountId) -> Result<Vec<Campaign>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT campaign_id, document FROM campaigns WHERE account_id = ? ORDER BY updated_at DESC",
        )
        .bind(account.as_str())
        .fetch_all(self.connection.pool())
        .await
        .map_err(db_error)?;

        let mut campaigns = Vec::with_capacity(rows.len());
        for row in rows {
            let campaign_id: String = row.try_get("campaign_id").map_err(db_error)?;
            let document: String = row.try_get("document").map_err(db_error)?;

            // A single unreadable document should not hide the others
            let decoded = serde_json::from_str::<serde_json::Value>(&document)
                .map_err(SchemaError::from)
                .and_then(decode_campaign);
            match decoded {
                Ok(campaign) => campaigns.push(campaign),
                Err(e) => {
                    tracing::warn!(campaign = %campaign_id, error = %e, "Skipping unreadable campaign")
                }
            }
        }
        Ok(campaigns)
    }

    async fn save(&self, account: &AccountId, campaign: &Campaign) -> Result<(), RepositoryError> {
        let document = document_text(campaign)?;
        sqlx::query(UPSERT_CAMPAIGN)
            .bind(account.as_str())
            .bind(campaign.id.as_str())
            .bind(CURRENT_SCHEMA_VERSION as i64)
            .bind(document)
            .bind(campaign.updated_at.timestamp_millis())
            .execute(self.connection.pool())
            .await
            .map_err(db_error)?;

        tracing::debug!("Saved campaign: {}", campaign.id);
        Ok(())
    }

    async fn save_many(
        &self,
        account: &AccountId,
        campaigns: &[Campaign],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.connection.pool().begin().await.map_err(db_error)?;
        for campaign in campaigns {
            let document = document_text(campaign)?;
            sqlx::query(UPSERT_CAMPAIGN)
                .bind(account.as_str())
                .bind(campaign.id.as_str())
                .bind(CURRENT_SCHEMA_VERSION as i64)
                .bind(document)
                .bind(campaign.updated_at.timestamp_millis())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)?;

        tracing::debug!("Saved {} campaigns in one batch", campaigns.len());
        Ok(())
    }

    async fn delete(&self, account: &AccountId, id: &CampaignId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM campaigns WHERE account_id = ? AND campaign_id = ?")
            .bind(account.as_str())
            .bind(id.as_str())
            .execute(self.connection.pool())
            .await
            .map_err(db_error)?;

        tracing::debug!("Deleted campaign: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    async fn create_test_repository() -> SqliteCampaignRepository {
        let connection = SqliteConnection::in_memory().await.unwrap();
        connection.initialize_schema().await.unwrap();
        SqliteCampaignRepository::new(connection)
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_document() {
        let repo = create_test_repository().await;
        let account = AccountId::from("acct");
        let mut campaign = Campaign::from_template("", "dunwich-legacy", "hard", Utc::now());

        repo.save(&account, &campaign).await.unwrap();
        campaign.notes = "second revision".to_string();
        repo.save(&account, &campaign).await.unwrap();

        let loaded = repo.load_all(&account).await.unwrap();
        assert_eq!(loaded, vec![campaign]);
    }

    #[tokio::test]
    async fn test_documents_are_scoped_to_account() {
        let repo = create_test_repository().await;
        let campaign = Campaign::from_template("", "standalone", "easy", Utc::now());
        repo.save(&AccountId::from("a"), &campaign).await.unwrap();

        assert!(repo.load_all(&AccountId::from("b")).await.unwrap().is_empty());
        // Deleting another account's copy is a no-op
        repo.delete(&AccountId::from("b"), &campaign.id).await.unwrap();
        assert_eq!(repo.load_all(&AccountId::from("a")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_many_and_delete() {
        let repo = create_test_repository().await;
        let account = AccountId::from("acct");
        let now = Utc::now();
        let campaigns = vec![
            Campaign::from_template("One", "standalone", "easy", now),
            Campaign::from_template("Two", "standalone", "easy", now),
        ];
        repo.save_many(&account, &campaigns).await.unwrap();
        assert_eq!(repo.load_all(&account).await.unwrap().len(), 2);

        repo.delete(&account, &campaigns[0].id).await.unwrap();
        let remaining = repo.load_all(&account).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, campaigns[1].id);
    }

    #[tokio::test]
    async fn test_legacy_rows_are_migrated_and_bad_rows_skipped() {
        let repo = create_test_repository().await;
        let account = AccountId::from("acct");
        let legacy = json!({
            "id": "legacy-1",
            "name": "Old",
            "campaignType": "standalone",
            "tokenCounts": { "skull": 2, "mystery": 4 },
        });

        for (id, document) in [("legacy-1", legacy.to_string()), ("broken", "{not json".to_string())] {
            sqlx::query(
                "INSERT INTO campaigns (account_id, campaign_id, schema_version, document, updated_at) VALUES (?, ?, 1, ?, 0)",
            )
            .bind(account.as_str())
            .bind(id)
            .bind(document)
            .execute(repo.connection.pool())
            .await
            .unwrap();
        }

        let loaded = repo.load_all(&account).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "legacy-1");
        assert_eq!(loaded[0].token_counts.total(), 2);
    }
}
