//! Shared application state

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::application::ports::outbound::{
    CampaignRepositoryPort, ClockPort, IdentityPort, LocalCampaignStorePort,
};
use crate::application::services::{CampaignService, ChaosBagSession, PersistenceGateway};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::{AppConfig, RemoteBackend};
use crate::infrastructure::identity::SqliteIdentityProvider;
use crate::infrastructure::local_store::JsonFileCampaignStore;
use crate::infrastructure::persistence::{
    InMemoryCampaignRepository, SqliteCampaignRepository, SqliteConnection,
};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub campaign_service: CampaignService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Accounts always live in SQLite; campaigns may not
        let connection = SqliteConnection::new(&config.database_url).await?;
        connection.initialize_schema().await?;

        let remote: Arc<dyn CampaignRepositoryPort> = match config.remote_backend {
            RemoteBackend::Sqlite => Arc::new(SqliteCampaignRepository::new(connection.clone())),
            RemoteBackend::Memory => Arc::new(InMemoryCampaignRepository::new()),
        };
        let local: Arc<dyn LocalCampaignStorePort> =
            Arc::new(JsonFileCampaignStore::new(config.data_dir.clone()));

        let state = Self::assemble(config, connection, remote, local);
        state.campaign_service.reload().await;
        Ok(state)
    }

    fn assemble(
        config: AppConfig,
        connection: SqliteConnection,
        remote: Arc<dyn CampaignRepositoryPort>,
        local: Arc<dyn LocalCampaignStorePort>,
    ) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let identity: Arc<dyn IdentityPort> =
            Arc::new(SqliteIdentityProvider::new(connection, clock.clone()));
        let gateway = Arc::new(PersistenceGateway::new(remote, local));
        let session = ChaosBagSession::new(clock, Box::new(StdRng::from_entropy()));

        Self {
            config,
            campaign_service: CampaignService::new(session, gateway, identity),
        }
    }

    /// State backed entirely by memory
    #[cfg(test)]
    pub async fn for_tests() -> Result<Self> {
        use crate::application::ports::outbound::Locale;
        use crate::infrastructure::local_store::InMemoryCampaignStore;

        let connection = SqliteConnection::in_memory().await?;
        connection.initialize_schema().await?;

        let config = AppConfig {
            server_port: 0,
            database_url: "sqlite::memory:".to_string(),
            remote_backend: RemoteBackend::Memory,
            data_dir: std::env::temp_dir(),
            locale: Locale::English,
        };
        Ok(Self::assemble(
            config,
            connection,
            Arc::new(InMemoryCampaignRepository::new()),
            Arc::new(InMemoryCampaignStore::new()),
        ))
    }
}
