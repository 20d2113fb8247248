//! Remote campaign store adapters
//!
//! SQLite is the durable store; the in-memory repository backs demos and
//! tests.

mod connection;
mod memory_campaign_repository;
mod sqlite_campaign_repository;

pub use connection::SqliteConnection;
pub use memory_campaign_repository::InMemoryCampaignRepository;
pub use sqlite_campaign_repository::SqliteCampaignRepository;
