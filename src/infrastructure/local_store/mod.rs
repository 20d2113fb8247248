//! Local campaign store adapters
//!
//! The file store keeps the signed-out campaign list and the per-account
//! write-ahead journals as JSON files under the data directory.

mod file_store;
mod memory_store;

pub use file_store::JsonFileCampaignStore;
pub use memory_store::InMemoryCampaignStore;
