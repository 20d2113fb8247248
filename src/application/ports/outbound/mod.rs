//! Outbound ports - Interfaces that the application requires from external systems

mod clock_port;
mod identity_port;
mod local_store_port;
mod repository_port;

pub use clock_port::ClockPort;
pub use identity_port::{Account, AuthError, IdentityPort, Locale};
pub use local_store_port::{JournalEntry, LocalCampaignStorePort, LocalStoreError};
pub use repository_port::{CampaignRepositoryPort, RepositoryError};
