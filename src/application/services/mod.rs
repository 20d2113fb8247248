//! Application services - Use case implementations
//!
//! The session holds interactive state, the gateway decides where campaigns
//! are stored, and the campaign service ties both to the signed-in identity.

pub mod campaign_service;
pub mod chaos_bag_session;
pub mod persistence_gateway;

pub use campaign_service::CampaignService;
pub use chaos_bag_session::{BagView, ChaosBagSession, DrawOutcome, SessionError};
pub use persistence_gateway::{GatewayError, PersistenceGateway};
