//! Aggregates - Cluster of domain objects treated as a single unit

pub mod campaign_aggregate;

pub use campaign_aggregate::{AggregateError, Campaign, CampaignSummary};
