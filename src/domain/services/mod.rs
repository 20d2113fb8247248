//! Domain services - Pure business logic operations

mod chaos_bag;
mod statistics_report;

pub use chaos_bag::Bag;
pub use statistics_report::{StatisticsReport, TokenShare, RECENT_DRAWS};
