//! Domain entities - Core business objects owned by a campaign

mod investigator;
mod scenario;
mod statistics;

pub use investigator::{Investigator, InvestigatorClass, InvestigatorEdit, Trauma};
pub use scenario::Scenario;
pub use statistics::{DrawRecord, Statistics};
