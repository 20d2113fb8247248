//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Value Objects: Token catalog, token counts, difficulty presets, ids
//! - Entities: Scenario, Investigator, Statistics
//! - Aggregates: Campaign aggregate root
//! - Domain Services: Bag building, drawing, statistics reports
//! - Schema: Versioned persisted record shape and its migrations

pub mod aggregates;
pub mod entities;
pub mod schema;
pub mod services;
pub mod value_objects;
