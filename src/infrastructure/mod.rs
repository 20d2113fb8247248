//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory remote campaign stores
//! - Local store: JSON files for the signed-out list and write-ahead journals
//! - Identity: local accounts with argon2 password hashes
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod clock;
pub mod config;
pub mod http;
pub mod identity;
pub mod local_store;
pub mod persistence;
pub mod state;
