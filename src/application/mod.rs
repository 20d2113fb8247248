//! Application layer - Use cases orchestrating the domain
//!
//! This layer contains:
//! - Ports: Interfaces for persistence, identity and time
//! - Services: The chaos bag session, persistence gateway and campaign service

pub mod ports;
pub mod services;
