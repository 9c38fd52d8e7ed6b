//! Core traits for zonesync
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsBackend`]: Fetch zones and apply record-set changes via a backend API
//! - [`DesiredState`]: Supply the declared records of a zone

pub mod desired_state;
pub mod dns_backend;

pub use desired_state::DesiredState;
pub use dns_backend::{DnsBackend, DnsBackendFactory};
