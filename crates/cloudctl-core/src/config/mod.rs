//! Configuration and profile management for cloudctl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! Profiles hold the API endpoint, an optional token, and per-profile defaults
//! for waiting on asynchronous operations.
//!
//! # Features
//!
//! - Multiple named profiles with a default
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod error;

// Re-export main types for convenience
pub use config::{Config, DEFAULT_API_URL, Profile};
pub use error::{ConfigError, Result};
