//! Core types and configuration for the price-timeline system.
//!
//! This crate provides shared types used across all other crates:
//! - Priced interval value types (keys, periods, records)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
