//! # mentora-core
//!
//! Core library for Mentora providing:
//! - Runtime configuration types and the layered config loader
//! - Error types shared by the service crates
//! - The resilient operation executor (policy-based retry engine)

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::{RetryPolicy, RetryStrategy, RuntimeConfig};
