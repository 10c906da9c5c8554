//! Type definitions shared across Mentora crates

mod runtime_config;

pub use runtime_config::*;
