//! # mentora-db
//!
//! Keeps the application's database connection alive:
//! - `DatabaseClient`: the connect / disconnect / ping capability of a driver
//! - `TransientCodePredicate`: classifies driver errors as transient or terminal
//! - `ConnectionSupervisor`: bounded startup connection with lazy fallback, and
//!   a retry wrapper (disconnect-then-reconnect between attempts) for queries
//! - `TcpCheckClient`: a `DatabaseClient` that verifies TCP reachability of
//!   the server named by a connection URL

mod client;
mod error;
mod predicate;
mod supervisor;
mod tcp;

pub use client::DatabaseClient;
pub use error::{DbError, Result};
pub use predicate::TransientCodePredicate;
pub use supervisor::{ConnectionSupervisor, StartupOutcome};
pub use tcp::TcpCheckClient;
