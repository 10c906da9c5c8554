//! Shared test infrastructure for mentora-db tests
//!
//! `ScriptedClient` replays queued connect/ping outcomes and counts every
//! call, so tests can assert exactly how the supervisor drove the driver.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use mentora_db::{DatabaseClient, DbError, Result};

#[derive(Default)]
pub struct ScriptedClient {
    connect_results: Mutex<VecDeque<Result<()>>>,
    ping_results: Mutex<VecDeque<Result<()>>>,
    connect_fallback: Mutex<Option<DbError>>,
    connects: AtomicU32,
    disconnects: AtomicU32,
    pings: AtomicU32,
}

impl ScriptedClient {
    /// A client whose every call succeeds
    pub fn healthy() -> Self {
        Self::default()
    }

    /// Fail the next `n` connects with `err`, then succeed
    pub fn failing_connects(n: usize, err: DbError) -> Self {
        let client = Self::default();
        client.queue_connect_failures(n, err);
        client
    }

    /// Fail every connect with `err`
    pub fn unreachable(err: DbError) -> Self {
        let client = Self::default();
        *client.connect_fallback.lock().unwrap() = Some(err);
        client
    }

    pub fn queue_connect_failures(&self, n: usize, err: DbError) {
        let mut queue = self.connect_results.lock().unwrap();
        for _ in 0..n {
            queue.push_back(Err(err.clone()));
        }
    }

    pub fn queue_ping_results(&self, results: Vec<Result<()>>) {
        self.ping_results.lock().unwrap().extend(results);
    }

    /// Let connects succeed again after `unreachable`
    pub fn recover(&self) {
        *self.connect_fallback.lock().unwrap() = None;
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn connect(&self) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.connect_results.lock().unwrap().pop_front() {
            return result;
        }
        match self.connect_fallback.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.ping_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

pub fn refused() -> DbError {
    DbError::connection(Some("ECONNREFUSED"), "connect ECONNREFUSED 127.0.0.1:5432")
}

pub fn server_closed() -> DbError {
    DbError::query(Some("P1017"), "server has closed the connection")
}
