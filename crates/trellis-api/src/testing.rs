//! Scripted in-memory store for tests.
//!
//! The source-of-truth behaviors (atomicity, no-commit-on-validation-failure,
//! exactly-one-close) are asserted against this journal instead of a real
//! database. Results are consumed in FIFO order: script the rows/row-counts
//! you expect the code under test to ask for, in order.

use crate::store::{Param, Store, StoreError, StoreTx};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Record of everything a request did to the store.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    /// SQL text of each row-returning statement, in order.
    pub queries: Vec<String>,
    /// SQL text of each row-count statement, in order.
    pub executes: Vec<String>,
    pub committed: bool,
    pub rolled_back: bool,
    /// Number of commit/rollback calls observed. Must end at 1.
    pub closes: u32,
}

#[derive(Default)]
struct Inner {
    query_results: VecDeque<Result<Vec<Value>, String>>,
    exec_results: VecDeque<Result<u64, String>>,
    commit_error: Option<String>,
    journal: Journal,
}

/// Store whose transactions replay a script and journal every call.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next query to return these rows.
    pub fn expect_rows(&self, rows: Vec<Value>) {
        self.lock().query_results.push_back(Ok(rows));
    }

    /// Script the next query to fail.
    pub fn expect_query_err(&self, message: &str) {
        self.lock().query_results.push_back(Err(message.to_string()));
    }

    /// Script the next execute to report this many affected rows.
    pub fn expect_exec(&self, affected: u64) {
        self.lock().exec_results.push_back(Ok(affected));
    }

    /// Script the next execute to fail.
    pub fn expect_exec_err(&self, message: &str) {
        self.lock().exec_results.push_back(Err(message.to_string()));
    }

    /// Make the eventual commit fail.
    pub fn fail_commit(&self, message: &str) {
        self.lock().commit_error = Some(message.to_string());
    }

    /// Snapshot of everything recorded so far.
    pub fn journal(&self) -> Journal {
        self.lock().journal.clone()
    }

    /// Test convenience: begin without the `Result` wrapper.
    pub async fn begin_mock(&self) -> Box<dyn StoreTx> {
        Box::new(MockTx {
            inner: Arc::clone(&self.inner),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock store lock poisoned")
    }
}

#[async_trait]
impl Store for MockStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        Ok(self.begin_mock().await)
    }
}

struct MockTx {
    inner: Arc<Mutex<Inner>>,
}

#[async_trait]
impl StoreTx for MockTx {
    async fn query(&mut self, sql: &str, _params: &[Param]) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        inner.journal.queries.push(sql.to_string());
        match inner.query_results.pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(msg)) => Err(StoreError::Backend(msg)),
            None => Err(StoreError::Backend(format!("unscripted query: {}", sql))),
        }
    }

    async fn execute(&mut self, sql: &str, _params: &[Param]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        inner.journal.executes.push(sql.to_string());
        match inner.exec_results.pop_front() {
            Some(Ok(n)) => Ok(n),
            Some(Err(msg)) => Err(StoreError::Backend(msg)),
            None => Err(StoreError::Backend(format!("unscripted execute: {}", sql))),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        inner.journal.closes += 1;
        if let Some(msg) = inner.commit_error.take() {
            // A failed commit leaves nothing persisted.
            inner.journal.rolled_back = true;
            return Err(StoreError::Close(msg));
        }
        inner.journal.committed = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        inner.journal.closes += 1;
        inner.journal.rolled_back = true;
        Ok(())
    }
}
