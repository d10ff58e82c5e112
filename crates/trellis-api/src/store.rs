//! Storage seam.
//!
//! The core needs only begin/commit/rollback plus a query/exec mechanism;
//! it is agnostic to the relational engine behind it. Rows travel as JSON
//! objects so the dispatcher and the resources stay free of driver types,
//! and tests can substitute a scripted implementation (see [`crate::testing`]).

use async_trait::async_trait;
use serde_json::Value;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Param::Null,
        }
    }
}

/// Error surfaced by the storage backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected the statement (constraint violation,
    /// connectivity failure, malformed row).
    #[error("{0}")]
    Backend(String),
    /// Commit or rollback failed.
    #[error("failed to close transaction: {0}")]
    Close(String),
}

/// One live transaction.
///
/// Commit and rollback consume the handle; a transaction can be closed at
/// most once.
#[async_trait]
pub trait StoreTx: Send {
    /// Run a statement returning rows, each encoded as a JSON object.
    async fn query(&mut self, sql: &str, params: &[Param]) -> Result<Vec<Value>, StoreError>;

    /// Run a statement returning the number of affected rows.
    async fn execute(&mut self, sql: &str, params: &[Param]) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Handle to the relational store; hands out transactions.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}
