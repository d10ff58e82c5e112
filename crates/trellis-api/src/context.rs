//! Transactional request context.
//!
//! One context per request, exclusively owned by the handling invocation.
//! It carries exactly one live transaction and the commit decision through
//! validation and persistence. The default disposition is rollback: a
//! request that errors before explicitly requesting commit must not persist
//! partial state.
//!
//! Only the dispatcher closes the context, exactly once. `close` consumes
//! the value, so a closed context cannot be touched again and resource
//! implementations (which only ever see `&mut RequestContext`) cannot
//! commit or roll back themselves.

use crate::store::{StoreError, StoreTx};

/// Lifecycle of a request context.
///
/// `Open → {Validating, Persisting} → {CommitPending, RollbackPending}`,
/// then `close` takes it to its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Open,
    Validating,
    Persisting,
    CommitPending,
    RollbackPending,
}

pub struct RequestContext {
    tx: Box<dyn StoreTx>,
    state: ContextState,
}

impl RequestContext {
    /// Wrap an already-open transaction. Commit intent starts as rollback.
    pub fn new(tx: Box<dyn StoreTx>) -> Self {
        Self {
            tx,
            state: ContextState::Open,
        }
    }

    /// The live transaction, for validation queries and persistence.
    pub fn tx(&mut self) -> &mut dyn StoreTx {
        self.tx.as_mut()
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn begin_validation(&mut self) {
        self.state = ContextState::Validating;
    }

    pub fn begin_persistence(&mut self) {
        self.state = ContextState::Persisting;
    }

    /// Flip the commit intent after a successful persistence call.
    pub fn request_commit(&mut self) {
        self.state = ContextState::CommitPending;
    }

    /// Flip back to rollback; overrides a prior commit request within the
    /// same request.
    pub fn request_rollback(&mut self) {
        self.state = ContextState::RollbackPending;
    }

    pub fn will_commit(&self) -> bool {
        self.state == ContextState::CommitPending
    }

    /// Commit or roll back according to the recorded intent.
    ///
    /// Anything other than an explicit `CommitPending` rolls back.
    pub async fn close(self) -> Result<(), StoreError> {
        if self.will_commit() {
            tracing::debug!("closing request context: commit");
            self.tx.commit().await
        } else {
            tracing::debug!(state = ?self.state, "closing request context: rollback");
            self.tx.rollback().await
        }
    }
}
