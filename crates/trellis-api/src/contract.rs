//! Resource capability contract.
//!
//! Every resource type implements this one trait; the dispatcher is written
//! once against it and reused for every type without modification. No
//! central switch over entity kinds exists anywhere in the pipeline.

use crate::context::RequestContext;
use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use trellis_core::Identity;
use trellis_validate::ValidationErrors;

#[async_trait]
pub trait Resource: Send + Sync {
    /// Stable key fields, independent of mutable attributes.
    fn identify(&self) -> Identity;

    /// Evaluate the full per-field rule set against the candidate entity.
    ///
    /// Referential checks may issue read-only queries against the open
    /// transaction; their failures merge into the returned set. An empty
    /// set means the entity may be persisted.
    async fn validate(&self, ctx: &mut RequestContext) -> Result<ValidationErrors, ApiError>;

    /// Return matching entities as JSON payloads. An empty filter map
    /// returns everything; unrecognized filter keys are ignored. Zero
    /// matches is an empty sequence, not an error.
    async fn read(
        &self,
        ctx: &mut RequestContext,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Value>, ApiError>;

    /// Insert one row; on success the identity is populated from the
    /// generated key.
    async fn create(&mut self, ctx: &mut RequestContext) -> Result<(), ApiError>;

    /// Update the row addressed by the identity; `NotFound` if the
    /// identity does not match an existing row.
    async fn update(&mut self, ctx: &mut RequestContext) -> Result<(), ApiError>;

    /// Delete the row addressed by the identity. Not idempotent: deleting
    /// a missing row is `NotFound`, not a no-op.
    async fn delete(&self, ctx: &mut RequestContext) -> Result<(), ApiError>;

    /// The entity's JSON payload for the success response.
    fn payload(&self) -> Result<Value, ApiError>;
}
