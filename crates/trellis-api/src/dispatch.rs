//! CRUD dispatcher.
//!
//! One function per operation, generic over the capability contract. Each
//! function takes ownership of the request context and guarantees it
//! reaches its terminal state (commit or rollback) on every exit path;
//! no transaction is ever leaked open.
//!
//! Sequencing for mutations: validate first; any validation error skips
//! persistence entirely and rolls back. A successful persistence call flips
//! the commit intent; a persistence error flips it back.

use crate::context::RequestContext;
use crate::contract::Resource;
use crate::error::ApiError;
use serde_json::Value;
use std::collections::HashMap;

/// Read entities matching `filters`. The context closes by rollback: a
/// read never requests commit, and rolling back a read-only transaction is
/// the fail-safe disposition.
pub async fn read(
    resource: &dyn Resource,
    mut ctx: RequestContext,
    filters: &HashMap<String, String>,
) -> Result<Vec<Value>, ApiError> {
    let result = resource.read(&mut ctx, filters).await;
    match result {
        Ok(rows) => {
            finish(ctx).await?;
            Ok(rows)
        }
        Err(e) => {
            finish_after_error(ctx).await;
            Err(e)
        }
    }
}

/// Validate and insert, committing only on success.
pub async fn create(resource: &mut dyn Resource, ctx: RequestContext) -> Result<Value, ApiError> {
    mutate(resource, ctx, Op::Create).await
}

/// Validate and update the row addressed by the entity's identity.
pub async fn update(resource: &mut dyn Resource, ctx: RequestContext) -> Result<Value, ApiError> {
    mutate(resource, ctx, Op::Update).await
}

/// Delete the row addressed by the entity's identity.
///
/// Missing identity is a caller error and is never dispatched to the
/// resource; the store stays untouched.
pub async fn delete(resource: &dyn Resource, mut ctx: RequestContext) -> Result<(), ApiError> {
    let identity = resource.identify();
    if !identity.has_key() {
        ctx.request_rollback();
        finish_after_error(ctx).await;
        return Err(ApiError::programming(format!(
            "delete of {} requires an assigned identity",
            identity.kind
        )));
    }

    ctx.begin_persistence();
    match resource.delete(&mut ctx).await {
        Ok(()) => {
            ctx.request_commit();
            finish(ctx).await?;
            tracing::info!(%identity, "deleted");
            Ok(())
        }
        Err(e) => {
            ctx.request_rollback();
            finish_after_error(ctx).await;
            Err(e)
        }
    }
}

enum Op {
    Create,
    Update,
}

async fn mutate(
    resource: &mut dyn Resource,
    mut ctx: RequestContext,
    op: Op,
) -> Result<Value, ApiError> {
    ctx.begin_validation();
    let errs = match resource.validate(&mut ctx).await {
        Ok(errs) => errs,
        Err(e) => {
            ctx.request_rollback();
            finish_after_error(ctx).await;
            return Err(e);
        }
    };
    if !errs.is_empty() {
        // No partial writes are attempted once validation has failed.
        ctx.request_rollback();
        finish_after_error(ctx).await;
        return Err(ApiError::Validation(errs));
    }

    ctx.begin_persistence();
    let result = match op {
        Op::Create => resource.create(&mut ctx).await,
        Op::Update => resource.update(&mut ctx).await,
    };
    match result {
        Ok(()) => {
            ctx.request_commit();
            finish(ctx).await?;
            tracing::info!(identity = %resource.identify(), "persisted");
            resource.payload()
        }
        Err(e) => {
            ctx.request_rollback();
            finish_after_error(ctx).await;
            Err(e)
        }
    }
}

/// Close the context when its outcome decides the request's outcome.
async fn finish(ctx: RequestContext) -> Result<(), ApiError> {
    ctx.close().await.map_err(ApiError::Persistence)
}

/// Close the context on a path that already has an error to report. A
/// rollback failure must not mask that error, so it is only logged.
async fn finish_after_error(ctx: RequestContext) {
    if let Err(e) = ctx.close().await {
        tracing::error!("rollback failed while reporting an earlier error: {}", e);
    }
}
