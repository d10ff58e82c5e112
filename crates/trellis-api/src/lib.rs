//! Generic CRUD machinery for Trellis configuration resources.
//!
//! One request-handling pipeline serves every resource type:
//!
//! 1. The boundary layer resolves a registry key to a [`contract::Resource`]
//!    implementation and opens a transaction on the injected [`store::Store`].
//! 2. The [`dispatch`] functions run validate → persist → commit/rollback
//!    against the [`context::RequestContext`], uniformly for every type.
//! 3. Errors come back as one [`error::ApiError`] per request, with a
//!    classification hint for status mapping.
//!
//! The dispatcher never branches on concrete entity kinds; everything
//! per-type flows through the capability contract.

pub mod context;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod store;
pub mod testing;

pub use context::{ContextState, RequestContext};
pub use contract::Resource;
pub use error::{ApiError, ErrorKind};
pub use registry::{Registry, ResourceFactory};
pub use store::{Param, Store, StoreError, StoreTx};
