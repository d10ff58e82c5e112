//! Resource type registry.
//!
//! The boundary layer resolves a URL key (e.g. `"cachegroups"`) to a
//! factory, builds a capability implementation from the request body (or an
//! empty prototype for reads), and hands it to the dispatcher. This is the
//! only place keys and types meet; the dispatcher itself stays type-free.

use crate::contract::Resource;
use crate::error::ApiError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Builds capability implementations for one resource type.
pub trait ResourceFactory: Send + Sync {
    /// Registry key the type is served under.
    fn kind(&self) -> &'static str;

    /// Prototype with no fields set, for Read dispatch.
    fn empty(&self) -> Box<dyn Resource>;

    /// Decode a request body into a candidate entity. Decoding failures are
    /// caller errors; field-level problems are left to validation.
    fn from_json(&self, body: Value) -> Result<Box<dyn Resource>, ApiError>;
}

#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<&'static str, Box<dyn ResourceFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Box<dyn ResourceFactory>) {
        let kind = factory.kind();
        if self.entries.insert(kind, factory).is_some() {
            tracing::warn!("resource type '{}' registered twice; keeping the later one", kind);
        }
    }

    pub fn get(&self, kind: &str) -> Option<&dyn ResourceFactory> {
        self.entries.get(kind).map(|f| f.as_ref())
    }

    /// Registered keys in deterministic order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use trellis_core::Identity;
    use trellis_validate::ValidationErrors;

    struct Noop;

    #[async_trait]
    impl Resource for Noop {
        fn identify(&self) -> Identity {
            Identity::new("noop", None, None)
        }
        async fn validate(
            &self,
            _ctx: &mut RequestContext,
        ) -> Result<ValidationErrors, ApiError> {
            Ok(ValidationErrors::new())
        }
        async fn read(
            &self,
            _ctx: &mut RequestContext,
            _filters: &HashMap<String, String>,
        ) -> Result<Vec<Value>, ApiError> {
            Ok(vec![])
        }
        async fn create(&mut self, _ctx: &mut RequestContext) -> Result<(), ApiError> {
            Ok(())
        }
        async fn update(&mut self, _ctx: &mut RequestContext) -> Result<(), ApiError> {
            Ok(())
        }
        async fn delete(&self, _ctx: &mut RequestContext) -> Result<(), ApiError> {
            Ok(())
        }
        fn payload(&self) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }
    }

    struct NoopFactory;

    impl ResourceFactory for NoopFactory {
        fn kind(&self) -> &'static str {
            "noops"
        }
        fn empty(&self) -> Box<dyn Resource> {
            Box::new(Noop)
        }
        fn from_json(&self, _body: Value) -> Result<Box<dyn Resource>, ApiError> {
            Ok(Box::new(Noop))
        }
    }

    #[test]
    fn lookup_by_key_and_deterministic_listing() {
        let mut registry = Registry::new();
        registry.register(Box::new(NoopFactory));

        assert!(registry.get("noops").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["noops"]);
    }
}
