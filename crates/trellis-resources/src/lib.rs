//! Concrete configuration resources.
//!
//! One module per resource type. Each supplies its own SQL, rule set, and
//! identity through the capability contract in `trellis-api`; nothing here
//! is visible to the dispatcher beyond that contract.

pub mod cachegroup;
pub mod delivery_service;
mod row;

use trellis_api::Registry;

/// Register every resource type under its boundary key.
pub fn register_all(registry: &mut Registry) {
    registry.register(Box::new(cachegroup::CacheGroupFactory));
    registry.register(Box::new(delivery_service::DeliveryServiceFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_resource_types_are_registered() {
        let mut registry = Registry::new();
        register_all(&mut registry);
        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(kinds, vec!["cachegroups", "deliveryservices"]);
    }
}
