// Named-object registry contract
// Reference-valued configuration entries resolve against this at bind time.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves objects referenced by name from configuration values.
pub trait Registry: Send + Sync {
    /// Look up a bound object; `None` when the name is unbound.
    fn resolve(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// In-memory registry backed by a name map.
#[derive(Default)]
pub struct MapRegistry {
    objects: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an object under a name, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, object: Arc<dyn Any + Send + Sync>) {
        self.objects.insert(name.into(), object);
    }

    /// Builder-style [`MapRegistry::bind`].
    pub fn with(mut self, name: impl Into<String>, object: Arc<dyn Any + Send + Sync>) -> Self {
        self.bind(name, object);
        self
    }
}

impl Registry for MapRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.objects.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_objects_resolve_by_name() {
        let registry = MapRegistry::new().with("pool", Arc::new(42_usize));

        let object = registry.resolve("pool").expect("pool is bound");
        assert_eq!(*object.downcast::<usize>().expect("usize"), 42);
    }

    #[test]
    fn test_unbound_names_resolve_to_none() {
        let registry = MapRegistry::new();
        assert!(registry.resolve("missing").is_none());
    }

    #[test]
    fn test_rebinding_replaces_the_object() {
        let mut registry = MapRegistry::new();
        registry.bind("pool", Arc::new(1_usize));
        registry.bind("pool", Arc::new(2_usize));

        let object = registry.resolve("pool").expect("pool is bound");
        assert_eq!(*object.downcast::<usize>().expect("usize"), 2);
    }
}
