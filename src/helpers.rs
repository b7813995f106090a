use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::resolve::{Context, Descriptor, ResolveError, Value};

/// Bound value, resolved to the same instance under any context
#[derive(Clone)]
pub struct ValueDescriptor(Value);

impl ValueDescriptor {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Arc::new(data))
    }

    /// Bind an existing shared value, keeping its identity
    pub fn shared(value: Value) -> Self {
        Self(value)
    }
}

impl Descriptor for ValueDescriptor {
    fn resolve(&self, _context: &dyn Context) -> Result<Value, ResolveError> {
        Ok(self.0.clone())
    }
}

/// Reference to another descriptor registered by name in the context
#[derive(Clone, Debug)]
pub struct ReferenceDescriptor {
    name: String,
}

impl ReferenceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Descriptor for ReferenceDescriptor {
    fn resolve(&self, context: &dyn Context) -> Result<Value, ResolveError> {
        trace!(reference = %self.name, "looking up descriptor");
        let target = context
            .descriptor(&self.name)
            .ok_or_else(|| ResolveError::NotFound(self.name.clone()))?;
        target.resolve(context)
    }
}

/// Empty context
impl Context for () {
    fn descriptor(&self, _name: &str) -> Option<Arc<dyn Descriptor>> {
        None
    }
}

/// Named registry of descriptors
impl Context for HashMap<String, Arc<dyn Descriptor>> {
    fn descriptor(&self, name: &str) -> Option<Arc<dyn Descriptor>> {
        self.get(name).cloned()
    }
}
