//! Traits and structs supporting the resolution protocol
//!
//! Every injectable value is produced by a [Descriptor]. A descriptor is asked to
//! resolve itself under a [Context] and returns a dynamically typed [Value].
//!
//! * The [Descriptor] trait indicates that a struct can produce an instance.
//!   Implementations may be stateless (bound values, lookups) or memoizing (services).
//!   Callers must not assume purity: resolving may construct something, or may return
//!   a value cached during an earlier call with another context.
//! * The [Factory] trait builds a service instance from its resolved [Parameters].
//! * The [Context] trait is the ambient container passed unchanged through resolution.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Dynamically typed instance produced by a [Descriptor]
pub type Value = Arc<dyn Any + Send + Sync>;

/// Boxed error raised by a constructor
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Wrap any shareable data into a [Value]
pub fn value<T: Any + Send + Sync>(data: T) -> Value {
    Arc::new(data)
}

/// Produce an instance under a given context
pub trait Descriptor: Send + Sync {
    /// Resolve this descriptor into a value.
    ///
    /// Nested descriptors receive the same context.
    fn resolve(&self, context: &dyn Context) -> Result<Value, ResolveError>;
}

/// Ambient container passed through resolution calls.
///
/// The resolution core never inspects the context, only nested descriptors use it
/// to look up sibling services.
pub trait Context: Send + Sync {
    /// Find the descriptor registered under the given name
    fn descriptor(&self, name: &str) -> Option<Arc<dyn Descriptor>>;
}

/// Build a service instance from named parameters
pub trait Factory: Send + Sync {
    fn create(&self, parameters: &Parameters) -> Result<Value, ResolveError>;
}

impl<F> Factory for F
where
    F: Fn(&Parameters) -> Result<Value, ResolveError> + Send + Sync,
{
    fn create(&self, parameters: &Parameters) -> Result<Value, ResolveError> {
        (self)(parameters)
    }
}

/// Resolved dependency values, in the order the dependencies were declared.
///
/// Services produce them with `resolve_dependencies`. They can also be collected from
/// `(name, value)` pairs, to call a [Factory] directly.
#[derive(Clone, Default)]
pub struct Parameters(Vec<(String, Value)>);

impl Parameters {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Names are unique upstream, this only appends
    pub(crate) fn push(&mut self, name: String, value: Value) {
        self.0.push((name, value));
    }

    pub(crate) fn entries(&self) -> &[(String, Value)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Retrieve a parameter with its concrete type.
    ///
    /// Returns `None` if the name is unknown or holds another type.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).cloned().and_then(|v| v.downcast::<T>().ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A repeated name keeps its first value
impl<N: Into<String>> FromIterator<(N, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut parameters = Self::default();
        for (name, value) in iter {
            let name = name.into();
            if parameters.get(&name).is_none() {
                parameters.push(name, value);
            }
        }
        parameters
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Errors triggered during the wiring and resolution process
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Service dependencies are immutable: '{0}' is already set")]
    ImmutableValue(String),
    #[error("Failed to construct '{service}': {source}")]
    Construction {
        service: String,
        #[source]
        source: BoxError,
    },
    #[error("Cyclic dependencies: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
    #[error("No descriptor registered under '{0}'")]
    NotFound(String),
    #[error("'{service}' expects an argument at position {position}, no dependency is left")]
    MissingArgument { service: String, position: usize },
    #[error("'{service}' got an unexpected extra dependency '{dependency}'")]
    UnexpectedArgument { service: String, dependency: String },
    #[error("'{service}' expects dependency '{dependency}' to be a {expected}")]
    ArgumentType {
        service: String,
        dependency: String,
        expected: &'static str,
    },
}

impl ResolveError {
    /// Wrap a constructor failure for the named service
    pub fn construction(service: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Construction {
            service: service.into(),
            source: source.into(),
        }
    }

    pub(crate) fn argument_type<T>(service: &str, dependency: &str) -> Self {
        Self::ArgumentType {
            service: service.to_string(),
            dependency: dependency.to_string(),
            expected: type_name::<T>(),
        }
    }
}
