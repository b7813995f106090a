use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::positional::{Constructor, PositionalBindingFactory, TryConstructor};
use crate::resolve::{Context, Descriptor, Factory, Parameters, ResolveError, Value};

/// Descriptor of an object built by a factory from named dependencies.
///
/// # Singleton per descriptor
///
/// The first successful [resolve](Descriptor::resolve) stores the instance, and every
/// later call returns that same instance, whatever context it receives. The cache is
/// keyed by the descriptor itself, not by the context: resolving with another context
/// afterwards silently ignores it. Nothing ever clears the cached instance.
///
/// A failed construction is not cached: the next call resolves the dependencies and
/// invokes the factory again.
///
/// Concurrent first resolutions construct the service at most once, the other callers
/// wait for the winner and share its instance.
pub struct ServiceDescriptor {
    type_identifier: String,
    factory: Box<dyn Factory>,
    dependencies: Vec<(String, Arc<dyn Descriptor>)>,
    instance: OnceCell<Value>,
}

impl ServiceDescriptor {
    /// Describe a service built by a constructor receiving its dependencies by position
    pub fn new<Args, Ret, C>(type_identifier: impl Into<String>, constructor: C) -> Self
    where
        Args: 'static,
        Ret: 'static,
        C: Constructor<Args, Ret>,
    {
        let type_identifier = type_identifier.into();
        let factory = PositionalBindingFactory::new(type_identifier.clone(), constructor);
        Self::with_factory(type_identifier, factory)
    }

    /// Describe a service built by a fallible constructor receiving its dependencies by position.
    ///
    /// A constructor error is reported as [ResolveError::Construction] and is not cached.
    pub fn try_new<Args, Ret, E, C>(type_identifier: impl Into<String>, constructor: C) -> Self
    where
        Args: 'static,
        Ret: 'static,
        E: 'static,
        C: TryConstructor<Args, Ret, E>,
    {
        let type_identifier = type_identifier.into();
        let factory = PositionalBindingFactory::try_new(type_identifier.clone(), constructor);
        Self::with_factory(type_identifier, factory)
    }

    /// Describe a service built by a custom factory
    pub fn with_factory(
        type_identifier: impl Into<String>,
        factory: impl Factory + 'static,
    ) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            factory: Box::new(factory),
            dependencies: Vec::new(),
            instance: OnceCell::new(),
        }
    }

    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }

    pub fn factory(&self) -> &dyn Factory {
        self.factory.as_ref()
    }

    /// Registered dependencies, in insertion order
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, &Arc<dyn Descriptor>)> {
        self.dependencies.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn dependency(&self, name: &str) -> Option<&Arc<dyn Descriptor>> {
        self.dependencies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Check if the instance has already been constructed
    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Add a named dependency.
    ///
    /// Return an error if the name is already bound, the existing binding is kept.
    pub fn set_dependency(
        &mut self,
        name: impl ToString,
        descriptor: Arc<dyn Descriptor>,
    ) -> Result<&mut Self, ResolveError> {
        let name = name.to_string();
        if self.dependency(&name).is_some() {
            warn!(
                service = %self.type_identifier,
                dependency = %name,
                "rejected dependency overwrite"
            );
            return Err(ResolveError::ImmutableValue(name));
        }
        debug!(service = %self.type_identifier, dependency = %name, "registered dependency");
        self.dependencies.push((name, descriptor));
        Ok(self)
    }

    /// Evaluate all dependency descriptors in the given context.
    ///
    /// This ignores the cached instance and always resolves every dependency.
    /// The first failing dependency aborts the evaluation.
    pub fn resolve_dependencies(&self, context: &dyn Context) -> Result<Parameters, ResolveError> {
        let mut parameters = Parameters::with_capacity(self.dependencies.len());
        for (name, descriptor) in &self.dependencies {
            trace!(service = %self.type_identifier, dependency = %name, "resolving dependency");
            parameters.push(name.clone(), descriptor.resolve(context)?);
        }
        Ok(parameters)
    }

    fn construct(&self, context: &dyn Context) -> Result<Value, ResolveError> {
        let parameters = self.resolve_dependencies(context)?;
        let instance = self.factory.create(&parameters)?;
        debug!(service = %self.type_identifier, ?parameters, "constructed service");
        Ok(instance)
    }
}

impl Descriptor for ServiceDescriptor {
    fn resolve(&self, context: &dyn Context) -> Result<Value, ResolveError> {
        if let Some(instance) = self.instance.get() {
            trace!(service = %self.type_identifier, "using cached instance");
            return Ok(instance.clone());
        }

        // Must be checked before entering the cell: re-entrant initialization would block forever
        let _guard = ResolutionGuard::enter(self)?;
        let instance = self.instance.get_or_try_init(|| self.construct(context))?;
        Ok(instance.clone())
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("type_identifier", &self.type_identifier)
            .field(
                "dependencies",
                &self.dependencies.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

thread_local! {
    /// Services currently being resolved on this thread, outermost first
    static RESOLVING: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a service as being resolved on the current thread until dropped
struct ResolutionGuard {
    id: usize,
}

impl ResolutionGuard {
    fn enter(service: &ServiceDescriptor) -> Result<Self, ResolveError> {
        let id = service as *const ServiceDescriptor as usize;
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|(open, _)| *open == id) {
                let mut path: Vec<String> =
                    stack[start..].iter().map(|(_, n)| n.clone()).collect();
                path.push(service.type_identifier.clone());
                warn!(service = %service.type_identifier, path = ?path, "cyclic dependency");
                return Err(ResolveError::CyclicDependency(path));
            }
            stack.push((id, service.type_identifier.clone()));
            Ok(Self { id })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        let _ = RESOLVING.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|(open, _)| *open == self.id) {
                stack.remove(pos);
            }
        });
    }
}
