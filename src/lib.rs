//! Runtime dependency injection core: declarative service descriptors resolved once and cached.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use svcwire::*;
//! // Define regular structs and their constructors
//! struct Logger {
//!     prefix: String,
//! }
//!
//! struct Mailer {
//!     logger: Arc<Logger>,
//!     host: Arc<String>,
//! }
//!
//! # fn main() -> Result<(), ResolveError> {
//! // Describe the services and wire their dependencies by name
//! let logger = Arc::new(ServiceDescriptor::new("Logger", || Logger {
//!     prefix: "mail".to_string(),
//! }));
//! let mut mailer = ServiceDescriptor::new("Mailer", |logger: Arc<Logger>, host: Arc<String>| {
//!     Mailer { logger, host }
//! });
//! mailer
//!     .set_dependency("logger", logger)?
//!     .set_dependency("host", Arc::new(ValueDescriptor::new("smtp.local".to_string())))?;
//!
//! // The first resolution builds the service, later ones reuse it
//! let first = mailer.resolve(&())?;
//! let second = mailer.resolve(&())?;
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! let mailer = first.downcast::<Mailer>().expect("a mailer");
//! assert_eq!(mailer.host.as_str(), "smtp.local");
//! assert_eq!(mailer.logger.prefix, "mail");
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! * The [Descriptor] trait indicates that a struct can resolve itself into a [Value] under a
//!   [Context].
//!   Bound values ([ValueDescriptor]), lookups by name ([ReferenceDescriptor]) and services
//!   ([ServiceDescriptor]) all implement it.
//! * A [ServiceDescriptor] owns a [Factory], an ordered list of named dependencies and a cache
//!   slot.
//!   Resolving it resolves each dependency with the same context, hands the resulting [Parameters]
//!   to the factory, and caches the instance forever.
//! * The default factory is a [PositionalBindingFactory]: the resolved values are passed to a plain
//!   constructor function by position, following the order in which dependencies were added.
//!
//! Re-entering a service that is still being resolved on the current thread fails with
//! [ResolveError::CyclicDependency] instead of recursing forever.

mod helpers;
mod positional;
mod resolve;
mod service;

pub use helpers::{ReferenceDescriptor, ValueDescriptor};
pub use positional::{Arguments, Constructor, PositionalBindingFactory, TryConstructor};
pub use resolve::{value, BoxError, Context, Descriptor, Factory, Parameters, ResolveError, Value};
pub use service::ServiceDescriptor;
