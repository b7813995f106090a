//! Positional binding of resolved dependencies to constructor functions
//!
//! A [PositionalBindingFactory] hands the resolved [Parameters] to a constructor by
//! position: the first declared dependency becomes the first argument, and so on.
//! Parameter names only serve error reporting at this stage.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::resolve::{BoxError, Factory, Parameters, ResolveError, Value};

/// Cursor over the ordered parameters supplied to a constructor
pub struct Arguments<'a> {
    service: &'a str,
    position: usize,
    values: std::slice::Iter<'a, (String, Value)>,
}

impl<'a> Arguments<'a> {
    fn new(service: &'a str, parameters: &'a Parameters) -> Self {
        Self {
            service,
            position: 0,
            values: parameters.entries().iter(),
        }
    }

    /// Take the next positional value with its expected type
    pub fn argument<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>, ResolveError> {
        let Some((name, value)) = self.values.next() else {
            return Err(ResolveError::MissingArgument {
                service: self.service.to_string(),
                position: self.position,
            });
        };
        self.position += 1;
        value
            .clone()
            .downcast::<T>()
            .map_err(|_| ResolveError::argument_type::<T>(self.service, name))
    }

    /// Reject leftover parameters that no argument consumed
    pub fn finish(mut self) -> Result<(), ResolveError> {
        match self.values.next() {
            None => Ok(()),
            Some((name, _)) => Err(ResolveError::UnexpectedArgument {
                service: self.service.to_string(),
                dependency: name.clone(),
            }),
        }
    }
}

/// A constructor receiving its arguments by position.
///
/// This trait is implemented for all functions with up to 10 arguments of type `Arc<_>`,
/// using a tuple to describe the argument types. The returned value is the instance:
/// use [TryConstructor] for constructors that can fail.
pub trait Constructor<Args, Ret>: Send + Sync + 'static {
    fn construct(&self, args: Arguments<'_>) -> Result<Value, ResolveError>;
}

/// A fallible constructor receiving its arguments by position.
///
/// The error is reported as [ResolveError::Construction] for the service being built.
pub trait TryConstructor<Args, Ret, E>: Send + Sync + 'static {
    fn try_construct(&self, args: Arguments<'_>) -> Result<Value, ResolveError>;
}

macro_rules! constructor_tuple ({ $($param:ident)* } => {
    impl<Func, Ret, $($param,)*> Constructor<($($param,)*), Ret> for Func
    where
        Func: Fn($(Arc<$param>),*) -> Ret + Send + Sync + 'static,
        Ret: Any + Send + Sync,
        $($param: Any + Send + Sync,)*
    {
        #[inline]
        #[allow(non_snake_case, unused_mut)]
        fn construct(&self, mut args: Arguments<'_>) -> Result<Value, ResolveError> {
            $(let $param = args.argument::<$param>()?;)*
            args.finish()?;
            Ok(Arc::new((self)($($param,)*)))
        }
    }

    impl<Func, Ret, Err, $($param,)*> TryConstructor<($($param,)*), Ret, Err> for Func
    where
        Func: Fn($(Arc<$param>),*) -> Result<Ret, Err> + Send + Sync + 'static,
        Ret: Any + Send + Sync,
        Err: Into<BoxError>,
        $($param: Any + Send + Sync,)*
    {
        #[inline]
        #[allow(non_snake_case, unused_mut)]
        fn try_construct(&self, mut args: Arguments<'_>) -> Result<Value, ResolveError> {
            let service = args.service;
            $(let $param = args.argument::<$param>()?;)*
            args.finish()?;
            match (self)($($param,)*) {
                Ok(instance) => Ok(Arc::new(instance)),
                Err(e) => Err(ResolveError::construction(service, e)),
            }
        }
    }
});

constructor_tuple! {}
constructor_tuple! { A }
constructor_tuple! { A B }
constructor_tuple! { A B C }
constructor_tuple! { A B C D }
constructor_tuple! { A B C D E }
constructor_tuple! { A B C D E F }
constructor_tuple! { A B C D E F G }
constructor_tuple! { A B C D E F G H }
constructor_tuple! { A B C D E F G H I }
constructor_tuple! { A B C D E F G H I J }

type BoundConstructor = Box<dyn Fn(Arguments<'_>) -> Result<Value, ResolveError> + Send + Sync>;

/// Factory building instances of a named type with positional arguments
pub struct PositionalBindingFactory {
    type_identifier: String,
    constructor: BoundConstructor,
}

impl PositionalBindingFactory {
    pub fn new<Args, Ret, C>(type_identifier: impl Into<String>, constructor: C) -> Self
    where
        Args: 'static,
        Ret: 'static,
        C: Constructor<Args, Ret>,
    {
        Self {
            type_identifier: type_identifier.into(),
            constructor: Box::new(move |args: Arguments<'_>| constructor.construct(args)),
        }
    }

    /// Build instances with a constructor that can fail
    pub fn try_new<Args, Ret, E, C>(type_identifier: impl Into<String>, constructor: C) -> Self
    where
        Args: 'static,
        Ret: 'static,
        E: 'static,
        C: TryConstructor<Args, Ret, E>,
    {
        Self {
            type_identifier: type_identifier.into(),
            constructor: Box::new(move |args: Arguments<'_>| constructor.try_construct(args)),
        }
    }

    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }
}

impl Factory for PositionalBindingFactory {
    fn create(&self, parameters: &Parameters) -> Result<Value, ResolveError> {
        (self.constructor)(Arguments::new(&self.type_identifier, parameters))
    }
}

impl fmt::Debug for PositionalBindingFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionalBindingFactory")
            .field("type_identifier", &self.type_identifier)
            .finish_non_exhaustive()
    }
}
