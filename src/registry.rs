//! Recasts the "globally-registered backend factories with side-effect constructors"
//! pattern as an explicit value instead of a `lazy_static!`/ctor-registered global.
//!
//! The core is generic over its backend (`Session<B: SessionBackend>`), so a registry
//! that erases the backend type would need to erase every associated type in the
//! `Backend` trait family (`Into`, `Use`, `VectorInto`, `VectorUse`) as trait objects too.
//! That is a real, useful extension (and is exactly what a driver-manager crate like
//! `odbc-api`'s own `driver_manager` feature does for *its* FFI-level drivers), but it is
//! out of scope for the CORE this crate implements, which ships exactly one backend. This
//! module therefore only provides the narrow piece that generalizes regardless of how many
//! backends exist: a named factory function callers register once at startup.
//!
//! A crate wiring up several backends behind one application-level `enum AnySession`
//! would implement dispatch over that enum by hand, the same way an application picks
//! between `rusqlite` and `postgres` connections today -- the registry below exists so
//! that choice can still be driven by a runtime string (e.g. a config file's `driver =
//! "odbc"` key) instead of being hard-coded at the call site.

use crate::Error;
use std::collections::HashMap;

/// A named factory: given a connection string, attempts to connect and returns an
/// application-defined handle `T` (typically an enum wrapping every `Session<B>` the
/// application links against).
pub struct BackendRegistry<T> {
    factories: HashMap<&'static str, Box<dyn Fn(&str) -> Result<T, Error>>>,
}

impl<T> Default for BackendRegistry<T> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<T> BackendRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`. Re-registering the same name replaces the prior
    /// factory, rather than erroring -- this mirrors how the teacher's own driver manager
    /// treats re-registration as an explicit override, useful in tests that swap a real
    /// backend for a fake one.
    pub fn register(
        &mut self,
        name: &'static str,
        factory: impl Fn(&str) -> Result<T, Error> + 'static,
    ) {
        self.factories.insert(name, Box::new(factory));
    }

    /// Connect using the backend registered under `name`.
    pub fn connect(&self, name: &str, connection_string: &str) -> Result<T, Error> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::UnknownBackend(name.to_string()))?;
        factory(connection_string)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
