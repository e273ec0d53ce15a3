//! Named, shared data components.
//!
//! Modules publish their outputs (the solver's `E`, `B`, `J`, diagnostics)
//! into a [`DataRegistry`] under unique names. Consumers resolve a name to
//! a typed [`DataHandle`] once, at initialisation, and lock it for each
//! access.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::error::RegistryError;

/// Shared handle to one registered data component.
pub struct DataHandle<T> {
    name: Arc<str>,
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for DataHandle<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for DataHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataHandle")
            .field("name", &self.name)
            .field("type", &type_name::<T>())
            .finish()
    }
}

impl<T> DataHandle<T> {
    /// Wrap a value in a handle that is not registered anywhere.
    pub fn detached(name: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared access.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, T>, RegistryError> {
        self.inner.read().map_err(|_| self.poisoned())
    }

    /// Exclusive access.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>, RegistryError> {
        self.inner.write().map_err(|_| self.poisoned())
    }

    /// Whether two handles refer to the same component.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn poisoned(&self) -> RegistryError {
        RegistryError::Poisoned {
            name: self.name.to_string(),
        }
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

/// Name → component map.
#[derive(Default)]
pub struct DataRegistry {
    entries: IndexMap<String, (Entry, &'static str)>,
}

impl fmt::Debug for DataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, (_, ty))| (k, ty)))
            .finish()
    }
}

impl DataRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `name` and return a handle to it.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Duplicate`] if the name is taken.
    pub fn register<T: Any + Send + Sync>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<DataHandle<T>, RegistryError> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
            });
        }
        let handle = DataHandle::detached(name, value);
        let entry: Entry = handle.inner.clone();
        self.entries
            .insert(name.to_string(), (entry, type_name::<T>()));
        Ok(handle)
    }

    /// Resolve `name` to a typed handle.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<DataHandle<T>, RegistryError> {
        let (entry, _) = self
            .entries
            .get(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })?;
        let inner = Arc::clone(entry)
            .downcast::<RwLock<T>>()
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })?;
        Ok(DataHandle {
            name: Arc::from(name),
            inner,
        })
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
