//! The environment handed to modules at initialisation.

use crate::params::Params;
use crate::registry::DataRegistry;

/// Configuration and data registry of one rank.
///
/// Passed explicitly to `init()`; nothing in the workspace reaches for a
/// process-global environment.
#[derive(Debug, Default)]
pub struct SimContext {
    /// Configuration values.
    pub params: Params,
    /// Published data components.
    pub registry: DataRegistry,
}

impl SimContext {
    /// A context with the given parameters and an empty registry.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            registry: DataRegistry::new(),
        }
    }
}
