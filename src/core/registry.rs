//! Capability registry boundary.
//!
//! Independently-authored AST extensions advertise themselves for a named
//! hook; this subsystem only reads from the registry and preserves the
//! registration order it hands back.

use crate::core::precompile::extension::AstExtension;
use indexmap::IndexMap;

/// External mechanism by which extensions advertise themselves for a hook.
pub trait ExtensionRegistry {
    /// Extensions registered for `capability`, in registration order.
    fn load(&self, capability: &str) -> Vec<AstExtension>;
}

/// Registry backed by in-process registrations. Used by embedders that wire
/// extensions programmatically and by tests.
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: IndexMap<String, Vec<AstExtension>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        InMemoryRegistry::default()
    }

    /// Append an extension under `capability`, preserving arrival order.
    pub fn register<T: Into<String>>(&mut self, capability: T, extension: AstExtension) {
        self.entries
            .entry(capability.into())
            .or_default()
            .push(extension);
    }
}

impl ExtensionRegistry for InMemoryRegistry {
    fn load(&self, capability: &str) -> Vec<AstExtension> {
        self.entries.get(capability).cloned().unwrap_or_default()
    }
}
