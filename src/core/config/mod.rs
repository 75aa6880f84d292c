use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod loader;

pub use loader::ConfigLoader;

/// Profile selected when `STENCIL_ENV` is unset.
pub const DEFAULT_PROFILE: &str = "development";

/// Process-wide selector for the active configuration profile.
pub const PROFILE_ENV_VAR: &str = "STENCIL_ENV";

/// Main Stencil configuration loaded from stencil.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StencilConfig {
    /// Named configuration profiles; the active one is selected by STENCIL_ENV.
    /// Declaration order is preserved for reporting.
    #[serde(default)]
    pub profiles: IndexMap<String, ProfileConfig>,
}

impl StencilConfig {
    /// Profile for the given name, or defaults when the section is absent.
    pub fn profile(&self, name: &str) -> ProfileConfig {
        self.profiles.get(name).cloned().unwrap_or_default()
    }
}

/// Per-profile configuration consumed by the precompile subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    /// Explicit template compiler location; beats provider and vendor lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_compiler_path: Option<PathBuf>,

    /// Override for the package-manager vendor directory searched as the
    /// compiler fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_dir: Option<PathBuf>,
}
