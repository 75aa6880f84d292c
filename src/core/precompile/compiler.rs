#![allow(clippy::result_large_err)]

use crate::core::config::ProfileConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fmt;
use std::path::{Path, PathBuf};

/// Conventional compiler location under the package-manager vendor
/// directory, relative to the workspace root.
pub const VENDOR_COMPILER_PATH: &str = "vendor/stencil/stencil-compiler.wasm";

/// Sibling package that ships its own template compiler build.
pub trait CompilerProvider {
    /// Absolute path to the compiler the provider ships.
    fn compiler_path(&self) -> PathBuf;
}

/// Which resolution rule produced the compiler path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerSource {
    ProfileOverride,
    Provider,
    VendorFallback,
}

impl fmt::Display for CompilerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerSource::ProfileOverride => write!(f, "profile override"),
            CompilerSource::Provider => write!(f, "compiler provider package"),
            CompilerSource::VendorFallback => write!(f, "vendor fallback"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedCompiler {
    pub path: PathBuf,
    pub source: CompilerSource,
}

/// Locate the template compiler: explicit profile override, then a sibling
/// provider package, then the conventional vendor path. A path that does not
/// exist on disk aborts build setup.
pub fn resolve_template_compiler(
    profile: &ProfileConfig,
    workspace_root: &Path,
    provider: Option<&dyn CompilerProvider>,
) -> Result<ResolvedCompiler, AppError> {
    let (path, source) = if let Some(configured) = &profile.template_compiler_path {
        let path = if configured.is_absolute() {
            configured.clone()
        } else {
            workspace_root.join(configured)
        };
        (path, CompilerSource::ProfileOverride)
    } else if let Some(provider) = provider {
        (provider.compiler_path(), CompilerSource::Provider)
    } else {
        let vendor_root = profile
            .vendor_dir
            .as_ref()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    workspace_root.join(dir)
                }
            })
            .unwrap_or_else(|| workspace_root.to_path_buf());
        let path = if profile.vendor_dir.is_some() {
            vendor_root.join("stencil").join("stencil-compiler.wasm")
        } else {
            vendor_root.join(VENDOR_COMPILER_PATH)
        };
        (path, CompilerSource::VendorFallback)
    };

    if !path.exists() {
        return Err(AppError::new(
            ErrorCategory::ConfigurationError,
            format!(
                "template compiler not found at {} (resolved via {})",
                path.display(),
                source
            ),
        )
        .with_code("CFG-002")
        .with_suggestion(
            "Set template_compiler_path in the active stencil.toml profile or install a compiler provider package",
        ));
    }

    Ok(ResolvedCompiler { path, source })
}
