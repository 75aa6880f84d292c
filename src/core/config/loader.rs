#![allow(clippy::result_large_err)]

use super::{ProfileConfig, StencilConfig, DEFAULT_PROFILE, PROFILE_ENV_VAR};
use crate::core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/stencil.toml).
    /// Returns defaults when the file does not exist; an unparseable file is a
    /// fatal configuration error.
    pub fn load_from_workspace(workspace_path: &Path) -> Result<StencilConfig, AppError> {
        let config_path = workspace_path.join("stencil.toml");
        let config_file = Self::load_from_file(&config_path)?;
        Ok(config_file.unwrap_or_default())
    }

    /// Load config from specific file path.
    /// Returns Ok(None) if file doesn't exist.
    pub fn load_from_file(path: &Path) -> Result<Option<StencilConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                crate::core::types::ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: StencilConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                crate::core::types::ErrorCategory::ConfigurationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CFG-001")
        })?;

        Ok(Some(config))
    }

    /// Name of the profile selected by STENCIL_ENV, defaulting to development.
    pub fn active_profile_name() -> String {
        env::var(PROFILE_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    /// Resolve the active profile: STENCIL_ENV section plus env overrides.
    /// Environment variables take precedence over config file values.
    pub fn resolve_active_profile(config: &StencilConfig) -> ProfileConfig {
        let name = Self::active_profile_name();
        let mut profile = config.profile(&name);
        Self::apply_env_overrides(&mut profile);
        profile
    }

    fn apply_env_overrides(profile: &mut ProfileConfig) {
        if let Ok(compiler_path) = env::var("STENCIL_TEMPLATE_COMPILER_PATH") {
            profile.template_compiler_path = Some(PathBuf::from(compiler_path));
        }

        if let Ok(vendor_dir) = env::var("STENCIL_VENDOR_DIR") {
            profile.vendor_dir = Some(PathBuf::from(vendor_dir));
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "STENCIL_ENV - Select the active configuration profile (default: development)",
            "STENCIL_TEMPLATE_COMPILER_PATH - Override the template compiler location",
            "STENCIL_VENDOR_DIR - Override the vendor directory searched as the compiler fallback",
            "STENCIL_LOG_LEVEL - Override the default tracing filter",
            "STENCIL_LOG_DIR - Override the log file directory",
            "STENCIL_LOG_CONSOLE - Route console logs to stdout, stderr, or none",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &StencilConfig) -> Result<(), AppError> {
        for (name, profile) in &config.profiles {
            if name.trim().is_empty() {
                return Err(AppError::new(
                    crate::core::types::ErrorCategory::ValidationError,
                    "Profile name cannot be empty".to_string(),
                ));
            }

            if let Some(path) = &profile.template_compiler_path {
                if path.as_os_str().is_empty() {
                    return Err(AppError::new(
                        crate::core::types::ErrorCategory::ValidationError,
                        format!(
                            "template_compiler_path in profile '{}' cannot be empty",
                            name
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}
