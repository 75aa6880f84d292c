use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::Directive;

const DEFAULT_LEVEL: &str = "info";

/// Resolved logging configuration after reading config files and env overrides.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
    pub default_level: String,
    pub enable_file: bool,
    pub console_output: Option<ConsoleOutput>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_level: DEFAULT_LEVEL.to_string(),
            enable_file: true,
            console_output: None,
        }
    }
}

impl LoggingConfig {
    /// Load configuration with deterministic precedence: defaults, config
    /// file, env overrides.
    pub fn load(workspace_root: Option<&Path>) -> Result<Self> {
        let mut config = LoggingConfig::default();
        if let Some(workspace) = workspace_root {
            if let Some(workspace_config) = Self::load_from_workspace(workspace)? {
                config.apply(workspace_config)?;
            }
        }
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_workspace(workspace_root: &Path) -> Result<Option<TomlLogging>> {
        let path = workspace_root
            .join(".stencil")
            .join("config")
            .join("logging.toml");
        Self::load_from_file(&path)
    }

    fn load_from_file(path: &Path) -> Result<Option<TomlLogging>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read logging config {}", path.display()))?;
        let parsed: TomlLogging = toml::from_str(&content)
            .with_context(|| format!("failed to parse logging config {}", path.display()))?;
        Ok(Some(parsed))
    }

    fn apply(&mut self, file: TomlLogging) -> Result<()> {
        if let Some(level) = file.level {
            self.default_level = level;
        }
        if let Some(log_dir) = file.log_dir {
            self.log_dir = Some(log_dir);
        }
        if let Some(enable_file) = file.enable_file {
            self.enable_file = enable_file;
        }
        if let Some(console_output) = file.console_output {
            self.console_output = Some(console_output);
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = env::var("STENCIL_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.default_level = level;
            }
        }
        if let Ok(dir) = env::var("STENCIL_LOG_DIR") {
            if !dir.trim().is_empty() {
                self.log_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(enable) = env::var("STENCIL_LOG_FILE") {
            if let Ok(enable) = enable.trim().parse::<bool>() {
                self.enable_file = enable;
            }
        }
        if let Ok(console) = env::var("STENCIL_LOG_CONSOLE") {
            let parsed = ConsoleOutput::from_str(&console).map_err(anyhow::Error::msg)?;
            self.console_output = Some(parsed);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        Directive::from_str(&self.default_level).with_context(|| {
            format!(
                "invalid logging level '{}'; expected a tracing filter directive",
                self.default_level
            )
        })?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TomlLogging {
    level: Option<String>,
    log_dir: Option<PathBuf>,
    enable_file: Option<bool>,
    console_output: Option<ConsoleOutput>,
}
