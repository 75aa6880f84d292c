#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use semver::Version;

/// Oldest host pipeline release whose worker-pool API this addon understands.
pub fn minimum_host_version() -> Version {
    Version::new(1, 4, 0)
}

/// Identity of the host build pipeline this addon is being wired into.
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub name: String,
    pub version: Version,
}

impl HostInfo {
    pub fn new<T: Into<String>>(name: T, version: Version) -> Self {
        HostInfo {
            name: name.into(),
            version,
        }
    }
}

/// Abort build setup when the host pipeline is older than the supported
/// minimum. Surfaced verbatim, never retried.
pub fn ensure_host_supported(host: &HostInfo) -> Result<(), AppError> {
    let minimum = minimum_host_version();
    if host.version < minimum {
        return Err(AppError::new(
            ErrorCategory::ConfigurationError,
            format!(
                "stencil v{} requires {} v{} or above; found v{}. Upgrade {} or downgrade stencil to the 0.2 series.",
                crate::VERSION, host.name, minimum, host.version, host.name
            ),
        )
        .with_code("CFG-003"));
    }
    Ok(())
}
