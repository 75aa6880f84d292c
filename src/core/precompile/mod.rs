#![allow(clippy::result_large_err)]

//! Registers the inline template precompiler with a build target's transform
//! pipeline, negotiating the execution strategy with the cooperating AST
//! extensions along the way.

use crate::core::compat::{self, HostInfo};
use crate::core::config::ProfileConfig;
use crate::core::error::{AppError, DiagnosticsSink};
use crate::core::pipeline::{BuildTarget, RegistrationLedger};
use crate::core::registry::ExtensionRegistry;
use std::path::Path;
use tracing::debug;

pub mod cache_key;
pub mod capability;
pub mod compiler;
pub mod extension;
pub mod factory;
pub mod registrar;

pub use factory::{TransformDescriptor, TransformFactory, TRANSFORM_IDENTITY};
pub use registrar::Registration;

/// Hook name under which cooperating AST extensions advertise themselves.
pub const CAPABILITY_NAME: &str = "stencil-ast-extension";

/// Everything the install path needs, passed explicitly per build-graph
/// node. No ambient project or registry lookups.
pub struct InstallContext<'a> {
    pub registry: &'a dyn ExtensionRegistry,
    pub target: &'a mut dyn BuildTarget,
    pub ledger: &'a mut RegistrationLedger,
    pub profile: &'a ProfileConfig,
    pub workspace_root: &'a Path,
    pub addon_root: &'a Path,
    pub host: &'a HostInfo,
    pub provider: Option<&'a dyn compiler::CompilerProvider>,
    pub diagnostics: &'a dyn DiagnosticsSink,
}

/// Wire the precompiler into one build-graph node. Invoked once per node per
/// build; repeated invocations are no-ops.
pub fn install_precompiler(ctx: InstallContext<'_>) -> Result<Registration, AppError> {
    compat::ensure_host_supported(ctx.host)?;

    // A cooperating provider may have registered the capability already;
    // skip before touching the registry or the filesystem.
    if ctx.ledger.is_registered(ctx.target.id()) {
        debug!(
            target_id = %ctx.target.id(),
            "skipping install; capability already registered for this build"
        );
        return Ok(Registration::SkippedLedger);
    }

    let extensions = ctx.registry.load(CAPABILITY_NAME);
    debug!(
        count = extensions.len(),
        "loaded AST extensions for precompile hook"
    );

    let compiler =
        compiler::resolve_template_compiler(ctx.profile, ctx.workspace_root, ctx.provider)?;
    debug!(path = %compiler.path.display(), source = %compiler.source, "resolved template compiler");

    let factory = TransformFactory::new(ctx.addon_root.to_path_buf());
    let descriptor = factory.build(&extensions, &compiler.path, ctx.diagnostics)?;

    registrar::register(ctx.target, descriptor, ctx.ledger)
}
