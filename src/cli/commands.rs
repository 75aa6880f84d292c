use crate::cli::{DoctorArgs, FingerprintArgs};
use crate::core::config::ConfigLoader;
use crate::core::fingerprint;
use crate::core::precompile::compiler;
use std::env;
use tracing::info;

/// Report how build setup would resolve configuration and the template
/// compiler for a workspace.
pub fn doctor(args: DoctorArgs) -> crate::Result<()> {
    let workspace_root = match args.path {
        Some(path) => path,
        None => env::current_dir()?,
    };
    info!(workspace = %workspace_root.display(), "running doctor");

    let config = ConfigLoader::load_from_workspace(&workspace_root)?;
    ConfigLoader::validate_config(&config)?;

    println!("workspace: {}", workspace_root.display());
    if config.profiles.is_empty() {
        println!("config: using defaults (stencil.toml has no profiles)");
    } else {
        println!("config: {} profile(s) declared", config.profiles.len());
    }

    let profile_name = ConfigLoader::active_profile_name();
    let profile = ConfigLoader::resolve_active_profile(&config);
    println!("active profile: {}", profile_name);

    let resolved = compiler::resolve_template_compiler(&profile, &workspace_root, None)?;
    println!(
        "template compiler: {} (via {})",
        resolved.path.display(),
        resolved.source
    );

    if args.fingerprint {
        let digest = fingerprint::fingerprint_file(&resolved.path)?;
        println!("compiler fingerprint: {}", digest);
    }

    Ok(())
}

/// Print the cache fragment fingerprint for a directory tree.
pub fn fingerprint(args: FingerprintArgs) -> crate::Result<()> {
    let digest = fingerprint::fingerprint_dir(&args.dir)?;
    println!("{}", digest);
    Ok(())
}
