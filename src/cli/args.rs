use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct DoctorArgs {
    /// Workspace root containing stencil.toml (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Emit the resolved compiler fingerprint as well
    #[arg(long, help_heading = "Output Options")]
    pub fingerprint: bool,
}

#[derive(Args)]
pub struct FingerprintArgs {
    /// Directory whose content fingerprint should be computed
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}
