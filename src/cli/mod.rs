pub mod args;
pub mod commands;

pub use args::{DoctorArgs, FingerprintArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
PIPELINE COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "stencil")]
#[command(version = crate::VERSION)]
#[command(about = "Inline template precompilation registrar for build pipelines")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: inspect a workspace with doctor, then debug cache invalidation with fingerprint."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Inspect compiler resolution for a workspace",
        long_about = "Doctor loads stencil.toml, reports the active profile, and resolves the template compiler the way build setup would.",
        after_help = "Example:\n    stencil doctor ./app --fingerprint"
    )]
    Doctor(DoctorArgs),
    #[command(
        about = "Compute the cache fragment fingerprint of a directory",
        long_about = "Fingerprint walks a directory tree in sorted order and prints the content fingerprint cacheable extensions contribute to the cache key.",
        after_help = "Example:\n    stencil fingerprint ./extensions/inline-helpers"
    )]
    Fingerprint(FingerprintArgs),
}

pub fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Doctor(doctor_args) => commands::doctor(doctor_args),
        Command::Fingerprint(fingerprint_args) => commands::fingerprint(fingerprint_args),
    }
}
