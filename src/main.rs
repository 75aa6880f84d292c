use clap::Parser;
use stencil::cli;

fn main() -> stencil::Result<()> {
    let args = cli::Args::parse();
    let _logging_guard = stencil::logging::init(&args.command)?;
    cli::run(args)
}
