use clap::Parser;
use strateval::cli::{init_logging, run, Cli};

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
