use clap::Parser;
use momrev::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    momrev::logging::init_logging();
    run(Cli::parse())
}
