use clap::Parser;
use swingscan::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
