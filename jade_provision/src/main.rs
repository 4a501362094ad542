use std::process::ExitCode;

use clap::Parser;
use jade_client::Jade;
use jade_provision::{init_logging, run, Cli, Config};

fn main() -> ExitCode {
    let args = Cli::parse();
    let _guard = init_logging();
    tracing::debug!("CLI initialized with args: {:?}", args);

    let config = Config::from(&args);
    let jade = Jade::new(config.target.clone(), config.network);
    ExitCode::from(run(&jade, &config))
}
