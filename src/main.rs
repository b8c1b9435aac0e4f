use std::env;
use std::process;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use habitquest::cli::run_with_args;

const LOG_ENV_VAR: &str = "HABITQUEST_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();
    process::exit(run_with_args(&args));
}
