//! Kitsune CLI main entry point

use anyhow::Result;
use kitsune_cli::commands::{log_level, parse_args, CommandExecutor};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let (cli, actions) = match parse_args(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut executor = CommandExecutor::new(&cli, actions)?;
    let failures = executor.run(&cli.ontologies);

    // Exit with appropriate code
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
