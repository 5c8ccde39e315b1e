//! Arena CLI - debate tournament among model-backed personas
//!
//! Main entry point for the `arena` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use arena_cli::cli::Cli;
use arena_cli::CliError;
use arena_common_config::{vars, Environment};
use arena_common_log::{LogConfig, LogLevel};

fn main() -> ExitCode {
    // .env may supply ARENA_CONFIG and friends, so load it before parsing
    if let Err(e) = Environment::init() {
        return fail(&CliError::from(e), false);
    }

    let cli = Cli::parse();
    let verbose = cli.verbose > 0;

    if let Err(e) = init_logging(&cli) {
        return fail(&e, verbose);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fail(&CliError::from(e), verbose),
    };

    match runtime.block_on(cli.execute()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), "{e}");
            fail(&e, verbose)
        }
    }
}

fn fail(e: &CliError, verbose: bool) -> ExitCode {
    eprintln!("{}", e.report(verbose));
    e.exit_code()
}

/// Flags win over `ARENA_LOG_LEVEL`, which wins over the quiet default.
fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let mut config = LogConfig::from_env();
    if cli.verbose > 0 || cli.quiet || Environment::get(vars::ARENA_LOG_LEVEL).is_none() {
        config.level = LogLevel::from_verbosity(cli.verbose, cli.quiet);
    }
    arena_common_log::init(config)?;
    Ok(())
}
