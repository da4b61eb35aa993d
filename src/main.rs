use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;
mod config;
mod run;

use cli::Args;
use config::Config;

/// Usage errors: unknown flags, bad values, bad filter syntax
const EXIT_USAGE: u8 = 1;

/// Runtime failures: unreadable input, bad config, output sink errors
const EXIT_RUNTIME: u8 = 4;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    init_tracing(args.verbose);
    ExitCode::from(execute(args))
}

/// Help and version requests succeed; every other clap error is a usage error
fn usage_exit_code(e: &clap::Error) -> u8 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_USAGE,
    }
}

fn init_tracing(verbose: u8) {
    // Diagnostics go to stderr so they never mix with records on stdout
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load config, validate the invocation and run it. Returns the exit code.
fn execute(args: Args) -> u8 {
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_RUNTIME;
        }
    };

    let options = match args.into_options(&config) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };

    match run::run(&options) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_RUNTIME
        }
    }
}
