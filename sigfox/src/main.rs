mod cli;
mod commands;
mod output;
mod prompt;
mod shell;
mod utils;

use anyhow::Result;
use clap::Parser;
use sigfox_core::{SerialExecutor, SystemPortScanner};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::Cli;
use crate::prompt::TerminalPrompter;
use crate::shell::Shell;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up logging
    setup_logging(&cli);

    let mut shell = Shell::new(
        &cli.config_dir,
        cli.timeouts(),
        TerminalPrompter,
        &SerialExecutor,
        &SystemPortScanner,
    );
    shell.run()
}

fn setup_logging(cli: &Cli) {
    let filter_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_level));

    // Menus own stdout, so logs go to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
