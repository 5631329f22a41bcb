// src/bin/menuset.rs

use clap::Parser;
use colored::*;
use menuset::cli::{Cli, dispatcher};

/// Entry point of the `menuset` binary: sets up logging, dispatches the
/// command and reports errors.
fn main() {
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("CLI args parsed: {:?}", cli);

    if let Err(e) = dispatcher::dispatch(cli.args) {
        // clap errors (including --help and --version of a command) print themselves.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
