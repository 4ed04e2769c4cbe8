use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;

mod api;
mod cli;
mod config;
mod logging;
mod util;
mod workflow;

use api::{CodacyClient, HttpTransport};
use cli::RootArgs;
use config::Config;
use workflow::ConsoleReporter;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(err) => RootArgs::command()
            .error(ErrorKind::MissingRequiredArgument, err)
            .exit(),
    };
    logging::init_tracing(config.options.verbose);

    if run(&config).is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(config: &Config) -> workflow::RunSummary {
    let transport = HttpTransport::new(&config.api_base_url, &config.api_token);
    let client = CodacyClient::new(transport, config.provider, &config.organization);
    let mut reporter = ConsoleReporter::new(config.options.verbose);
    reporter.print_banner(config);

    tracing::info!(
        provider = config.provider.as_str(),
        organization = %config.organization,
        standard = ?config.coding_standard_id,
        dry_run = config.options.dry_run,
        "starting run"
    );
    workflow::run(
        &client,
        config.coding_standard_id,
        &config.options,
        &mut reporter,
    )
}
