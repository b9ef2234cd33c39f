use std::time::Instant;

use clap::Parser;
use epi_tag_cli::cli::Cli;
use epi_tag_cli::output::{ResultBuilder, print_result};
use epi_tag_cli::{commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let started = Instant::now();
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();

	if let Err(err) = commands::dispatch(cli).await {
		error!(target = "epi_tag", error = %err, "command failed");
		let result = ResultBuilder::<()>::new(command).started_at(started).error(err.code(), err.to_string()).build();
		print_result(&result, format);
		std::process::exit(1);
	}
}
