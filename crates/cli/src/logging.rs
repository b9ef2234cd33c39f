use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("epi_tag={level},epi_tag_cli={level},warn")));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose > 1)
		.without_time()
		.try_init();
}
