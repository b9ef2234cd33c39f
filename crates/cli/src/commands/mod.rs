mod batch;
mod pipeline;
mod tag;
mod vocab;

pub use pipeline::{DocumentOutcome, Pipeline};

use crate::cli::{Cli, Commands};
use crate::config::TaggerConfig;
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	match cli.command {
		Commands::Tag {
			source,
			destination,
			bundle,
			tagging,
		} => {
			let mut config = TaggerConfig::load(cli.config.as_deref())?;
			config.apply_args(&tagging);
			tag::execute(&source, &destination, &bundle, &config, format).await
		}
		Commands::Batch { root, target, tagging } => {
			let mut config = TaggerConfig::load(cli.config.as_deref())?;
			config.apply_args(&tagging);
			batch::execute(&root, &target, &config, format).await
		}
		Commands::Vocab { keywords } => vocab::execute(&keywords, format),
	}
}
