use std::path::Path;

use epi_tag::Vocabulary;
use serde::Serialize;

use super::pipeline::load_vocabulary;
use crate::error::Result;
use crate::output::{CommandInputs, OutputFormat, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabReport {
	pub languages: Vec<LanguageSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSummary {
	pub language: String,
	pub keywords: usize,
	/// Distinct class tokens.
	pub classes: usize,
}

fn summarize(vocabulary: &Vocabulary) -> VocabReport {
	VocabReport {
		languages: vocabulary
			.languages()
			.map(|(language, keywords)| LanguageSummary {
				language: language.to_string(),
				keywords: keywords.len(),
				classes: keywords.recognized_classes().len(),
			})
			.collect(),
	}
}

pub fn execute(keywords: &Path, format: OutputFormat) -> Result<()> {
	let vocabulary = load_vocabulary(keywords)?;

	let result = ResultBuilder::new("vocab")
		.inputs(CommandInputs {
			keywords: Some(keywords.to_path_buf()),
			..Default::default()
		})
		.data(summarize(&vocabulary))
		.build();
	print_result(&result, format);
	Ok(())
}
