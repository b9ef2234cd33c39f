//! FSH extension blocks describing what the tagger found.

use std::collections::HashSet;

use crate::plain_language::Explanation;
use crate::tally::MatchTally;
use crate::vocabulary::{ConceptTag, LanguageVocabulary};

pub const HTML_ELEMENT_LINK_URL: &str = "http://hl7.eu/fhir/ig/gravitate-health/StructureDefinition/HtmlElementLink";
pub const ADDITIONAL_INFORMATION_URL: &str = "http://hl7.eu/fhir/ig/gravitate-health/StructureDefinition/AdditionalInformation";
pub const TYPE_OF_DATA_SYSTEM: &str = "http://hl7.eu/fhir/ig/gravitate-health/CodeSystem/type-of-data-cs";

/// Header written above the generated lines.
pub const BLOCK_HEADER: &str = "// Auto-tagged extensions";

/// Coding-system short names used in vocabulary tables, and the FSH system
/// reference each one stands for.
const SYSTEM_ALIASES: [(&str, &str); 2] = [("icpc-2", "https://icpc2.icd.com/"), ("snomed", "$sct")];

pub fn coding_system(system: &str) -> &str {
	SYSTEM_ALIASES
		.iter()
		.find(|(alias, _)| alias.eq_ignore_ascii_case(system))
		.map_or(system, |(_, resolved)| resolved)
}

/// Distinct concepts behind the tally's keys, in the order the keys were
/// first matched. Keys without a vocabulary entry (difficulty and
/// plain-language markers) never produce a concept.
pub fn tallied_concepts(tally: &MatchTally, vocabulary: &LanguageVocabulary) -> Vec<ConceptTag> {
	let mut seen = HashSet::new();
	let mut concepts = Vec::new();
	for key in tally.first_seen() {
		let Some(concept) = vocabulary.get(key) else {
			continue;
		};
		if seen.insert(concept) {
			concepts.push(concept.clone());
		}
	}
	concepts
}

/// Accumulates extension lines in FSH syntax.
#[derive(Debug, Clone, Default)]
pub struct ExtensionWriter {
	lines: Vec<String>,
	blocks: usize,
}

impl ExtensionWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks == 0
	}

	pub fn len(&self) -> usize {
		self.blocks
	}

	/// Links an element class to a coded concept.
	pub fn html_element_link(&mut self, concept: &ConceptTag) -> &mut Self {
		self.lines.extend([
			format!("* extension[+].url = \"{HTML_ELEMENT_LINK_URL}\""),
			"* extension[=].extension[+].url = \"elementClass\"".to_string(),
			format!("* extension[=].extension[=].valueString = \"{}\"", escape(&concept.class)),
			"* extension[=].extension[+].url = \"concept\"".to_string(),
			format!(
				"* extension[=].extension[=].valueCodeableReference.concept.coding = {}#{} \"{}\"",
				coding_system(&concept.system),
				concept.code,
				escape(&concept.display)
			),
			String::new(),
		]);
		self.blocks += 1;
		self
	}

	/// Attaches a plain-language explanation to its element class.
	pub fn additional_information(&mut self, explanation: &Explanation) -> &mut Self {
		self.lines.extend([
			format!("* extension[+].url = \"{ADDITIONAL_INFORMATION_URL}\""),
			"* extension[=].extension[+].url = \"elementClass\"".to_string(),
			format!("* extension[=].extension[=].valueString = \"{}\"", escape(&explanation.id)),
			"* extension[=].extension[+].url = \"type\"".to_string(),
			format!("* extension[=].extension[=].valueCodeableConcept.coding[0].system = \"{TYPE_OF_DATA_SYSTEM}\""),
			"* extension[=].extension[=].valueCodeableConcept.coding[0].code = #TXT".to_string(),
			"* extension[=].extension[=].valueCodeableConcept.coding[0].display = \"Text\"".to_string(),
			"* extension[=].extension[+].url = \"concept\"".to_string(),
			format!("* extension[=].extension[=].valueString = \"{}\"", escape(&explanation.text)),
			String::new(),
		]);
		self.blocks += 1;
		self
	}

	/// The block ready for insertion, or `None` when nothing was written.
	pub fn render(&self) -> Option<String> {
		if self.is_empty() {
			return None;
		}
		Some(format!("\n{BLOCK_HEADER}\n{}\n", self.lines.join("\n")))
	}
}

/// Escapes a value for an FSH double-quoted string.
fn escape(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'"' => out.push_str("\\\""),
			'\n' => out.push_str("\\n"),
			'\r' => {}
			c => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tagger::{DIFFICULT_KEY, PLAIN_LANGUAGE_KEY};

	fn concept(class: &str, code: &str, system: &str) -> ConceptTag {
		ConceptTag {
			class: class.to_string(),
			code: code.to_string(),
			system: system.to_string(),
			display: format!("{class} display"),
		}
	}

	#[test]
	fn resolves_system_aliases() {
		assert_eq!(coding_system("snomed"), "$sct");
		assert_eq!(coding_system("ICPC-2"), "https://icpc2.icd.com/");
		assert_eq!(coding_system("http://loinc.org"), "http://loinc.org");
	}

	#[test]
	fn one_concept_per_distinct_tuple() {
		let mut vocab = LanguageVocabulary::new();
		vocab.insert("elderly", concept("jonwort", "DB00099", "snomed"));
		vocab.insert("Adults", concept("jonwort", "DB00099", "snomed"));
		vocab.insert("rash", concept("rash", "DB99998", "snomed"));
		vocab.insert("children", concept("children", "DB99999", "snomed"));

		let mut tally = MatchTally::new();
		tally.record("elderly");
		tally.record("Adults");
		tally.record("rash");
		tally.record("plain-language");

		let classes: Vec<_> = tallied_concepts(&tally, &vocab).into_iter().map(|c| c.class).collect();
		assert_eq!(classes, vec!["jonwort", "rash"]);
	}

	#[test]
	fn markers_without_vocabulary_entry_yield_no_concept() {
		let mut vocab = LanguageVocabulary::new();
		vocab.insert("rash", concept("rash", "DB99998", "snomed"));

		let mut tally = MatchTally::new();
		tally.record(DIFFICULT_KEY);
		tally.record(PLAIN_LANGUAGE_KEY);
		assert!(tallied_concepts(&tally, &vocab).is_empty());

		tally.record("rash");
		let classes: Vec<_> = tallied_concepts(&tally, &vocab).into_iter().map(|c| c.class).collect();
		assert_eq!(classes, vec!["rash"]);
	}

	#[test]
	fn concepts_follow_first_match_order() {
		let mut vocab = LanguageVocabulary::new();
		vocab.insert("rash", concept("rash", "DB99998", "snomed"));
		vocab.insert("children", concept("children", "DB99999", "snomed"));
		vocab.insert("asthma", concept("asthma", "DB99997", "snomed"));

		let mut tally = MatchTally::new();
		tally.record("rash");
		tally.record("children");
		tally.record("rash");
		tally.record("asthma");

		let classes: Vec<_> = tallied_concepts(&tally, &vocab).into_iter().map(|c| c.class).collect();
		assert_eq!(classes, vec!["rash", "children", "asthma"]);
	}

	#[test]
	fn renders_element_link_block() {
		let mut writer = ExtensionWriter::new();
		writer.html_element_link(&concept("diabetes", "DB01234", "snomed"));
		let block = writer.render().expect("one block");

		assert!(block.starts_with("\n// Auto-tagged extensions\n* extension[+].url = \"http://hl7.eu/fhir/ig/gravitate-health/StructureDefinition/HtmlElementLink\"\n"));
		assert!(block.contains("* extension[=].extension[=].valueString = \"diabetes\"\n"));
		assert!(block.contains("valueCodeableReference.concept.coding = $sct#DB01234 \"diabetes display\"\n"));
	}

	#[test]
	fn renders_quoted_explanations() {
		let mut writer = ExtensionWriter::new();
		writer.additional_information(&Explanation {
			id: "plain-language-1".to_string(),
			text: "Take it \"with\" food".to_string(),
		});
		let block = writer.render().expect("one block");
		assert!(block.contains("valueString = \"plain-language-1\""));
		assert!(block.contains("valueString = \"Take it \\\"with\\\" food\""));
		assert!(block.contains("coding[0].code = #TXT"));
	}

	#[test]
	fn empty_writer_renders_nothing() {
		assert_eq!(ExtensionWriter::new().render(), None);
	}
}
