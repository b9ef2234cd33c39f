//! Integration tests for `batch`: directory walking, output naming and
//! per-document failure isolation.

use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

const KEYWORDS: &str = "class;code;system;display;keyword_en;keyword_da\nrash;DB99998;snomed;Rash;rash;udslæt\n";

fn epi_tag_binary() -> PathBuf {
	let mut path = std::env::current_exe().expect("current_exe should resolve");
	path.pop();
	path.pop();
	path.push("epi-tag");
	path
}

fn composition(name: &str, language: &str, html: &str) -> String {
	format!("Instance: {name}\nInstanceOf: CompositionUvEpi\n* language = #{language}\n* text.div = \"\"\"{html}\"\"\"\n* section[+].title = \"x\"\n")
}

#[test]
fn batch_processes_tree_and_isolates_failures() {
	let root = tempfile::tempdir().expect("tempdir");
	let input = root.path().join("rawEPI");
	let target = root.path().join("processedEPI");

	let en = input.join("product-a");
	let da = input.join("product-b");
	let fr = input.join("product-c");
	for dir in [&en, &da, &fr] {
		std::fs::create_dir_all(dir).expect("mkdir");
	}
	std::fs::write(en.join("composition-en-a1.fsh"), composition("composition-en-a1", "en", "<p>May cause a rash</p>")).expect("write");
	std::fs::write(
		en.join("Bundle.fsh"),
		"Instance: bundle-a\nInstanceOf: BundleUvEpi\n* entry[0].resource = composition-en-a1\n",
	)
	.expect("write");
	std::fs::write(da.join("composition-da-b2.fsh"), composition("composition-da-b2", "da", "<p>Ingen bivirkninger</p>")).expect("write");
	std::fs::write(fr.join("composition-fr-c3.fsh"), composition("composition-fr-c3", "fr", "<p>rash</p>")).expect("write");

	let keywords = root.path().join("keywords.csv");
	let config = root.path().join("config.json");
	std::fs::write(&keywords, KEYWORDS).expect("write keywords");
	std::fs::write(&config, "{}").expect("write config");

	let output = Command::new(epi_tag_binary())
		.args(["-f", "json", "--config"])
		.arg(&config)
		.arg("batch")
		.arg(&input)
		.arg(&target)
		.arg("--keywords")
		.arg(&keywords)
		.output()
		.expect("failed to run epi-tag");
	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	assert!(output.status.success(), "batch failed: {stderr}");

	let json: Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
	assert_eq!(json["ok"], true);
	assert_eq!(json["data"]["written"], 1);
	assert_eq!(json["data"]["documents"].as_array().map(Vec::len), Some(2));
	assert_eq!(json["data"]["failures"][0]["code"], "UNSUPPORTED_LANGUAGE");
	assert_eq!(json["data"]["tally"]["rash"], 1);

	let written = std::fs::read_to_string(target.join("pproc_en_a1.fsh")).expect("en output");
	assert!(written.contains("<p class=\"rash\">May cause a rash</p>"));
	assert!(written.contains("Instance: bundle-a-pproc"));
	assert!(!target.join("pproc_da_b2.fsh").exists());
	assert!(!target.join("pproc_fr_c3.fsh").exists());
}
