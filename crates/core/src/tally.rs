//! Occurrence counts per match key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Counts how often each key matched. Keys that never matched are absent;
/// counts only ever go up.
///
/// Equality and serialization look at the counts only; the order in which
/// keys were first recorded is kept on the side for [`MatchTally::first_seen`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchTally {
	counts: BTreeMap<String, u64>,
	#[serde(skip)]
	order: Vec<String>,
}

impl PartialEq for MatchTally {
	fn eq(&self, other: &Self) -> bool {
		self.counts == other.counts
	}
}

impl Eq for MatchTally {}

impl MatchTally {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&mut self, key: &str) {
		self.add(key, 1);
	}

	fn add(&mut self, key: &str, count: u64) {
		match self.counts.get_mut(key) {
			Some(existing) => *existing += count,
			None => {
				self.counts.insert(key.to_string(), count);
				self.order.push(key.to_string());
			}
		}
	}

	pub fn count(&self, key: &str) -> u64 {
		self.counts.get(key).copied().unwrap_or(0)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.counts.contains_key(key)
	}

	/// Keys in sorted order with their counts.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.counts.iter().map(|(k, v)| (k.as_str(), *v))
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.counts.keys().map(String::as_str)
	}

	/// Keys in the order they were first recorded. A deserialized tally has
	/// no recording history and falls back to sorted order.
	pub fn first_seen(&self) -> Box<dyn Iterator<Item = &str> + '_> {
		if self.order.len() == self.counts.len() {
			Box::new(self.order.iter().map(String::as_str))
		} else {
			Box::new(self.keys())
		}
	}

	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	pub fn total(&self) -> u64 {
		self.counts.values().sum()
	}

	/// Per-key sum.
	pub fn merge(&mut self, other: &MatchTally) {
		for key in other.first_seen() {
			self.add(key, other.count(key));
		}
	}
}

impl<'a> IntoIterator for &'a MatchTally {
	type Item = (&'a str, u64);
	type IntoIter = Box<dyn Iterator<Item = (&'a str, u64)> + 'a>;

	fn into_iter(self) -> Self::IntoIter {
		Box::new(self.iter())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn absent_keys_count_zero() {
		let mut tally = MatchTally::new();
		tally.record("diabetes");
		tally.record("diabetes");

		assert_eq!(tally.count("diabetes"), 2);
		assert_eq!(tally.count("rash"), 0);
		assert!(!tally.contains("rash"));
		assert_eq!(tally.len(), 1);
	}

	#[test]
	fn merge_sums_per_key() {
		let mut a = MatchTally::new();
		a.record("rash");
		a.record("difficult_text");
		let mut b = MatchTally::new();
		b.record("rash");
		b.record("children");

		a.merge(&b);
		assert_eq!(a.count("rash"), 2);
		assert_eq!(a.count("children"), 1);
		assert_eq!(a.total(), 4);
	}

	#[test]
	fn remembers_first_recording_order() {
		let mut tally = MatchTally::new();
		tally.record("rash");
		tally.record("children");
		tally.record("rash");
		assert_eq!(tally.first_seen().collect::<Vec<_>>(), vec!["rash", "children"]);
		assert_eq!(tally.keys().collect::<Vec<_>>(), vec!["children", "rash"]);

		let mut other = MatchTally::new();
		other.record("asthma");
		other.record("rash");
		tally.merge(&other);
		assert_eq!(tally.first_seen().collect::<Vec<_>>(), vec!["rash", "children", "asthma"]);
	}

	#[test]
	fn deserialized_tally_lists_keys_sorted() {
		let tally: MatchTally = serde_json::from_str(r#"{"rash":2,"children":1}"#).expect("parses");
		assert_eq!(tally.first_seen().collect::<Vec<_>>(), vec!["children", "rash"]);
	}

	#[test]
	fn serializes_as_plain_map() {
		let mut tally = MatchTally::new();
		tally.record("rash");
		assert_eq!(serde_json::to_string(&tally).expect("serializes"), r#"{"rash":1}"#);
	}

	mod properties {
		use proptest::prelude::*;

		use super::*;

		fn tally_of(keys: &[String]) -> MatchTally {
			let mut tally = MatchTally::new();
			for key in keys {
				tally.record(key);
			}
			tally
		}

		proptest! {
			#[test]
			fn totals_ignore_recording_order(keys in prop::collection::vec("[a-d]{1,2}", 0..40)) {
				let forward = tally_of(&keys);
				let mut reversed_keys = keys.clone();
				reversed_keys.reverse();
				let reversed = tally_of(&reversed_keys);

				prop_assert_eq!(&forward, &reversed);
				prop_assert_eq!(forward.total(), keys.len() as u64);
			}

			#[test]
			fn merge_is_commutative(a in prop::collection::vec("[a-c]", 0..20), b in prop::collection::vec("[a-c]", 0..20)) {
				let mut left = tally_of(&a);
				left.merge(&tally_of(&b));
				let mut right = tally_of(&b);
				right.merge(&tally_of(&a));

				prop_assert_eq!(left, right);
			}
		}
	}
}
