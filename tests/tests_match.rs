//! End-to-end scenarios for the Bitap fuzzy matcher.

use dmpx::DiffMatchPatch;
use proptest::prelude::*;

#[test]
fn finds_general_in_the_classic_example() {
	let dmp = DiffMatchPatch::new();
	let text = "I am the very model of a modern major general.";
	let loc = dmp.find(text, "general", 20).unwrap();
	assert_eq!(&text[loc..loc + "general".len()], "general");
}

#[test]
fn empty_pattern_clamps_to_text_bounds() {
	let dmp = DiffMatchPatch::new();
	assert_eq!(dmp.find("hello", "", 3), Some(3));
	assert_eq!(dmp.find("hello", "", 999), Some(5));
}

#[test]
fn no_match_on_dissimilar_text_within_threshold() {
	let dmp = DiffMatchPatch::with_config(dmpx::Config { match_threshold: 0.2, ..dmpx::Config::default() });
	assert_eq!(dmp.find("abcdefgh", "zzzzzzzz", 0), None);
}

proptest! {
	#[test]
	fn exact_occurrence_is_found_at_its_own_location(
		prefix in "[a-z]{0,10}",
		pattern in "[a-z]{1,10}",
		suffix in "[a-z]{0,10}",
	) {
		let dmp = DiffMatchPatch::new();
		let text = format!("{prefix}{pattern}{suffix}");
		let loc = prefix.chars().count();
		let found = dmp.find(&text, &pattern, loc);
		prop_assert_eq!(found, Some(loc));
	}
}
