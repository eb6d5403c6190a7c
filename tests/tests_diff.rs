//! End-to-end scenarios for the diff engine and its renderers/delta format.

use assertables::assert_contains;
use dmpx::DiffMatchPatch;
use proptest::prelude::*;

#[test]
fn bills_boards_renders_raw_humanized_html() {
	let dmp = DiffMatchPatch::new();
	let mut edits = dmp.diff("bills boards", "bills swords", false);
	edits.cleanup_semantic();

	assert_eq!(edits.render_humanized(), "bills -[boa]+[swo]rds");
	assert_eq!(edits.render_html(), "<span>bills </span><del>boa</del><ins>swo</ins><span>rds</span>");
	assert_contains!(edits.render_raw(), "+sw");
	assert_contains!(edits.render_raw(), "-bo");
}

#[test]
fn cat_dog_produces_expected_edit_script() {
	let dmp = DiffMatchPatch::new();
	let edits = dmp.diff("The cat in the hat.", "The dog in the hat.", false);
	let rendered: Vec<(String, String)> = edits
		.iter()
		.map(|e| {
			let op = match e.op {
				dmpx::Op::Equal => "=",
				dmpx::Op::Insert => "+",
				dmpx::Op::Delete => "-",
			};
			(op.to_string(), e.text.clone())
		})
		.collect();
	assert_eq!(
		rendered,
		vec![
			("=".to_string(), "The ".to_string()),
			("-".to_string(), "cat".to_string()),
			("+".to_string(), "dog".to_string()),
			("=".to_string(), " in the hat.".to_string()),
		]
	);
}

#[test]
fn delta_encode_decode_roundtrips_the_spec_example() {
	let dmp = DiffMatchPatch::new();
	let edits = dmp.diff("abc", "abd", false);
	assert_eq!(edits.to_delta(), "=2\t-1\t+d");

	let decoded = dmpx::EditList::from_delta("abc", "=2\t-1\t+d").unwrap();
	assert_eq!(decoded.destination_text(), "abd");
}

#[test]
fn empty_and_identical_input_boundaries() {
	let dmp = DiffMatchPatch::new();

	let empty = dmp.diff("", "", false);
	assert!(empty.is_empty());

	let insert_only = dmp.diff("", "hello", false);
	assert_eq!(insert_only.len(), 1);
	assert_eq!(insert_only.as_slice()[0].op, dmpx::Op::Insert);

	let delete_only = dmp.diff("hello", "", false);
	assert_eq!(delete_only.len(), 1);
	assert_eq!(delete_only.as_slice()[0].op, dmpx::Op::Delete);

	let identical = dmp.diff("same", "same", false);
	assert_eq!(identical.len(), 1);
	assert_eq!(identical.as_slice()[0].op, dmpx::Op::Equal);
}

#[test]
fn cleanup_merge_is_idempotent() {
	let mut edits = dmpx::EditList::new(vec![
		dmpx::Edit::delete("a"),
		dmpx::Edit::delete("b"),
		dmpx::Edit::insert("x"),
		dmpx::Edit::equal(""),
		dmpx::Edit::equal("c"),
	]);
	edits.cleanup_merge();
	let once = edits.clone();
	edits.cleanup_merge();
	assert_eq!(edits, once);
}

proptest! {
	#[test]
	fn source_and_destination_text_roundtrip(a in "[a-zA-Z0-9 ]{0,30}", b in "[a-zA-Z0-9 ]{0,30}") {
		let dmp = DiffMatchPatch::new();
		let edits = dmp.diff(&a, &b, false);
		prop_assert_eq!(edits.source_text(), a);
		prop_assert_eq!(edits.destination_text(), b);
	}

	#[test]
	fn levenshtein_is_bounded_by_input_lengths(a in "[a-zA-Z0-9]{0,20}", b in "[a-zA-Z0-9]{0,20}") {
		let dmp = DiffMatchPatch::new();
		let edits = dmp.diff(&a, &b, false);
		let lower = (a.chars().count() as i64 - b.chars().count() as i64).unsigned_abs() as usize;
		let upper = a.chars().count().max(b.chars().count());
		prop_assert!(edits.levenshtein() >= lower);
		prop_assert!(edits.levenshtein() <= upper);
	}

	#[test]
	fn delta_roundtrip_matches_destination(a in "[a-zA-Z0-9 ]{0,20}", b in "[a-zA-Z0-9 ]{0,20}") {
		let dmp = DiffMatchPatch::new();
		let edits = dmp.diff(&a, &b, false);
		let delta = edits.to_delta();
		let decoded = dmpx::EditList::from_delta(&a, &delta).unwrap();
		prop_assert_eq!(decoded.destination_text(), b);
	}
}
