//! Context-bearing patches: construction from a diff, context growth,
//! size-bounded splitting, padding, fuzzy application, and the patch text
//! wire format (spec §4.4, §6).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;
use crate::diff;
use crate::error::{Error, Result};
use crate::match_engine::bitap_match;
use crate::op::{Edit, Op};

/// One context-bearing patch: a span of some reference text plus the edits
/// that replace it, expressed with 0-based, inclusive-start coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch {
	pub start1: usize,
	pub start2: usize,
	pub length1: usize,
	pub length2: usize,
	pub diffs: Vec<Edit>,
}

impl Patch {
	fn new(start1: usize, start2: usize) -> Self {
		Self { start1, start2, length1: 0, length2: 0, diffs: Vec::new() }
	}
}

/// A sequence of [`Patch`]es, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatchList {
	patches: Vec<Patch>,
}

impl PatchList {
	pub fn new(patches: Vec<Patch>) -> Self {
		Self { patches }
	}

	pub fn is_empty(&self) -> bool {
		self.patches.is_empty()
	}

	pub fn len(&self) -> usize {
		self.patches.len()
	}

	pub fn as_slice(&self) -> &[Patch] {
		&self.patches
	}

	pub fn into_vec(self) -> Vec<Patch> {
		self.patches
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Patch> {
		self.patches.iter()
	}
}

impl IntoIterator for PatchList {
	type Item = Patch;
	type IntoIter = std::vec::IntoIter<Patch>;

	fn into_iter(self) -> Self::IntoIter {
		self.patches.into_iter()
	}
}

impl<'a> IntoIterator for &'a PatchList {
	type Item = &'a Patch;
	type IntoIter = std::slice::Iter<'a, Patch>;

	fn into_iter(self) -> Self::IntoIter {
		self.patches.iter()
	}
}

impl From<Vec<Patch>> for PatchList {
	fn from(patches: Vec<Patch>) -> Self {
		Self::new(patches)
	}
}

fn source_text(diffs: &[Edit]) -> Vec<char> {
	diffs.iter().filter(|e| e.op != Op::Insert).flat_map(|e| e.text.chars()).collect()
}

fn destination_text(diffs: &[Edit]) -> Vec<char> {
	diffs.iter().filter(|e| e.op != Op::Delete).flat_map(|e| e.text.chars()).collect()
}

fn to_string(chars: &[char]) -> String {
	chars.iter().collect()
}

// region:    --- patch_make

/// Diffs `text1` and `text2`, runs the semantic and efficiency cleanups, and
/// builds a patch list from the result (spec §4.4.1, one-diff-arg form).
pub fn patch_make(text1: &str, text2: &str, config: &Config) -> PatchList {
	let mut edits = diff::diff_with_config(text1, text2, true, config);
	if edits.len() > 2 {
		edits.cleanup_semantic();
		edits.cleanup_efficiency(config.diff_edit_cost);
	}
	patch_make_from_diffs(text1, edits.into_vec(), config)
}

/// Builds a patch list directly from a precomputed edit script against
/// `text1` (spec §4.4.1, two-arg form).
pub fn patch_make_from_diffs(text1: &str, diffs: Vec<Edit>, config: &Config) -> PatchList {
	if diffs.is_empty() {
		return PatchList::new(Vec::new());
	}

	let mut patches = Vec::new();
	let mut patch = Patch::new(0, 0);
	let mut char_count1 = 0usize;
	let mut char_count2 = 0usize;
	let mut prepatch_text: Vec<char> = text1.chars().collect();
	let mut postpatch_text = prepatch_text.clone();

	let len = diffs.len();
	for (i, edit) in diffs.iter().enumerate() {
		let edit_len = edit.char_len();

		if patch.diffs.is_empty() && edit.op != Op::Equal {
			patch.start1 = char_count1;
			patch.start2 = char_count2;
		}

		match edit.op {
			Op::Insert => {
				patch.diffs.push(edit.clone());
				patch.length2 += edit_len;
				let insert: Vec<char> = edit.text.chars().collect();
				postpatch_text.splice(char_count2..char_count2, insert);
			}
			Op::Delete => {
				patch.length1 += edit_len;
				patch.diffs.push(edit.clone());
				postpatch_text.splice(char_count2..char_count2 + edit_len, std::iter::empty());
			}
			Op::Equal => {
				if edit_len <= 2 * config.patch_margin as usize && !patch.diffs.is_empty() && i + 1 != len {
					patch.diffs.push(edit.clone());
					patch.length1 += edit_len;
					patch.length2 += edit_len;
				}
			}
		}

		if edit.op == Op::Equal && edit_len >= 2 * config.patch_margin as usize && !patch.diffs.is_empty() {
			patch_add_context(&mut patch, &to_string(&prepatch_text), config);
			patches.push(patch);
			patch = Patch::new(0, 0);
			prepatch_text = postpatch_text.clone();
			char_count1 = char_count2;
		}

		if edit.op != Op::Insert {
			char_count1 += edit_len;
		}
		if edit.op != Op::Delete {
			char_count2 += edit_len;
		}
	}

	if !patch.diffs.is_empty() {
		patch_add_context(&mut patch, &to_string(&prepatch_text), config);
		patches.push(patch);
	}

	PatchList::new(patches)
}

// endregion: --- patch_make

// region:    --- patch_add_context

/// Grows `patch`'s edits with surrounding `Equal` context taken from
/// `reference_text` until the pattern is unique within it, up to
/// `match_max_bits - 2*patch_margin` characters, plus one more margin of
/// slack on each side (spec §4.4.2).
pub fn patch_add_context(patch: &mut Patch, reference_text: &str, config: &Config) {
	let text: Vec<char> = reference_text.chars().collect();
	if text.is_empty() {
		return;
	}

	let max_bits = config.match_max_bits as usize;
	let mut padding = 0usize;

	let mut pattern: Vec<char> = text[patch.start2.min(text.len())..(patch.start2 + patch.length1).min(text.len())].to_vec();

	while first_match(&text, &pattern) != last_match(&text, &pattern)
		&& (max_bits == 0 || pattern.len() < max_bits.saturating_sub(2 * config.patch_margin as usize))
	{
		padding += config.patch_margin as usize;
		let lo = patch.start2.saturating_sub(padding);
		let hi = (patch.start2 + patch.length1 + padding).min(text.len());
		pattern = text[lo..hi].to_vec();
	}
	padding += config.patch_margin as usize;

	let prefix_lo = patch.start2.saturating_sub(padding);
	let prefix: Vec<char> = text[prefix_lo..patch.start2.min(text.len())].to_vec();
	if !prefix.is_empty() {
		patch.diffs.insert(0, Edit::equal(to_string(&prefix)));
	}

	let suffix_lo = (patch.start2 + patch.length1).min(text.len());
	let suffix_hi = (patch.start2 + patch.length1 + padding).min(text.len());
	let suffix: Vec<char> = if suffix_lo < suffix_hi { text[suffix_lo..suffix_hi].to_vec() } else { Vec::new() };
	if !suffix.is_empty() {
		patch.diffs.push(Edit::equal(to_string(&suffix)));
	}

	patch.start1 = patch.start1.saturating_sub(prefix.len());
	patch.start2 = patch.start2.saturating_sub(prefix.len());
	patch.length1 += prefix.len() + suffix.len();
	patch.length2 += prefix.len() + suffix.len();
}

fn first_match(haystack: &[char], needle: &[char]) -> Option<usize> {
	crate::text_util::index_of(haystack, needle, 0)
}

fn last_match(haystack: &[char], needle: &[char]) -> Option<usize> {
	if needle.is_empty() || needle.len() > haystack.len() {
		return None;
	}
	(0..=haystack.len() - needle.len()).rev().find(|&start| haystack[start..start + needle.len()] == *needle)
}

// endregion: --- patch_add_context

// region:    --- patch_split_max

/// Splits any patch whose `length1` exceeds `match_max_bits` into adjacent
/// smaller patches, each carrying `patch_margin` of pre/post context (spec
/// §4.4.3). `match_max_bits == 0` disables splitting (unbounded).
pub fn patch_split_max(patches: &mut Vec<Patch>, config: &Config) {
	let patch_size = config.match_max_bits as usize;
	if patch_size == 0 {
		return;
	}
	let margin = config.patch_margin as usize;

	let mut i = 0usize;
	while i < patches.len() {
		if patches[i].length1 <= patch_size {
			i += 1;
			continue;
		}

		let mut bigpatch = patches.remove(i);
		let mut start1 = bigpatch.start1;
		let mut start2 = bigpatch.start2;
		let mut precontext: Vec<char> = Vec::new();
		let mut insert_at = i;

		while !bigpatch.diffs.is_empty() {
			let mut patch = Patch::new(start1.saturating_sub(precontext.len()), start2.saturating_sub(precontext.len()));
			let mut empty = true;

			if !precontext.is_empty() {
				patch.length1 = precontext.len();
				patch.length2 = precontext.len();
				patch.diffs.push(Edit::equal(to_string(&precontext)));
			}

			while !bigpatch.diffs.is_empty() && patch.length1 < patch_size.saturating_sub(margin) {
				let op = bigpatch.diffs[0].op;
				let full_text: Vec<char> = bigpatch.diffs[0].text.chars().collect();

				if op == Op::Insert {
					patch.length2 += full_text.len();
					start2 += full_text.len();
					patch.diffs.push(bigpatch.diffs.remove(0));
					empty = false;
				} else if op == Op::Delete
					&& patch.diffs.len() == 1
					&& patch.diffs[0].op == Op::Equal
					&& full_text.len() > 2 * patch_size
				{
					// A large deletion: let it pass through in one chunk.
					patch.length1 += full_text.len();
					start1 += full_text.len();
					empty = false;
					patch.diffs.push(bigpatch.diffs.remove(0));
				} else {
					let take = (patch_size.saturating_sub(patch.length1).saturating_sub(margin)).min(full_text.len());
					let taken: Vec<char> = full_text[..take].to_vec();
					patch.length1 += taken.len();
					start1 += taken.len();
					if op == Op::Equal {
						patch.length2 += taken.len();
						start2 += taken.len();
					} else {
						empty = false;
					}
					patch.diffs.push(Edit::new(op, to_string(&taken)));

					if taken.len() == full_text.len() {
						bigpatch.diffs.remove(0);
					} else {
						bigpatch.diffs[0].text = to_string(&full_text[taken.len()..]);
					}
				}
			}

			precontext = destination_text(&patch.diffs);
			let keep_from = precontext.len().saturating_sub(margin);
			precontext = precontext[keep_from..].to_vec();

			let postcontext_full = source_text(&bigpatch.diffs);
			let postcontext: Vec<char> = postcontext_full[..postcontext_full.len().min(margin)].to_vec();
			if !postcontext.is_empty() {
				patch.length1 += postcontext.len();
				patch.length2 += postcontext.len();
				if let Some(last) = patch.diffs.last_mut().filter(|e| e.op == Op::Equal) {
					last.text.push_str(&to_string(&postcontext));
				} else {
					patch.diffs.push(Edit::equal(to_string(&postcontext)));
				}
			}

			if !empty {
				patches.insert(insert_at, patch);
				insert_at += 1;
			}
		}

		i = insert_at;
	}
}

// endregion: --- patch_split_max

// region:    --- patch_add_padding

/// Prepends/appends a `patch_margin`-length sentinel string (code points
/// `1..=patch_margin`) to the patch coordinates and returns the padding text,
/// so edge patches can be located against a padded working copy of the
/// target text (spec §4.4.4).
pub fn patch_add_padding(patches: &mut [Patch], config: &Config) -> String {
	let padding_length = config.patch_margin as usize;
	let null_padding: String = (1..=padding_length as u32).filter_map(char::from_u32).collect();

	for patch in patches.iter_mut() {
		patch.start1 += padding_length;
		patch.start2 += padding_length;
	}

	if let Some(first) = patches.first_mut() {
		match first.diffs.first() {
			Some(e) if e.op == Op::Equal => {
				let existing_len = e.char_len();
				if padding_length > existing_len {
					let extra = padding_length - existing_len;
					let grown = format!("{}{}", &null_padding[existing_len..], first.diffs[0].text);
					first.diffs[0].text = grown;
					first.start1 -= extra;
					first.start2 -= extra;
					first.length1 += extra;
					first.length2 += extra;
				}
			}
			_ => {
				first.diffs.insert(0, Edit::equal(null_padding.clone()));
				first.start1 -= padding_length;
				first.start2 -= padding_length;
				first.length1 += padding_length;
				first.length2 += padding_length;
			}
		}
	}

	if let Some(last) = patches.last_mut() {
		match last.diffs.last() {
			Some(e) if e.op == Op::Equal => {
				let existing_len = e.char_len();
				if padding_length > existing_len {
					let extra = padding_length - existing_len;
					let idx = last.diffs.len() - 1;
					last.diffs[idx].text.push_str(&null_padding[..extra]);
					last.length1 += extra;
					last.length2 += extra;
				}
			}
			_ => {
				last.diffs.push(Edit::equal(null_padding.clone()));
				last.length1 += padding_length;
				last.length2 += padding_length;
			}
		}
	}

	null_padding
}

// endregion: --- patch_add_padding

// region:    --- patch_apply

/// Applies `patches` to `text`, returning the patched text and one success
/// flag per patch. Never fails: an unlocatable patch is recorded as `false`
/// and left unapplied (spec §4.4.5, §7 "patch_apply never fails").
pub fn patch_apply(patches: &PatchList, text: &str, config: &Config) -> (String, Vec<bool>) {
	if patches.is_empty() {
		return (text.to_string(), Vec::new());
	}

	let mut patches: Vec<Patch> = patches.as_slice().to_vec();
	let null_padding = patch_add_padding(&mut patches, config);
	let mut working: Vec<char> = format!("{null_padding}{text}{null_padding}").chars().collect();
	patch_split_max(&mut patches, config);

	let mut delta: i64 = 0;
	let mut results = Vec::with_capacity(patches.len());
	let max_bits = config.match_max_bits as usize;

	for patch in &patches {
		let expected_loc = (patch.start2 as i64 + delta).max(0) as usize;
		let text1 = source_text(&patch.diffs);
		let mut end_loc: Option<usize> = None;

		let start_loc = if max_bits != 0 && text1.len() > max_bits {
			let head: String = text1[..max_bits].iter().collect();
			match bitap_match(&to_string(&working), &head, expected_loc, config) {
				Some(s) => {
					let tail_start = text1.len() - max_bits;
					let tail: String = text1[tail_start..].iter().collect();
					match bitap_match(&to_string(&working), &tail, expected_loc + text1.len() - max_bits, config) {
						Some(e) if e > s => {
							end_loc = Some(e);
							Some(s)
						}
						_ => None,
					}
				}
				None => None,
			}
		} else {
			bitap_match(&to_string(&working), &to_string(&text1), expected_loc, config)
		};

		let Some(start_loc) = start_loc else {
			results.push(false);
			delta -= patch.length2 as i64 - patch.length1 as i64;
			continue;
		};

		results.push(true);
		delta = start_loc as i64 - expected_loc as i64;

		let text2: Vec<char> = match end_loc {
			None => working[start_loc..(start_loc + text1.len()).min(working.len())].to_vec(),
			Some(e) => working[start_loc..(e + max_bits).min(working.len())].to_vec(),
		};

		if text1 == text2 {
			let dest = destination_text(&patch.diffs);
			let end = (start_loc + text1.len()).min(working.len());
			working.splice(start_loc..end, dest);
		} else {
			let sub_diffs = diff::diff(&to_string(&text1), &to_string(&text2), false, None);
			if max_bits != 0 && text1.len() > max_bits && (sub_diffs.levenshtein() as f64 / text1.len() as f64) > config.patch_delete_threshold as f64
			{
				*results.last_mut().unwrap() = false;
			} else {
				let mut sub_diffs = sub_diffs;
				sub_diffs.cleanup_semantic_lossless();
				let mut index1 = 0usize;
				for edit in &patch.diffs {
					if edit.op != Op::Equal {
						let index2 = sub_diffs.x_index(index1);
						if edit.op == Op::Insert {
							let at = (start_loc + index2).min(working.len());
							let ins: Vec<char> = edit.text.chars().collect();
							working.splice(at..at, ins);
						} else if edit.op == Op::Delete {
							let del_end_index2 = sub_diffs.x_index(index1 + edit.char_len());
							let from = (start_loc + index2).min(working.len());
							let to = (start_loc + del_end_index2).min(working.len());
							if from <= to {
								working.splice(from..to, std::iter::empty());
							}
						}
					}
					if edit.op != Op::Delete {
						index1 += edit.char_len();
					}
				}
			}
		}
	}

	let pad_len = null_padding.chars().count();
	let result_len = working.len();
	let stripped = if result_len >= 2 * pad_len {
		working[pad_len..result_len - pad_len].to_vec()
	} else {
		Vec::new()
	};

	(to_string(&stripped), results)
}

// endregion: --- patch_apply

// region:    --- Serialization

static PATCH_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@$").unwrap());

/// Percent-encoding's safe set for patch text: as the delta safe set, plus a
/// literal space (patch text does not use `+` for space like delta does).
const PATCH_TEXT_SAFE_STAYS_ENCODED: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
	.remove(b'!')
	.remove(b'~')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')')
	.remove(b';')
	.remove(b'/')
	.remove(b'?')
	.remove(b':')
	.remove(b'@')
	.remove(b'&')
	.remove(b'=')
	.remove(b'+')
	.remove(b'$')
	.remove(b',')
	.remove(b'#')
	.remove(b' ');

fn patch_header(patch: &Patch) -> String {
	let coords1 = if patch.length1 == 0 {
		format!("{},0", patch.start1)
	} else if patch.length1 == 1 {
		format!("{}", patch.start1 + 1)
	} else {
		format!("{},{}", patch.start1 + 1, patch.length1)
	};
	let coords2 = if patch.length2 == 0 {
		format!("{},0", patch.start2)
	} else if patch.length2 == 1 {
		format!("{}", patch.start2 + 1)
	} else {
		format!("{},{}", patch.start2 + 1, patch.length2)
	};
	format!("@@ -{coords1} +{coords2} @@")
}

/// Renders a patch list in the `@@ -S1,L1 +S2,L2 @@` wire format (spec §6).
pub fn patch_to_text(patches: &PatchList) -> String {
	let mut out = String::new();
	for patch in patches.iter() {
		out.push_str(&patch_header(patch));
		out.push('\n');
		for edit in &patch.diffs {
			let sign = match edit.op {
				Op::Insert => '+',
				Op::Delete => '-',
				Op::Equal => ' ',
			};
			out.push(sign);
			out.push_str(&percent_encoding::utf8_percent_encode(&edit.text, PATCH_TEXT_SAFE_STAYS_ENCODED).to_string());
			out.push('\n');
		}
	}
	out
}

/// Parses the `@@ ... @@` wire format back into a [`PatchList`] (spec §6).
pub fn patch_from_text(text: &str) -> Result<PatchList> {
	let mut patches = Vec::new();
	if text.is_empty() {
		return Ok(PatchList::new(patches));
	}

	let mut lines: std::collections::VecDeque<&str> = text.split('\n').collect();

	while let Some(&header) = lines.front() {
		let caps = PATCH_HEADER
			.captures(header)
			.ok_or_else(|| Error::patch_parse(format!("invalid patch header: '{header}'")))?;
		lines.pop_front();

		let mut patch = Patch::new(0, 0);

		let start1: i64 = caps[1].parse().map_err(|_| Error::patch_parse("invalid start1"))?;
		let len1_str = &caps[2];
		if len1_str.is_empty() {
			patch.start1 = (start1 - 1).max(0) as usize;
			patch.length1 = 1;
		} else if len1_str == "0" {
			patch.start1 = start1 as usize;
			patch.length1 = 0;
		} else {
			patch.start1 = (start1 - 1).max(0) as usize;
			patch.length1 = len1_str.parse().map_err(|_| Error::patch_parse("invalid length1"))?;
		}

		let start2: i64 = caps[3].parse().map_err(|_| Error::patch_parse("invalid start2"))?;
		let len2_str = &caps[4];
		if len2_str.is_empty() {
			patch.start2 = (start2 - 1).max(0) as usize;
			patch.length2 = 1;
		} else if len2_str == "0" {
			patch.start2 = start2 as usize;
			patch.length2 = 0;
		} else {
			patch.start2 = (start2 - 1).max(0) as usize;
			patch.length2 = len2_str.parse().map_err(|_| Error::patch_parse("invalid length2"))?;
		}

		while let Some(&line) = lines.front() {
			let sign = line.chars().next();
			match sign {
				Some('@') => break,
				Some('+') | Some('-') | Some(' ') => {
					let decoded = percent_encoding::percent_decode_str(&line[1..])
						.decode_utf8()
						.map_err(|e| Error::patch_parse(format!("invalid percent-encoding: {e}")))?
						.into_owned();
					lines.pop_front();
					let op = match sign.unwrap() {
						'+' => Op::Insert,
						'-' => Op::Delete,
						_ => Op::Equal,
					};
					patch.diffs.push(Edit::new(op, decoded));
				}
				None => {
					lines.pop_front();
				}
				Some(other) => {
					return Err(Error::patch_parse(format!("invalid patch line mode '{other}'")));
				}
			}
		}

		patches.push(patch);
	}

	Ok(PatchList::new(patches))
}

// endregion: --- Serialization

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn make_then_apply_roundtrips_clean_text() {
		let config = Config::default();
		let patches = patch_make("The quick brown fox.", "The quick red fox.", &config);
		let (result, results) = patch_apply(&patches, "The quick brown fox.", &config);
		assert_eq!(result, "The quick red fox.");
		assert!(results.iter().all(|&ok| ok));
	}

	#[test]
	fn apply_tolerates_drift() {
		let config = Config::default();
		let patches = patch_make("The quick brown fox.", "The quick red fox.", &config);
		let (result, results) = patch_apply(&patches, "The quick brown fox jumps.", &config);
		assert_eq!(result, "The quick red fox jumps.");
		assert_eq!(results, vec![true]);
	}

	#[test]
	fn apply_reports_failure_on_unrelated_text() {
		let config = Config::default();
		let patches = patch_make("The quick brown fox.", "The quick red fox.", &config);
		let (result, results) = patch_apply(&patches, "completely unrelated text", &config);
		assert_eq!(result, "completely unrelated text");
		assert!(results.iter().all(|&ok| !ok));
	}

	#[test]
	fn to_text_then_from_text_roundtrips() {
		let config = Config::default();
		let patches = patch_make("The quick brown fox.", "The quick red fox.", &config);
		let text = patch_to_text(&patches);
		let parsed = patch_from_text(&text).unwrap();
		assert_eq!(parsed, patches);
	}

	#[test]
	fn zero_length_header_keeps_start_undecremented() {
		let patch = Patch { start1: 5, start2: 5, length1: 0, length2: 3, diffs: vec![Edit::insert("ins")] };
		assert_eq!(patch_header(&patch), "@@ -5,0 +6,3 @@");
	}

	#[test]
	fn from_text_rejects_malformed_header() {
		let err = patch_from_text("not a header\n").unwrap_err();
		assert!(matches!(err, Error::PatchParse { .. }));
	}
}
