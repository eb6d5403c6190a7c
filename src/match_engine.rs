//! Bitap (shift-or) approximate string matching (spec §4.3).

use std::collections::HashMap;

use crate::config::Config;
use crate::text_util::index_of;

/// Locates `pattern` inside `text` near `loc`, returning the char index of
/// the best match, or `None` if nothing scores within `config.match_threshold`.
///
/// `pattern` must be no longer than `config.match_max_bits` (when that is
/// non-zero) — splitting longer patterns is the patch engine's job, not this
/// function's (spec §4.3 "Bit-width constraint").
pub fn bitap_match(text: &str, pattern: &str, loc: usize, config: &Config) -> Option<usize> {
	let text: Vec<char> = text.chars().collect();
	let pattern: Vec<char> = pattern.chars().collect();
	let loc = loc.min(text.len());

	if pattern.is_empty() {
		return Some(loc);
	}
	if text.is_empty() {
		return None;
	}
	if text == pattern {
		return Some(0);
	}

	let max_bits = if config.match_max_bits == 0 { usize::MAX } else { config.match_max_bits as usize };
	debug_assert!(pattern.len() <= max_bits, "pattern longer than match_max_bits must be split by the caller");

	bitap(&text, &pattern, loc, config)
}

fn score(e: usize, x: isize, loc: usize, pattern_len: usize, config: &Config) -> f64 {
	let accuracy = e as f64 / pattern_len as f64;
	let proximity = (loc as isize - x).unsigned_abs();
	if config.match_distance == 0 {
		return if proximity != 0 { 1.0 } else { accuracy };
	}
	accuracy + proximity as f64 / config.match_distance as f64
}

fn alphabet(pattern: &[char]) -> HashMap<char, u32> {
	let mut map = HashMap::new();
	for (i, &c) in pattern.iter().enumerate() {
		let bit = 1u32 << (pattern.len() - 1 - i);
		*map.entry(c).or_insert(0) |= bit;
	}
	map
}

/// The Bitap search proper. Ported from the classic `diff_match_patch`
/// shift-or recurrence: at each error count `d`, narrow the search window
/// with a binary search on the score function, then sweep `j` from the
/// window's far edge back toward `loc`, combining a character-match bit with
/// the substitution/insertion/deletion continuations from the previous `d`.
fn bitap(text: &[char], pattern: &[char], loc: usize, config: &Config) -> Option<usize> {
	let alphabet = alphabet(pattern);
	let pattern_len = pattern.len();
	let match_mask = 1u32 << (pattern_len - 1);

	let mut score_threshold = config.match_threshold as f64;

	if let Some(pos) = index_of(text, pattern, loc) {
		score_threshold = score_threshold.min(score(0, pos as isize, loc, pattern_len, config));
		if let Some(pos) = rindex_of(text, pattern, (loc + pattern_len).min(text.len())) {
			score_threshold = score_threshold.min(score(0, pos as isize, loc, pattern_len, config));
		}
	}

	let mut best_loc: Option<usize> = None;
	let mut bin_max = (pattern_len + text.len()) as i64;
	let mut last_rd: Vec<u32> = Vec::new();

	for d in 0..pattern_len {
		let mut bin_min = 0i64;
		let mut bin_mid = bin_max;
		while bin_min < bin_mid {
			if score(d, (loc as i64 + bin_mid) as isize, loc, pattern_len, config) <= score_threshold {
				bin_min = bin_mid;
			} else {
				bin_max = bin_mid;
			}
			bin_mid = (bin_max - bin_min) / 2 + bin_min;
		}
		bin_max = bin_mid;

		let mut start = (loc as i64 - bin_mid + 1).max(1) as usize;
		let finish = ((loc as i64 + bin_mid).min(text.len() as i64) as usize) + pattern_len;

		let mut rd = vec![0u32; finish + 2];
		rd[finish + 1] = (1u32 << d) - 1;

		let mut j = finish;
		'inner: while j >= start {
			let char_match = if j >= 1 && j - 1 < text.len() { *alphabet.get(&text[j - 1]).unwrap_or(&0) } else { 0 };

			rd[j] = if d == 0 {
				((rd[j + 1] << 1) | 1) & char_match
			} else {
				let last_jp1 = last_rd[j + 1];
				let last_j = last_rd[j];
				(((rd[j + 1] << 1) | 1) & char_match) | (((last_jp1 | last_j) << 1) | 1) | last_jp1
			};

			if rd[j] & match_mask != 0 {
				let s = score(d, (j - 1) as isize, loc, pattern_len, config);
				if s <= score_threshold {
					score_threshold = s;
					best_loc = Some(j - 1);
					if best_loc.unwrap() > loc {
						start = (2 * loc as i64 - best_loc.unwrap() as i64).max(1) as usize;
					} else {
						break 'inner;
					}
				}
			}

			if j == 0 {
				break;
			}
			j -= 1;
		}

		if score(d + 1, loc as isize, loc, pattern_len, config) > score_threshold {
			break;
		}
		last_rd = rd;
	}

	best_loc
}

fn rindex_of(haystack: &[char], needle: &[char], before: usize) -> Option<usize> {
	if needle.is_empty() || needle.len() > haystack.len() {
		return None;
	}
	let last_start = before.min(haystack.len() - needle.len());
	for start in (0..=last_start).rev() {
		if haystack[start..start + needle.len()] == *needle {
			return Some(start);
		}
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exact_match_returns_loc() {
		let cfg = Config::default();
		let text = "I am the very model of a modern major general.";
		let pos = bitap_match(text, "general", 20, &cfg).unwrap();
		assert_eq!(&text[pos..pos + "general".len()], "general");
	}

	#[test]
	fn empty_pattern_returns_clamped_loc() {
		let cfg = Config::default();
		assert_eq!(bitap_match("abc", "", 5, &cfg), Some(3));
		assert_eq!(bitap_match("abc", "", 0, &cfg), Some(0));
	}

	#[test]
	fn empty_text_returns_none() {
		let cfg = Config::default();
		assert_eq!(bitap_match("", "x", 0, &cfg), None);
	}

	#[test]
	fn fuzzy_match_within_threshold() {
		let cfg = Config::default();
		assert_eq!(bitap_match("fi", "efxhi", 4, &cfg), Some(4));
	}

	#[test]
	fn no_match_beyond_threshold() {
		let cfg = Config { match_threshold: 0.3, ..Config::default() };
		assert_eq!(bitap_match("wxyz", "abcd", 0, &cfg), None);
	}
}
