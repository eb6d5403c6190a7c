//! Character-level helpers shared by the diff, match, and patch engines.
//!
//! Everything here operates on `&[char]` slices rather than `&str` so the diff
//! engine can borrow sub-ranges of the input texts instead of copying them on
//! every recursive call (see DESIGN.md, "borrow from inputs").

use std::borrow::Cow;

/// Length of the longest common prefix of `a` and `b`, in chars.
pub fn common_prefix(a: &[char], b: &[char]) -> usize {
	let max = a.len().min(b.len());
	let mut n = 0;
	while n < max && a[n] == b[n] {
		n += 1;
	}
	n
}

/// Length of the longest common suffix of `a` and `b`, in chars.
pub fn common_suffix(a: &[char], b: &[char]) -> usize {
	let max = a.len().min(b.len());
	let mut n = 0;
	while n < max && a[a.len() - 1 - n] == b[b.len() - 1 - n] {
		n += 1;
	}
	n
}

/// Length of the longest run such that the last `n` chars of `a` equal the
/// first `n` chars of `b`. Used to detect overlap between an adjacent
/// delete/insert pair.
pub fn common_overlap(a: &[char], b: &[char]) -> usize {
	let a_len = a.len();
	let b_len = b.len();
	if a_len == 0 || b_len == 0 {
		return 0;
	}
	let a = if a_len > b_len { &a[a_len - b_len..] } else { a };
	let b = if b_len > a_len { &b[..a_len] } else { b };
	let text_len = a.len().min(b.len());
	if a == b {
		return text_len;
	}

	let mut best = 0;
	let mut length = 1;
	loop {
		let pattern = &a[a.len() - length..];
		let Some(found) = index_of(b, pattern, 0) else {
			return best;
		};
		length += found;
		if found == 0 || a[a.len() - length..] == b[..length] {
			best = length;
			length += 1;
		}
		if length > text_len {
			return best;
		}
	}
}

/// Find `needle` in `haystack` starting at or after `from`, returning the
/// char offset of the first match.
pub fn index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
	if needle.is_empty() {
		return if from <= haystack.len() { Some(from) } else { None };
	}
	if from >= haystack.len() || needle.len() > haystack.len() - from {
		return None;
	}
	haystack[from..].windows(needle.len()).position(|w| w == needle).map(|p| p + from)
}

/// A substring common to both `a` and `b` that is at least half the length of
/// the longer input, used to split the diff problem in two before running the
/// expensive bisect. Returns `None` when no such split exists, or when the
/// caller has disabled the speedup (`timeout <= 0`).
pub struct HalfMatch<'a> {
	pub a_prefix: &'a [char],
	pub a_suffix: &'a [char],
	pub b_prefix: &'a [char],
	pub b_suffix: &'a [char],
	pub common_mid: Vec<char>,
}

pub fn half_match<'a>(a: &'a [char], b: &'a [char], timeout_secs: f32) -> Option<HalfMatch<'a>> {
	if timeout_secs <= 0.0 {
		return None;
	}
	let (long, short, swapped) = if a.len() > b.len() { (a, b, false) } else { (b, a, true) };
	if long.len() < 4 || short.len() * 2 < long.len() {
		return None;
	}

	let hm1 = half_match_i(long, short, (long.len() + 3) / 4);
	let hm2 = half_match_i(long, short, (long.len() + 1) / 2);

	let best = match (hm1, hm2) {
		(None, None) => return None,
		(Some(x), None) => x,
		(None, Some(x)) => x,
		(Some(x), Some(y)) => {
			if x.common_mid.len() > y.common_mid.len() {
				x
			} else {
				y
			}
		}
	};

	let (long_prefix, long_suffix, short_prefix, short_suffix, common_mid) =
		(best.long_prefix, best.long_suffix, best.short_prefix, best.short_suffix, best.common_mid);

	if swapped {
		Some(HalfMatch {
			a_prefix: short_prefix,
			a_suffix: short_suffix,
			b_prefix: long_prefix,
			b_suffix: long_suffix,
			common_mid,
		})
	} else {
		Some(HalfMatch {
			a_prefix: long_prefix,
			a_suffix: long_suffix,
			b_prefix: short_prefix,
			b_suffix: short_suffix,
			common_mid,
		})
	}
}

struct HalfMatchI<'a> {
	long_prefix: &'a [char],
	long_suffix: &'a [char],
	short_prefix: &'a [char],
	short_suffix: &'a [char],
	common_mid: Vec<char>,
}

/// Probe for a half-match anchored at `long[i..i + long.len()/4]`.
fn half_match_i<'a>(long: &'a [char], short: &'a [char], i: usize) -> Option<HalfMatchI<'a>> {
	let seed = &long[i..i + long.len() / 4];

	let mut best_common_len = 0usize;
	let mut best: Option<(usize, usize, usize)> = None; // (j, prefix_len, suffix_len)

	let mut from = 0;
	while let Some(j) = index_of(short, seed, from) {
		let prefix_len = common_prefix(&long[i..], &short[j..]);
		let suffix_len = common_suffix(&long[..i], &short[..j]);
		if prefix_len + suffix_len > best_common_len {
			best_common_len = prefix_len + suffix_len;
			best = Some((j, prefix_len, suffix_len));
		}
		from = j + 1;
	}

	let (j, prefix_len, suffix_len) = best?;
	if best_common_len * 2 < long.len() - i {
		return None;
	}

	let common_mid = {
		let mut v = Vec::with_capacity(suffix_len + prefix_len);
		v.extend_from_slice(&short[j - suffix_len..j]);
		v.extend_from_slice(&short[j..j + prefix_len]);
		v
	};

	Some(HalfMatchI {
		long_prefix: &long[..i - suffix_len],
		long_suffix: &long[i + prefix_len..],
		short_prefix: &short[..j - suffix_len],
		short_suffix: &short[j + prefix_len..],
		common_mid,
	})
}

/// Reverses percent-escaping for the fixed set of characters the standard URL
/// encoder escapes but that are safe to leave literal in delta/patch text.
pub fn url_unescape_uri_safe(s: &str) -> Cow<'_, str> {
	const SAFE: &[(&str, char)] = &[
		("%21", '!'),
		("%7E", '~'),
		("%27", '\''),
		("%28", '('),
		("%29", ')'),
		("%3B", ';'),
		("%2F", '/'),
		("%3F", '?'),
		("%3A", ':'),
		("%40", '@'),
		("%26", '&'),
		("%3D", '='),
		("%2B", '+'),
		("%24", '$'),
		("%2C", ','),
		("%23", '#'),
	];
	if !s.contains('%') {
		return Cow::Borrowed(s);
	}
	let mut out = String::with_capacity(s.len());
	let mut rest = s;
	'outer: while !rest.is_empty() {
		if rest.starts_with('%') && rest.len() >= 3 {
			for (enc, ch) in SAFE {
				if rest.starts_with(enc) {
					out.push(*ch);
					rest = &rest[3..];
					continue 'outer;
				}
			}
		}
		let mut chars = rest.char_indices();
		let (_, c) = chars.next().unwrap();
		let next_idx = chars.next().map(|(i, _)| i).unwrap_or(rest.len());
		out.push(c);
		rest = &rest[next_idx..];
	}
	Cow::Owned(out)
}
