//! The diff engine: prefix/suffix stripping, half-match bisection, optional
//! line-mode acceleration, Myers bisect, and the cleanup passes (spec §4.2).

mod bisect;
pub mod cleanup;
mod linemode;

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::edits::EditList;
use crate::op::{Edit, Op};
use crate::text_util;

/// Turns a configured timeout budget into an absolute deadline, the form
/// every recursive diff entry point actually wants (spec §9 "deadline
/// plumbing"). `diff_timeout <= 0` means no timeout.
pub(crate) fn deadline_for(config: &Config) -> Option<Instant> {
	if config.diff_timeout > 0.0 {
		Some(Instant::now() + Duration::from_secs_f32(config.diff_timeout))
	} else {
		None
	}
}

/// Parameters threaded through every recursive diff entry point. `deadline`
/// is the absolute point after which bisect gives up on the current
/// subproblem; `timeout_secs` is the original budget, kept alongside so
/// `half_match` can tell "no deadline because none was requested" apart from
/// "no deadline left because wall-clock time is up" (spec §4.1: half_match
/// is skippable only when the timeout is disabled).
#[derive(Clone, Copy)]
struct Ctx {
	deadline: Option<Instant>,
	timeout_secs: f32,
}

/// Computes the edit script that turns `text1` into `text2`.
///
/// `check_lines` enables the line-mode speedup for large texts. `deadline` is
/// an absolute monotonic time after which bisect returns a coarse answer for
/// the remaining subproblem rather than continuing to search; `None` means
/// no timeout.
pub fn diff(text1: &str, text2: &str, check_lines: bool, deadline: Option<Instant>) -> EditList {
	diff_with_timeout(text1, text2, check_lines, deadline, 0.0)
}

/// Runs [`diff`] using a [`Config`]'s timeout budget for both the deadline
/// and the half-match skip decision, the form `patch_make`/`patch_apply` use
/// internally and the form [`crate::DiffMatchPatch`] exposes publicly.
pub fn diff_with_config(text1: &str, text2: &str, check_lines: bool, config: &Config) -> EditList {
	let deadline = deadline_for(config);
	diff_with_timeout(text1, text2, check_lines, deadline, config.diff_timeout)
}

/// As [`diff`], but also carries the original timeout budget (seconds) so
/// the half-match speedup can be disabled consistently with `diff_timeout <= 0`
/// even when the caller passes an explicit deadline.
pub fn diff_with_timeout(
	text1: &str,
	text2: &str,
	check_lines: bool,
	deadline: Option<Instant>,
	timeout_secs: f32,
) -> EditList {
	let ctx = Ctx { deadline, timeout_secs };
	let a: Vec<char> = text1.chars().collect();
	let b: Vec<char> = text2.chars().collect();
	let edits = diff_internal(&a, &b, check_lines, ctx);
	EditList::new(edits)
}

/// The full recursive pipeline: short-circuit, strip affixes, dispatch to
/// `compute`, glue the affixes back, merge. Called both as the top-level
/// entry point and recursively from bisect-split and line-mode's character
/// level re-diff.
fn diff_internal(a: &[char], b: &[char], check_lines: bool, ctx: Ctx) -> Vec<Edit> {
	if a == b {
		return if a.is_empty() { Vec::new() } else { vec![Edit::equal(a.iter().collect::<String>())] };
	}

	let prefix_len = text_util::common_prefix(a, b);
	let (a, b, prefix) = (&a[prefix_len..], &b[prefix_len..], &a[..prefix_len]);
	let suffix_len = text_util::common_suffix(a, b);
	let (a, b, suffix) = (&a[..a.len() - suffix_len], &b[..b.len() - suffix_len], &a[a.len() - suffix_len..]);

	let mut edits = Vec::new();
	if !prefix.is_empty() {
		edits.push(Edit::equal(prefix.iter().collect::<String>()));
	}
	edits.extend(compute(a, b, check_lines, ctx));
	if !suffix.is_empty() {
		edits.push(Edit::equal(suffix.iter().collect::<String>()));
	}

	cleanup::cleanup_merge(&mut edits);
	edits
}

/// `compute(a, b)`: both non-empty, no common affix remaining.
fn compute(a: &[char], b: &[char], check_lines: bool, ctx: Ctx) -> Vec<Edit> {
	if a.is_empty() {
		return vec![Edit::insert(b.iter().collect::<String>())];
	}
	if b.is_empty() {
		return vec![Edit::delete(a.iter().collect::<String>())];
	}

	let (long, short, short_is_a) = if a.len() > b.len() { (a, b, false) } else { (b, a, true) };
	if let Some(pos) = text_util::index_of(long, short, 0) {
		let op = if short_is_a { Op::Insert } else { Op::Delete };
		let mut out = Vec::with_capacity(3);
		if pos > 0 {
			out.push(Edit::new(op, long[..pos].iter().collect::<String>()));
		}
		out.push(Edit::equal(short.iter().collect::<String>()));
		if pos + short.len() < long.len() {
			out.push(Edit::new(op, long[pos + short.len()..].iter().collect::<String>()));
		}
		return out;
	}

	if short.len() == 1 {
		return vec![Edit::delete(a.iter().collect::<String>()), Edit::insert(b.iter().collect::<String>())];
	}

	if let Some(hm) = text_util::half_match(a, b, ctx.timeout_secs) {
		let mut left = diff_internal(hm.a_prefix, hm.b_prefix, check_lines, ctx);
		let mid = Edit::equal(hm.common_mid.iter().collect::<String>());
		let right = diff_internal(hm.a_suffix, hm.b_suffix, check_lines, ctx);
		left.push(mid);
		left.extend(right);
		return left;
	}

	if check_lines && a.len() > 100 && b.len() > 100 {
		return linemode::diff_line_mode(a, b, ctx);
	}

	bisect::bisect(a, b, ctx)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(s: &str) -> Vec<char> {
		s.chars().collect()
	}

	fn no_deadline() -> Ctx {
		Ctx { deadline: None, timeout_secs: 1.0 }
	}

	#[test]
	fn compute_substring_fast_path_deletes_when_text1_is_longer() {
		// "y" is embedded in "xyz" with no shared prefix/suffix to strip first.
		let a = chars("xyz");
		let b = chars("y");
		let edits = compute(&a, &b, false, no_deadline());
		assert_eq!(edits, vec![Edit::delete("x"), Edit::equal("y"), Edit::delete("z")]);
	}

	#[test]
	fn compute_substring_fast_path_inserts_when_text2_is_longer() {
		let a = chars("y");
		let b = chars("xyz");
		let edits = compute(&a, &b, false, no_deadline());
		assert_eq!(edits, vec![Edit::insert("x"), Edit::equal("y"), Edit::insert("z")]);
	}

	#[test]
	fn diff_internal_preserves_source_and_destination_text_for_substring_case() {
		let a = chars("xyz");
		let b = chars("y");
		let edits = diff_internal(&a, &b, false, no_deadline());
		let list = EditList::new(edits);
		assert_eq!(list.source_text(), "xyz");
		assert_eq!(list.destination_text(), "y");
	}
}
