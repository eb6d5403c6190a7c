//! Diff, match, and patch plain Unicode text: a bidirectional-bisect diff
//! engine, a Bitap fuzzy matcher, and a context-bearing patch engine.
//!
//! The free functions in [`diff`], [`match_engine`], and [`patch`] take an
//! explicit [`Config`] (or no config, for the parts that don't need one);
//! [`DiffMatchPatch`] is a thin facade over a fixed `Config` for callers who
//! want to build once and reuse the same tunables across calls.

// region:    --- Modules

mod config;
mod diff;
mod edits;
mod error;
mod match_engine;
mod op;
mod patch;
mod text_util;

pub use config::*;
pub use edits::*;
pub use error::*;
pub use op::*;
pub use patch::*;

// endregion: --- Modules

use std::time::Instant;

/// A facade over the diff/match/patch functions, bound to one [`Config`].
///
/// There is no process-wide mutable state anywhere in this crate; this
/// struct exists purely so a caller with custom tunables doesn't have to
/// thread `&config` through every call site by hand.
#[derive(Debug, Clone, Default)]
pub struct DiffMatchPatch {
	config: Config,
}

impl DiffMatchPatch {
	/// Builds a facade using [`Config::default`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a facade using caller-supplied tunables.
	pub fn with_config(config: Config) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Computes the edit script that turns `text1` into `text2`, honoring the
	/// configured timeout. `check_lines` enables the line-mode speedup for
	/// large inputs.
	pub fn diff(&self, text1: &str, text2: &str, check_lines: bool) -> EditList {
		tracing::debug!(text1_len = text1.len(), text2_len = text2.len(), check_lines, "diff start");
		let edits = diff::diff_with_config(text1, text2, check_lines, &self.config);
		tracing::debug!(edit_count = edits.len(), "diff done");
		edits
	}

	/// As [`Self::diff`], but with an explicit absolute deadline instead of
	/// one derived from `config.diff_timeout`.
	pub fn diff_with_deadline(&self, text1: &str, text2: &str, check_lines: bool, deadline: Option<Instant>) -> EditList {
		diff::diff_with_timeout(text1, text2, check_lines, deadline, self.config.diff_timeout)
	}

	/// Locates `pattern` in `text` near `loc` using the Bitap fuzzy matcher.
	pub fn find(&self, text: &str, pattern: &str, loc: usize) -> Option<usize> {
		match_engine::bitap_match(text, pattern, loc, &self.config)
	}

	/// Diffs `text1`/`text2`, runs the semantic and efficiency cleanups, and
	/// builds a patch list from the result.
	pub fn patch_make(&self, text1: &str, text2: &str) -> PatchList {
		patch::patch_make(text1, text2, &self.config)
	}

	/// Builds a patch list directly from a precomputed edit script against `text1`.
	pub fn patch_make_from_diffs(&self, text1: &str, diffs: Vec<Edit>) -> PatchList {
		patch::patch_make_from_diffs(text1, diffs, &self.config)
	}

	/// Applies `patches` to `text`. Never fails: returns the best-effort
	/// result plus one success flag per patch.
	pub fn patch_apply(&self, patches: &PatchList, text: &str) -> (String, Vec<bool>) {
		for (i, patch) in patches.iter().enumerate() {
			tracing::debug!(patch = i, start1 = patch.start1, start2 = patch.start2, "patch_apply candidate");
		}
		let (result, outcomes) = patch::patch_apply(patches, text, &self.config);
		for (i, ok) in outcomes.iter().enumerate() {
			tracing::debug!(patch = i, matched = ok, "patch_apply outcome");
		}
		(result, outcomes)
	}

	pub fn patch_to_text(&self, patches: &PatchList) -> String {
		patch::patch_to_text(patches)
	}

	pub fn patch_from_text(&self, text: &str) -> Result<PatchList> {
		patch::patch_from_text(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn facade_diff_and_patch_roundtrip() {
		let dmp = DiffMatchPatch::new();
		let patches = dmp.patch_make("The cat in the hat.", "The dog in the hat.");
		let (result, ok) = dmp.patch_apply(&patches, "The cat in the hat.");
		assert_eq!(result, "The dog in the hat.");
		assert!(ok.iter().all(|&x| x));
	}

	#[test]
	fn facade_find_matches_general_example() {
		let dmp = DiffMatchPatch::new();
		let text = "I am the very model of a modern major general.";
		let loc = dmp.find(text, "general", 20).unwrap();
		assert_eq!(&text[loc..loc + "general".len()], "general");
	}
}
