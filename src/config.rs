//! Tunables recognized by the diff, match, and patch engines (spec §6).

/// Knobs shared by [`crate::DiffMatchPatch`]. Constructed once and threaded
/// through every call; there is no process-wide mutable configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
	/// Advisory wall-clock budget for a single `diff` call, in seconds. `0` disables.
	pub diff_timeout: f32,
	/// Cost of an edit operation, used by `cleanup_efficiency` to decide whether a
	/// short equality is worth keeping.
	pub diff_edit_cost: u16,
	/// Cutoff score for the Bitap matcher, in `[0, 1]`. Lower is stricter.
	pub match_threshold: f32,
	/// Number of characters of drift from the expected location that cost 1.0 of score.
	pub match_distance: u32,
	/// Fraction of `text1`'s length, in `[0, 1]`, beyond which a patch's matched
	/// region is considered too different and the patch is rejected.
	pub patch_delete_threshold: f32,
	/// Amount of surrounding context kept around each patch.
	pub patch_margin: u16,
	/// Width of the Bitap state word. `0` means unbounded (no splitting needed).
	pub match_max_bits: u16,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			diff_timeout: 1.0,
			diff_edit_cost: 4,
			match_threshold: 0.5,
			match_distance: 1000,
			patch_delete_threshold: 0.5,
			patch_margin: 4,
			match_max_bits: 32,
		}
	}
}
