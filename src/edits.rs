//! [`EditList`]: the canonical-form sequence of [`Edit`]s produced by the diff
//! engine, plus the operations derived from it (delta, levenshtein, x_index,
//! rendering) and the cleanup passes that bring a raw edit list into
//! canonical form.

use crate::diff::cleanup;
use crate::error::{Error, Result};
use crate::op::{Edit, Op};
use crate::text_util::url_unescape_uri_safe;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// An ordered sequence of [`Edit`]s.
///
/// In canonical form (after [`EditList::cleanup_merge`]):
/// - no two adjacent edits share the same [`Op`],
/// - no edit has empty text,
/// - an adjacent `Delete`/`Insert` pair has no common prefix or suffix (that
///   would be factored out into a surrounding `Equal`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditList {
	edits: Vec<Edit>,
}

impl EditList {
	pub fn new(edits: Vec<Edit>) -> Self {
		Self { edits }
	}

	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	pub fn len(&self) -> usize {
		self.edits.len()
	}

	pub fn as_slice(&self) -> &[Edit] {
		&self.edits
	}

	pub fn into_vec(self) -> Vec<Edit> {
		self.edits
	}
}

// region:    --- Iterators

impl EditList {
	pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
		self.edits.iter()
	}
}

impl IntoIterator for EditList {
	type Item = Edit;
	type IntoIter = std::vec::IntoIter<Edit>;

	fn into_iter(self) -> Self::IntoIter {
		self.edits.into_iter()
	}
}

impl<'a> IntoIterator for &'a EditList {
	type Item = &'a Edit;
	type IntoIter = std::slice::Iter<'a, Edit>;

	fn into_iter(self) -> Self::IntoIter {
		self.edits.iter()
	}
}

impl From<Vec<Edit>> for EditList {
	fn from(edits: Vec<Edit>) -> Self {
		Self::new(edits)
	}
}

// endregion: --- Iterators

// region:    --- Derived text

impl EditList {
	/// Concatenates the text of every `Equal` and `Delete` edit: the original text.
	pub fn source_text(&self) -> String {
		self
			.edits
			.iter()
			.filter(|e| e.op != Op::Insert)
			.map(|e| e.text.as_str())
			.collect()
	}

	/// Concatenates the text of every `Equal` and `Insert` edit: the destination text.
	pub fn destination_text(&self) -> String {
		self
			.edits
			.iter()
			.filter(|e| e.op != Op::Delete)
			.map(|e| e.text.as_str())
			.collect()
	}

	/// Sum, over every maximal run of adjacent non-`Equal` edits, of
	/// `max(insertions, deletions)` in that run.
	pub fn levenshtein(&self) -> usize {
		let mut total = 0usize;
		let mut inserts = 0usize;
		let mut deletes = 0usize;
		for edit in &self.edits {
			match edit.op {
				Op::Insert => inserts += edit.char_len(),
				Op::Delete => deletes += edit.char_len(),
				Op::Equal => {
					total += inserts.max(deletes);
					inserts = 0;
					deletes = 0;
				}
			}
		}
		total + inserts.max(deletes)
	}

	/// Translates a char position in the source text to the corresponding
	/// position in the destination text.
	pub fn x_index(&self, loc: usize) -> usize {
		let mut chars1 = 0usize;
		let mut chars2 = 0usize;
		let mut last_chars1 = 0usize;
		let mut last_chars2 = 0usize;

		for edit in &self.edits {
			let len = edit.char_len();
			if edit.op != Op::Insert {
				chars1 += len;
			}
			if edit.op != Op::Delete {
				chars2 += len;
			}
			if chars1 > loc {
				if edit.op == Op::Delete {
					return last_chars2;
				}
				break;
			}
			last_chars1 = chars1;
			last_chars2 = chars2;
		}
		last_chars2 + loc.saturating_sub(last_chars1)
	}
}

// endregion: --- Derived text

// region:    --- Cleanup

impl EditList {
	pub fn cleanup_merge(&mut self) {
		cleanup::cleanup_merge(&mut self.edits);
	}

	pub fn cleanup_semantic(&mut self) {
		cleanup::cleanup_semantic(&mut self.edits);
	}

	pub fn cleanup_semantic_lossless(&mut self) {
		cleanup::cleanup_semantic_lossless(&mut self.edits);
	}

	pub fn cleanup_efficiency(&mut self, edit_cost: u16) {
		cleanup::cleanup_efficiency(&mut self.edits, edit_cost);
	}
}

// endregion: --- Cleanup

// region:    --- Rendering

impl EditList {
	/// `+insert`, `-delete`, equal text verbatim.
	pub fn render_raw(&self) -> String {
		let mut out = String::new();
		for edit in &self.edits {
			match edit.op {
				Op::Equal => out.push_str(&edit.text),
				Op::Insert => {
					out.push('+');
					out.push_str(&edit.text);
				}
				Op::Delete => {
					out.push('-');
					out.push_str(&edit.text);
				}
			}
		}
		out
	}

	/// Groups adjacent same-op runs with bracketing: `-[deleted]`, `+[inserted]`.
	pub fn render_humanized(&self) -> String {
		let mut out = String::new();
		for edit in &self.edits {
			match edit.op {
				Op::Equal => out.push_str(&edit.text),
				Op::Insert => {
					out.push_str("+[");
					out.push_str(&edit.text);
					out.push(']');
				}
				Op::Delete => {
					out.push_str("-[");
					out.push_str(&edit.text);
					out.push(']');
				}
			}
		}
		out
	}

	/// Escapes `&<>` and newlines, wraps edits in `<ins>/<del>/<span>`.
	pub fn render_html(&self) -> String {
		let mut out = String::new();
		for edit in &self.edits {
			let escaped = html_escape(&edit.text);
			match edit.op {
				Op::Equal => {
					out.push_str("<span>");
					out.push_str(&escaped);
					out.push_str("</span>");
				}
				Op::Insert => {
					out.push_str("<ins>");
					out.push_str(&escaped);
					out.push_str("</ins>");
				}
				Op::Delete => {
					out.push_str("<del>");
					out.push_str(&escaped);
					out.push_str("</del>");
				}
			}
		}
		out
	}
}

fn html_escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'\n' => out.push_str("&para;<br>"),
			c => out.push(c),
		}
	}
	out
}

// endregion: --- Rendering

// region:    --- Delta

/// Percent-encoding's "everything but alphanumerics" set, narrowed by the
/// safe set that the delta format un-escapes for readability (spec §6).
const DELTA_SAFE_STAYS_ENCODED: &AsciiSet = &NON_ALPHANUMERIC
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
	.remove(b'#');

impl EditList {
	/// TAB-separated tokens: `=N` keep, `-N` delete, `+TEXT` insert (URL-encoded,
	/// spaces as `+`), with the safe-set characters un-escaped for readability.
	pub fn to_delta(&self) -> String {
		let mut tokens = Vec::with_capacity(self.edits.len());
		for edit in &self.edits {
			match edit.op {
				Op::Equal => tokens.push(format!("={}", edit.char_len())),
				Op::Delete => tokens.push(format!("-{}", edit.char_len())),
				Op::Insert => {
					let encoded = utf8_percent_encode(&edit.text, DELTA_SAFE_STAYS_ENCODED).to_string();
					let encoded = encoded.replace("%20", "+");
					tokens.push(format!("+{encoded}"));
				}
			}
		}
		tokens.join("\t")
	}

	/// Reconstructs an [`EditList`] whose destination text is obtained by
	/// replaying `delta` against `source`.
	pub fn from_delta(source: &str, delta: &str) -> Result<Self> {
		let source_chars: Vec<char> = source.chars().collect();
		let mut cursor = 0usize;
		let mut edits = Vec::new();

		if delta.is_empty() {
			if source.is_empty() {
				return Ok(Self::new(Vec::new()));
			}
			return Err(Error::delta_cursor_mismatch(source_chars.len(), 0));
		}

		for token in delta.split('\t') {
			if token.is_empty() {
				continue;
			}
			let (tag, rest) = token.split_at(1);
			match tag {
				"+" => {
					let decoded = rest.replace('+', "%20");
					let decoded = percent_encoding::percent_decode_str(&decoded)
						.decode_utf8()
						.map_err(|e| Error::delta_parse(format!("invalid percent-encoding: {e}")))?
						.into_owned();
					let decoded = url_unescape_uri_safe(&decoded).into_owned();
					if !decoded.is_empty() {
						edits.push(Edit::insert(decoded));
					}
				}
				"=" | "-" => {
					let n: usize = rest
						.parse()
						.map_err(|_| Error::delta_parse(format!("invalid count in token '{token}'")))?;
					if cursor + n > source_chars.len() {
						return Err(Error::delta_parse(format!(
							"delta token '{token}' exceeds remaining source text"
						)));
					}
					let slice: String = source_chars[cursor..cursor + n].iter().collect();
					cursor += n;
					if !slice.is_empty() {
						edits.push(if tag == "=" { Edit::equal(slice) } else { Edit::delete(slice) });
					}
				}
				other => {
					return Err(Error::delta_parse(format!("unknown delta op '{other}' in token '{token}'")));
				}
			}
		}

		if cursor != source_chars.len() {
			return Err(Error::delta_cursor_mismatch(source_chars.len(), cursor));
		}

		Ok(Self::new(edits))
	}
}

// endregion: --- Delta

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn source_and_destination_text_roundtrip() {
		let edits = EditList::new(vec![
			Edit::equal("The "),
			Edit::delete("cat"),
			Edit::insert("dog"),
			Edit::equal(" in the hat."),
		]);
		assert_eq!(edits.source_text(), "The cat in the hat.");
		assert_eq!(edits.destination_text(), "The dog in the hat.");
	}

	#[test]
	fn levenshtein_sums_max_per_run() {
		let edits = EditList::new(vec![Edit::delete("abc"), Edit::insert("de"), Edit::equal("f")]);
		assert_eq!(edits.levenshtein(), 3);
	}

	#[test]
	fn to_delta_basic() {
		let edits = EditList::new(vec![Edit::equal("ab"), Edit::delete("c"), Edit::insert("d")]);
		assert_eq!(edits.to_delta(), "=2\t-1\t+d");
	}

	#[test]
	fn from_delta_reconstructs_destination() {
		let edits = EditList::from_delta("abc", "=2\t-1\t+d").unwrap();
		assert_eq!(edits.destination_text(), "abd");
	}

	#[test]
	fn from_delta_rejects_cursor_mismatch() {
		let err = EditList::from_delta("abc", "=2").unwrap_err();
		assert!(matches!(err, Error::DeltaCursorMismatch { .. }));
	}

	#[test]
	fn render_html_escapes_and_wraps() {
		let edits = EditList::new(vec![Edit::equal("bills "), Edit::delete("boa"), Edit::insert("swo"), Edit::equal("rds")]);
		assert_eq!(
			edits.render_html(),
			"<span>bills </span><del>boa</del><ins>swo</ins><span>rds</span>"
		);
	}
}
