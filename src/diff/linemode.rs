//! Line-mode acceleration: diff at the line level first, then patch up the
//! boundaries at the character level (spec §4.2.1).

use std::collections::HashMap;

use crate::op::{Edit, Op};

use super::{cleanup, diff_internal, Ctx};

/// Runs the diff on line-handle strings instead of raw characters, then
/// rehydrates the result and re-diffs any adjacent delete/insert pair at
/// character granularity.
pub fn diff_line_mode(a: &[char], b: &[char], ctx: Ctx) -> Vec<Edit> {
	let (handles_a, handles_b, lines) = lines_to_chars(a, b);

	let mut edits = diff_internal(&handles_a, &handles_b, false, ctx);
	chars_to_lines(&mut edits, &lines);
	cleanup::cleanup_semantic(&mut edits);

	edits.push(Edit::equal(""));
	let mut result = Vec::with_capacity(edits.len());
	let mut pointer = 0usize;
	let mut text_delete = String::new();
	let mut text_insert = String::new();
	let mut count_delete = 0usize;
	let mut count_insert = 0usize;

	while pointer < edits.len() {
		match edits[pointer].op {
			Op::Insert => {
				count_insert += 1;
				text_insert.push_str(&edits[pointer].text);
			}
			Op::Delete => {
				count_delete += 1;
				text_delete.push_str(&edits[pointer].text);
			}
			Op::Equal => {
				if count_delete >= 1 && count_insert >= 1 {
					let a_chars: Vec<char> = text_delete.chars().collect();
					let b_chars: Vec<char> = text_insert.chars().collect();
					result.extend(diff_internal(&a_chars, &b_chars, false, ctx));
				} else {
					if count_delete >= 1 {
						result.push(Edit::delete(std::mem::take(&mut text_delete)));
					}
					if count_insert >= 1 {
						result.push(Edit::insert(std::mem::take(&mut text_insert)));
					}
				}
				if !edits[pointer].text.is_empty() {
					result.push(edits[pointer].clone());
				}
				count_delete = 0;
				count_insert = 0;
				text_delete.clear();
				text_insert.clear();
			}
		}
		pointer += 1;
	}

	result
}

/// Maps a sequential handle index to a `char`, skipping the UTF-16 surrogate
/// range so the diff engine never has to reject a line handle as invalid.
fn handle_to_char(handle: u32) -> char {
	let shifted = if handle >= 0xD800 { handle + 0x800 } else { handle };
	char::from_u32(shifted).unwrap_or('\u{FFFD}')
}

fn char_to_handle(c: char) -> usize {
	let code = c as u32;
	(if code >= 0xE000 { code - 0x800 } else { code }) as usize
}

/// Maps each line of `a` and `b` to a unique code-point handle, starting the
/// handle table with a blank sentinel at index 0.
fn lines_to_chars(a: &[char], b: &[char]) -> (Vec<char>, Vec<char>, Vec<String>) {
	let mut lines: Vec<String> = vec![String::new()];
	let mut index: HashMap<String, u32> = HashMap::new();

	let mut munge = |text: &[char]| -> Vec<char> {
		let mut handles = Vec::new();
		let mut start = 0usize;
		while start < text.len() {
			let mut end = start;
			while end < text.len() && text[end] != '\n' {
				end += 1;
			}
			if end < text.len() {
				end += 1; // keep the trailing '\n' with the line
			}
			let line: String = text[start..end].iter().collect();
			let handle = *index.entry(line.clone()).or_insert_with(|| {
				lines.push(line);
				(lines.len() - 1) as u32
			});
			handles.push(handle_to_char(handle));
			start = end;
		}
		handles
	};

	let handles_a = munge(a);
	let handles_b = munge(b);
	(handles_a, handles_b, lines)
}

/// Rehydrates each edit's handle-text into the concatenation of the lines it stands for.
fn chars_to_lines(edits: &mut [Edit], lines: &[String]) {
	for edit in edits.iter_mut() {
		let mut text = String::new();
		for c in edit.text.chars() {
			text.push_str(&lines[char_to_handle(c)]);
		}
		edit.text = text;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lines_to_chars_assigns_stable_handles() {
		let a: Vec<char> = "one\ntwo\nthree\n".chars().collect();
		let b: Vec<char> = "one\nfour\nthree\n".chars().collect();
		let (ha, hb, lines) = lines_to_chars(&a, &b);
		assert_eq!(ha.len(), 3);
		assert_eq!(hb.len(), 3);
		assert_eq!(ha[0], hb[0]); // "one\n" shares a handle
		assert_eq!(ha[2], hb[2]); // "three\n" shares a handle
		assert_ne!(ha[1], hb[1]);
		assert_eq!(lines[0], "");
	}
}
