//! The four cleanup passes that turn a raw edit list into canonical form
//! (spec §4.2.3). Each pass mutates a working `Vec<Edit>` in place using
//! index-based splicing rather than a linked-list cursor (DESIGN.md).

use crate::op::{Edit, Op};
use crate::text_util;

fn chars(s: &str) -> Vec<char> {
	s.chars().collect()
}

fn common_prefix_len(a: &str, b: &str) -> usize {
	text_util::common_prefix(&chars(a), &chars(b))
}

fn common_suffix_len(a: &str, b: &str) -> usize {
	text_util::common_suffix(&chars(a), &chars(b))
}

fn common_overlap_len(a: &str, b: &str) -> usize {
	text_util::common_overlap(&chars(a), &chars(b))
}

/// Splits `s` at char index `n` into `(s[..n], s[n..])`.
fn split_at_char(s: &str, n: usize) -> (String, String) {
	let cs = chars(s);
	(cs[..n].iter().collect(), cs[n..].iter().collect())
}

fn char_len(s: &str) -> usize {
	s.chars().count()
}

/// Merges adjacent edits of the same op, factors common affixes out of
/// adjacent delete/insert runs, and shifts single edits across equalities
/// when that eliminates an equality entirely.
pub fn cleanup_merge(edits: &mut Vec<Edit>) {
	edits.push(Edit::equal(""));

	let mut pointer = 0usize;
	let mut count_delete = 0usize;
	let mut count_insert = 0usize;
	let mut text_delete = String::new();
	let mut text_insert = String::new();

	while pointer < edits.len() {
		match edits[pointer].op {
			Op::Insert => {
				count_insert += 1;
				text_insert.push_str(&edits[pointer].text);
				pointer += 1;
			}
			Op::Delete => {
				count_delete += 1;
				text_delete.push_str(&edits[pointer].text);
				pointer += 1;
			}
			Op::Equal => {
				if count_delete + count_insert > 1 {
					let start = pointer - count_delete - count_insert;

					if count_delete != 0 && count_insert != 0 {
						let common_len = common_prefix_len(&text_insert, &text_delete);
						if common_len != 0 {
							let (prefix, insert_rest) = split_at_char(&text_insert, common_len);
							let (_, delete_rest) = split_at_char(&text_delete, common_len);
							if start > 0 && edits[start - 1].op == Op::Equal {
								edits[start - 1].text.push_str(&prefix);
							} else {
								edits.insert(0, Edit::equal(prefix));
								pointer += 1;
							}
							text_insert = insert_rest;
							text_delete = delete_rest;
						}

						let common_len = common_suffix_len(&text_insert, &text_delete);
						if common_len != 0 {
							let (insert_rest, suffix) = split_at_char(&text_insert, char_len(&text_insert) - common_len);
							let (delete_rest, _) = split_at_char(&text_delete, char_len(&text_delete) - common_len);
							edits[pointer].text = format!("{suffix}{}", edits[pointer].text);
							text_insert = insert_rest;
							text_delete = delete_rest;
						}
					}

					let start = pointer - count_delete - count_insert;
					let mut new_ops = Vec::with_capacity(2);
					if !text_delete.is_empty() {
						new_ops.push(Edit::delete(std::mem::take(&mut text_delete)));
					}
					if !text_insert.is_empty() {
						new_ops.push(Edit::insert(std::mem::take(&mut text_insert)));
					}
					let new_len = new_ops.len();
					edits.splice(start..pointer, new_ops);
					pointer = start + new_len + 1;
				} else if pointer != 0 && edits[pointer - 1].op == Op::Equal {
					let moved = edits[pointer].text.clone();
					edits[pointer - 1].text.push_str(&moved);
					edits.remove(pointer);
				} else {
					pointer += 1;
				}

				count_insert = 0;
				count_delete = 0;
				text_delete.clear();
				text_insert.clear();
			}
		}
	}

	if edits.last().map(|e| e.text.is_empty()).unwrap_or(false) {
		edits.pop();
	}

	// Second pass: shift an edit sandwiched between two equalities sideways
	// when it wholly absorbs one of them.
	let mut changes = false;
	let mut pointer = 1isize;
	while pointer < edits.len() as isize - 1 {
		let p = pointer as usize;
		if edits[p - 1].op == Op::Equal && edits[p + 1].op == Op::Equal {
			let prev_text = edits[p - 1].text.clone();
			let next_text = edits[p + 1].text.clone();
			if edits[p].text.ends_with(&prev_text) {
				let keep_len = char_len(&edits[p].text) - char_len(&prev_text);
				let (kept, _) = split_at_char(&edits[p].text, keep_len);
				edits[p].text = format!("{prev_text}{kept}");
				edits[p + 1].text = format!("{prev_text}{next_text}");
				edits.remove(p - 1);
				changes = true;
			} else if edits[p].text.starts_with(&next_text) {
				edits[p - 1].text.push_str(&next_text);
				let skip_len = char_len(&next_text);
				let (_, rest) = split_at_char(&edits[p].text, skip_len);
				edits[p].text = format!("{rest}{next_text}");
				edits.remove(p + 1);
				changes = true;
			}
		}
		pointer += 1;
	}

	if changes {
		cleanup_merge(edits);
	}
}

/// Eliminates equalities that separate edits when the equality is no longer
/// than the insertions/deletions surrounding it, then splits overlapping
/// adjacent delete/insert pairs out into an explicit equality.
pub fn cleanup_semantic(edits: &mut Vec<Edit>) {
	let mut changes = false;
	let mut equalities: Vec<usize> = Vec::new();
	let mut last_equality: Option<String> = None;
	let mut pointer: isize = 0;

	let mut len_ins1 = 0usize;
	let mut len_del1 = 0usize;
	let mut len_ins2 = 0usize;
	let mut len_del2 = 0usize;

	while pointer >= 0 && (pointer as usize) < edits.len() {
		let p = pointer as usize;
		if edits[p].op == Op::Equal {
			equalities.push(p);
			len_ins1 = len_ins2;
			len_del1 = len_del2;
			len_ins2 = 0;
			len_del2 = 0;
			last_equality = Some(edits[p].text.clone());
		} else {
			if edits[p].op == Op::Insert {
				len_ins2 += char_len(&edits[p].text);
			} else {
				len_del2 += char_len(&edits[p].text);
			}

			let eliminate = match &last_equality {
				Some(eq) => {
					let n = char_len(eq);
					n <= len_ins1.max(len_del1) && n <= len_ins2.max(len_del2)
				}
				None => false,
			};

			if eliminate {
				let eq_idx = *equalities.last().unwrap();
				let eq_text = last_equality.clone().unwrap();
				edits.insert(eq_idx, Edit::delete(eq_text));
				edits[eq_idx + 1].op = Op::Insert;

				equalities.pop();
				if !equalities.is_empty() {
					equalities.pop();
				}
				pointer = equalities.last().map(|&i| i as isize).unwrap_or(-1);

				len_ins1 = 0;
				len_del1 = 0;
				len_ins2 = 0;
				len_del2 = 0;
				last_equality = None;
				changes = true;
			}
		}
		pointer += 1;
	}

	if changes {
		cleanup_merge(edits);
	}

	cleanup_semantic_lossless(edits);

	// Find overlaps between adjacent delete/insert pairs.
	let mut pointer = 1usize;
	while pointer < edits.len() {
		if edits[pointer - 1].op == Op::Delete && edits[pointer].op == Op::Insert {
			let deletion = edits[pointer - 1].text.clone();
			let insertion = edits[pointer].text.clone();
			let overlap1 = common_overlap_len(&deletion, &insertion);
			let overlap2 = common_overlap_len(&insertion, &deletion);

			if overlap1 >= overlap2 {
				if overlap1 as f64 >= char_len(&deletion) as f64 / 2.0 || overlap1 as f64 >= char_len(&insertion) as f64 / 2.0 {
					let (ins_prefix, ins_rest) = split_at_char(&insertion, overlap1);
					let (del_rest, _) = split_at_char(&deletion, char_len(&deletion) - overlap1);
					edits.insert(pointer, Edit::equal(ins_prefix));
					edits[pointer - 1].text = del_rest;
					edits[pointer + 1].text = ins_rest;
					pointer += 1;
				}
			} else if overlap2 as f64 >= char_len(&deletion) as f64 / 2.0 || overlap2 as f64 >= char_len(&insertion) as f64 / 2.0 {
				let (del_prefix, del_rest) = split_at_char(&deletion, overlap2);
				let (ins_rest, _) = split_at_char(&insertion, char_len(&insertion) - overlap2);
				edits.insert(pointer, Edit::equal(del_prefix));
				edits[pointer - 1].text = ins_rest;
				edits[pointer].text = del_rest;
				pointer += 1;
			}
			pointer += 1;
		}
		pointer += 1;
	}
}

/// Boundary score used by [`cleanup_semantic_lossless`]: higher is a better
/// place to put an edit boundary.
fn boundary_score(one: &str, two: &str) -> u8 {
	let one_chars = chars(one);
	let two_chars = chars(two);
	let char1 = one_chars.last().copied();
	let char2 = two_chars.first().copied();

	if char1.is_none() || char2.is_none() {
		return 6; // Edge of the text.
	}
	let char1 = char1.unwrap();
	let char2 = char2.unwrap();

	let non_alnum1 = !char1.is_alphanumeric();
	let non_alnum2 = !char2.is_alphanumeric();
	let whitespace1 = non_alnum1 && char1.is_whitespace();
	let whitespace2 = non_alnum2 && char2.is_whitespace();
	let linebreak1 = whitespace1 && (char1 == '\n' || char1 == '\r');
	let linebreak2 = whitespace2 && (char2 == '\n' || char2 == '\r');
	let blankline1 = linebreak1 && ends_with_blank_line(&one_chars);
	let blankline2 = linebreak2 && starts_with_blank_line(&two_chars);

	if blankline1 || blankline2 {
		5
	} else if linebreak1 || linebreak2 {
		4
	} else if non_alnum1 && !whitespace1 && whitespace2 {
		3
	} else if whitespace1 || whitespace2 {
		2
	} else if non_alnum1 || non_alnum2 {
		1
	} else {
		0
	}
}

fn ends_with_blank_line(s: &[char]) -> bool {
	let as_str: String = s.iter().collect();
	as_str.ends_with("\n\n") || as_str.ends_with("\n\r\n") || as_str.ends_with("\r\n\r\n") || as_str.ends_with("\r\n\n")
}

fn starts_with_blank_line(s: &[char]) -> bool {
	let as_str: String = s.iter().collect();
	as_str.starts_with("\n\n")
		|| as_str.starts_with("\r\n\n")
		|| as_str.starts_with("\n\r\n")
		|| as_str.starts_with("\r\n\r\n")
}

/// For each `Equal, X, Equal` triple, shifts `X` by whole characters to land
/// the boundary where `boundary_score` is highest. The shift direction walks
/// characters off the front of `X` (and of the trailing equality) onto the
/// back of the leading equality, one at a time.
pub fn cleanup_semantic_lossless(edits: &mut Vec<Edit>) {
	let mut pointer = 1usize;
	while pointer + 1 < edits.len() {
		if edits[pointer - 1].op == Op::Equal && edits[pointer + 1].op == Op::Equal {
			let mut equality1 = chars(&edits[pointer - 1].text);
			let mut edit_text = chars(&edits[pointer].text);
			let mut equality2 = chars(&edits[pointer + 1].text);

			// Pre-shift: factor the common suffix of equality1/edit_text into
			// the front of edit_text and equality2, so the scan below starts
			// from the tightest-possible placement.
			let common_len = text_util::common_suffix(&equality1, &edit_text);
			if common_len != 0 {
				let common: Vec<char> = equality1[equality1.len() - common_len..].to_vec();
				equality1.truncate(equality1.len() - common_len);
				let mut new_edit = common.clone();
				new_edit.extend_from_slice(&edit_text[..edit_text.len() - common_len]);
				edit_text = new_edit;
				let mut new_eq2 = common;
				new_eq2.extend_from_slice(&equality2);
				equality2 = new_eq2;
			}

			let score_of = |a: &[char], b: &[char]| -> u8 {
				let a_s: String = a.iter().collect();
				let b_s: String = b.iter().collect();
				boundary_score(&a_s, &b_s)
			};

			let mut best_equality1 = equality1.clone();
			let mut best_edit = edit_text.clone();
			let mut best_equality2 = equality2.clone();
			let mut best_score = score_of(&equality1, &edit_text) + score_of(&edit_text, &equality2);

			while !edit_text.is_empty() && !equality2.is_empty() && edit_text[0] == equality2[0] {
				equality1.push(edit_text[0]);
				edit_text.remove(0);
				edit_text.push(equality2[0]);
				equality2.remove(0);

				let score = score_of(&equality1, &edit_text) + score_of(&edit_text, &equality2);
				if score >= best_score {
					best_score = score;
					best_equality1 = equality1.clone();
					best_edit = edit_text.clone();
					best_equality2 = equality2.clone();
				}
			}

			if best_equality1 != chars(&edits[pointer - 1].text) {
				if !best_equality1.is_empty() {
					edits[pointer - 1].text = best_equality1.iter().collect();
				} else {
					edits.remove(pointer - 1);
					pointer -= 1;
				}
				edits[pointer].text = best_edit.iter().collect();
				if !best_equality2.is_empty() {
					edits[pointer + 1].text = best_equality2.iter().collect();
				} else {
					edits.remove(pointer + 1);
				}
			}
		}
		pointer += 1;
	}
}

/// Eliminates short equalities that are expensive relative to the
/// surrounding edits, parameterized by `edit_cost`.
pub fn cleanup_efficiency(edits: &mut Vec<Edit>, edit_cost: u16) {
	let edit_cost = edit_cost as i64;
	let mut changes = false;
	let mut equalities: Vec<usize> = Vec::new();
	let mut last_equality: Option<String> = None;
	let mut pointer: isize = 0;

	let mut pre_ins = false;
	let mut pre_del = false;
	let mut post_ins = false;
	let mut post_del = false;

	while pointer >= 0 && (pointer as usize) < edits.len() {
		let p = pointer as usize;
		if edits[p].op == Op::Equal {
			if char_len(&edits[p].text) < edit_cost as usize && (post_ins || post_del) {
				equalities.push(p);
				pre_ins = post_ins;
				pre_del = post_del;
				last_equality = Some(edits[p].text.clone());
			} else {
				equalities.clear();
				last_equality = None;
			}
			post_ins = false;
			post_del = false;
		} else {
			if edits[p].op == Op::Delete {
				post_del = true;
			} else {
				post_ins = true;
			}

			let eliminate = last_equality.is_some()
				&& ((pre_ins && pre_del && post_ins && post_del)
					|| (char_len(last_equality.as_deref().unwrap_or("")) < edit_cost as usize / 2
						&& [pre_ins, pre_del, post_ins, post_del].iter().filter(|b| **b).count() == 3));

			if eliminate {
				let eq_idx = *equalities.last().unwrap();
				let eq_text = last_equality.clone().unwrap();
				edits.insert(eq_idx, Edit::delete(eq_text));
				edits[eq_idx + 1].op = Op::Insert;

				equalities.pop();
				last_equality = None;

				if pre_ins && pre_del {
					post_ins = true;
					post_del = true;
					equalities.clear();
				} else {
					if !equalities.is_empty() {
						equalities.pop();
					}
					pointer = equalities.last().map(|&i| i as isize).unwrap_or(-1);
					post_ins = false;
					post_del = false;
				}
				changes = true;
			}
		}
		pointer += 1;
	}

	if changes {
		cleanup_merge(edits);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_factors_common_affixes() {
		let mut edits = vec![Edit::equal("a"), Edit::delete("bab"), Edit::insert("baba"), Edit::equal("c")];
		cleanup_merge(&mut edits);
		assert_eq!(edits, vec![Edit::equal("aba"), Edit::delete("b"), Edit::insert("ba"), Edit::equal("bac")]);
	}

	#[test]
	fn merge_drops_empty_edits() {
		let mut edits = vec![Edit::equal("a"), Edit::delete(""), Edit::insert("b"), Edit::equal("c")];
		cleanup_merge(&mut edits);
		assert_eq!(edits, vec![Edit::equal("a"), Edit::insert("b"), Edit::equal("c")]);
	}

	#[test]
	fn semantic_eliminates_small_equality() {
		let mut edits = vec![
			Edit::delete("ab"),
			Edit::equal("cd"),
			Edit::delete("e"),
			Edit::equal("f"),
			Edit::insert("g"),
		];
		cleanup_semantic(&mut edits);
		assert_eq!(edits, vec![Edit::delete("abcdef"), Edit::insert("cdfg")]);
	}

	#[test]
	fn semantic_is_noop_on_already_clean_list() {
		let mut edits = vec![Edit::equal("The "), Edit::delete("cat"), Edit::insert("dog"), Edit::equal(" in the hat.")];
		let before = edits.clone();
		cleanup_semantic(&mut edits);
		assert_eq!(edits, before);
	}
}
