//! The three edit operations and a single edit step.

/// The kind of an [`Edit`]: keep, remove, or add a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
	/// Text present in both the source and the destination.
	Equal,
	/// Text present only in the destination.
	Insert,
	/// Text present only in the source.
	Delete,
}

/// One step of an edit script: an operation plus the text it carries.
///
/// Invariant: `text` is non-empty, except transiently while [`EditList`](crate::EditList)
/// cleanup passes are running (a sentinel empty equality may exist mid-pass and is
/// always removed before the pass returns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	pub op: Op,
	pub text: String,
}

impl Edit {
	pub fn new(op: Op, text: impl Into<String>) -> Self {
		Self { op, text: text.into() }
	}

	pub fn equal(text: impl Into<String>) -> Self {
		Self::new(Op::Equal, text)
	}

	pub fn insert(text: impl Into<String>) -> Self {
		Self::new(Op::Insert, text)
	}

	pub fn delete(text: impl Into<String>) -> Self {
		Self::new(Op::Delete, text)
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	pub fn char_len(&self) -> usize {
		self.text.chars().count()
	}
}
