use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From, PartialEq, Eq, Clone)]
#[display("{self:?}")]
pub enum Error {
	#[display("{_0}")]
	#[from(String, &String, &str)]
	Custom(String),

	// -- Construction
	#[display("invalid argument: {reason}")]
	InvalidArgument { reason: String },

	// -- Delta parsing (§6 delta format)
	#[display("invalid delta: {reason}")]
	DeltaParse { reason: String },
	#[display("delta cursor mismatch: expected {expected} source chars consumed, got {actual}")]
	DeltaCursorMismatch { expected: usize, actual: usize },

	// -- Patch text parsing (§6 patch text format)
	#[display("invalid patch text: {reason}")]
	PatchParse { reason: String },

	// -- Environment
	// Unreachable on today's Rust (`str` is always UTF-8), kept as a named
	// variant so the error contract stays total across language bindings.
	#[display("environment does not provide UTF-8 text")]
	Utf8Environment,
}

// region:    --- Custom

impl Error {
	pub fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	pub fn delta_parse(reason: impl Into<String>) -> Self {
		Self::DeltaParse { reason: reason.into() }
	}

	pub fn delta_cursor_mismatch(expected: usize, actual: usize) -> Self {
		Self::DeltaCursorMismatch { expected, actual }
	}

	pub fn patch_parse(reason: impl Into<String>) -> Self {
		Self::PatchParse { reason: reason.into() }
	}
}

// endregion: --- Custom

// region:    --- Error Boilerplate

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
