//! Errors raised while applying steps to a document.

use thiserror::Error;

use crate::range::{CharIdx, CharLen};

/// Errors that can occur when a step is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
	/// A position lies past the end of the document.
	#[error("position {pos} out of range for document of length {len}")]
	OutOfRange {
		/// The offending position.
		pos: CharIdx,
		/// Length of the document the step was applied to.
		len: CharLen,
	},

	/// A range ends before it starts.
	#[error("invalid range {from}..{to}")]
	InvalidRange {
		/// Start of the range.
		from: CharIdx,
		/// End of the range.
		to: CharIdx,
	},
}

/// Result type for step application.
pub type Result<T> = std::result::Result<T, StepError>;
