//! Core types for tracked rich-text editing: documents, ranges, selections,
//! steps and transactions.

/// Rich-text document model: blocks, runs, marks and slices.
pub mod doc;
/// Step application errors.
pub mod error;
/// Text range types over flat document positions.
pub mod range;
/// Text and block selections.
pub mod selection;
/// Document plus selection.
pub mod state;
/// Steps, transactions and position mapping.
pub mod transaction;

pub use doc::{
	Block, BlockKind, BlockTrack, BlockTrackKind, DeletionMark, Doc, FormatChangeMark, FormatMark,
	Formats, InsertionMark, Mark, MarkKind, Marks, Run, RunSpan, Slice, TrackAttrs, TrackKind,
	TrackMark, UserId,
};
pub use error::StepError;
pub use range::{CharIdx, CharLen, Range};
pub use selection::Selection;
pub use state::DocState;
pub use transaction::{
	AppliedStep, Bias, ChangeSet, Mapping, Meta, MetaKey, Step, StepResult, Transaction,
};
