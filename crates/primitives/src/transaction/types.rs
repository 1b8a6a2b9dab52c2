use crate::range::CharLen;

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a change, bias determines whether the position
/// moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// A single operation in a changeset.
///
/// Operations are the atomic units that make up a `ChangeSet`: retaining
/// existing positions, deleting positions, or inserting new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	/// Retain the next N positions from the source document.
	Retain(CharLen),
	/// Delete the next N positions from the source document.
	Delete(CharLen),
	/// Insert N new positions at the current position.
	Insert(CharLen),
}
