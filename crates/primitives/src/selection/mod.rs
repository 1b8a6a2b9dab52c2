use crate::range::{CharIdx, CharLen, Range};
use crate::transaction::{Bias, ChangeSet};

#[cfg(test)]
mod tests;

/// The user's selection in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
	/// A text cursor or range.
	Text(Range),
	/// A whole block, addressed by a position inside its content.
	Node { pos: CharIdx },
}

impl Default for Selection {
	fn default() -> Self {
		Self::point(0)
	}
}

impl Selection {
	/// Creates a text selection.
	pub fn single(anchor: CharIdx, head: CharIdx) -> Self {
		Selection::Text(Range::new(anchor, head))
	}

	/// Creates a point selection (zero-width cursor).
	pub fn point(pos: CharIdx) -> Self {
		Self::single(pos, pos)
	}

	/// Creates a selection of the block holding `pos`.
	pub fn node(pos: CharIdx) -> Self {
		Selection::Node { pos }
	}

	pub fn is_node(&self) -> bool {
		matches!(self, Selection::Node { .. })
	}

	pub fn anchor(&self) -> CharIdx {
		match self {
			Selection::Text(range) => range.anchor,
			Selection::Node { pos } => *pos,
		}
	}

	pub fn head(&self) -> CharIdx {
		match self {
			Selection::Text(range) => range.head,
			Selection::Node { pos } => *pos,
		}
	}

	/// Maps the selection through a changeset.
	///
	/// Both ends of a text selection move past text inserted at their
	/// position, so a cursor follows typed text.
	pub fn map(&self, changes: &ChangeSet) -> Self {
		match self {
			Selection::Text(range) => {
				Selection::Text(range.map(|pos| changes.map_pos(pos, Bias::Right)))
			}
			Selection::Node { pos } => Selection::Node {
				pos: changes.map_pos(*pos, Bias::Left),
			},
		}
	}

	/// Clamps every position to `len`.
	pub fn clamp(&self, len: CharLen) -> Self {
		match self {
			Selection::Text(range) => Selection::Text(range.clamp(len)),
			Selection::Node { pos } => Selection::Node {
				pos: (*pos).min(len),
			},
		}
	}
}
