use super::types::{Bias, Operation};
use crate::range::{CharIdx, CharLen};

/// A sequence of operations describing how positions move across one edit.
///
/// ChangeSet represents a document change as retain, delete, and insert
/// operations over flat document positions. It carries lengths only; the
/// content itself lives in the document model. This is enough to map positions
/// and ranges from the coordinates before the change to the coordinates after it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	/// Sequence of retain/delete/insert operations.
	pub(super) changes: Vec<Operation>,
	/// Length of the source document before changes.
	pub(super) len: usize,
	/// Length of the document after applying changes.
	pub(super) len_after: usize,
}

impl ChangeSet {
	/// Creates a new empty changeset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a changeset that keeps every position of a document of `len`.
	pub fn identity(len: CharLen) -> Self {
		let mut cs = Self::new();
		cs.retain(len);
		cs
	}

	/// Creates a changeset replacing `[from, to)` with `inserted` positions.
	///
	/// # Parameters
	/// - `len`: Length of the document before the change
	/// - `from`, `to`: The replaced range
	/// - `inserted`: Number of positions the replacement occupies
	pub fn replace(len: CharLen, from: CharIdx, to: CharIdx, inserted: CharLen) -> Self {
		debug_assert!(from <= to && to <= len);
		let mut cs = Self::new();
		cs.retain(from);
		cs.insert(inserted);
		cs.delete(to - from);
		cs.retain(len - to);
		cs
	}

	/// Returns the length of the source document (before changes).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the length of the document after applying changes.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if this changeset contains no operations.
	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	/// Returns true if this changeset moves no position.
	pub fn is_identity(&self) -> bool {
		self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Returns a slice of all operations in this changeset.
	pub fn changes(&self) -> &[Operation] {
		&self.changes
	}

	/// Adds a retain operation, preserving N positions from the source.
	///
	/// Consecutive retain operations are automatically merged.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation, removing N positions from the source.
	///
	/// Consecutive delete operations are automatically merged.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation of N positions at the current position.
	///
	/// Inserts are merged with adjacent inserts and always placed before a
	/// trailing delete, so a replacement reads as insert-then-delete.
	pub(crate) fn insert(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len_after += n;

		match self.changes.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				*prev += n;
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(n));
				self.changes.push(del);
			}
			_ => {
				self.changes.push(Operation::Insert(n));
			}
		}
	}

	/// Maps a position through this changeset using the specified bias.
	///
	/// Positions inside a deleted range collapse onto the deletion point.
	///
	/// # Parameters
	/// - `pos`: The position to map
	/// - `bias`: How to handle positions at insertion boundaries
	///
	/// # Returns
	/// The mapped position in the transformed document.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.changes {
			if old_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(n) => {
					if old_pos == pos && bias == Bias::Left {
						// Position is exactly at insert point, stay before
					} else {
						new_pos += n;
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Maps a half-open range through this changeset.
	///
	/// The start moves with insertions at its position, the end stays before
	/// them, so text inserted at either edge is not absorbed into the range.
	///
	/// # Returns
	/// The mapped range, or [`None`] if the range collapsed to zero length.
	pub fn map_range(&self, from: CharIdx, to: CharIdx) -> Option<(CharIdx, CharIdx)> {
		let new_from = self.map_pos(from, Bias::Right);
		let new_to = self.map_pos(to, Bias::Left);
		(new_from < new_to).then_some((new_from, new_to))
	}
}
