/// A position in the document, measured in characters.
///
/// Every character of block content occupies one position and every boundary
/// between two blocks occupies one position.
pub type CharIdx = usize;

/// A length or count in the document, measured in characters.
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A text range defined by anchor and head positions.
///
/// The anchor is the fixed end, and the head moves during selection extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
	/// The fixed end of the range.
	pub anchor: CharIdx,
	/// The moving end of the range (cursor position).
	pub head: CharIdx,
}

impl Range {
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	/// Creates a zero-width range (cursor) at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	/// Returns true if anchor equals head (zero-width cursor).
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// Applies a function to both anchor and head.
	pub fn map(self, mut f: impl FnMut(CharIdx) -> CharIdx) -> Self {
		Self {
			anchor: f(self.anchor),
			head: f(self.head),
		}
	}

	/// Clamps anchor and head to `[0, max_char]`.
	pub fn clamp(&self, max_char: CharIdx) -> Self {
		self.map(|pos| pos.min(max_char))
	}
}

impl Default for Range {
	fn default() -> Self {
		Self::point(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn point_is_empty() {
		assert!(Range::point(4).is_empty());
		assert!(!Range::new(4, 2).is_empty());
		assert_eq!(Range::default(), Range::point(0));
	}

	#[test]
	fn map_keeps_direction() {
		let mapped = Range::new(10, 5).map(|pos| pos * 2);
		assert_eq!((mapped.anchor, mapped.head), (20, 10));
	}

	#[test]
	fn clamp_limits_both_ends() {
		assert_eq!(Range::new(3, 40).clamp(12), Range::new(3, 12));
		assert_eq!(Range::new(40, 3).clamp(12), Range::new(12, 3));
	}
}
