use super::changeset::ChangeSet;
use super::types::Bias;
use crate::range::CharIdx;

/// An ordered list of changesets, one per applied step.
///
/// Mapping a position through a `Mapping` maps it through every changeset in
/// order. Partial mappings (starting at a given step) are used to carry
/// positions recorded mid-transaction to the final document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Mapping {
	maps: Vec<ChangeSet>,
}

impl Mapping {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the changesets in application order.
	pub fn maps(&self) -> &[ChangeSet] {
		&self.maps
	}

	/// Returns the number of changesets.
	pub fn len(&self) -> usize {
		self.maps.len()
	}

	/// Returns true if no changeset has been recorded.
	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}

	/// Appends a changeset.
	pub fn push(&mut self, map: ChangeSet) {
		self.maps.push(map);
	}

	/// Maps a position through all changesets.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		self.map_pos_from(0, pos, bias)
	}

	/// Maps a position through the changesets starting at index `start`.
	pub fn map_pos_from(&self, start: usize, pos: CharIdx, bias: Bias) -> CharIdx {
		self.maps
			.iter()
			.skip(start)
			.fold(pos, |pos, map| map.map_pos(pos, bias))
	}

	/// Maps a half-open range through all changesets.
	///
	/// # Returns
	/// The mapped range, or [`None`] once it collapses to zero length.
	pub fn map_range(&self, from: CharIdx, to: CharIdx) -> Option<(CharIdx, CharIdx)> {
		self.map_range_from(0, from, to)
	}

	/// Maps a half-open range through the changesets starting at index `start`.
	pub fn map_range_from(
		&self,
		start: usize,
		from: CharIdx,
		to: CharIdx,
	) -> Option<(CharIdx, CharIdx)> {
		if from >= to {
			return None;
		}
		self.maps
			.iter()
			.skip(start)
			.try_fold((from, to), |(from, to), map| map.map_range(from, to))
	}

	/// Maps a closed span outward: the start stays before insertions and the
	/// end moves after them, and empty results are kept.
	///
	/// Used for neighborhoods that must keep covering an edited region.
	pub fn map_span(&self, from: CharIdx, to: CharIdx) -> (CharIdx, CharIdx) {
		let from = self.map_pos(from, Bias::Left);
		let to = self.map_pos(to, Bias::Right);
		(from, to.max(from))
	}

	/// Returns true if no changeset moves any position.
	pub fn is_identity(&self) -> bool {
		self.maps.iter().all(ChangeSet::is_identity)
	}
}
