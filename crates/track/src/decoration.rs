//! Highlight decorations and their incremental mapping.

use std::fmt;
use std::ptr;

use redline_primitives::{Bias, CharIdx, Mapping};

/// Opaque identity of a decoration's origin.
///
/// Specs are compared by address: two decorations come from the same source
/// exactly when they point at the same static spec.
pub struct DecorationSpec {
	name: &'static str,
}

impl DecorationSpec {
	pub const fn new(name: &'static str) -> Self {
		Self { name }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl fmt::Debug for DecorationSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("DecorationSpec").field(&self.name).finish()
	}
}

pub static SELECTED_INSERTION_SPEC: DecorationSpec = DecorationSpec::new("selected-insertion");
pub static SELECTED_DELETION_SPEC: DecorationSpec = DecorationSpec::new("selected-deletion");
pub static SELECTED_FORMAT_CHANGE_SPEC: DecorationSpec =
	DecorationSpec::new("selected-format_change");
pub static SELECTED_BLOCK_CHANGE_SPEC: DecorationSpec = DecorationSpec::new("selected-block_change");

/// Whether a decoration styles inline content or a whole block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
	Inline,
	Node,
}

/// A styled document range.
#[derive(Debug, Clone, Copy)]
pub struct Decoration {
	pub from: CharIdx,
	pub to: CharIdx,
	pub kind: DecorationKind,
	/// CSS class applied by the renderer.
	pub class: &'static str,
	pub spec: &'static DecorationSpec,
}

impl Decoration {
	pub fn inline(
		from: CharIdx,
		to: CharIdx,
		class: &'static str,
		spec: &'static DecorationSpec,
	) -> Self {
		Self {
			from,
			to,
			kind: DecorationKind::Inline,
			class,
			spec,
		}
	}

	pub fn node(from: CharIdx, to: CharIdx, class: &'static str, spec: &'static DecorationSpec) -> Self {
		Self {
			kind: DecorationKind::Node,
			..Self::inline(from, to, class, spec)
		}
	}

	pub fn has_spec(&self, spec: &DecorationSpec) -> bool {
		ptr::eq(self.spec, spec)
	}

	/// Maps the decoration through `mapping`.
	///
	/// The start stays after and the end before text inserted at them. Inline
	/// decorations that collapse are dropped, as are node decorations whose
	/// block content vanished.
	fn map(&self, mapping: &Mapping) -> Option<Self> {
		let from = mapping.map_pos(self.from, Bias::Right);
		let to = mapping.map_pos(self.to, Bias::Left);
		let keep = match self.kind {
			DecorationKind::Inline => from < to,
			DecorationKind::Node => from < to || (from == to && self.from == self.to),
		};
		keep.then_some(Self { from, to, ..*self })
	}
}

impl PartialEq for Decoration {
	fn eq(&self, other: &Self) -> bool {
		self.from == other.from
			&& self.to == other.to
			&& self.kind == other.kind
			&& self.class == other.class
			&& ptr::eq(self.spec, other.spec)
	}
}

impl Eq for Decoration {}

/// An ordered set of decorations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
	decos: Vec<Decoration>,
}

impl DecorationSet {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn new(mut decos: Vec<Decoration>) -> Self {
		decos.sort_by_key(|deco| (deco.from, deco.to));
		Self { decos }
	}

	pub fn len(&self) -> usize {
		self.decos.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decos.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
		self.decos.iter()
	}

	/// Returns the decoration created from `spec`.
	pub fn find(&self, spec: &DecorationSpec) -> Option<&Decoration> {
		self.decos.iter().find(|deco| deco.has_spec(spec))
	}

	/// Returns the set after the document changes described by `mapping`.
	pub fn map(&self, mapping: &Mapping) -> Self {
		if mapping.is_identity() {
			return self.clone();
		}
		Self::new(self.decos.iter().filter_map(|deco| deco.map(mapping)).collect())
	}
}

#[cfg(test)]
mod tests {
	use redline_primitives::ChangeSet;

	use super::*;

	fn mapping(len: usize, from: usize, to: usize, inserted: usize) -> Mapping {
		let mut mapping = Mapping::new();
		mapping.push(ChangeSet::replace(len, from, to, inserted));
		mapping
	}

	#[test]
	fn specs_compare_by_identity() {
		static OTHER: DecorationSpec = DecorationSpec::new("selected-insertion");
		let deco = Decoration::inline(0, 2, "selected-insertion", &SELECTED_INSERTION_SPEC);
		assert!(deco.has_spec(&SELECTED_INSERTION_SPEC));
		assert!(!deco.has_spec(&OTHER));
		assert_ne!(deco, Decoration::inline(0, 2, "selected-insertion", &OTHER));
	}

	#[test]
	fn map_excludes_edge_insertions() {
		let set = DecorationSet::new(vec![Decoration::inline(
			3,
			6,
			"selected-insertion",
			&SELECTED_INSERTION_SPEC,
		)]);
		let at_start = set.map(&mapping(10, 3, 3, 2));
		assert_eq!(at_start.iter().next().map(|d| (d.from, d.to)), Some((5, 8)));
		let at_end = set.map(&mapping(10, 6, 6, 2));
		assert_eq!(at_end.iter().next().map(|d| (d.from, d.to)), Some((3, 6)));
		let inside = set.map(&mapping(10, 4, 4, 2));
		assert_eq!(inside.iter().next().map(|d| (d.from, d.to)), Some((3, 8)));
	}

	#[test]
	fn map_drops_collapsed_inline() {
		let set = DecorationSet::new(vec![Decoration::inline(
			3,
			6,
			"selected-deletion",
			&SELECTED_DELETION_SPEC,
		)]);
		assert!(set.map(&mapping(10, 2, 7, 0)).is_empty());
	}

	#[test]
	fn node_decoration_of_empty_block_survives() {
		let set = DecorationSet::new(vec![Decoration::node(
			4,
			4,
			"selected-insertion",
			&SELECTED_INSERTION_SPEC,
		)]);
		let mapped = set.map(&mapping(10, 0, 0, 3));
		assert_eq!(mapped.find(&SELECTED_INSERTION_SPEC).map(|d| (d.from, d.to)), Some((7, 7)));
	}
}
