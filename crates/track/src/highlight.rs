//! Finds the tracked changes under the user's selection.

use redline_primitives::{
	BlockTrack, BlockTrackKind, CharIdx, Doc, RunSpan, Selection, TrackKind, TrackMark,
};

/// What a selected change is recorded on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeTarget {
	/// An inline attribution mark.
	Inline(TrackMark),
	/// An entry of a block's `track` attribute.
	Block(BlockTrack),
}

/// A tracked change intersecting the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedChange {
	pub from: CharIdx,
	pub to: CharIdx,
	/// Highlight category. Block changes count as format changes.
	pub kind: TrackKind,
	pub target: ChangeTarget,
}

/// At most one selected change per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedChanges {
	pub insertion: Option<SelectedChange>,
	pub deletion: Option<SelectedChange>,
	pub format_change: Option<SelectedChange>,
}

impl SelectedChanges {
	pub fn get(&self, kind: TrackKind) -> Option<&SelectedChange> {
		match kind {
			TrackKind::Insertion => self.insertion.as_ref(),
			TrackKind::Deletion => self.deletion.as_ref(),
			TrackKind::FormatChange => self.format_change.as_ref(),
		}
	}

	fn slot(&mut self, kind: TrackKind) -> &mut Option<SelectedChange> {
		match kind {
			TrackKind::Insertion => &mut self.insertion,
			TrackKind::Deletion => &mut self.deletion,
			TrackKind::FormatChange => &mut self.format_change,
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &SelectedChange> {
		[&self.insertion, &self.deletion, &self.format_change]
			.into_iter()
			.flatten()
	}

	pub fn is_empty(&self) -> bool {
		self.iter().next().is_none()
	}
}

/// Returns the tracked changes the selection points at.
///
/// A cursor looks at the character after it and, for categories that
/// character lacks, the character before it. A range looks only at the
/// character on the anchor side. The change found extends over neighbouring
/// runs of the same block carrying an equal mark. A block selection reports
/// the block's own track entries over its content range.
pub fn find_selected_changes(doc: &Doc, selection: Selection) -> SelectedChanges {
	match selection {
		Selection::Node { pos } => block_changes(doc, pos),
		Selection::Text(range) => {
			let anchor = range.anchor;
			let candidates: Vec<RunSpan<'_>> = if range.is_empty() {
				doc.run_after(anchor).into_iter().chain(doc.run_before(anchor)).collect()
			} else if range.anchor < range.head {
				doc.run_after(anchor).into_iter().collect()
			} else {
				doc.run_before(anchor).into_iter().collect()
			};

			let mut out = SelectedChanges::default();
			for kind in TrackKind::ALL {
				let found = candidates
					.iter()
					.find_map(|span| span.marks().get(kind).map(|mark| (span, mark)));
				if let Some((span, mark)) = found {
					let (from, to) = extent(doc, span, mark);
					*out.slot(kind) = Some(SelectedChange {
						from,
						to,
						kind,
						target: ChangeTarget::Inline(mark.clone()),
					});
				}
			}
			out
		}
	}
}

/// Returns the range covered by `mark` around `span`.
fn extent(doc: &Doc, span: &RunSpan<'_>, mark: &TrackMark) -> (CharIdx, CharIdx) {
	let runs = doc.block_runs(span.block);
	let Some(idx) = runs.iter().position(|run| run.from == span.from) else {
		return (span.from, span.to);
	};
	let carries = |run: &RunSpan<'_>| run.marks().get(mark.kind()) == Some(mark);

	let first = runs[..idx]
		.iter()
		.rposition(|run| !carries(run))
		.map_or(0, |pos| pos + 1);
	let last = runs[idx..]
		.iter()
		.position(|run| !carries(run))
		.map_or(runs.len(), |pos| idx + pos);
	(runs[first].from, runs[last - 1].to)
}

fn block_changes(doc: &Doc, pos: CharIdx) -> SelectedChanges {
	let mut out = SelectedChanges::default();
	let Some(idx) = doc.block_index_at(pos) else {
		return out;
	};
	let (Some(block), Some((from, to))) = (doc.block(idx), doc.block_range(idx)) else {
		return out;
	};
	for entry in &block.track {
		let kind = match entry.kind {
			BlockTrackKind::Insertion => TrackKind::Insertion,
			BlockTrackKind::Deletion => TrackKind::Deletion,
			BlockTrackKind::BlockChange => TrackKind::FormatChange,
		};
		out.slot(kind).get_or_insert_with(|| SelectedChange {
			from,
			to,
			kind,
			target: ChangeTarget::Block(entry.clone()),
		});
	}
	out
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};
	use redline_primitives::{Block, BlockKind, FormatMark, Marks, Run, TrackAttrs, UserId};

	use super::*;

	fn attrs(user: u32) -> TrackAttrs {
		TrackAttrs::new(UserId(user), Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
	}

	fn ins(user: u32) -> Marks {
		Marks::new().with(TrackMark::insertion(attrs(user)))
	}

	/// "Hello" by user 1 with an "X" by user 2 typed after "Hel".
	fn hel_x_lo() -> Doc {
		Doc::new(vec![Block::new(BlockKind::Paragraph).with_content(vec![
			Run::new("Hel", ins(1)),
			Run::new("X", ins(2)),
			Run::new("lo", ins(1)),
		])])
	}

	fn span(change: Option<&SelectedChange>) -> Option<(CharIdx, CharIdx, UserId)> {
		change.map(|c| {
			let user = match &c.target {
				ChangeTarget::Inline(mark) => mark.user(),
				ChangeTarget::Block(entry) => entry.user(),
			};
			(c.from, c.to, user)
		})
	}

	#[test]
	fn selecting_inserted_character_finds_only_it() {
		let changes = find_selected_changes(&hel_x_lo(), Selection::single(3, 4));
		assert_eq!(span(changes.insertion.as_ref()), Some((3, 4, UserId(2))));
		assert!(changes.deletion.is_none());
		assert!(changes.format_change.is_none());
	}

	#[test]
	fn backward_range_uses_character_before_anchor() {
		let changes = find_selected_changes(&hel_x_lo(), Selection::single(4, 3));
		assert_eq!(span(changes.insertion.as_ref()), Some((3, 4, UserId(2))));
		let changes = find_selected_changes(&hel_x_lo(), Selection::single(3, 0));
		assert_eq!(span(changes.insertion.as_ref()), Some((0, 3, UserId(1))));
	}

	#[test]
	fn cursor_prefers_run_after_it() {
		let changes = find_selected_changes(&hel_x_lo(), Selection::point(3));
		assert_eq!(span(changes.insertion.as_ref()), Some((3, 4, UserId(2))));
		let changes = find_selected_changes(&hel_x_lo(), Selection::point(5));
		assert_eq!(span(changes.insertion.as_ref()), Some((4, 6, UserId(1))));
	}

	#[test]
	fn cursor_falls_back_to_run_before_per_category() {
		let doc = Doc::new(vec![Block::new(BlockKind::Paragraph).with_content(vec![
			Run::new("ab", Marks::new().with(TrackMark::deletion(attrs(1)))),
			Run::new("cd", ins(2)),
		])]);
		let changes = find_selected_changes(&doc, Selection::point(2));
		assert_eq!(span(changes.insertion.as_ref()), Some((2, 4, UserId(2))));
		assert_eq!(span(changes.deletion.as_ref()), Some((0, 2, UserId(1))));
	}

	#[test]
	fn change_extends_over_runs_with_equal_mark() {
		let doc = Doc::new(vec![Block::new(BlockKind::Paragraph).with_content(vec![
			Run::new("plain ", Marks::new()),
			Run::new("ab", ins(1)),
			Run::new("cd", ins(1).with(FormatMark::Strong)),
			Run::new("ef", ins(1)),
			Run::new("gh", ins(2)),
		])]);
		let changes = find_selected_changes(&doc, Selection::point(9));
		assert_eq!(span(changes.insertion.as_ref()), Some((6, 12, UserId(1))));
	}

	#[test]
	fn nothing_selected_on_plain_text() {
		let changes = find_selected_changes(&Doc::from_text("plain"), Selection::single(1, 3));
		assert!(changes.is_empty());
	}

	#[test]
	fn block_selection_reports_track_entries() {
		let doc = Doc::new(vec![
			Block::paragraph("first"),
			Block::new(BlockKind::Heading { level: 1 })
				.with_content(vec![Run::plain("title")])
				.with_track(vec![
					BlockTrack::insertion(attrs(2)),
					BlockTrack::block_change(attrs(3), BlockKind::Paragraph),
				]),
		]);
		let changes = find_selected_changes(&doc, Selection::node(8));
		assert_eq!(span(changes.insertion.as_ref()), Some((6, 11, UserId(2))));
		assert_eq!(span(changes.format_change.as_ref()), Some((6, 11, UserId(3))));
		assert!(changes.deletion.is_none());
		assert!(find_selected_changes(&doc, Selection::node(2)).is_empty());
	}
}
