//! Rules over attribution marks: when two marks are one change, when a
//! deletion cancels an insertion, and how repeated formatting compounds.

use chrono::{DateTime, TimeDelta, Utc};
use redline_primitives::{
	Block, BlockKind, BlockTrack, BlockTrackKind, CharIdx, Doc, FormatChangeMark, FormatMark,
	Formats, InsertionMark, Run, TrackAttrs, TrackKind, TrackMark, UserId,
};

use crate::config::TrackConfig;

/// Returns the index of the date bucket holding `date`.
pub fn bucket(date: DateTime<Utc>, width: TimeDelta) -> i64 {
	date.timestamp().div_euclid(width.num_seconds().max(1))
}

/// Returns true if both dates fall into the same bucket.
pub fn same_bucket(a: DateTime<Utc>, b: DateTime<Utc>, width: TimeDelta) -> bool {
	bucket(a, width) == bucket(b, width)
}

/// Returns true if two adjacent marks describe one change and must be
/// represented as one mark.
pub fn can_merge(left: &TrackMark, right: &TrackMark, config: &TrackConfig) -> bool {
	let (l, r) = (left.attrs(), right.attrs());
	if l.user != r.user || !same_bucket(l.date, r.date, config.bucket_width()) {
		return false;
	}
	match (left, right) {
		(TrackMark::Insertion(l), TrackMark::Insertion(r)) => l.approved == r.approved,
		(TrackMark::Deletion(_), TrackMark::Deletion(_)) => true,
		(TrackMark::FormatChange(l), TrackMark::FormatChange(r)) => {
			l.before.is_some() && l.before == r.before && l.after == r.after
		}
		_ => false,
	}
}

/// Returns true if a deletion by `deleter` removes `insertion` outright.
pub fn cancels(insertion: &InsertionMark, deleter: UserId) -> bool {
	!insertion.approved && insertion.attrs.user == deleter
}

/// Returns the run to keep in place of deleted content.
///
/// The deleter's own unapproved insertions disappear, content that is already
/// deleted stays as it is, and anything else gains a deletion mark.
pub fn mark_deleted(run: &Run, attrs: &TrackAttrs) -> Option<Run> {
	if run.marks.insertion().is_some_and(|ins| cancels(ins, attrs.user)) {
		return None;
	}
	if run.marks.deletion().is_some() {
		return Some(run.clone());
	}
	let marks = run.marks.clone().with(TrackMark::deletion(attrs.clone()));
	Some(Run::new(run.text.clone(), marks))
}

/// Returns the header to keep for a deleted block boundary, or [`None`] if
/// the boundary was the deleter's own insertion and disappears.
pub fn mark_block_deleted(header: &Block, attrs: &TrackAttrs) -> Option<Block> {
	if header
		.track_entry(BlockTrackKind::Insertion)
		.is_some_and(|entry| entry.user() == attrs.user)
	{
		return None;
	}
	let mut header = header.header();
	if header.track_entry(BlockTrackKind::Deletion).is_none() {
		header.set_track_entry(BlockTrack::deletion(attrs.clone()));
	}
	Some(header)
}

/// Computes the format change mark after formatting went from `previous` to
/// `current`.
///
/// An existing mark keeps its `before`, so repeated changes compare against
/// the formatting as of the first unacknowledged change. Returns [`None`] when
/// the net change is a no-op.
pub fn compound_format_change(
	existing: Option<&FormatChangeMark>,
	previous: &[FormatMark],
	current: &[FormatMark],
	attrs: &TrackAttrs,
) -> Option<FormatChangeMark> {
	let before: Formats = existing
		.and_then(|mark| mark.before.clone())
		.unwrap_or_else(|| previous.iter().copied().collect());
	if before.as_slice() == current {
		return None;
	}
	Some(FormatChangeMark {
		attrs: attrs.clone(),
		before: Some(before),
		after: current.iter().copied().collect(),
	})
}

/// Computes the block change entry after a block went from `previous` to
/// `current`; the block-level counterpart of [`compound_format_change`].
pub fn compound_block_change(
	existing: Option<&BlockTrack>,
	previous: BlockKind,
	current: BlockKind,
	attrs: &TrackAttrs,
) -> Option<BlockTrack> {
	let before = existing.and_then(|entry| entry.before).unwrap_or(previous);
	(before != current).then(|| BlockTrack::block_change(attrs.clone(), before))
}

/// A broken attribution rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
	/// Two adjacent runs carry unequal marks that should be one mark.
	Fragmented { pos: CharIdx, kind: TrackKind },
	/// A run is both an unapproved insertion and a deletion by one user.
	SelfCancel { from: CharIdx, to: CharIdx, user: UserId },
	/// A format change whose `before` equals the current formatting.
	StaleFormatChange { from: CharIdx, to: CharIdx },
	/// A block change whose `before` equals the current block kind.
	StaleBlockChange { block: usize },
}

/// Lists every attribution rule `doc` breaks.
pub fn find_violations(doc: &Doc, config: &TrackConfig) -> Vec<Violation> {
	let mut out = Vec::new();
	let mut prev: Option<redline_primitives::RunSpan<'_>> = None;

	for span in doc.runs() {
		let marks = span.marks();
		if let Some(left) = prev.filter(|left| left.block == span.block) {
			for kind in TrackKind::ALL {
				if let (Some(l), Some(r)) = (left.marks().get(kind), marks.get(kind))
					&& l != r && can_merge(l, r, config)
				{
					out.push(Violation::Fragmented { pos: span.from, kind });
				}
			}
		}
		if let (Some(ins), Some(del)) = (marks.insertion(), marks.deletion())
			&& cancels(ins, del.attrs.user)
		{
			out.push(Violation::SelfCancel {
				from: span.from,
				to: span.to,
				user: del.attrs.user,
			});
		}
		if let Some(change) = marks.format_change()
			&& change.before.as_deref() == Some(marks.formats())
		{
			out.push(Violation::StaleFormatChange {
				from: span.from,
				to: span.to,
			});
		}
		prev = Some(span);
	}

	for (idx, block) in doc.blocks().iter().enumerate() {
		if block
			.track_entry(BlockTrackKind::BlockChange)
			.is_some_and(|entry| entry.before == Some(block.kind))
		{
			out.push(Violation::StaleBlockChange { block: idx });
		}
	}

	out
}
