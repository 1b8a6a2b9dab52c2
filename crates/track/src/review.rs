//! Accepting and rejecting tracked changes.
//!
//! Review actions are ordinary untracked transactions: the corrective pass
//! handles them like any other edit.

use redline_primitives::{
	BlockTrackKind, CharIdx, DocState, FormatMark, MarkKind, Step, StepError, TrackKind,
	Transaction,
};
use tracing::debug;

/// What to do with the changes in a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	Accept,
	Reject,
}

/// Accepts the changes of `kind` (or all kinds) intersecting `[from, to]`.
///
/// Returns [`None`] when there is nothing to accept.
pub fn accept_changes(
	state: &DocState,
	from: CharIdx,
	to: CharIdx,
	kind: Option<TrackKind>,
) -> Result<Option<Transaction>, StepError> {
	review(state, from, to, kind, Decision::Accept)
}

/// Rejects the changes of `kind` (or all kinds) intersecting `[from, to]`.
pub fn reject_changes(
	state: &DocState,
	from: CharIdx,
	to: CharIdx,
	kind: Option<TrackKind>,
) -> Result<Option<Transaction>, StepError> {
	review(state, from, to, kind, Decision::Reject)
}

pub fn accept_all(state: &DocState) -> Result<Option<Transaction>, StepError> {
	accept_changes(state, 0, state.doc.len(), None)
}

pub fn reject_all(state: &DocState) -> Result<Option<Transaction>, StepError> {
	reject_changes(state, 0, state.doc.len(), None)
}

/// Builds the review transaction.
///
/// Mark and block attribute steps come first since they keep positions
/// stable; content and boundary deletions follow from the end of the
/// document backwards.
pub fn review(
	state: &DocState,
	from: CharIdx,
	to: CharIdx,
	kind: Option<TrackKind>,
	decision: Decision,
) -> Result<Option<Transaction>, StepError> {
	if from > to {
		return Err(StepError::InvalidRange { from, to });
	}
	let doc = &state.doc;
	let wants = |k: TrackKind| kind.is_none_or(|kind| kind == k);
	let mut steps = Vec::new();
	let mut deletions: Vec<(CharIdx, CharIdx)> = Vec::new();

	for span in doc.runs_between(from, to) {
		let (a, b) = (span.from.max(from), span.to.min(to));
		let marks = span.marks();
		if marks.insertion().is_some() && wants(TrackKind::Insertion) {
			match decision {
				Decision::Accept => steps.push(strip(a, b, TrackKind::Insertion)),
				Decision::Reject => deletions.push((a, b)),
			}
		}
		if marks.deletion().is_some() && wants(TrackKind::Deletion) {
			match decision {
				Decision::Accept => deletions.push((a, b)),
				Decision::Reject => steps.push(strip(a, b, TrackKind::Deletion)),
			}
		}
		if let Some(change) = marks.format_change().filter(|_| wants(TrackKind::FormatChange)) {
			if let (Decision::Reject, Some(before)) = (decision, &change.before) {
				steps.extend(restore_formats(a, b, marks.formats(), before));
			}
			steps.push(strip(a, b, TrackKind::FormatChange));
		}
	}

	for (idx, (start, end)) in doc.block_ranges().into_iter().enumerate() {
		if start > to || end < from {
			continue;
		}
		let Some(block) = doc.block(idx) else {
			continue;
		};
		let mut header = block.header();
		let boundary = doc.boundary_before(idx);
		for entry in &block.track {
			let category = match entry.kind {
				BlockTrackKind::Insertion => TrackKind::Insertion,
				BlockTrackKind::Deletion => TrackKind::Deletion,
				BlockTrackKind::BlockChange => TrackKind::FormatChange,
			};
			if !wants(category) {
				continue;
			}
			header.remove_track_entry(entry.kind);
			let joins = matches!(
				(entry.kind, decision),
				(BlockTrackKind::Insertion, Decision::Reject)
					| (BlockTrackKind::Deletion, Decision::Accept)
			);
			if joins && let Some(boundary) = boundary {
				deletions.push((boundary, boundary + 1));
			}
			if let (BlockTrackKind::BlockChange, Decision::Reject, Some(before)) =
				(entry.kind, decision, entry.before)
			{
				header.kind = before;
			}
		}
		if header.kind != block.kind || header.track != block.track {
			steps.push(Step::SetBlock {
				pos: start,
				kind: header.kind,
				track: header.track,
			});
		}
	}

	if steps.is_empty() && deletions.is_empty() {
		return Ok(None);
	}

	let mut tr = state.tr();
	for step in steps {
		tr.step(step)?;
	}
	deletions.sort_unstable();
	deletions.dedup();
	for &(from, to) in deletions.iter().rev() {
		tr.delete(from, to)?;
	}
	debug!(?decision, ?kind, steps = tr.steps().len(), "track.review");
	Ok(Some(tr))
}

fn strip(from: CharIdx, to: CharIdx, kind: TrackKind) -> Step {
	Step::RemoveMark {
		from,
		to,
		kind: MarkKind::Track(kind),
	}
}

/// Steps that turn `current` formatting back into `before`.
fn restore_formats(
	from: CharIdx,
	to: CharIdx,
	current: &[FormatMark],
	before: &[FormatMark],
) -> Vec<Step> {
	let removed = current
		.iter()
		.filter(|format| !before.contains(format))
		.map(|&format| Step::RemoveMark {
			from,
			to,
			kind: MarkKind::Format(format),
		});
	let added = before
		.iter()
		.filter(|format| !current.contains(format))
		.map(|&format| Step::AddMark {
			from,
			to,
			mark: format.into(),
		});
	removed.chain(added).collect()
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};
	use pretty_assertions::assert_eq;
	use redline_primitives::{
		Block, BlockKind, BlockTrack, Doc, Formats, Marks, Run, TrackAttrs, TrackMark, UserId,
	};
	use smallvec::smallvec;

	use super::*;

	fn attrs(user: u32) -> TrackAttrs {
		TrackAttrs::new(UserId(user), Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
	}

	fn ins(user: u32) -> Marks {
		Marks::new().with(TrackMark::insertion(attrs(user)))
	}

	fn del(user: u32) -> Marks {
		Marks::new().with(TrackMark::deletion(attrs(user)))
	}

	fn paragraph(runs: Vec<Run>) -> Block {
		Block::new(BlockKind::Paragraph).with_content(runs)
	}

	/// "The [quick ]brown [slow ]fox" with "quick " inserted by user 1 and
	/// "slow " deleted by user 2.
	fn mixed() -> DocState {
		DocState::new(Doc::new(vec![paragraph(vec![
			Run::plain("The "),
			Run::new("quick ", ins(1)),
			Run::plain("brown "),
			Run::new("slow ", del(2)),
			Run::plain("fox"),
		])]))
	}

	fn run_review(tr: Option<Transaction>, state: &DocState) -> Doc {
		tr.map_or_else(|| state.doc.clone(), |tr| tr.doc().clone())
	}

	#[test]
	fn accept_all_keeps_insertions_and_drops_deletions() {
		let state = mixed();
		let doc = run_review(accept_all(&state).unwrap(), &state);
		assert_eq!(doc, Doc::from_text("The quick brown fox"));
	}

	#[test]
	fn reject_all_drops_insertions_and_keeps_deletions() {
		let state = mixed();
		let doc = run_review(reject_all(&state).unwrap(), &state);
		assert_eq!(doc, Doc::from_text("The brown slow fox"));
	}

	#[test]
	fn kind_filter_limits_review() {
		let state = mixed();
		let tr = accept_changes(&state, 0, state.doc.len(), Some(TrackKind::Deletion))
			.unwrap()
			.unwrap();
		assert_eq!(tr.doc().text(), "The quick brown fox");
		assert!(tr.doc().runs().any(|span| span.marks().insertion().is_some()));
	}

	#[test]
	fn range_limits_review() {
		let state = mixed();
		let tr = reject_changes(&state, 4, 6, None).unwrap().unwrap();
		assert_eq!(tr.doc().text(), "The ck brown slow fox");
	}

	#[test]
	fn nothing_to_review_yields_none() {
		let state = DocState::new(Doc::from_text("plain"));
		assert!(accept_all(&state).unwrap().is_none());
		assert!(reject_changes(&state, 3, 1, None).is_err());
	}

	#[test]
	fn rejecting_format_change_restores_before() {
		let strong: Formats = smallvec![FormatMark::Strong];
		let marks = Marks::from_formats([FormatMark::Strong]).with(TrackMark::format_change(
			attrs(1),
			Formats::new(),
			strong.clone(),
		));
		let state = DocState::new(Doc::new(vec![paragraph(vec![Run::new("bold", marks)])]));

		let rejected = reject_all(&state).unwrap().unwrap();
		assert_eq!(rejected.doc(), &Doc::from_text("bold"));

		let accepted = accept_all(&state).unwrap().unwrap();
		assert_eq!(
			accepted.doc().runs().map(|s| s.marks().clone()).collect::<Vec<_>>(),
			vec![Marks::from_formats([FormatMark::Strong])]
		);
	}

	#[test]
	fn block_insertion_reject_joins_and_accept_strips() {
		let state = DocState::new(Doc::new(vec![
			Block::paragraph("ab"),
			Block::paragraph("cd").with_track(vec![BlockTrack::insertion(attrs(1))]),
		]));
		let rejected = reject_all(&state).unwrap().unwrap();
		assert_eq!(rejected.doc(), &Doc::from_text("abcd"));
		let accepted = accept_all(&state).unwrap().unwrap();
		assert_eq!(accepted.doc(), &Doc::from_text("ab\ncd"));
	}

	#[test]
	fn block_deletion_accept_joins_and_reject_strips() {
		let state = DocState::new(Doc::new(vec![
			Block::paragraph("ab"),
			Block::paragraph("cd").with_track(vec![BlockTrack::deletion(attrs(1))]),
		]));
		let accepted = accept_all(&state).unwrap().unwrap();
		assert_eq!(accepted.doc(), &Doc::from_text("abcd"));
		let rejected = reject_all(&state).unwrap().unwrap();
		assert_eq!(rejected.doc(), &Doc::from_text("ab\ncd"));
	}

	#[test]
	fn block_change_reject_restores_kind() {
		let state = DocState::new(Doc::new(vec![
			Block::new(BlockKind::Heading { level: 1 })
				.with_content(vec![Run::plain("title")])
				.with_track(vec![BlockTrack::block_change(attrs(1), BlockKind::Paragraph)]),
		]));
		let rejected = reject_all(&state).unwrap().unwrap();
		assert_eq!(rejected.doc(), &Doc::from_text("title"));
		let accepted = accept_all(&state).unwrap().unwrap();
		assert_eq!(accepted.doc().blocks()[0].kind, BlockKind::Heading { level: 1 });
		assert!(accepted.doc().blocks()[0].track.is_empty());
	}
}
