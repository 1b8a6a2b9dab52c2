//! The corrective pass run after every dispatch.
//!
//! [`append_transaction`] looks at the transactions just applied and builds a
//! single transaction that restores the attribution rules: new content gets
//! insertion marks, deleted content comes back with deletion marks, formatting
//! and block kind changes are recorded, self-cancelling content is removed and
//! fragmented marks are merged.

mod merge;
mod pending;


use std::collections::BTreeSet;

use redline_primitives::{
	Bias, BlockTrack, BlockTrackKind, DocState, FormatChangeMark, MarkKind, Selection, Step,
	TrackAttrs, TrackKind, TrackMark, Transaction, UserId,
};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use self::pending::{Pending, PendingInsertion, StepCtx};
use crate::attribution::{cancels, compound_block_change, compound_format_change};
use crate::clock::Clock;
use crate::config::TrackConfig;
use crate::meta::{APPENDED_KEY, Appended, EDIT_KEY};

/// Settings and time source for a normalizer run.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeCtx<'a> {
	pub config: &'a TrackConfig,
	pub clock: &'a dyn Clock,
}

/// Builds the corrective transaction for a batch of applied transactions.
///
/// `old` is the state before the batch and `new` the state after it. Returns
/// [`None`] when the document already satisfies every rule. Transactions
/// produced by this function carry [`Appended`] and are ignored when they come
/// back in a later batch.
pub fn append_transaction(
	trs: &[Transaction],
	old: &DocState,
	new: &DocState,
	ctx: &NormalizeCtx<'_>,
) -> Option<Transaction> {
	let edits: Vec<&Transaction> = trs
		.iter()
		.filter(|tr| tr.doc_changed() && !tr.has_meta(APPENDED_KEY))
		.collect();
	if edits.is_empty() {
		return None;
	}

	let mut pending = Pending::default();
	for tr in &edits {
		let meta = tr.meta(EDIT_KEY);
		let attrs = meta.map_or_else(
			|| TrackAttrs::new(UserId::ANONYMOUS, ctx.clock.now()),
			|meta| meta.attrs(ctx.clock),
		);
		let tracking = meta.is_some_and(|meta| meta.tracking);
		trace!(
			user = %attrs.user,
			tracking,
			origin = ?meta.map(|meta| meta.origin),
			steps = tr.steps().len(),
			"track.normalize.transaction"
		);

		// Cursor position in front of each step.
		let mut head = tr.selection_before().head();
		for (applied, map) in tr.steps().iter().zip(tr.mapping().maps()) {
			let backward = matches!(applied.step, Step::Replace { from, to, .. } if to > from && head >= to);
			head = map.map_pos(head, Bias::Right);
			let step_ctx = StepCtx {
				attrs: &attrs,
				tracking,
				config: ctx.config,
				backward,
			};
			pending.record(applied, map, &step_ctx);
		}
	}

	let mut tr = new.tr();
	tag_insertions(&mut tr, &pending);
	track_formats(&mut tr, &pending);
	track_blocks(&mut tr, &pending);
	let cursor = reinsert_tombstones(&mut tr, &pending, new.selection);

	let mut blocks = BTreeSet::new();
	let tomb_spans = pending.tombstones.iter().map(|tomb| (tomb.pos, tomb.pos));
	for (from, to) in pending.touched.iter().copied().chain(tomb_spans) {
		let (from, to) = tr.mapping().map_span(from, to);
		let (Some(first), Some(last)) = (tr.doc().block_index_at(from), tr.doc().block_index_at(to))
		else {
			continue;
		};
		blocks.extend(first..=last);
	}
	merge::resolve_self_cancel(&mut tr, &blocks);
	merge::merge_marks(&mut tr, &blocks, ctx.config);

	if let Some((step, pos)) = cursor {
		let pos = tr.mapping().map_pos_from(step, pos, Bias::Left);
		tr.set_selection(Selection::point(pos));
	}

	trace!(
		old_len = old.doc.len(),
		new_len = new.doc.len(),
		touched_blocks = blocks.len(),
		tombstones = pending.tombstones.len(),
		"track.normalize.summary"
	);
	if !tr.doc_changed() {
		return None;
	}
	tr.set_meta(APPENDED_KEY, Appended);
	debug!(steps = tr.steps().len(), "track.normalize.corrective");
	Some(tr)
}

/// Applies a corrective step, logging and skipping it if it does not fit.
fn apply(tr: &mut Transaction, step: Step) -> bool {
	match tr.step(step) {
		Ok(_) => true,
		Err(error) => {
			warn!(%error, "track.normalize.skip_step");
			false
		}
	}
}

/// Gives content inserted by tracking users their insertion mark, and the
/// blocks they opened a block insertion entry.
fn tag_insertions(tr: &mut Transaction, pending: &Pending) {
	for ins in &pending.insertions {
		let Some(attrs) = &ins.attrs else {
			strip_inherited(tr, ins);
			continue;
		};
		let target = TrackMark::insertion(attrs.clone());
		let spans: Vec<_> = tr
			.doc()
			.runs_between(ins.from, ins.to)
			.into_iter()
			.map(|span| (span.from.max(ins.from), span.to.min(ins.to), span.marks().clone()))
			.collect();
		for (from, to, marks) in spans {
			if marks.deletion().is_some() {
				let kind = MarkKind::Track(TrackKind::Deletion);
				apply(tr, Step::RemoveMark { from, to, kind });
			}
			if marks.format_change().is_some() {
				let kind = MarkKind::Track(TrackKind::FormatChange);
				apply(tr, Step::RemoveMark { from, to, kind });
			}
			if marks.get(TrackKind::Insertion) != Some(&target) {
				let mark = target.clone().into();
				apply(tr, Step::AddMark { from, to, mark });
			}
		}

		let entry = BlockTrack::insertion(attrs.clone());
		let opened: Vec<_> = tr
			.doc()
			.block_ranges()
			.into_iter()
			.enumerate()
			.skip(1)
			.filter(|(_, (start, _))| ins.from < *start && *start <= ins.to)
			.map(|(idx, (start, _))| (idx, start))
			.collect();
		for (idx, start) in opened {
			let block = &tr.doc().blocks()[idx];
			if block.track_entry(BlockTrackKind::Insertion) == Some(&entry) {
				continue;
			}
			let mut header = block.header();
			header.remove_track_entry(BlockTrackKind::Deletion);
			header.set_track_entry(entry.clone());
			apply(
				tr,
				Step::SetBlock {
					pos: start,
					kind: header.kind,
					track: header.track,
				},
			);
		}
	}
}

/// Removes the insertion and deletion marks untracked content picked up from
/// another user's neighbouring change.
fn strip_inherited(tr: &mut Transaction, ins: &PendingInsertion) {
	let spans: Vec<_> = tr
		.doc()
		.runs_between(ins.from, ins.to)
		.into_iter()
		.map(|span| (span.from.max(ins.from), span.to.min(ins.to), span.marks().clone()))
		.collect();
	for (from, to, marks) in spans {
		for kind in [TrackKind::Insertion, TrackKind::Deletion] {
			if marks.get(kind).is_some_and(|mark| mark.user() != ins.user) {
				let kind = MarkKind::Track(kind);
				apply(tr, Step::RemoveMark { from, to, kind });
			}
		}
	}
}

/// Records formatting changes as format change marks.
///
/// Each character is judged against the formatting recorded by the first
/// step of the batch that touched it.
fn track_formats(tr: &mut Transaction, pending: &Pending) {
	let mut points: Vec<_> = pending
		.formats
		.iter()
		.flat_map(|seg| [seg.from, seg.to])
		.collect();
	points.sort_unstable();
	points.dedup();

	for window in points.windows(2) {
		let (x, y) = (window[0], window[1]);
		let Some(seg) = pending.formats.iter().find(|seg| seg.from <= x && y <= seg.to) else {
			continue;
		};
		if pending
			.insertions
			.iter()
			.any(|ins| ins.attrs.is_some() && ins.from <= x && y <= ins.to)
		{
			continue;
		}

		let spans: Vec<_> = tr
			.doc()
			.runs_between(x, y)
			.into_iter()
			.map(|span| (span.from.max(x), span.to.min(y), span.marks().clone()))
			.collect();
		for (from, to, marks) in spans {
			let current = marks.formats();
			let existing = marks.format_change();
			// Own unapproved insertions are not format-tracked, but a change
			// recorded on them by someone else still follows the formatting.
			let attrs = seg
				.attrs
				.as_ref()
				.filter(|attrs| !marks.insertion().is_some_and(|ins| cancels(ins, attrs.user)));
			let desired = match attrs {
				Some(attrs) => compound_format_change(existing, &seg.before, current, attrs),
				None => {
					let Some(existing) = existing else {
						continue;
					};
					let Some(before) = &existing.before else {
						continue;
					};
					(before.as_slice() != current).then(|| FormatChangeMark {
						after: current.iter().copied().collect(),
						..existing.clone()
					})
				}
			};
			match desired {
				None if existing.is_some() => {
					let kind = MarkKind::Track(TrackKind::FormatChange);
					apply(tr, Step::RemoveMark { from, to, kind });
				}
				Some(change) if existing != Some(&change) => {
					let mark = TrackMark::FormatChange(change).into();
					apply(tr, Step::AddMark { from, to, mark });
				}
				_ => {}
			}
		}
	}
}

/// Records block kind changes as block change entries.
fn track_blocks(tr: &mut Transaction, pending: &Pending) {
	let mut seen = FxHashSet::default();
	for edit in &pending.blocks {
		let Some(idx) = tr.doc().block_index_at(edit.pos) else {
			continue;
		};
		if !seen.insert(idx) {
			continue;
		}
		let block = &tr.doc().blocks()[idx];
		let existing = block.track_entry(BlockTrackKind::BlockChange);
		let desired = match &edit.attrs {
			Some(attrs) => compound_block_change(existing, edit.before, block.kind, attrs),
			None => existing.filter(|entry| entry.before != Some(block.kind)).cloned(),
		};
		if desired.as_ref() == existing {
			continue;
		}
		let mut header = block.header();
		match desired {
			Some(entry) => header.set_track_entry(entry),
			None => header.remove_track_entry(BlockTrackKind::BlockChange),
		}
		let Some((start, _)) = tr.doc().block_range(idx) else {
			continue;
		};
		apply(
			tr,
			Step::SetBlock {
				pos: start,
				kind: header.kind,
				track: header.track,
			},
		);
	}
}

/// Puts deleted content back in ascending position order.
///
/// Returns the corrective step count after the tombstone that should hold the
/// cursor in front of it, with the position it was inserted at.
fn reinsert_tombstones(
	tr: &mut Transaction,
	pending: &Pending,
	selection: Selection,
) -> Option<(usize, usize)> {
	let last_seq = pending.tombstones.iter().map(|tomb| tomb.seq).max()?;
	let mut tombs: Vec<_> = pending.tombstones.iter().collect();
	tombs.sort_by_key(|tomb| (tomb.pos, tomb.seq));

	let mut cursor = None;
	for tomb in tombs {
		let pos = tr.mapping().map_pos(tomb.pos, Bias::Left);
		let slice = tomb.content.clone();
		if !apply(tr, Step::Replace { from: pos, to: pos, slice }) {
			continue;
		}
		if tomb.seq == last_seq && tomb.cursor_before && selection == Selection::point(tomb.pos) {
			cursor = Some((tr.steps().len(), pos));
		}
	}
	cursor
}
