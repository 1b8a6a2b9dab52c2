//! Bookkeeping of what a batch of transactions did, kept in the coordinates
//! of the document after the most recent step.

use std::collections::BTreeSet;

use redline_primitives::{
	AppliedStep, Bias, BlockKind, BlockTrack, ChangeSet, CharIdx, Formats, Mark, MarkKind, Run,
	Slice, Step, TrackAttrs, TrackMark, UserId,
};

use crate::attribution::{mark_block_deleted, mark_deleted};
use crate::config::TrackConfig;

/// Content inserted during the batch.
#[derive(Debug, Clone)]
pub(super) struct PendingInsertion {
	pub from: CharIdx,
	pub to: CharIdx,
	/// The user who typed the content, tracked or not.
	pub user: UserId,
	/// Author of a tracked insertion; [`None`] for untracked content.
	pub attrs: Option<TrackAttrs>,
}

/// Deleted content waiting to be put back with a deletion mark.
#[derive(Debug, Clone)]
pub(super) struct Tombstone {
	pub pos: CharIdx,
	pub content: Slice,
	/// The deletion ran backwards, so the cursor belongs before the content.
	pub cursor_before: bool,
	/// Creation order within the batch.
	pub seq: usize,
}

/// Formatting of a run before a formatting step touched it.
#[derive(Debug, Clone)]
pub(super) struct FormatSegment {
	pub from: CharIdx,
	pub to: CharIdx,
	pub before: Formats,
	/// Author of a tracked change; untracked changes only update existing
	/// format change marks.
	pub attrs: Option<TrackAttrs>,
}

/// A block kind change.
#[derive(Debug, Clone)]
pub(super) struct BlockEdit {
	pub pos: CharIdx,
	pub before: BlockKind,
	pub attrs: Option<TrackAttrs>,
}

/// How the step being recorded is attributed.
pub(super) struct StepCtx<'a> {
	pub attrs: &'a TrackAttrs,
	pub tracking: bool,
	pub config: &'a TrackConfig,
	/// The deletion ends at or before the cursor (backspace).
	pub backward: bool,
}

impl StepCtx<'_> {
	fn insertion_attrs(&self) -> Option<TrackAttrs> {
		self.tracking.then(|| self.attrs.clone())
	}

	fn format_attrs(&self) -> Option<TrackAttrs> {
		(self.tracking && self.config.track_formatting).then(|| self.attrs.clone())
	}

	fn block_attrs(&self) -> Option<TrackAttrs> {
		(self.tracking && self.config.track_block_changes).then(|| self.attrs.clone())
	}
}

#[derive(Debug, Default)]
pub(super) struct Pending {
	pub insertions: Vec<PendingInsertion>,
	pub tombstones: Vec<Tombstone>,
	pub formats: Vec<FormatSegment>,
	pub blocks: Vec<BlockEdit>,
	/// Regions whose blocks need merging, as closed spans.
	pub touched: Vec<(CharIdx, CharIdx)>,
	next_seq: usize,
}

impl Pending {
	pub fn record(&mut self, applied: &AppliedStep, map: &ChangeSet, ctx: &StepCtx<'_>) {
		match &applied.step {
			Step::Replace { from, to, slice } => {
				self.replace(*from, *to, slice.len(), &applied.prior, map, ctx);
			}
			Step::AddMark { from, to, mark } => {
				if matches!(mark, Mark::Format(_)) {
					self.format(*from, &applied.prior, ctx.format_attrs());
				}
				self.touched.push((*from, *to));
			}
			Step::RemoveMark { from, to, kind } => {
				if matches!(kind, MarkKind::Format(_)) {
					self.format(*from, &applied.prior, ctx.format_attrs());
				}
				self.touched.push((*from, *to));
			}
			Step::SetBlock { pos, kind, .. } => {
				if let Some(prev) = applied.prev_block.as_ref().filter(|prev| prev.kind != *kind) {
					self.blocks.push(BlockEdit {
						pos: *pos,
						before: prev.kind,
						attrs: ctx.block_attrs(),
					});
				}
				self.touched.push((*pos, *pos));
			}
		}
	}

	fn replace(
		&mut self,
		from: CharIdx,
		to: CharIdx,
		inserted: usize,
		prior: &Slice,
		map: &ChangeSet,
		ctx: &StepCtx<'_>,
	) {
		let tombstone = (to > from).then(|| self.absorb(from, to, prior, ctx)).flatten();

		for tomb in &mut self.tombstones {
			tomb.pos = map.map_pos(tomb.pos, Bias::Left);
		}
		self.insertions.retain_mut(|ins| match map.map_range(ins.from, ins.to) {
			Some((from, to)) => {
				(ins.from, ins.to) = (from, to);
				true
			}
			None => false,
		});
		self.formats.retain_mut(|seg| match map.map_range(seg.from, seg.to) {
			Some((from, to)) => {
				(seg.from, seg.to) = (from, to);
				true
			}
			None => false,
		});
		for edit in &mut self.blocks {
			edit.pos = map.map_pos(edit.pos, Bias::Left);
		}
		for span in &mut self.touched {
			let from = map.map_pos(span.0, Bias::Left);
			*span = (from, map.map_pos(span.1, Bias::Right).max(from));
		}

		if inserted > 0 {
			self.insertions.push(PendingInsertion {
				from,
				to: from + inserted,
				user: ctx.attrs.user,
				attrs: ctx.insertion_attrs(),
			});
		}
		self.touched.push((from, from + inserted));
		self.tombstones.extend(tombstone);
	}

	/// Removes the tombstones inside `[from, to]` and returns one tombstone at
	/// `from` holding them together with the newly deleted content, in
	/// document order.
	fn absorb(
		&mut self,
		from: CharIdx,
		to: CharIdx,
		prior: &Slice,
		ctx: &StepCtx<'_>,
	) -> Option<Tombstone> {
		let (mut absorbed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tombstones)
			.into_iter()
			.partition(|tomb| from <= tomb.pos && tomb.pos <= to);
		self.tombstones = kept;
		absorbed.sort_by_key(|tomb| (tomb.pos, tomb.seq));

		let len = to - from;
		let mut cuts: BTreeSet<usize> = BTreeSet::from([0, len]);
		cuts.extend(absorbed.iter().map(|tomb| tomb.pos - from));
		for ins in &self.insertions {
			if ins.from < to && ins.to > from {
				cuts.insert(ins.from.clamp(from, to) - from);
				cuts.insert(ins.to.clamp(from, to) - from);
			}
		}

		let mut content = Slice::empty();
		let mut tombs = absorbed.into_iter().peekable();
		let cuts: Vec<usize> = cuts.into_iter().collect();
		for (idx, &start) in cuts.iter().enumerate() {
			while let Some(tomb) = tombs.next_if(|tomb| tomb.pos - from == start) {
				content.append(tomb.content);
			}
			let Some(&end) = cuts.get(idx + 1) else {
				break;
			};
			if !ctx.tracking {
				continue;
			}
			let owner = self
				.insertions
				.iter()
				.rev()
				.find(|ins| ins.from <= from + start && from + end <= ins.to)
				.and_then(|ins| ins.attrs.as_ref());
			content.append(delete_slice(&prior.cut(start, end), owner, ctx.attrs));
		}

		if content.is_empty() {
			return None;
		}
		let seq = self.next_seq;
		self.next_seq += 1;
		Some(Tombstone {
			pos: from,
			content,
			cursor_before: ctx.backward,
			seq,
		})
	}

	/// Records the formatting of every run in `prior`, which starts at `from`.
	fn format(&mut self, from: CharIdx, prior: &Slice, attrs: Option<TrackAttrs>) {
		let mut offset = from;
		let mut push = |offset: &mut CharIdx, run: &Run| {
			let len = run.len();
			self.formats.push(FormatSegment {
				from: *offset,
				to: *offset + len,
				before: run.marks.format_set(),
				attrs: attrs.clone(),
			});
			*offset += len;
		};
		for run in prior.first() {
			push(&mut offset, run);
		}
		for block in prior.rest() {
			offset += 1;
			for run in &block.content {
				push(&mut offset, run);
			}
		}
	}
}

/// Returns what remains visible of deleted content.
///
/// `owner` is the author of a tracked insertion made earlier in the batch
/// that covers `piece`; such content carries no insertion mark yet.
fn delete_slice(piece: &Slice, owner: Option<&TrackAttrs>, deleter: &TrackAttrs) -> Slice {
	if owner.is_some_and(|owner| owner.user == deleter.user) {
		return Slice::empty();
	}

	let mark = |run: &Run| {
		let run = match owner {
			Some(owner) => Run::new(
				run.text.clone(),
				run.marks.clone().with(TrackMark::insertion(owner.clone())),
			),
			None => run.clone(),
		};
		mark_deleted(&run, deleter)
	};

	let mut out = Slice::empty();
	for run in piece.first().iter().filter_map(mark) {
		out.push_run(run);
	}
	for block in piece.rest() {
		let mut header = block.header();
		if let Some(owner) = owner {
			header.set_track_entry(BlockTrack::insertion(owner.clone()));
		}
		if let Some(header) = mark_block_deleted(&header, deleter) {
			out.push_block(header);
		}
		for run in block.content.iter().filter_map(mark) {
			out.push_run(run);
		}
	}
	out
}
