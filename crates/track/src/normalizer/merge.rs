use std::collections::BTreeSet;

use redline_primitives::{Slice, Step, TrackKind, TrackMark, Transaction};

use super::apply;
use crate::attribution::{can_merge, cancels};
use crate::config::TrackConfig;

/// Deletes content in `blocks` that is both an unapproved insertion and a
/// deletion by the same user.
pub(super) fn resolve_self_cancel(tr: &mut Transaction, blocks: &BTreeSet<usize>) {
	let doomed: Vec<_> = blocks
		.iter()
		.flat_map(|&idx| tr.doc().block_runs(idx))
		.filter(|span| {
			let marks = span.marks();
			match (marks.insertion(), marks.deletion()) {
				(Some(ins), Some(del)) => cancels(ins, del.attrs.user),
				_ => false,
			}
		})
		.map(|span| (span.from, span.to))
		.collect();

	for (from, to) in doomed.into_iter().rev() {
		apply(tr, Step::Replace { from, to, slice: Slice::empty() });
	}
}

/// Coalesces adjacent mergeable marks in `blocks`; the right mark adopts the
/// left one.
///
/// Runs are planned against the left neighbour's mark as it will be after
/// the pass, so a chain of mergeable marks collapses onto its first mark.
pub(super) fn merge_marks(tr: &mut Transaction, blocks: &BTreeSet<usize>, config: &TrackConfig) {
	let mut plan: Vec<(usize, usize, TrackMark)> = Vec::new();

	for &idx in blocks {
		let mut left: [Option<TrackMark>; 3] = Default::default();
		for span in tr.doc().block_runs(idx) {
			let mut effective: [Option<TrackMark>; 3] = Default::default();
			for (slot, kind) in TrackKind::ALL.into_iter().enumerate() {
				let Some(mark) = span.marks().get(kind) else {
					continue;
				};
				effective[slot] = match &left[slot] {
					Some(prev) if prev != mark && can_merge(prev, mark, config) => {
						plan.push((span.from, span.to, prev.clone()));
						Some(prev.clone())
					}
					_ => Some(mark.clone()),
				};
			}
			left = effective;
		}
	}

	for (from, to, mark) in plan {
		apply(tr, Step::AddMark { from, to, mark: mark.into() });
	}
}
