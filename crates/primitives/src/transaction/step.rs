use super::changeset::ChangeSet;
use crate::doc::{Block, BlockKind, BlockTrack, Doc, Mark, MarkKind, Slice};
use crate::error::Result;
use crate::range::CharIdx;

/// An atomic document change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
	/// Replaces `[from, to)` with `slice`.
	Replace { from: CharIdx, to: CharIdx, slice: Slice },
	/// Adds `mark` to every character in `[from, to)`.
	AddMark { from: CharIdx, to: CharIdx, mark: Mark },
	/// Removes the mark of `kind` from every character in `[from, to)`.
	RemoveMark {
		from: CharIdx,
		to: CharIdx,
		kind: MarkKind,
	},
	/// Replaces the attributes of the block holding `pos`.
	SetBlock {
		pos: CharIdx,
		kind: BlockKind,
		track: Vec<BlockTrack>,
	},
}

/// Outcome of applying a [`Step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
	/// How positions move across the step.
	pub map: ChangeSet,
	/// Content of the touched range as it was before the step.
	pub prior: Slice,
	/// Attributes of the touched block before a [`Step::SetBlock`].
	pub prev_block: Option<Block>,
}

impl Step {
	/// Applies the step to `doc`.
	///
	/// # Errors
	/// Returns an error if the step's positions do not fit `doc`; the document
	/// is left unchanged in that case.
	pub fn apply(&self, doc: &mut Doc) -> Result<StepResult> {
		let len = doc.len();
		match self {
			Step::Replace { from, to, slice } => {
				let prior = doc.slice(*from, *to)?;
				doc.replace(*from, *to, slice)?;
				Ok(StepResult {
					map: ChangeSet::replace(len, *from, *to, slice.len()),
					prior,
					prev_block: None,
				})
			}
			Step::AddMark { from, to, mark } => {
				let prior = doc.slice(*from, *to)?;
				doc.update_marks(*from, *to, |marks| marks.add(mark.clone()))?;
				Ok(StepResult {
					map: ChangeSet::identity(len),
					prior,
					prev_block: None,
				})
			}
			Step::RemoveMark { from, to, kind } => {
				let prior = doc.slice(*from, *to)?;
				doc.update_marks(*from, *to, |marks| marks.remove(kind))?;
				Ok(StepResult {
					map: ChangeSet::identity(len),
					prior,
					prev_block: None,
				})
			}
			Step::SetBlock { pos, kind, track } => {
				let prev = doc.set_block(*pos, *kind, track.clone())?;
				Ok(StepResult {
					map: ChangeSet::identity(len),
					prior: Slice::empty(),
					prev_block: Some(prev),
				})
			}
		}
	}
}
