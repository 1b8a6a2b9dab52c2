//! Transactions: a batch of steps applied to a document, with the resulting
//! position mapping, selection and metadata.

mod changeset;
mod mapping;
mod meta;
mod step;
mod types;


pub use changeset::ChangeSet;
pub use mapping::Mapping;
pub use meta::{Meta, MetaKey};
pub use step::{Step, StepResult};
pub use types::{Bias, Operation};

use crate::doc::{Block, BlockKind, BlockTrack, Doc, Mark, MarkKind, Slice};
use crate::error::Result;
use crate::range::CharIdx;
use crate::selection::Selection;

/// A step recorded in a transaction together with what it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedStep {
	pub step: Step,
	/// Content of the touched range before the step.
	pub prior: Slice,
	/// Block attributes before a [`Step::SetBlock`].
	pub prev_block: Option<Block>,
}

/// A document change under construction.
///
/// Builder methods apply their step immediately, so [`Transaction::doc`]
/// always reflects every step added so far and the selection is mapped
/// through each step as it is added.
#[derive(Debug)]
pub struct Transaction {
	doc: Doc,
	steps: Vec<AppliedStep>,
	mapping: Mapping,
	selection_before: Selection,
	selection: Selection,
	selection_set: bool,
	meta: Meta,
}

impl Transaction {
	/// Starts a transaction on `doc` with the current `selection`.
	pub fn new(doc: Doc, selection: Selection) -> Self {
		Self {
			doc,
			steps: Vec::new(),
			mapping: Mapping::new(),
			selection_before: selection,
			selection,
			selection_set: false,
			meta: Meta::new(),
		}
	}

	/// The document after every step so far.
	pub fn doc(&self) -> &Doc {
		&self.doc
	}

	pub fn steps(&self) -> &[AppliedStep] {
		&self.steps
	}

	/// Position mapping from the starting document to [`Transaction::doc`],
	/// one changeset per step.
	pub fn mapping(&self) -> &Mapping {
		&self.mapping
	}

	pub fn selection_before(&self) -> Selection {
		self.selection_before
	}

	pub fn selection(&self) -> Selection {
		self.selection
	}

	/// Returns true if the selection was set explicitly.
	pub fn selection_set(&self) -> bool {
		self.selection_set
	}

	pub fn doc_changed(&self) -> bool {
		!self.steps.is_empty()
	}

	/// Returns true if the transaction changes neither the document nor the
	/// selection.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty() && !self.selection_set
	}

	/// Applies a step.
	///
	/// # Errors
	/// Returns an error if the step does not fit the current document; the
	/// transaction is left unchanged in that case.
	pub fn step(&mut self, step: Step) -> Result<&mut Self> {
		let StepResult {
			map,
			prior,
			prev_block,
		} = step.apply(&mut self.doc)?;
		self.selection = self.selection.map(&map);
		self.mapping.push(map);
		self.steps.push(AppliedStep {
			step,
			prior,
			prev_block,
		});
		Ok(self)
	}

	/// Replaces `[from, to)` with `slice`.
	pub fn replace(&mut self, from: CharIdx, to: CharIdx, slice: Slice) -> Result<&mut Self> {
		self.step(Step::Replace { from, to, slice })
	}

	/// Inserts `slice` at `pos`.
	pub fn insert(&mut self, pos: CharIdx, slice: Slice) -> Result<&mut Self> {
		self.replace(pos, pos, slice)
	}

	/// Inserts `text` at `pos` with the marks of the surrounding text.
	pub fn insert_text(&mut self, pos: CharIdx, text: &str) -> Result<&mut Self> {
		let marks = self.doc.marks_at(pos);
		self.replace(pos, pos, Slice::text(text, marks))
	}

	pub fn delete(&mut self, from: CharIdx, to: CharIdx) -> Result<&mut Self> {
		self.replace(from, to, Slice::empty())
	}

	pub fn add_mark(&mut self, from: CharIdx, to: CharIdx, mark: impl Into<Mark>) -> Result<&mut Self> {
		let mark = mark.into();
		self.step(Step::AddMark { from, to, mark })
	}

	pub fn remove_mark(&mut self, from: CharIdx, to: CharIdx, kind: MarkKind) -> Result<&mut Self> {
		self.step(Step::RemoveMark { from, to, kind })
	}

	/// Replaces the kind and track entries of the block holding `pos`.
	pub fn set_block(
		&mut self,
		pos: CharIdx,
		kind: BlockKind,
		track: Vec<BlockTrack>,
	) -> Result<&mut Self> {
		self.step(Step::SetBlock { pos, kind, track })
	}

	/// Changes the kind of the block holding `pos`, keeping its track entries.
	pub fn set_block_kind(&mut self, pos: CharIdx, kind: BlockKind) -> Result<&mut Self> {
		let (idx, _) = self.doc.resolve(pos)?;
		let track = self.doc.blocks()[idx].track.clone();
		self.set_block(pos, kind, track)
	}

	/// Splits the block holding `pos`; the new block has the same kind and no
	/// track entries.
	pub fn split_block(&mut self, pos: CharIdx) -> Result<&mut Self> {
		let (idx, _) = self.doc.resolve(pos)?;
		let block = Block::new(self.doc.blocks()[idx].kind);
		self.replace(pos, pos, Slice::block_break(block))
	}

	/// Sets the selection after the transaction.
	pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
		self.selection = selection.clamp(self.doc.len());
		self.selection_set = true;
		self
	}

	/// Stores a metadata value.
	pub fn set_meta<T: 'static>(&mut self, key: MetaKey<T>, value: T) -> &mut Self {
		self.meta.insert(key, value);
		self
	}

	pub fn meta<T: 'static>(&self, key: MetaKey<T>) -> Option<&T> {
		self.meta.get(key)
	}

	pub fn has_meta<T: 'static>(&self, key: MetaKey<T>) -> bool {
		self.meta.contains(key)
	}
}
