//! Document model: blocks of marked text runs addressed by flat positions.
//!
//! Block `k`'s content starts one position after block `k - 1`'s content
//! ends; the position in between is the boundary. A document of blocks
//! `"ab"` and `"cd"` therefore has length 5:
//!
//! ```text
//!  a b | c d
//! 0 1 2 3 4 5
//! ```
//!
//! Every mutation keeps runs canonical: adjacent runs with equal marks are
//! joined and empty runs are dropped.

mod mark;
mod node;
mod slice;


pub use mark::{
	DeletionMark, FormatChangeMark, FormatMark, Formats, InsertionMark, Mark, MarkKind, Marks,
	TrackAttrs, TrackKind, TrackMark, UserId,
};
pub use node::{Block, BlockKind, BlockTrack, BlockTrackKind, Run};
use node::{map_runs, normalize_runs, push_run, slice_runs};
use serde::{Deserialize, Serialize};
pub use slice::Slice;
use slice::cut_parts;

use crate::error::StepError;
use crate::range::{CharIdx, CharLen};

/// A run together with its absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan<'a> {
	/// Index of the block holding the run.
	pub block: usize,
	/// Absolute start of the run.
	pub from: CharIdx,
	/// Absolute end of the run (exclusive).
	pub to: CharIdx,
	pub run: &'a Run,
}

impl RunSpan<'_> {
	pub fn marks(&self) -> &Marks {
		&self.run.marks
	}
}

/// A rich-text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDoc", into = "RawDoc")]
pub struct Doc {
	/// Always holds at least one block.
	blocks: Vec<Block>,
}

#[derive(Serialize, Deserialize)]
struct RawDoc {
	#[serde(default)]
	blocks: Vec<Block>,
}

impl From<RawDoc> for Doc {
	fn from(raw: RawDoc) -> Self {
		let blocks = raw
			.blocks
			.into_iter()
			.map(|mut block| {
				let content = std::mem::take(&mut block.content)
					.into_iter()
					.map(|run| Run::new(run.text, run.marks.canonical()))
					.collect();
				block.with_content(content)
			})
			.collect();
		Doc::new(blocks)
	}
}

impl From<Doc> for RawDoc {
	fn from(doc: Doc) -> Self {
		RawDoc { blocks: doc.blocks }
	}
}

impl Default for Doc {
	fn default() -> Self {
		Self::new(Vec::new())
	}
}

impl Doc {
	/// Creates a document; an empty block list becomes one empty paragraph.
	pub fn new(blocks: Vec<Block>) -> Self {
		let mut blocks: Vec<Block> = blocks
			.into_iter()
			.map(|block| {
				let content = normalize_runs(block.content.clone());
				Block { content, ..block }
			})
			.collect();
		if blocks.is_empty() {
			blocks.push(Block::new(BlockKind::Paragraph));
		}
		Self { blocks }
	}

	/// Creates a document of unmarked paragraphs, one per line.
	pub fn from_text(text: &str) -> Self {
		Self::new(text.split('\n').map(Block::paragraph).collect())
	}

	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	pub fn block(&self, idx: usize) -> Option<&Block> {
		self.blocks.get(idx)
	}

	/// Length in positions: characters plus one per boundary.
	pub fn len(&self) -> CharLen {
		self.blocks.iter().map(Block::len).sum::<CharLen>() + self.blocks.len() - 1
	}

	/// A document is empty when it holds a single empty block.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Text of the document, with boundaries rendered as newlines.
	pub fn text(&self) -> String {
		self.blocks.iter().map(Block::text).collect::<Vec<_>>().join("\n")
	}

	/// Text between two positions, with boundaries rendered as newlines.
	pub fn text_between(&self, from: CharIdx, to: CharIdx) -> String {
		self.slice(from, to).map(|s| s.text_content()).unwrap_or_default()
	}

	/// Returns the content range `[start, end)` of every block.
	pub fn block_ranges(&self) -> Vec<(CharIdx, CharIdx)> {
		let mut ranges = Vec::with_capacity(self.blocks.len());
		let mut start = 0;
		for block in &self.blocks {
			let end = start + block.len();
			ranges.push((start, end));
			start = end + 1;
		}
		ranges
	}

	/// Returns the content range of block `idx`.
	pub fn block_range(&self, idx: usize) -> Option<(CharIdx, CharIdx)> {
		let block = self.blocks.get(idx)?;
		let start: CharLen = self.blocks[..idx].iter().map(|block| block.len() + 1).sum();
		Some((start, start + block.len()))
	}

	/// Resolves a position to a block index and an offset into its content.
	///
	/// A boundary position resolves to the end of the preceding block.
	pub fn resolve(&self, pos: CharIdx) -> Result<(usize, CharLen), StepError> {
		let mut start = 0;
		for (idx, block) in self.blocks.iter().enumerate() {
			let end = start + block.len();
			if pos <= end {
				return Ok((idx, pos - start));
			}
			start = end + 1;
		}
		Err(StepError::OutOfRange {
			pos,
			len: self.len(),
		})
	}

	/// Returns the index of the block whose content holds `pos`.
	pub fn block_index_at(&self, pos: CharIdx) -> Option<usize> {
		self.resolve(pos).ok().map(|(idx, _)| idx)
	}

	/// Returns the boundary position in front of block `idx` (for `idx > 0`).
	pub fn boundary_before(&self, idx: usize) -> Option<CharIdx> {
		if idx == 0 {
			return None;
		}
		self.block_range(idx).map(|(start, _)| start - 1)
	}

	/// Iterates over every run with its absolute position, in document order.
	pub fn runs(&self) -> impl Iterator<Item = RunSpan<'_>> {
		self.block_ranges()
			.into_iter()
			.zip(&self.blocks)
			.enumerate()
			.flat_map(|(idx, ((start, _), block))| block_spans(idx, start, block))
	}

	/// Returns the runs of block `idx` with their absolute positions.
	pub fn block_runs(&self, idx: usize) -> Vec<RunSpan<'_>> {
		match (self.blocks.get(idx), self.block_range(idx)) {
			(Some(block), Some((start, _))) => block_spans(idx, start, block).collect(),
			_ => Vec::new(),
		}
	}

	/// Returns every run intersecting `[from, to)`.
	pub fn runs_between(&self, from: CharIdx, to: CharIdx) -> Vec<RunSpan<'_>> {
		let Some(first) = self.block_index_at(from) else {
			return Vec::new();
		};
		let Some((mut start, _)) = self.block_range(first) else {
			return Vec::new();
		};
		let mut spans = Vec::new();
		for (idx, block) in self.blocks.iter().enumerate().skip(first) {
			if start >= to {
				break;
			}
			spans.extend(block_spans(idx, start, block).filter(|span| span.from < to && span.to > from));
			start += block.len() + 1;
		}
		spans
	}

	/// Returns the run holding the character right after `pos`, within the
	/// block of `pos`.
	pub fn run_after(&self, pos: CharIdx) -> Option<RunSpan<'_>> {
		let block = self.block_index_at(pos)?;
		self.block_runs(block)
			.into_iter()
			.find(|span| span.from <= pos && pos < span.to)
	}

	/// Returns the run holding the character right before `pos`, within the
	/// block of `pos`.
	pub fn run_before(&self, pos: CharIdx) -> Option<RunSpan<'_>> {
		let block = self.block_index_at(pos)?;
		self.block_runs(block)
			.into_iter()
			.find(|span| span.from < pos && pos <= span.to)
	}

	/// Marks that text typed at `pos` inherits: those of the character
	/// before it, or after it at the start of a block.
	pub fn marks_at(&self, pos: CharIdx) -> Marks {
		self.run_before(pos)
			.or_else(|| self.run_after(pos))
			.map(|span| span.run.marks.clone())
			.unwrap_or_default()
	}

	fn check_range(&self, from: CharIdx, to: CharIdx) -> Result<(), StepError> {
		if from > to {
			return Err(StepError::InvalidRange { from, to });
		}
		let len = self.len();
		if to > len {
			return Err(StepError::OutOfRange { pos: to, len });
		}
		Ok(())
	}

	/// Returns the content between two positions.
	pub fn slice(&self, from: CharIdx, to: CharIdx) -> Result<Slice, StepError> {
		self.check_range(from, to)?;
		Ok(match self.blocks.split_first() {
			Some((head, rest)) => cut_parts(&head.content, rest, from, to),
			None => Slice::empty(),
		})
	}

	/// Replaces `[from, to)` with `slice`.
	///
	/// Deleting a boundary joins two blocks; the joined block keeps the
	/// attributes of the first. Each boundary in the slice opens a block with
	/// the slice's attributes, and the content after `to` ends up in the last
	/// of them.
	pub(crate) fn replace(
		&mut self,
		from: CharIdx,
		to: CharIdx,
		slice: &Slice,
	) -> Result<(), StepError> {
		self.check_range(from, to)?;
		let (start_block, start_offset) = self.resolve(from)?;
		let (end_block, end_offset) = self.resolve(to)?;

		let start = &self.blocks[start_block];
		let end = &self.blocks[end_block];
		let mut head = start.header();
		head.content = slice_runs(&start.content, 0, start_offset);
		let tail = slice_runs(&end.content, end_offset, end.len());

		let mut replacement = vec![head];
		for run in slice.first() {
			push_run(&mut replacement[0].content, run.clone());
		}
		replacement.extend(slice.rest().iter().cloned());
		if let Some(last) = replacement.last_mut() {
			for run in tail {
				push_run(&mut last.content, run);
			}
		}

		self.blocks.splice(start_block..=end_block, replacement);
		Ok(())
	}

	/// Applies `f` to the marks of every character in `[from, to)`.
	pub(crate) fn update_marks(
		&mut self,
		from: CharIdx,
		to: CharIdx,
		mut f: impl FnMut(&mut Marks),
	) -> Result<(), StepError> {
		self.check_range(from, to)?;
		for (idx, (start, end)) in self.block_ranges().into_iter().enumerate() {
			if end < from || start >= to {
				continue;
			}
			let local_from = from.max(start) - start;
			let local_to = to.min(end).max(start) - start;
			if local_from >= local_to {
				continue;
			}
			let block = &mut self.blocks[idx];
			block.content = map_runs(&block.content, local_from, local_to, &mut f);
		}
		Ok(())
	}

	/// Replaces the attributes of the block holding `pos`.
	pub(crate) fn set_block(
		&mut self,
		pos: CharIdx,
		kind: BlockKind,
		track: Vec<BlockTrack>,
	) -> Result<Block, StepError> {
		let (idx, _) = self.resolve(pos)?;
		let block = &mut self.blocks[idx];
		let previous = block.header();
		block.kind = kind;
		block.track = track;
		Ok(previous)
	}
}

/// Runs of `block`, which starts at `start`, with absolute positions.
fn block_spans(idx: usize, start: CharIdx, block: &Block) -> impl Iterator<Item = RunSpan<'_>> {
	let mut offset = start;
	block.content.iter().map(move |run| {
		let from = offset;
		offset += run.len();
		RunSpan {
			block: idx,
			from,
			to: offset,
			run,
		}
	})
}
