use super::mark::Marks;
use super::node::{Block, Run, push_run, runs_len, slice_runs};
use crate::range::CharLen;

/// A piece of document content that may cross block boundaries.
///
/// `first` holds the inline content before the first boundary; it joins the
/// block the slice is inserted into. Every block in `rest` starts with a
/// boundary and carries the attributes of the block that boundary opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slice {
	first: Vec<Run>,
	rest: Vec<Block>,
}

impl Slice {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Creates an inline slice from runs.
	pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
		let mut slice = Self::empty();
		for run in runs {
			slice.push_run(run);
		}
		slice
	}

	/// Creates an inline slice holding `text` with the given marks.
	pub fn text(text: &str, marks: Marks) -> Self {
		Self::from_runs([Run::new(text, marks)])
	}

	/// Creates a slice holding a single boundary that opens `block`.
	pub fn block_break(block: Block) -> Self {
		Self {
			first: Vec::new(),
			rest: vec![block],
		}
	}

	pub fn first(&self) -> &[Run] {
		&self.first
	}

	pub fn rest(&self) -> &[Block] {
		&self.rest
	}

	pub(crate) fn into_parts(self) -> (Vec<Run>, Vec<Block>) {
		(self.first, self.rest)
	}

	/// Length in positions: characters plus one per boundary.
	pub fn len(&self) -> CharLen {
		runs_len(&self.first) + self.rest.iter().map(|block| block.len() + 1).sum::<CharLen>()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns true if the slice crosses at least one block boundary.
	pub fn is_open(&self) -> bool {
		!self.rest.is_empty()
	}

	/// Iterates over every run, in document order.
	pub fn runs(&self) -> impl Iterator<Item = &Run> {
		self.first
			.iter()
			.chain(self.rest.iter().flat_map(|block| block.content.iter()))
	}

	/// Text of the slice, with boundaries rendered as newlines.
	pub fn text_content(&self) -> String {
		let mut out: String = self.first.iter().map(|run| run.text.as_str()).collect();
		for block in &self.rest {
			out.push('\n');
			out.push_str(&block.text());
		}
		out
	}

	/// Appends a run to the last part of the slice.
	pub fn push_run(&mut self, run: Run) {
		match self.rest.last_mut() {
			Some(block) => push_run(&mut block.content, run),
			None => push_run(&mut self.first, run),
		}
	}

	/// Appends a boundary opening `block` (its content included).
	pub fn push_block(&mut self, block: Block) {
		self.rest.push(block);
	}

	/// Appends another slice; its inline head joins the last part of `self`.
	pub fn append(&mut self, other: Slice) {
		let (first, rest) = other.into_parts();
		for run in first {
			self.push_run(run);
		}
		self.rest.extend(rest);
	}

	/// Returns the content between the offsets `[start, end)`.
	pub fn cut(&self, start: CharLen, end: CharLen) -> Slice {
		cut_parts(&self.first, &self.rest, start, end)
	}

	/// Returns a copy with every run passed through `f`; a run mapped to
	/// [`None`] is dropped.
	pub fn filter_map_runs(&self, mut f: impl FnMut(&Run) -> Option<Run>) -> Slice {
		let mut out = Slice::empty();
		for run in &self.first {
			if let Some(run) = f(run) {
				out.push_run(run);
			}
		}
		for block in &self.rest {
			out.push_block(block.header());
			for run in &block.content {
				if let Some(run) = f(run) {
					out.push_run(run);
				}
			}
		}
		out
	}
}

/// Cuts `[start, end)` out of content laid out as an inline head followed by
/// boundary-opened blocks.
pub(crate) fn cut_parts(first: &[Run], rest: &[Block], start: CharLen, end: CharLen) -> Slice {
	let mut out = Slice::empty();
	if start >= end {
		return out;
	}

	let head_len = runs_len(first);
	for run in slice_runs(first, start.min(head_len), end.min(head_len)) {
		out.push_run(run);
	}

	let mut offset = head_len;
	for block in rest {
		if offset >= end {
			break;
		}
		let boundary = offset;
		let content_start = boundary + 1;
		let content_end = content_start + block.len();
		offset = content_end;
		if content_end < start {
			continue;
		}
		if boundary >= start {
			out.push_block(block.header());
		}
		let from = start.max(content_start) - content_start;
		let to = end.min(content_end).saturating_sub(content_start);
		if from < to {
			for run in slice_runs(&block.content, from, to) {
				out.push_run(run);
			}
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::doc::node::BlockKind;

	fn two_part() -> Slice {
		let mut slice = Slice::from_runs([Run::plain("ab")]);
		slice.push_block(Block::paragraph("cd"));
		slice
	}

	#[test]
	fn len_counts_boundaries() {
		assert_eq!(two_part().len(), 5);
		assert_eq!(two_part().text_content(), "ab\ncd");
	}

	#[test]
	fn cut_inside_head() {
		assert_eq!(two_part().cut(1, 2), Slice::from_runs([Run::plain("b")]));
	}

	#[test]
	fn cut_across_boundary() {
		let cut = two_part().cut(1, 4);
		assert_eq!(cut.text_content(), "b\nc");
		assert_eq!(cut.rest()[0].kind, BlockKind::Paragraph);
	}

	#[test]
	fn cut_after_boundary_is_inline() {
		let cut = two_part().cut(3, 5);
		assert!(!cut.is_open());
		assert_eq!(cut.text_content(), "cd");
	}

	#[test]
	fn append_joins_inline_head() {
		let mut slice = two_part();
		slice.append(Slice::from_runs([Run::plain("e")]));
		assert_eq!(slice.text_content(), "ab\ncde");
		assert_eq!(slice.rest().len(), 1);
	}
}
