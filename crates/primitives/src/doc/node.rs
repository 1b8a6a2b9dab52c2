use serde::{Deserialize, Serialize};

use super::mark::{Marks, TrackAttrs, UserId};
use crate::range::CharLen;

/// The type of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
	#[default]
	Paragraph,
	Heading {
		level: u8,
	},
	Blockquote,
	CodeBlock,
}

/// Kind of a block-level tracked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTrackKind {
	/// The block was created by splitting or inserting.
	Insertion,
	/// The boundary before the block was deleted.
	Deletion,
	/// The block kind was changed; `before` holds the original kind.
	BlockChange,
}

/// One entry of a block's `track` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockTrack {
	#[serde(rename = "type")]
	pub kind: BlockTrackKind,
	#[serde(flatten)]
	pub attrs: TrackAttrs,
	/// Original kind of a [`BlockTrackKind::BlockChange`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub before: Option<BlockKind>,
}

impl BlockTrack {
	pub fn insertion(attrs: TrackAttrs) -> Self {
		Self {
			kind: BlockTrackKind::Insertion,
			attrs,
			before: None,
		}
	}

	pub fn deletion(attrs: TrackAttrs) -> Self {
		Self {
			kind: BlockTrackKind::Deletion,
			attrs,
			before: None,
		}
	}

	pub fn block_change(attrs: TrackAttrs, before: BlockKind) -> Self {
		Self {
			kind: BlockTrackKind::BlockChange,
			attrs,
			before: Some(before),
		}
	}

	pub fn user(&self) -> UserId {
		self.attrs.user
	}
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
	pub text: String,
	#[serde(default)]
	pub marks: Marks,
}

impl Run {
	pub fn new(text: impl Into<String>, marks: Marks) -> Self {
		Self {
			text: text.into(),
			marks,
		}
	}

	pub fn plain(text: impl Into<String>) -> Self {
		Self::new(text, Marks::new())
	}

	/// Length in characters.
	pub fn len(&self) -> CharLen {
		self.text.chars().count()
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	/// Splits the run after `n` characters.
	pub fn split_at(&self, n: CharLen) -> (Run, Run) {
		let byte = self
			.text
			.char_indices()
			.nth(n)
			.map_or(self.text.len(), |(idx, _)| idx);
		let (head, tail) = self.text.split_at(byte);
		(Run::new(head, self.marks.clone()), Run::new(tail, self.marks.clone()))
	}
}

/// A block of inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
	#[serde(default)]
	pub kind: BlockKind,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub track: Vec<BlockTrack>,
	#[serde(default)]
	pub content: Vec<Run>,
}

impl Block {
	/// Creates an empty block of the given kind.
	pub fn new(kind: BlockKind) -> Self {
		Self {
			kind,
			track: Vec::new(),
			content: Vec::new(),
		}
	}

	/// Creates a paragraph holding unmarked text.
	pub fn paragraph(text: &str) -> Self {
		Self::new(BlockKind::Paragraph).with_content(vec![Run::plain(text)])
	}

	pub fn with_content(mut self, content: Vec<Run>) -> Self {
		self.content = normalize_runs(content);
		self
	}

	pub fn with_track(mut self, track: Vec<BlockTrack>) -> Self {
		self.track = track;
		self
	}

	/// Returns a copy of the block attributes without content.
	pub fn header(&self) -> Block {
		Self {
			kind: self.kind,
			track: self.track.clone(),
			content: Vec::new(),
		}
	}

	/// Length of the content in characters.
	pub fn len(&self) -> CharLen {
		runs_len(&self.content)
	}

	pub fn is_empty(&self) -> bool {
		self.content.iter().all(Run::is_empty)
	}

	pub fn text(&self) -> String {
		self.content.iter().map(|run| run.text.as_str()).collect()
	}

	/// Returns the track entry of the given kind.
	pub fn track_entry(&self, kind: BlockTrackKind) -> Option<&BlockTrack> {
		self.track.iter().find(|entry| entry.kind == kind)
	}

	/// Replaces or adds the track entry of the entry's kind.
	pub fn set_track_entry(&mut self, entry: BlockTrack) {
		match self.track.iter_mut().find(|e| e.kind == entry.kind) {
			Some(existing) => *existing = entry,
			None => self.track.push(entry),
		}
	}

	/// Removes the track entry of the given kind.
	pub fn remove_track_entry(&mut self, kind: BlockTrackKind) {
		self.track.retain(|entry| entry.kind != kind);
	}
}

/// Total length of a run list in characters.
pub(crate) fn runs_len(runs: &[Run]) -> CharLen {
	runs.iter().map(Run::len).sum()
}

/// Appends a run, joining it with the previous run when the marks are equal.
pub(crate) fn push_run(runs: &mut Vec<Run>, run: Run) {
	if run.is_empty() {
		return;
	}
	match runs.last_mut() {
		Some(last) if last.marks == run.marks => last.text.push_str(&run.text),
		_ => runs.push(run),
	}
}

/// Joins adjacent runs with equal marks and drops empty runs.
pub(crate) fn normalize_runs(runs: Vec<Run>) -> Vec<Run> {
	let mut out = Vec::with_capacity(runs.len());
	for run in runs {
		push_run(&mut out, run);
	}
	out
}

/// Returns the runs covering the character offsets `[start, end)`.
pub(crate) fn slice_runs(runs: &[Run], start: CharLen, end: CharLen) -> Vec<Run> {
	let mut out = Vec::new();
	let mut offset = 0;
	for run in runs {
		let len = run.len();
		let (run_start, run_end) = (offset, offset + len);
		offset = run_end;
		if run_end <= start || run_start >= end {
			continue;
		}
		let from = start.saturating_sub(run_start);
		let to = end.min(run_end) - run_start;
		if from == 0 && to == len {
			push_run(&mut out, run.clone());
		} else {
			let (_, tail) = run.split_at(from);
			let (mid, _) = tail.split_at(to - from);
			push_run(&mut out, mid);
		}
	}
	out
}

/// Applies `f` to the marks of the runs covering `[start, end)`, splitting
/// runs at the edges as needed.
pub(crate) fn map_runs(
	runs: &[Run],
	start: CharLen,
	end: CharLen,
	mut f: impl FnMut(&mut Marks),
) -> Vec<Run> {
	let total = runs_len(runs);
	let mut out = slice_runs(runs, 0, start);
	for mut run in slice_runs(runs, start, end) {
		f(&mut run.marks);
		push_run(&mut out, run);
	}
	for run in slice_runs(runs, end, total) {
		push_run(&mut out, run);
	}
	out
}
