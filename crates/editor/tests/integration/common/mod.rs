//! Common utilities for editor integration tests.

use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use redline_editor::{EditorView, Workspace};
use redline_primitives::{Block, BlockKind, Doc, Marks, Run, Selection, TrackAttrs, TrackMark, UserId};
use redline_track::{FixedClock, TrackConfig};

pub fn t0() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn attrs(user: u32) -> TrackAttrs {
	TrackAttrs::new(UserId(user), t0())
}

pub fn ins(user: u32) -> Marks {
	Marks::new().with(TrackMark::insertion(attrs(user)))
}

pub fn del(user: u32) -> Marks {
	Marks::new().with(TrackMark::deletion(attrs(user)))
}

/// "Hello" written by user 1 as a tracked insertion.
pub fn hello_by_user_1() -> Doc {
	Doc::new(vec![
		Block::new(BlockKind::Paragraph).with_content(vec![Run::new("Hello", ins(1))]),
	])
}

/// A workspace for `user` with a clock frozen at [`t0`].
pub fn workspace(doc: Doc, user: u32) -> (Workspace, Rc<FixedClock>) {
	workspace_with(doc, user, TrackConfig::default())
}

pub fn workspace_with(doc: Doc, user: u32, config: TrackConfig) -> (Workspace, Rc<FixedClock>) {
	let _ = tracing_subscriber::fmt::try_init();
	let clock = Rc::new(FixedClock::new(t0()));
	let ws = Workspace::with_clock(doc, UserId(user), config, clock.clone());
	(ws, clock)
}

pub fn type_text(view: &mut EditorView, pos: usize, text: &str) {
	let mut tr = view.tr();
	tr.insert_text(pos, text).unwrap();
	tr.set_selection(Selection::point(pos + text.chars().count()));
	view.dispatch(tr);
}

pub fn delete(view: &mut EditorView, from: usize, to: usize) {
	let mut tr = view.tr();
	tr.delete(from, to).unwrap();
	view.dispatch(tr);
}

pub fn select(view: &mut EditorView, selection: Selection) {
	let mut tr = view.tr();
	tr.set_selection(selection);
	view.dispatch(tr);
}

/// Text and marks of every run, in document order.
pub fn runs(doc: &Doc) -> Vec<(String, Marks)> {
	doc.runs()
		.map(|span| (span.run.text.clone(), span.marks().clone()))
		.collect()
}
