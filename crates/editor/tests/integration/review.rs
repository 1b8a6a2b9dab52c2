use pretty_assertions::assert_eq;
use redline_primitives::{Doc, FormatMark, Marks, Selection, TrackKind};
use redline_track::{SelectedChange, accept_all, accept_changes, find_selected_changes, reject_all};

use crate::common::{del, delete, runs, select, type_text, workspace};

/// "The very quick fox" where user 1 typed "very " and deleted "quick ".
fn reviewed_workspace() -> redline_editor::Workspace {
	let (mut ws, _) = workspace(Doc::from_text("The quick fox"), 1);
	let view = ws.main_mut();
	type_text(view, 4, "very ");
	delete(view, 9, 15);
	assert_eq!(view.doc().text(), "The very quick fox");
	ws
}

#[test]
fn rejecting_everything_restores_the_original() {
	let mut ws = reviewed_workspace();
	let view = ws.main_mut();
	let tr = reject_all(&view.state().doc).unwrap().unwrap();
	view.dispatch(tr);
	assert_eq!(view.doc(), &Doc::from_text("The quick fox"));
}

#[test]
fn accepting_everything_applies_the_edits() {
	let mut ws = reviewed_workspace();
	let view = ws.main_mut();
	let tr = accept_all(&view.state().doc).unwrap().unwrap();
	view.dispatch(tr);
	assert_eq!(view.doc(), &Doc::from_text("The very fox"));
	assert!(accept_all(&view.state().doc).unwrap().is_none());
}

#[test]
fn selected_insertion_is_accepted_alone() {
	let mut ws = reviewed_workspace();
	let view = ws.main_mut();
	select(view, Selection::point(6));
	let changes = find_selected_changes(view.doc(), view.selection());
	let Some(SelectedChange { from, to, .. }) = changes.insertion else {
		panic!("no insertion under the cursor");
	};
	assert_eq!((from, to), (4, 9));

	let tr = accept_changes(&view.state().doc, from, to, Some(TrackKind::Insertion))
		.unwrap()
		.unwrap();
	view.dispatch(tr);
	assert_eq!(
		runs(view.doc()),
		vec![
			("The very ".to_string(), Marks::new()),
			("quick ".to_string(), del(1)),
			("fox".to_string(), Marks::new()),
		]
	);
}

#[test]
fn rejecting_tracked_formatting_restores_plain_text() {
	let (mut ws, _) = workspace(Doc::from_text("bold"), 1);
	let view = ws.main_mut();
	let mut tr = view.tr();
	tr.add_mark(0, 4, FormatMark::Strong).unwrap();
	view.dispatch(tr);
	assert!(view.doc().runs().all(|span| span.marks().format_change().is_some()));

	let tr = reject_all(&view.state().doc).unwrap().unwrap();
	view.dispatch(tr);
	assert_eq!(view.doc(), &Doc::from_text("bold"));
}

#[test]
fn rejecting_a_tracked_split_joins_the_blocks() {
	let (mut ws, _) = workspace(Doc::from_text("abcd"), 1);
	let view = ws.main_mut();
	let mut tr = view.tr();
	tr.split_block(2).unwrap();
	view.dispatch(tr);
	assert_eq!(view.doc().blocks().len(), 2);

	let tr = reject_all(&view.state().doc).unwrap().unwrap();
	view.dispatch(tr);
	assert_eq!(view.doc(), &Doc::from_text("abcd"));
}
