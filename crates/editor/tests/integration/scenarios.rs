use std::rc::Rc;

use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use redline_editor::Workspace;
use redline_primitives::{
	Block, BlockKind, BlockTrack, BlockTrackKind, Doc, FormatMark, Marks, Run, Selection,
	TrackAttrs, TrackMark, Transaction, UserId,
};
use redline_track::{
	DecorationKind, EDIT_KEY, EditMeta, FixedClock, TrackConfig, find_violations,
};

use crate::common::{
	attrs, del, delete, hello_by_user_1, ins, runs, select, t0, type_text, workspace,
	workspace_with,
};

fn decos(view: &redline_editor::EditorView) -> Vec<(usize, usize, &'static str)> {
	view.decorations().iter().map(|d| (d.from, d.to, d.class)).collect()
}

#[test]
fn typed_character_is_highlighted_alone() {
	let (mut ws, _) = workspace(hello_by_user_1(), 2);
	let users: Vec<_> = ws.colors().iter().map(|(user, _)| user).collect();
	assert_eq!(users, vec![UserId(2), UserId(1)]);

	type_text(ws.main_mut(), 3, "X");
	assert_eq!(
		runs(ws.main().doc()),
		vec![
			("Hel".to_string(), ins(1)),
			("X".to_string(), ins(2)),
			("lo".to_string(), ins(1)),
		]
	);

	select(ws.main_mut(), Selection::single(3, 4));
	assert_eq!(decos(ws.main()), vec![(3, 4, "selected-insertion")]);
}

#[test]
fn deleting_own_insertion_leaves_no_trace() {
	let (mut ws, _) = workspace(Doc::from_text("ab"), 1);
	type_text(ws.main_mut(), 1, "foo");
	assert_eq!(ws.main().doc().text(), "afoob");
	delete(ws.main_mut(), 1, 4);
	assert_eq!(ws.main().doc(), &Doc::from_text("ab"));
}

#[test]
fn deleting_another_users_text_marks_it() {
	let (mut ws, _) = workspace(hello_by_user_1(), 2);
	delete(ws.main_mut(), 0, 2);
	assert_eq!(
		runs(ws.main().doc()),
		vec![
			("He".to_string(), ins(1).with(TrackMark::deletion(attrs(2)))),
			("llo".to_string(), ins(1)),
		]
	);

	select(ws.main_mut(), Selection::point(1));
	assert_eq!(
		decos(ws.main()),
		vec![(0, 2, "selected-deletion"), (0, 5, "selected-insertion")]
	);
}

#[test]
fn dispatch_converges_in_one_round() {
	let (mut ws, _) = workspace(Doc::from_text("ab"), 1);
	let view = ws.main_mut();
	let mut tr = view.tr();
	tr.insert_text(2, "c").unwrap();
	let report = view.dispatch(tr);
	assert_eq!(report.corrective_rounds, 1);
	assert!(!report.reached_round_cap);

	let mut tr = view.tr();
	tr.set_selection(Selection::point(0));
	assert!(!view.dispatch(tr).corrected());
}

#[test]
fn edits_in_one_bucket_merge() {
	let (mut ws, clock) = workspace(Doc::from_text(""), 1);
	type_text(ws.main_mut(), 0, "ab");
	clock.advance(TimeDelta::minutes(3));
	type_text(ws.main_mut(), 2, "cd");
	assert_eq!(runs(ws.main().doc()), vec![("abcd".to_string(), ins(1))]);
}

#[test]
fn remote_and_local_delivery_agree() {
	let date = t0() + TimeDelta::minutes(1);
	let edit = |tr: &mut Transaction| {
		tr.delete(6, 11).unwrap();
		tr.insert_text(6, "there").unwrap();
	};

	let (mut local, _) = workspace(Doc::from_text("Hello world"), 1);
	let mut tr = local.main().tr();
	edit(&mut tr);
	tr.set_meta(EDIT_KEY, EditMeta::tracked(UserId(1)).at(date));
	local.main_mut().dispatch(tr);

	let (mut remote, clock) = workspace(Doc::from_text("Hello world"), 2);
	clock.advance(TimeDelta::hours(5));
	let mut tr = remote.main().tr();
	edit(&mut tr);
	tr.set_meta(EDIT_KEY, EditMeta::tracked(UserId(1)).at(date).remote());
	remote.main_mut().dispatch(tr);

	let doc = local.main().doc();
	assert_eq!(doc, remote.main().doc());
	assert!(find_violations(doc, &TrackConfig::default()).is_empty());
	let dated = TrackAttrs::new(UserId(1), date);
	assert_eq!(
		runs(doc),
		vec![
			("Hello ".to_string(), Marks::new()),
			("world".to_string(), Marks::new().with(TrackMark::deletion(dated.clone()))),
			("there".to_string(), Marks::new().with(TrackMark::insertion(dated))),
		]
	);
}

#[test]
fn formatting_tracking_follows_config() {
	let config = TrackConfig::from_toml_str("track-formatting = false").unwrap();
	let (mut ws, _) = workspace_with(Doc::from_text("abc"), 1, config);
	let view = ws.main_mut();
	let mut tr = view.tr();
	tr.add_mark(0, 3, FormatMark::Strong).unwrap();
	view.dispatch(tr);
	assert_eq!(
		runs(view.doc()),
		vec![("abc".to_string(), Marks::from_formats([FormatMark::Strong]))]
	);
}

#[test]
fn split_block_is_highlighted_as_node() {
	let (mut ws, _) = workspace(Doc::from_text("abcd"), 1);
	let view = ws.main_mut();
	let mut tr = view.tr();
	tr.split_block(2).unwrap();
	view.dispatch(tr);
	assert_eq!(
		view.doc().blocks()[1].track_entry(BlockTrackKind::Insertion),
		Some(&BlockTrack::insertion(attrs(1)))
	);

	select(view, Selection::node(4));
	let found: Vec<_> = view.decorations().iter().map(|d| (d.from, d.to, d.kind)).collect();
	assert_eq!(found, vec![(3, 5, DecorationKind::Node)]);
}

#[test]
fn backspace_keeps_cursor_before_deleted_text() {
	let (mut ws, _) = workspace(Doc::from_text("abc"), 1);
	let view = ws.main_mut();
	select(view, Selection::point(3));
	for _ in 0..2 {
		let head = view.selection().head();
		delete(view, head - 1, head);
	}
	assert_eq!(view.selection(), Selection::point(1));
	assert_eq!(
		runs(view.doc()),
		vec![("a".to_string(), Marks::new()), ("bc".to_string(), del(1))]
	);
}

#[test]
fn seeded_colors_stay_distinct() {
	let doc = Doc::new(vec![
		Block::new(BlockKind::Paragraph).with_content(vec![Run::new("text", ins(3))]),
	]);
	let clock = Rc::new(FixedClock::new(t0()));
	let mut ws = Workspace::with_seeded_colors(
		doc,
		UserId(1),
		TrackConfig::default(),
		clock,
		[(UserId(5), 0)],
	);
	ws.seed_colors([(UserId(7), 1), (UserId(3), 0)]);

	let assigned: Vec<_> = ws.colors().iter().map(|(user, token)| (user, token.index)).collect();
	assert_eq!(
		assigned,
		vec![(UserId(5), 0), (UserId(1), 1), (UserId(3), 2), (UserId(7), 3)]
	);
	let mut colors: Vec<_> = ws.colors().iter().map(|(_, token)| token.color.clone()).collect();
	colors.sort();
	colors.dedup();
	assert_eq!(colors.len(), 4);
}
