use redline_primitives::{Block, BlockKind, Doc, Run, Selection, UserId};
use redline_track::SurfaceRole;

use crate::common::{hello_by_user_1, ins, select, workspace};

fn note_by_user_3() -> Doc {
	Doc::new(vec![
		Block::new(BlockKind::Paragraph).with_content(vec![Run::new("note", ins(3))]),
	])
}

#[test]
fn opening_a_note_clears_main_highlights() {
	let (mut ws, _) = workspace(hello_by_user_1(), 2);
	select(ws.main_mut(), Selection::point(1));
	assert!(!ws.main().decorations().is_empty());

	let note = ws.open_note(note_by_user_3());
	assert!(note.tracking());
	assert_eq!(ws.focused(), SurfaceRole::Note);
	assert!(ws.main().decorations().is_empty());
	assert!(ws.colors().color(UserId(3)).is_some());
}

#[test]
fn focus_moves_highlights_between_surfaces() {
	let (mut ws, _) = workspace(hello_by_user_1(), 2);
	ws.open_note(note_by_user_3());
	select(ws.focused_mut(), Selection::point(2));
	assert!(ws.note().is_some_and(|note| !note.decorations().is_empty()));

	ws.focus(SurfaceRole::Main);
	assert_eq!(ws.focused(), SurfaceRole::Main);
	assert!(ws.note().is_some_and(|note| note.decorations().is_empty()));

	select(ws.focused_mut(), Selection::point(2));
	assert!(!ws.main().decorations().is_empty());
}

#[test]
fn closing_the_note_returns_focus_to_main() {
	let (mut ws, _) = workspace(hello_by_user_1(), 2);
	ws.set_tracking(false);
	let note = ws.open_note(note_by_user_3());
	assert!(!note.tracking());

	assert!(ws.close_note().is_some());
	assert_eq!(ws.focused(), SurfaceRole::Main);
	ws.focus(SurfaceRole::Note);
	assert_eq!(ws.focused(), SurfaceRole::Main);
	assert!(ws.close_note().is_none());
}
