use super::*;

#[test]
fn point_selection() {
	let sel = Selection::point(5);
	assert_eq!((sel.anchor(), sel.head()), (5, 5));
	assert_eq!(sel, Selection::Text(Range::point(5)));
	assert!(!sel.is_node());
}

#[test]
fn backward_selection_keeps_ends() {
	let sel = Selection::single(10, 4);
	assert_eq!(sel.anchor(), 10);
	assert_eq!(sel.head(), 4);
}

#[test]
fn cursor_follows_typed_text() {
	let cs = ChangeSet::replace(5, 3, 3, 2);
	assert_eq!(Selection::point(3).map(&cs), Selection::point(5));
	assert_eq!(Selection::point(2).map(&cs), Selection::point(2));
}

#[test]
fn selection_collapses_into_deletion() {
	let cs = ChangeSet::replace(10, 2, 6, 0);
	assert_eq!(Selection::single(3, 8).map(&cs), Selection::single(2, 4));
}

#[test]
fn node_selection_stays_before_insertions() {
	let cs = ChangeSet::replace(10, 4, 4, 3);
	assert_eq!(Selection::node(4).map(&cs), Selection::node(4));
	assert!(Selection::node(4).is_node());
}

#[test]
fn clamp_to_length() {
	assert_eq!(Selection::single(2, 9).clamp(4), Selection::single(2, 4));
	assert_eq!(Selection::node(9).clamp(4), Selection::node(4));
}
