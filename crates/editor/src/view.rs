use redline_primitives::{Doc, DocState, Selection, Transaction, UserId};
use redline_track::{
	DecorationSet, EDIT_KEY, EditMeta, EditorSurface, TrackPlugin, TrackState, UserColors,
};
use tracing::{trace, trace_span, warn};

use crate::dispatch::{DispatchReport, MAX_APPEND_ROUNDS};

/// Document state plus change-tracking plugin state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
	pub doc: DocState,
	pub track: TrackState,
}

/// One editing surface.
#[derive(Debug)]
pub struct EditorView {
	state: EditorState,
	plugin: TrackPlugin,
	tracking: bool,
	username: String,
}

impl EditorView {
	/// Opens `doc` and makes sure every author in it has a color.
	pub fn new(doc: Doc, plugin: TrackPlugin, colors: &mut dyn UserColors) -> Self {
		let doc = DocState::new(doc);
		let track = plugin.init(&doc, colors);
		Self {
			state: EditorState { doc, track },
			plugin,
			tracking: true,
			username: String::new(),
		}
	}

	pub fn state(&self) -> &EditorState {
		&self.state
	}

	pub fn doc(&self) -> &Doc {
		&self.state.doc.doc
	}

	pub fn selection(&self) -> Selection {
		self.state.doc.selection
	}

	pub fn decorations(&self) -> &DecorationSet {
		self.plugin.decorations(&self.state.track)
	}

	pub fn plugin(&self) -> &TrackPlugin {
		&self.plugin
	}

	pub fn user(&self) -> UserId {
		self.plugin.user()
	}

	pub fn tracking(&self) -> bool {
		self.tracking
	}

	/// Switches suggestion mode on or off for later transactions.
	pub fn set_tracking(&mut self, tracking: bool) {
		self.tracking = tracking;
	}

	pub fn set_username(&mut self, username: impl Into<String>) {
		self.username = username.into();
	}

	/// Starts a transaction attributed to the local user.
	pub fn tr(&self) -> Transaction {
		let meta = if self.tracking {
			EditMeta::tracked(self.user())
		} else {
			EditMeta::untracked(self.user())
		};
		let mut tr = self.state.doc.tr();
		tr.set_meta(EDIT_KEY, meta.with_username(self.username.clone()));
		tr
	}

	/// Applies `tr`, then corrective transactions until none is needed.
	pub fn dispatch(&mut self, tr: Transaction) -> DispatchReport {
		let _span = trace_span!(
			"editor.dispatch",
			user = %self.user(),
			steps = tr.steps().len(),
			selection_set = tr.selection_set(),
		)
		.entered();

		let mut report = DispatchReport::default();
		let mut before = self.state.doc.clone();
		self.apply(&tr);
		let mut batch = vec![tr];

		for round in 0..MAX_APPEND_ROUNDS {
			let _round_span = trace_span!("editor.append_round", round).entered();
			let Some(fix) = self.plugin.append_transaction(&batch, &before, &self.state.doc) else {
				break;
			};
			report.corrective_rounds += 1;
			before = self.state.doc.clone();
			self.apply(&fix);
			batch = vec![fix];
			if round + 1 == MAX_APPEND_ROUNDS {
				report.reached_round_cap = true;
				warn!(rounds = MAX_APPEND_ROUNDS, "editor.dispatch.round_cap");
			}
		}

		trace!(
			rounds = report.corrective_rounds,
			len = self.doc().len(),
			decos = self.decorations().len(),
			"editor.dispatch.done"
		);
		report
	}

	fn apply(&mut self, tr: &Transaction) {
		let doc = self.state.doc.apply(tr);
		let track = self.plugin.apply(tr, &self.state.track, &doc);
		self.state = EditorState { doc, track };
	}
}

impl EditorSurface for EditorView {
	fn transaction(&self) -> Transaction {
		self.tr()
	}

	fn dispatch(&mut self, tr: Transaction) {
		EditorView::dispatch(self, tr);
	}
}

#[cfg(test)]
mod tests {
	use redline_track::{ColorRegistry, TrackConfig};

	use super::*;

	fn view(text: &str) -> EditorView {
		let plugin = TrackPlugin::new(UserId(1), TrackConfig::default());
		EditorView::new(Doc::from_text(text), plugin, &mut ColorRegistry::default())
	}

	#[test]
	fn tracked_typing_needs_one_round() {
		let mut view = view("ab");
		let mut tr = view.tr();
		tr.insert_text(2, "c").unwrap();
		let report = view.dispatch(tr);
		assert_eq!(report.corrective_rounds, 1);
		assert!(!report.reached_round_cap);
		assert!(view.doc().runs().any(|span| span.marks().insertion().is_some()));
	}

	#[test]
	fn untracked_typing_needs_no_round() {
		let mut view = view("ab");
		view.set_tracking(false);
		let mut tr = view.tr();
		tr.insert_text(2, "c").unwrap();
		assert!(!view.dispatch(tr).corrected());
		assert_eq!(view.doc(), &Doc::from_text("abc"));
	}

	#[test]
	fn transactions_carry_username() {
		let mut view = view("ab");
		view.set_username("Ada");
		let tr = view.tr();
		let meta = tr.meta(EDIT_KEY).cloned();
		assert_eq!(meta.map(|m| (m.user, m.username, m.tracking)), Some((UserId(1), "Ada".into(), true)));
	}
}
