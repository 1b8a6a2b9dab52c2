//! The change-tracking plugin: highlight state, color seeding and the
//! corrective pass, bundled for an editor host.

use std::rc::Rc;

use redline_primitives::{DocState, MetaKey, Transaction, TrackKind, UserId};
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::colors::{UserColors, collect_user_ids};
use crate::config::TrackConfig;
use crate::decoration::{
	Decoration, DecorationSet, DecorationSpec, SELECTED_BLOCK_CHANGE_SPEC,
	SELECTED_DELETION_SPEC, SELECTED_FORMAT_CHANGE_SPEC, SELECTED_INSERTION_SPEC,
};
use crate::highlight::{ChangeTarget, SelectedChanges, find_selected_changes};
use crate::normalizer::{NormalizeCtx, append_transaction};

/// Plugin state: the highlight decorations of the selected changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackState {
	pub decos: DecorationSet,
}

/// A transaction carrying a [`TrackState`] here replaces the plugin state
/// with it.
pub const TRACK_KEY: MetaKey<TrackState> = MetaKey::new("redline.track");

/// Change tracking for one editor surface.
#[derive(Debug, Clone)]
pub struct TrackPlugin {
	user: UserId,
	config: TrackConfig,
	clock: Rc<dyn Clock>,
}

impl TrackPlugin {
	/// Creates the plugin for the local `user`.
	pub fn new(user: UserId, config: TrackConfig) -> Self {
		Self {
			user,
			config,
			clock: Rc::new(SystemClock),
		}
	}

	/// Replaces the time source used for edits without an explicit date.
	pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn user(&self) -> UserId {
		self.user
	}

	pub fn config(&self) -> &TrackConfig {
		&self.config
	}

	pub fn clock(&self) -> &dyn Clock {
		&*self.clock
	}

	/// Creates the initial state and makes sure the local user and every
	/// author in the document have a color before the first render.
	pub fn init(&self, state: &DocState, colors: &mut dyn UserColors) -> TrackState {
		let users = collect_user_ids(&state.doc, self.user);
		trace!(users = users.len(), "track.plugin.init");
		for user in users {
			colors.ensure_user_color(user);
		}
		TrackState::default()
	}

	/// Computes the plugin state after `tr`, where `state` is the editor state
	/// the transaction produced.
	///
	/// An explicit selection rebuilds the highlights; other transactions map
	/// the previous highlights through their changes.
	pub fn apply(&self, tr: &Transaction, prev: &TrackState, state: &DocState) -> TrackState {
		if let Some(meta) = tr.meta(TRACK_KEY) {
			trace!(decos = meta.decos.len(), "track.plugin.replace");
			return meta.clone();
		}
		if tr.selection_set() {
			let changes = find_selected_changes(&state.doc, state.selection);
			let decos = decorations_for(&changes, state.selection.is_node());
			trace!(decos = decos.len(), "track.plugin.rebuild");
			return TrackState { decos };
		}
		let decos = prev.decos.map(tr.mapping());
		trace!(before = prev.decos.len(), after = decos.len(), "track.plugin.remap");
		TrackState { decos }
	}

	pub fn decorations<'a>(&self, state: &'a TrackState) -> &'a DecorationSet {
		&state.decos
	}

	/// Runs the corrective pass over transactions just applied.
	pub fn append_transaction(
		&self,
		trs: &[Transaction],
		old: &DocState,
		new: &DocState,
	) -> Option<Transaction> {
		let ctx = NormalizeCtx {
			config: &self.config,
			clock: self.clock(),
		};
		append_transaction(trs, old, new, &ctx)
	}
}

/// Marks `tr` to clear every selected-change highlight.
pub fn deactivate_all_selected_changes(tr: &mut Transaction) -> &mut Transaction {
	tr.set_meta(TRACK_KEY, TrackState::default())
}

/// Builds one decoration per selected change.
pub fn decorations_for(changes: &SelectedChanges, node: bool) -> DecorationSet {
	let decos = changes
		.iter()
		.map(|change| {
			let (class, spec): (&'static str, &'static DecorationSpec) =
				match (change.kind, &change.target) {
					(TrackKind::Insertion, _) => ("selected-insertion", &SELECTED_INSERTION_SPEC),
					(TrackKind::Deletion, _) => ("selected-deletion", &SELECTED_DELETION_SPEC),
					(TrackKind::FormatChange, ChangeTarget::Block(_)) => {
						("selected-format_change", &SELECTED_BLOCK_CHANGE_SPEC)
					}
					(TrackKind::FormatChange, ChangeTarget::Inline(_)) => {
						("selected-format_change", &SELECTED_FORMAT_CHANGE_SPEC)
					}
				};
			if node {
				Decoration::node(change.from, change.to, class, spec)
			} else {
				Decoration::inline(change.from, change.to, class, spec)
			}
		})
		.collect();
	DecorationSet::new(decos)
}
