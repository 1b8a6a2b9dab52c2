use std::path::Path;
use std::rc::Rc;

use redline_primitives::{Doc, UserId};
use redline_track::{
	Clock, ColorRegistry, FocusCoordinator, SurfaceRole, SystemClock, TrackConfig, TrackPlugin,
};
use tracing::debug;

use crate::view::EditorView;

/// The main body surface, an optional note surface and their shared color
/// registry.
#[derive(Debug)]
pub struct Workspace {
	surfaces: FocusCoordinator<EditorView>,
	colors: ColorRegistry,
	user: UserId,
	config: TrackConfig,
	clock: Rc<dyn Clock>,
}

impl Workspace {
	/// Opens `doc` as the main surface for the local `user`.
	pub fn new(doc: Doc, user: UserId, config: TrackConfig) -> Self {
		Self::with_clock(doc, user, config, Rc::new(SystemClock))
	}

	/// Like [`Workspace::new`], with edit dates taken from `clock`.
	pub fn with_clock(doc: Doc, user: UserId, config: TrackConfig, clock: Rc<dyn Clock>) -> Self {
		Self::with_seeded_colors(doc, user, config, clock, std::iter::empty())
	}

	/// Like [`Workspace::with_clock`], starting from color assignments made by
	/// a collaboration session. Authors of `doc` that are not seeded get the
	/// next free colors.
	pub fn with_seeded_colors(
		doc: Doc,
		user: UserId,
		config: TrackConfig,
		clock: Rc<dyn Clock>,
		assignments: impl IntoIterator<Item = (UserId, usize)>,
	) -> Self {
		let mut colors = ColorRegistry::from_config(&config).with_assignments(assignments);
		let plugin = TrackPlugin::new(user, config.clone()).with_clock(Rc::clone(&clock));
		let main = EditorView::new(doc, plugin, &mut colors);
		Self {
			surfaces: FocusCoordinator::new(main),
			colors,
			user,
			config,
			clock,
		}
	}

	/// Opens `doc` with settings read from a TOML file.
	pub fn load(doc: Doc, user: UserId, config_path: impl AsRef<Path>) -> redline_track::Result<Self> {
		let config = TrackConfig::load(config_path)?;
		Ok(Self::new(doc, user, config))
	}

	fn plugin(&self) -> TrackPlugin {
		TrackPlugin::new(self.user, self.config.clone()).with_clock(Rc::clone(&self.clock))
	}

	pub fn config(&self) -> &TrackConfig {
		&self.config
	}

	pub fn colors(&self) -> &ColorRegistry {
		&self.colors
	}

	/// Seeds color assignments made by a collaboration session after the
	/// surfaces are open. Seeded indices already in use are replaced.
	pub fn seed_colors(&mut self, assignments: impl IntoIterator<Item = (UserId, usize)>) {
		self.colors = std::mem::take(&mut self.colors).with_assignments(assignments);
	}

	pub fn main(&self) -> &EditorView {
		self.surfaces.main()
	}

	pub fn main_mut(&mut self) -> &mut EditorView {
		self.surfaces.main_mut()
	}

	pub fn note(&self) -> Option<&EditorView> {
		self.surfaces.note()
	}

	pub fn note_mut(&mut self) -> Option<&mut EditorView> {
		self.surfaces.note_mut()
	}

	pub fn focused(&self) -> SurfaceRole {
		self.surfaces.focused()
	}

	pub fn focused_mut(&mut self) -> &mut EditorView {
		self.surfaces.focused_mut()
	}

	/// Opens a note editor on `doc`, replacing any open note.
	pub fn open_note(&mut self, doc: Doc) -> &mut EditorView {
		let mut note = EditorView::new(doc, self.plugin(), &mut self.colors);
		note.set_tracking(self.main().tracking());
		debug!(len = note.doc().len(), "editor.note.open");
		self.surfaces.set_note(Some(note));
		self.focus(SurfaceRole::Note);
		self.surfaces.focused_mut()
	}

	/// Closes the note editor and returns it.
	pub fn close_note(&mut self) -> Option<EditorView> {
		let note = self.surfaces.set_note(None);
		if note.is_some() {
			debug!("editor.note.close");
		}
		note
	}

	/// Moves focus to `role`, clearing highlights on the other surface.
	pub fn focus(&mut self, role: SurfaceRole) {
		self.surfaces.focus(role);
	}

	/// Switches suggestion mode on every surface.
	pub fn set_tracking(&mut self, tracking: bool) {
		self.surfaces.main_mut().set_tracking(tracking);
		if let Some(note) = self.surfaces.note_mut() {
			note.set_tracking(tracking);
		}
	}
}
