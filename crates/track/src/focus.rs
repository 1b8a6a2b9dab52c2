//! Keeps highlight state consistent across the main body and note editors.

use redline_primitives::Transaction;
use tracing::trace;

use crate::plugin::deactivate_all_selected_changes;

/// An editor surface that can start and dispatch transactions.
pub trait EditorSurface {
	/// Starts a transaction on the surface's current state.
	fn transaction(&self) -> Transaction;
	fn dispatch(&mut self, tr: Transaction);
}

/// Which surface gained focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
	Main,
	Note,
}

/// Owns the main surface and the optional note surface.
///
/// Only the focused surface shows selected-change highlights: focusing one
/// clears them on the other.
#[derive(Debug)]
pub struct FocusCoordinator<S> {
	main: S,
	note: Option<S>,
	focused: SurfaceRole,
}

impl<S: EditorSurface> FocusCoordinator<S> {
	pub fn new(main: S) -> Self {
		Self {
			main,
			note: None,
			focused: SurfaceRole::Main,
		}
	}

	pub fn main(&self) -> &S {
		&self.main
	}

	pub fn main_mut(&mut self) -> &mut S {
		&mut self.main
	}

	pub fn note(&self) -> Option<&S> {
		self.note.as_ref()
	}

	pub fn note_mut(&mut self) -> Option<&mut S> {
		self.note.as_mut()
	}

	/// Replaces the note surface, returning the previous one.
	pub fn set_note(&mut self, note: Option<S>) -> Option<S> {
		if note.is_none() {
			self.focused = SurfaceRole::Main;
		}
		std::mem::replace(&mut self.note, note)
	}

	pub fn focused(&self) -> SurfaceRole {
		self.focused
	}

	/// Returns the focused surface.
	pub fn focused_mut(&mut self) -> &mut S {
		match (self.focused, self.note.as_mut()) {
			(SurfaceRole::Note, Some(note)) => note,
			_ => &mut self.main,
		}
	}

	/// Records that `role` gained focus and clears the highlights of the
	/// other surface. Focusing the note while none is open does nothing.
	pub fn focus(&mut self, role: SurfaceRole) {
		if role == SurfaceRole::Note && self.note.is_none() {
			trace!("track.focus.no_note");
			return;
		}
		self.focused = role;
		let other = match role {
			SurfaceRole::Main => self.note.as_mut(),
			SurfaceRole::Note => Some(&mut self.main),
		};
		let Some(other) = other else {
			trace!(?role, "track.focus.no_other");
			return;
		};
		let mut tr = other.transaction();
		deactivate_all_selected_changes(&mut tr);
		trace!(?role, "track.focus.deactivate_other");
		other.dispatch(tr);
	}
}
