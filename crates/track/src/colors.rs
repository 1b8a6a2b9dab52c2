//! Highlight colors per user.

use indexmap::{IndexMap, IndexSet};
use redline_primitives::{Doc, UserId};
use tracing::trace;

use crate::config::{DEFAULT_PALETTE, TrackConfig};

/// Receives the users whose changes are about to be shown.
pub trait UserColors {
	/// Makes sure `user` has a color. Repeated calls for one user are no-ops.
	fn ensure_user_color(&mut self, user: UserId);
}

/// A color handed out to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorToken {
	/// Assignment order, starting at zero.
	pub index: usize,
	/// Palette entry, `#RRGGBB`.
	pub color: String,
}

impl ColorToken {
	/// CSS class used by the renderer for this user's changes.
	pub fn class_name(&self) -> String {
		format!("user-{}", self.index)
	}
}

/// Assigns colors to users in first-seen order, cycling through a palette.
///
/// Assignments are never removed or changed. The anonymous user gets none.
#[derive(Debug, Clone)]
pub struct ColorRegistry {
	palette: Vec<String>,
	assigned: IndexMap<UserId, ColorToken>,
	next_index: usize,
}

impl Default for ColorRegistry {
	fn default() -> Self {
		Self::new(Vec::new())
	}
}

impl ColorRegistry {
	/// Creates a registry over `palette`; an empty palette means the default.
	pub fn new(palette: Vec<String>) -> Self {
		let palette = if palette.is_empty() {
			DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect()
		} else {
			palette
		};
		Self {
			palette,
			assigned: IndexMap::new(),
			next_index: 0,
		}
	}

	pub fn from_config(config: &TrackConfig) -> Self {
		Self::new(config.palette.clone())
	}

	/// Seeds assignments made elsewhere, such as by a collaboration session.
	///
	/// Users already known keep their color. A seeded index another user
	/// already holds is replaced by the next free one.
	pub fn with_assignments(mut self, assignments: impl IntoIterator<Item = (UserId, usize)>) -> Self {
		for (user, index) in assignments {
			if user.is_anonymous() || self.assigned.contains_key(&user) {
				continue;
			}
			let index = if self.assigned.values().any(|token| token.index == index) {
				trace!(%user, index, next = self.next_index, "track.colors.reassign");
				self.next_index
			} else {
				index
			};
			let token = self.token(index);
			self.assigned.insert(user, token);
			self.next_index = self.next_index.max(index + 1);
		}
		self
	}

	fn token(&self, index: usize) -> ColorToken {
		ColorToken {
			index,
			color: self.palette[index % self.palette.len()].clone(),
		}
	}

	pub fn color(&self, user: UserId) -> Option<&ColorToken> {
		self.assigned.get(&user)
	}

	pub fn len(&self) -> usize {
		self.assigned.len()
	}

	pub fn is_empty(&self) -> bool {
		self.assigned.is_empty()
	}

	/// Assignments in the order they were made.
	pub fn iter(&self) -> impl Iterator<Item = (UserId, &ColorToken)> {
		self.assigned.iter().map(|(user, token)| (*user, token))
	}
}

impl UserColors for ColorRegistry {
	fn ensure_user_color(&mut self, user: UserId) {
		if user.is_anonymous() || self.assigned.contains_key(&user) {
			return;
		}
		let token = self.token(self.next_index);
		trace!(%user, index = token.index, color = %token.color, "track.colors.assign");
		self.assigned.insert(user, token);
		self.next_index += 1;
	}
}

/// Lists the users that need a color before `doc` is first shown: the local
/// user, then every author in the document in document order.
pub fn collect_user_ids(doc: &Doc, local_user: UserId) -> Vec<UserId> {
	let mut users = IndexSet::new();
	users.insert(local_user);
	for block in doc.blocks() {
		users.extend(block.track.iter().map(|entry| entry.user()));
		for run in &block.content {
			users.extend(run.marks.track().iter().map(|mark| mark.user()));
		}
	}
	users.into_iter().filter(|user| !user.is_anonymous()).collect()
}
