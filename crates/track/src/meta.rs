//! Transaction metadata read and written by the tracking engine.

use chrono::{DateTime, Utc};
use redline_primitives::{MetaKey, TrackAttrs, UserId};

use crate::clock::Clock;

/// Where an edit came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
	/// Typed on this site.
	#[default]
	Local,
	/// Replayed from a collaborator.
	Remote,
}

/// Who made an edit and whether it is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMeta {
	pub user: UserId,
	/// Display name stored on new marks.
	pub username: String,
	/// Whether the edit is recorded as a suggestion.
	pub tracking: bool,
	/// Time of the edit; the plugin clock is used when absent.
	pub date: Option<DateTime<Utc>>,
	pub origin: Origin,
}

impl EditMeta {
	/// A tracked local edit by `user`.
	pub fn tracked(user: UserId) -> Self {
		Self {
			user,
			username: String::new(),
			tracking: true,
			date: None,
			origin: Origin::Local,
		}
	}

	/// An untracked local edit by `user`.
	pub fn untracked(user: UserId) -> Self {
		Self {
			tracking: false,
			..Self::tracked(user)
		}
	}

	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.username = username.into();
		self
	}

	pub fn at(mut self, date: DateTime<Utc>) -> Self {
		self.date = Some(date);
		self
	}

	pub fn remote(mut self) -> Self {
		self.origin = Origin::Remote;
		self
	}

	/// Attribution for marks created by this edit.
	pub fn attrs(&self, clock: &dyn Clock) -> TrackAttrs {
		TrackAttrs::new(self.user, self.date.unwrap_or_else(|| clock.now()))
			.with_username(self.username.clone())
	}
}

/// Edit metadata of a user transaction.
pub const EDIT_KEY: MetaKey<EditMeta> = MetaKey::new("redline.edit");

/// Marker carried by corrective transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended;

pub const APPENDED_KEY: MetaKey<Appended> = MetaKey::new("redline.appended");
