use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Identifier of a document author.
///
/// `0` is reserved for the anonymous/system author: it is what a mark without
/// a `user` field decodes to, and it never receives a highlight color.
#[derive(
	Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl UserId {
	/// The anonymous/system author.
	pub const ANONYMOUS: UserId = UserId(0);

	/// Returns true for the anonymous/system author.
	#[inline]
	pub fn is_anonymous(self) -> bool {
		self == Self::ANONYMOUS
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Inline formatting marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatMark {
	Strong,
	Emphasis,
	Underline,
	Strikethrough,
	Code,
	Superscript,
	Subscript,
}

/// A sorted, duplicate-free set of formatting marks.
pub type Formats = SmallVec<[FormatMark; 2]>;

/// Author and time of a tracked edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackAttrs {
	/// Acting user; absent in malformed input and then anonymous.
	#[serde(default)]
	pub user: UserId,
	/// Display name of the acting user at the time of the edit.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub username: String,
	/// Time of the edit; absent in malformed input and then the Unix epoch.
	#[serde(default)]
	pub date: DateTime<Utc>,
}

impl TrackAttrs {
	pub fn new(user: UserId, date: DateTime<Utc>) -> Self {
		Self {
			user,
			username: String::new(),
			date,
		}
	}

	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.username = username.into();
		self
	}
}

/// Attribution of inserted content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsertionMark {
	#[serde(flatten)]
	pub attrs: TrackAttrs,
	/// Approved insertions never cancel against a later deletion.
	#[serde(default)]
	pub approved: bool,
}

/// Attribution of deleted content that is still shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeletionMark {
	#[serde(flatten)]
	pub attrs: TrackAttrs,
}

/// Attribution of a formatting change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatChangeMark {
	#[serde(flatten)]
	pub attrs: TrackAttrs,
	/// Formatting before the first unacknowledged change.
	///
	/// [`None`] only for malformed input; such marks never merge.
	#[serde(default)]
	pub before: Option<Formats>,
	/// Formatting after the latest change.
	#[serde(default)]
	pub after: Formats,
}

/// The three kinds of attribution marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackKind {
	Insertion,
	Deletion,
	FormatChange,
}

impl TrackKind {
	/// Every kind, in canonical order.
	pub const ALL: [TrackKind; 3] = [TrackKind::Insertion, TrackKind::Deletion, TrackKind::FormatChange];

	/// Schema name of the kind.
	pub fn name(self) -> &'static str {
		match self {
			TrackKind::Insertion => "insertion",
			TrackKind::Deletion => "deletion",
			TrackKind::FormatChange => "format_change",
		}
	}
}

impl fmt::Display for TrackKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// An attribution mark: who changed this content, when, and how.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "snake_case")]
pub enum TrackMark {
	Insertion(InsertionMark),
	Deletion(DeletionMark),
	FormatChange(FormatChangeMark),
}

impl TrackMark {
	pub fn insertion(attrs: TrackAttrs) -> Self {
		TrackMark::Insertion(InsertionMark {
			attrs,
			approved: false,
		})
	}

	pub fn deletion(attrs: TrackAttrs) -> Self {
		TrackMark::Deletion(DeletionMark { attrs })
	}

	pub fn format_change(attrs: TrackAttrs, before: Formats, after: Formats) -> Self {
		TrackMark::FormatChange(FormatChangeMark {
			attrs,
			before: Some(before),
			after,
		})
	}

	pub fn kind(&self) -> TrackKind {
		match self {
			TrackMark::Insertion(_) => TrackKind::Insertion,
			TrackMark::Deletion(_) => TrackKind::Deletion,
			TrackMark::FormatChange(_) => TrackKind::FormatChange,
		}
	}

	pub fn attrs(&self) -> &TrackAttrs {
		match self {
			TrackMark::Insertion(mark) => &mark.attrs,
			TrackMark::Deletion(mark) => &mark.attrs,
			TrackMark::FormatChange(mark) => &mark.attrs,
		}
	}

	pub fn user(&self) -> UserId {
		self.attrs().user
	}
}

/// Any mark that can be attached to a run of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
	Format(FormatMark),
	Track(TrackMark),
}

impl Mark {
	pub fn kind(&self) -> MarkKind {
		match self {
			Mark::Format(format) => MarkKind::Format(*format),
			Mark::Track(track) => MarkKind::Track(track.kind()),
		}
	}
}

impl From<FormatMark> for Mark {
	fn from(format: FormatMark) -> Self {
		Mark::Format(format)
	}
}

impl From<TrackMark> for Mark {
	fn from(track: TrackMark) -> Self {
		Mark::Track(track)
	}
}

/// Identifies the mark a removal applies to.
///
/// A run holds at most one attribution mark per kind, so the kind alone
/// identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
	Format(FormatMark),
	Track(TrackKind),
}

/// The marks carried by a run of text.
///
/// Formatting marks are kept sorted and unique; attribution marks are kept in
/// [`TrackKind`] order with at most one per kind. Two `Marks` compare equal
/// exactly when they would render and attribute identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
	#[serde(default, skip_serializing_if = "SmallVec::is_empty")]
	formats: Formats,
	#[serde(default, skip_serializing_if = "SmallVec::is_empty")]
	track: SmallVec<[TrackMark; 1]>,
}

impl Marks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a mark set from formatting marks.
	pub fn from_formats(formats: impl IntoIterator<Item = FormatMark>) -> Self {
		let mut marks = Self::new();
		for format in formats {
			marks.add(Mark::Format(format));
		}
		marks
	}

	pub fn formats(&self) -> &[FormatMark] {
		&self.formats
	}

	/// Returns the formatting marks as an owned set.
	pub fn format_set(&self) -> Formats {
		self.formats.clone()
	}

	pub fn track(&self) -> &[TrackMark] {
		&self.track
	}

	pub fn is_empty(&self) -> bool {
		self.formats.is_empty() && self.track.is_empty()
	}

	pub fn has_format(&self, format: FormatMark) -> bool {
		self.formats.binary_search(&format).is_ok()
	}

	/// Returns the attribution mark of the given kind.
	pub fn get(&self, kind: TrackKind) -> Option<&TrackMark> {
		self.track.iter().find(|mark| mark.kind() == kind)
	}

	pub fn insertion(&self) -> Option<&InsertionMark> {
		match self.get(TrackKind::Insertion)? {
			TrackMark::Insertion(mark) => Some(mark),
			_ => None,
		}
	}

	pub fn deletion(&self) -> Option<&DeletionMark> {
		match self.get(TrackKind::Deletion)? {
			TrackMark::Deletion(mark) => Some(mark),
			_ => None,
		}
	}

	pub fn format_change(&self) -> Option<&FormatChangeMark> {
		match self.get(TrackKind::FormatChange)? {
			TrackMark::FormatChange(mark) => Some(mark),
			_ => None,
		}
	}

	/// Returns true if this set holds exactly `mark`.
	pub fn contains(&self, mark: &Mark) -> bool {
		match mark {
			Mark::Format(format) => self.has_format(*format),
			Mark::Track(track) => self.get(track.kind()) == Some(track),
		}
	}

	/// Returns true if this set holds any mark of the given kind.
	pub fn contains_kind(&self, kind: &MarkKind) -> bool {
		match kind {
			MarkKind::Format(format) => self.has_format(*format),
			MarkKind::Track(kind) => self.get(*kind).is_some(),
		}
	}

	/// Adds a mark, replacing an attribution mark of the same kind.
	pub fn add(&mut self, mark: Mark) {
		match mark {
			Mark::Format(format) => {
				if let Err(idx) = self.formats.binary_search(&format) {
					self.formats.insert(idx, format);
				}
			}
			Mark::Track(track) => {
				let kind = track.kind();
				match self.track.iter().position(|m| m.kind() >= kind) {
					Some(idx) if self.track[idx].kind() == kind => self.track[idx] = track,
					Some(idx) => self.track.insert(idx, track),
					None => self.track.push(track),
				}
			}
		}
	}

	/// Removes the mark of the given kind, if present.
	pub fn remove(&mut self, kind: &MarkKind) {
		match kind {
			MarkKind::Format(format) => self.formats.retain(|f| f != format),
			MarkKind::Track(kind) => self.track.retain(|m| m.kind() != *kind),
		}
	}

	/// Replaces every formatting mark.
	pub fn set_formats(&mut self, formats: &[FormatMark]) {
		self.formats.clear();
		for format in formats {
			self.add(Mark::Format(*format));
		}
	}

	pub fn with(mut self, mark: impl Into<Mark>) -> Self {
		self.add(mark.into());
		self
	}

	pub fn without(mut self, kind: MarkKind) -> Self {
		self.remove(&kind);
		self
	}

	/// Restores the canonical ordering after deserialization.
	pub(crate) fn canonical(self) -> Self {
		let mut marks = Self::from_formats(self.formats);
		for track in self.track {
			if marks.get(track.kind()).is_none() {
				marks.add(Mark::Track(track));
			}
		}
		marks
	}
}

#[cfg(test)]
mod tests {
	use smallvec::smallvec;

	use super::*;

	fn attrs(user: u32) -> TrackAttrs {
		TrackAttrs::new(UserId(user), DateTime::<Utc>::default())
	}

	#[test]
	fn formats_stay_sorted_and_unique() {
		let marks = Marks::new()
			.with(FormatMark::Underline)
			.with(FormatMark::Strong)
			.with(FormatMark::Underline);
		assert_eq!(marks.formats(), &[FormatMark::Strong, FormatMark::Underline]);
	}

	#[test]
	fn track_marks_replace_same_kind() {
		let marks = Marks::new()
			.with(TrackMark::deletion(attrs(1)))
			.with(TrackMark::insertion(attrs(1)))
			.with(TrackMark::insertion(attrs(2)));
		assert_eq!(marks.track().len(), 2);
		assert_eq!(marks.insertion().map(|m| m.attrs.user), Some(UserId(2)));
		assert_eq!(marks.track()[0].kind(), TrackKind::Insertion);
		assert_eq!(marks.track()[1].kind(), TrackKind::Deletion);
	}

	#[test]
	fn remove_by_kind() {
		let marks = Marks::new()
			.with(FormatMark::Emphasis)
			.with(TrackMark::deletion(attrs(3)))
			.without(MarkKind::Track(TrackKind::Deletion));
		assert!(marks.deletion().is_none());
		assert!(marks.has_format(FormatMark::Emphasis));
	}

	#[test]
	fn canonical_drops_duplicate_kinds() {
		let raw = Marks {
			formats: smallvec![FormatMark::Code, FormatMark::Strong, FormatMark::Code],
			track: smallvec![TrackMark::deletion(attrs(1)), TrackMark::deletion(attrs(2))],
		};
		let marks = raw.canonical();
		assert_eq!(marks.formats(), &[FormatMark::Strong, FormatMark::Code]);
		assert_eq!(marks.deletion().map(|m| m.attrs.user), Some(UserId(1)));
	}

	#[test]
	fn missing_user_decodes_as_anonymous() {
		let mark: TrackMark =
			serde_json::from_str(r#"{"type":"insertion","attrs":{"date":"2024-05-01T10:00:00Z"}}"#)
				.unwrap();
		assert_eq!(mark.user(), UserId::ANONYMOUS);
		assert!(mark.user().is_anonymous());
	}

	#[test]
	fn missing_before_decodes_as_none() {
		let mark: TrackMark =
			serde_json::from_str(r#"{"type":"format_change","attrs":{"user":4,"after":["strong"]}}"#)
				.unwrap();
		let TrackMark::FormatChange(change) = mark else {
			panic!("expected a format change");
		};
		assert_eq!(change.before, None);
		assert_eq!(change.after.as_slice(), &[FormatMark::Strong]);
	}
}
