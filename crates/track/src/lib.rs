//! Change tracking for rich-text documents: attribution of edits, the
//! corrective pass that keeps attribution marks consistent, selected-change
//! highlights and user colors.

/// Rules over attribution marks and a validity checker.
pub mod attribution;
/// Time sources for edit dates.
pub mod clock;
/// User color assignment.
pub mod colors;
/// Tracking settings loaded from TOML.
pub mod config;
/// Highlight decorations and their mapping.
pub mod decoration;
/// Configuration errors.
pub mod error;
/// Highlight handoff between the main and note editors.
pub mod focus;
/// Tracked changes under the selection.
pub mod highlight;
/// Transaction metadata keys and values.
pub mod meta;
/// The corrective pass run after every dispatch.
pub mod normalizer;
/// Plugin state and entry points for editor hosts.
pub mod plugin;
/// Accept and reject actions.
pub mod review;

pub use attribution::{Violation, can_merge, cancels, find_violations};
pub use clock::{Clock, FixedClock, SystemClock};
pub use colors::{ColorRegistry, ColorToken, UserColors, collect_user_ids};
pub use config::TrackConfig;
pub use decoration::{Decoration, DecorationKind, DecorationSet, DecorationSpec};
pub use error::{ConfigError, Result};
pub use focus::{EditorSurface, FocusCoordinator, SurfaceRole};
pub use highlight::{ChangeTarget, SelectedChange, SelectedChanges, find_selected_changes};
pub use meta::{APPENDED_KEY, Appended, EDIT_KEY, EditMeta, Origin};
pub use normalizer::{NormalizeCtx, append_transaction};
pub use plugin::{TRACK_KEY, TrackPlugin, TrackState, deactivate_all_selected_changes};
pub use review::{Decision, accept_all, accept_changes, reject_all, reject_changes};
