#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Minimal editor host for tracked rich-text editing.
//!
//! # Main Types
//!
//! - [`EditorView`] - One editing surface: document state, highlight state
//!   and the dispatch loop that runs the corrective pass
//! - [`Workspace`] - The main body surface, an optional note surface and the
//!   color registry they share
//!
//! # Dispatch
//!
//! ```text
//! dispatch(tr)
//! ├── apply tr                      // document + highlight state
//! └── append round (bounded)
//!     ├── plugin.append_transaction // corrective pass
//!     └── apply correction          // until none is needed
//! ```

/// Dispatch reports and round limits.
pub mod dispatch;
/// Editor state and the editing surface.
pub mod view;
/// Main and note surfaces with shared colors.
pub mod workspace;

pub use dispatch::{DispatchReport, MAX_APPEND_ROUNDS};
pub use view::{EditorState, EditorView};
pub use workspace::Workspace;
