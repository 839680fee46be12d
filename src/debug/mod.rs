//! In-memory debug log of API calls
//!
//! [`DebugRecorder`] pairs each call's dispatch with its completion and
//! commits one [`DebugEntry`] per call to a bounded [`DebugStore`]. The
//! panel's open/closed state and filter persist through [`DebugPreferences`].

pub mod preferences;
pub mod recorder;
pub mod store;
pub mod types;

pub use preferences::{DebugPreferences, PreferencesError, PREFERENCES_FILE};
pub use recorder::DebugRecorder;
pub use store::{get_filtered_entries, DebugStore};
pub use types::{DebugEntry, DebugFilter, HttpMethod, PendingEntry};
