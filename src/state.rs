//! Pure reducers folding UI actions into application state.
//!
//! States are immutable `Arc` trees. A reducer returns the very same `Arc` for actions it does
//! not handle, so callers can skip re-rendering with [`Arc::ptr_eq`]. Handled actions rebuild
//! only the spine and the changed nodes; every untouched node is shared with the previous
//! state.

pub mod feeds;
pub mod settings;

pub use feeds::*;
pub use settings::*;

// self
use crate::{
	_prelude::*,
	feeds::{FeedItem, Settings},
};

/// Action dispatched by the UI layer, tagged by `type` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
	/// Seeds the feed list (usually from the cache).
	FeedsDefaultSet {
		/// New job list.
		data: Vec<FeedItem>,
	},
	/// Replaces the feed list with freshly fetched jobs.
	FeedsUpdate {
		/// New job list.
		data: Vec<FeedItem>,
	},
	/// Sets the active filter text.
	FeedsFilter {
		/// Filter text; `None` clears it.
		#[serde(default)]
		value: Option<String>,
	},
	/// Marks job `id` as favorite.
	FeedsAddToFavorites {
		/// Job identifier.
		id: String,
	},
	/// Clears the favorite mark on job `id`.
	FeedsRemoveFromFavorites {
		/// Job identifier.
		id: String,
	},
	/// Replaces the whole settings state.
	SettingsDefaultSet {
		/// New settings.
		data: Settings,
	},
	/// Sets one setting's value.
	SettingsChange {
		/// Setting name.
		name: String,
		/// New value.
		value: Value,
	},
	/// Any action type this crate does not handle.
	#[serde(other)]
	Unknown,
}

/// Root state combining both reducers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
	/// Feed list state.
	pub feeds: Arc<FeedsState>,
	/// Settings state.
	pub settings: Arc<SettingsState>,
}
impl AppState {
	/// Applies `action` to both sub-states; returns `state` itself when neither changed.
	pub fn reduce(state: &Arc<AppState>, action: &Action) -> Arc<AppState> {
		let feeds = FeedsState::reduce(&state.feeds, action);
		let settings = SettingsState::reduce(&state.settings, action);

		if Arc::ptr_eq(&feeds, &state.feeds) && Arc::ptr_eq(&settings, &state.settings) {
			return state.clone();
		}

		Arc::new(AppState { feeds, settings })
	}
}
