//! Feed list state.

// self
use crate::{_prelude::*, feeds::FeedItem, state::Action};

/// What the list screen should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedsView {
	/// No jobs; show the empty-state indicator.
	Blank,
	/// Show the list.
	List,
}

/// Jobs currently shown plus the active filter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedsState {
	/// Jobs in display order.
	pub data: Arc<Vec<Arc<FeedItem>>>,
	/// Active filter text.
	pub filter: Option<String>,
}
impl FeedsState {
	/// Builds a state holding `items`.
	pub fn with_items(items: impl IntoIterator<Item = FeedItem>) -> Self {
		Self { data: Arc::new(items.into_iter().map(Arc::new).collect()), filter: None }
	}

	/// Number of jobs.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether there are no jobs.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Which screen variant to render.
	pub fn view(&self) -> FeedsView {
		if self.is_empty() { FeedsView::Blank } else { FeedsView::List }
	}

	/// Folds `action` into `state`.
	pub fn reduce(state: &Arc<FeedsState>, action: &Action) -> Arc<FeedsState> {
		match action {
			Action::FeedsDefaultSet { data } | Action::FeedsUpdate { data } =>
				Arc::new(Self::with_items(data.iter().cloned()).filtered(state.filter.clone())),
			Action::FeedsFilter { value } =>
				Arc::new(Self { data: state.data.clone(), filter: value.clone() }),
			Action::FeedsAddToFavorites { id } => Self::mark_favorite(state, id, true),
			Action::FeedsRemoveFromFavorites { id } => Self::mark_favorite(state, id, false),
			_ => state.clone(),
		}
	}

	fn filtered(mut self, filter: Option<String>) -> Self {
		self.filter = filter;

		self
	}

	fn mark_favorite(state: &Arc<FeedsState>, id: &str, favorite: bool) -> Arc<FeedsState> {
		let data = state
			.data
			.iter()
			.map(|item| {
				if item.id == id {
					Arc::new(FeedItem { favorite, ..FeedItem::clone(item) })
				} else {
					item.clone()
				}
			})
			.collect();

		Arc::new(Self { data: Arc::new(data), filter: state.filter.clone() })
	}
}
