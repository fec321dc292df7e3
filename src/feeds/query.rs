//! Job search query derived from the current settings.

// self
use crate::{
	_prelude::*,
	feeds::settings::{self, Settings},
};

/// Sort order requested from the search endpoint.
pub const SORT_ORDER: &str = "create_time desc";

/// `offset;count` window over the search results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Paging {
	/// Index of the first job.
	pub offset: u32,
	/// Number of jobs.
	pub count: u32,
}
impl Paging {
	/// Window for zero-based `page` of size `page_size`.
	pub fn page(page: u32, page_size: u32) -> Self {
		Self { offset: page.saturating_mul(page_size), count: page_size }
	}
}
impl Display for Paging {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{};{}", self.offset, self.count)
	}
}

/// Parameters of one job search request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedQuery {
	/// Free-text search.
	pub q: String,
	/// Inclusive budget range, `[<from> TO <to>]`.
	pub budget: String,
	/// Maximum job age in days.
	pub days_posted: u32,
	/// Normalized duration filter.
	pub duration: String,
	/// Normalized job type filter.
	pub job_type: String,
	/// Normalized workload filter.
	pub workload: String,
	/// Category, omitted when the setting is `All`.
	pub category2: Option<String>,
	/// Sort order.
	pub sort: String,
	/// Result window.
	pub paging: Paging,
}
impl FeedQuery {
	/// Builds the query for `q` and `paging` from `settings`.
	pub fn from_settings(q: &str, settings: &Settings, days_posted: u32, paging: Paging) -> Self {
		let category = settings.text(settings::CATEGORY);

		Self {
			q: q.to_owned(),
			budget: format!(
				"[{} TO {}]",
				settings.text(settings::BUDGET_FROM),
				settings.text(settings::BUDGET_TO)
			),
			days_posted,
			duration: normalize_select(&settings.text(settings::DURATION)),
			job_type: normalize_select(&settings.text(settings::JOB_TYPE)),
			workload: normalize_select(&settings.text(settings::WORKLOAD)),
			category2: (category != settings::ALL).then_some(category),
			sort: SORT_ORDER.into(),
			paging,
		}
	}

	/// Request parameters for the search endpoint.
	pub fn to_params(&self) -> BTreeMap<String, String> {
		let mut params = BTreeMap::from([
			("q".to_owned(), self.q.clone()),
			("budget".to_owned(), self.budget.clone()),
			("days_posted".to_owned(), self.days_posted.to_string()),
			("duration".to_owned(), self.duration.clone()),
			("job_type".to_owned(), self.job_type.clone()),
			("workload".to_owned(), self.workload.clone()),
			("sort".to_owned(), self.sort.clone()),
			("paging".to_owned(), self.paging.to_string()),
		]);

		if let Some(category) = &self.category2 {
			params.insert("category2".into(), category.clone());
		}

		params
	}
}

/// Lower-cases a select value, maps `all` to the empty string, and joins words with `_`.
pub fn normalize_select(value: &str) -> String {
	let lowered = value.to_lowercase();

	if lowered == "all" {
		return String::new();
	}

	lowered.split_whitespace().collect::<Vec<_>>().join("_")
}
