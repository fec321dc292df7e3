//! Job entries returned by the search endpoint.

// crates.io
use serde::Deserializer;
// self
use crate::_prelude::*;

/// Client summary attached to a job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
	/// Average feedback score.
	#[serde(default)]
	pub feedback: Option<f64>,
	/// Number of reviews.
	#[serde(default)]
	pub reviews_count: Option<u64>,
	/// Payment verification label.
	#[serde(default)]
	pub payment_verification_status: Option<String>,
	/// Remaining client fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// A single job in the feed; `id` is its identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
	/// Job identifier.
	pub id: String,
	/// Job title.
	#[serde(default, deserialize_with = "null_as_default")]
	pub title: String,
	/// `Hourly` or `Fixed`.
	#[serde(default)]
	pub job_type: Option<String>,
	/// Creation timestamp as sent by the API.
	#[serde(default)]
	pub date_created: Option<String>,
	/// Budget for fixed-price jobs.
	#[serde(default)]
	pub budget: Option<f64>,
	/// Client summary.
	#[serde(default, deserialize_with = "null_as_default")]
	pub client: ClientInfo,
	/// Required skills.
	#[serde(default, deserialize_with = "null_as_default")]
	pub skills: Vec<String>,
	/// Whether the user starred the job.
	#[serde(default, deserialize_with = "null_as_default")]
	pub favorite: bool,
	/// Remaining job fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl FeedItem {
	/// Creates an item with only `id` and `title` set.
	pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
		Self { id: id.into(), title: title.into(), ..Default::default() }
	}
}

/// Decoded search response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobsResponse {
	/// Jobs on the requested page; absent means none.
	#[serde(default, deserialize_with = "null_as_default")]
	pub jobs: Vec<FeedItem>,
	/// Remaining response fields (paging metadata, server time, ...).
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

// The API sends `null` for empty collections and blank titles.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
