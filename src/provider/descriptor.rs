//! Provider descriptor data structures and URL helpers shared by the flows and the feed model.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Placeholder replaced by the job identifier in [`ApiPaths::job_profile`].
pub const JOB_ID_PLACEHOLDER: &str = "{id}";

/// Endpoint paths, relative to [`ProviderDescriptor::base_url`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiPaths {
	/// Request-token endpoint (POST).
	pub request_token: String,
	/// User authorization page opened in the browser (GET).
	pub authorize: String,
	/// Access-token endpoint (POST).
	pub access_token: String,
	/// Job search endpoint (GET).
	pub jobs_search: String,
	/// Single job profile endpoint (GET); contains [`JOB_ID_PLACEHOLDER`].
	pub job_profile: String,
}

/// Immutable API descriptor consumed by the session and the feed model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Origin every path is appended to.
	pub base_url: Url,
	/// Endpoint paths.
	pub paths: ApiPaths,
	/// Deep link the provider redirects to after the user authorizes the app.
	pub callback: Url,
	/// Number of jobs requested per page.
	pub page_size: u32,
	/// Age limit, in days, for jobs returned by the search endpoint.
	pub days_posted: u32,
}
impl ProviderDescriptor {
	/// Creates an empty builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::default()
	}

	/// Creates a builder seeded with the production Upwork endpoints.
	pub fn upwork() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::upwork()
	}

	/// Resolves `path` against the base URL.
	pub fn url(&self, path: &str) -> Result<Url> {
		join(&self.base_url, path)
			.map_err(|(url, source)| ConfigError::InvalidUrl { url, source }.into())
	}

	/// Authorization page URL for a request token.
	pub fn authorize_url(&self, token: &str) -> Result<Url> {
		let mut url = self.url(&self.paths.authorize)?;

		url.query_pairs_mut().append_pair("oauth_token", token);

		Ok(url)
	}

	/// Job profile path for `id`.
	pub fn job_profile_path(&self, id: &str) -> String {
		self.paths.job_profile.replace(JOB_ID_PLACEHOLDER, &urlencoding::encode(id))
	}
}

fn join(base: &Url, path: &str) -> Result<Url, (String, url::ParseError)> {
	let raw = format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));

	Url::parse(&raw).map_err(|source| (raw, source))
}
