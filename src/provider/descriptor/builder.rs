// self
use crate::{
	_prelude::*,
	provider::{ApiPaths, JOB_ID_PLACEHOLDER, ProviderDescriptor},
};

const UPWORK_BASE_URL: &str = "https://www.upwork.com";
const UPWORK_REQUEST_TOKEN_PATH: &str = "/api/auth/v1/oauth/token/request";
const UPWORK_AUTHORIZE_PATH: &str = "/services/api/auth";
const UPWORK_ACCESS_TOKEN_PATH: &str = "/api/auth/v1/oauth/token/access";
const UPWORK_JOBS_SEARCH_PATH: &str = "/api/profiles/v2/search/jobs.json";
const UPWORK_JOB_PROFILE_PATH: &str = "/api/profiles/v1/jobs/{id}.json";
const DEFAULT_CALLBACK: &str = "oauth2upwatcher://foo";
/// Jobs requested per page unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Age limit for searched jobs unless overridden.
pub const DEFAULT_DAYS_POSTED: u32 = 5;

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Base URL is mandatory.
	#[error("Missing base URL.")]
	MissingBaseUrl,
	/// An endpoint path was left empty.
	#[error("Missing {endpoint} path.")]
	MissingPath {
		/// Which path failed validation.
		endpoint: &'static str,
	},
	/// A URL could not be parsed.
	#[error("The {field} URL is invalid: {url}.")]
	InvalidUrl {
		/// Which field failed validation.
		field: &'static str,
		/// Raw value that failed to parse.
		url: String,
	},
	/// The API must be reached over HTTPS (loopback hosts excepted).
	#[error("The base URL must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// URL that failed validation.
		url: String,
	},
	/// The job profile path cannot address a job.
	#[error("The job profile path must contain `{{id}}`.")]
	MissingJobPlaceholder,
	/// Paging requires at least one job per page.
	#[error("Page size must be positive.")]
	ZeroPageSize,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// API origin.
	pub base_url: Option<String>,
	/// Request-token path.
	pub request_token_path: Option<String>,
	/// Authorization page path.
	pub authorize_path: Option<String>,
	/// Access-token path.
	pub access_token_path: Option<String>,
	/// Job search path.
	pub jobs_search_path: Option<String>,
	/// Job profile path template.
	pub job_profile_path: Option<String>,
	/// Deep-link callback.
	pub callback: Option<String>,
	/// Jobs per page.
	pub page_size: Option<u32>,
	/// Job age limit in days.
	pub days_posted: Option<u32>,
}
impl ProviderDescriptorBuilder {
	/// Creates a builder preloaded with the production Upwork endpoints.
	pub fn upwork() -> Self {
		Self {
			base_url: Some(UPWORK_BASE_URL.into()),
			request_token_path: Some(UPWORK_REQUEST_TOKEN_PATH.into()),
			authorize_path: Some(UPWORK_AUTHORIZE_PATH.into()),
			access_token_path: Some(UPWORK_ACCESS_TOKEN_PATH.into()),
			jobs_search_path: Some(UPWORK_JOBS_SEARCH_PATH.into()),
			job_profile_path: Some(UPWORK_JOB_PROFILE_PATH.into()),
			callback: Some(DEFAULT_CALLBACK.into()),
			page_size: None,
			days_posted: None,
		}
	}

	/// Sets the API origin.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the request-token path.
	pub fn request_token_path(mut self, path: impl Into<String>) -> Self {
		self.request_token_path = Some(path.into());

		self
	}

	/// Sets the authorization page path.
	pub fn authorize_path(mut self, path: impl Into<String>) -> Self {
		self.authorize_path = Some(path.into());

		self
	}

	/// Sets the access-token path.
	pub fn access_token_path(mut self, path: impl Into<String>) -> Self {
		self.access_token_path = Some(path.into());

		self
	}

	/// Sets the job search path.
	pub fn jobs_search_path(mut self, path: impl Into<String>) -> Self {
		self.jobs_search_path = Some(path.into());

		self
	}

	/// Sets the job profile path template (must contain `{id}`).
	pub fn job_profile_path(mut self, path: impl Into<String>) -> Self {
		self.job_profile_path = Some(path.into());

		self
	}

	/// Sets the deep-link callback.
	pub fn callback(mut self, url: impl Into<String>) -> Self {
		self.callback = Some(url.into());

		self
	}

	/// Overrides the page size.
	pub fn page_size(mut self, size: u32) -> Self {
		self.page_size = Some(size);

		self
	}

	/// Overrides the job age limit.
	pub fn days_posted(mut self, days: u32) -> Self {
		self.days_posted = Some(days);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let raw_base = self.base_url.ok_or(ProviderDescriptorError::MissingBaseUrl)?;
		let base_url = parse_url("base", &raw_base)?;
		let callback = parse_url("callback", self.callback.as_deref().unwrap_or(DEFAULT_CALLBACK))?;
		let paths = ApiPaths {
			request_token: required_path("request_token", self.request_token_path)?,
			authorize: required_path("authorize", self.authorize_path)?,
			access_token: required_path("access_token", self.access_token_path)?,
			jobs_search: required_path("jobs_search", self.jobs_search_path)?,
			job_profile: required_path("job_profile", self.job_profile_path)?,
		};
		let descriptor = ProviderDescriptor {
			base_url,
			paths,
			callback,
			page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
			days_posted: self.days_posted.unwrap_or(DEFAULT_DAYS_POSTED),
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_base(&self.base_url)?;

		if !self.paths.job_profile.contains(JOB_ID_PLACEHOLDER) {
			return Err(ProviderDescriptorError::MissingJobPlaceholder);
		}
		if self.page_size == 0 {
			return Err(ProviderDescriptorError::ZeroPageSize);
		}

		Ok(())
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|_| ProviderDescriptorError::InvalidUrl { field, url: raw.into() })
}

fn required_path(
	endpoint: &'static str,
	path: Option<String>,
) -> Result<String, ProviderDescriptorError> {
	path.filter(|value| !value.trim().is_empty())
		.ok_or(ProviderDescriptorError::MissingPath { endpoint })
}

fn validate_base(url: &Url) -> Result<(), ProviderDescriptorError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { url: url.to_string() })
	}
}
