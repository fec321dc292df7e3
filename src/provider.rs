//! Remote API configuration: endpoint descriptors and consumer credentials.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the API base URL,
//! endpoint paths for the three handshake legs and the job endpoints, the deep-link callback,
//! and feed paging defaults. [`ConsumerCredentials`] carries the application's key pair and is
//! handed to the signer explicitly instead of living in a process-wide singleton.

pub mod descriptor;

pub use descriptor::*;

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the consumer key.
pub const CONSUMER_KEY_VAR: &str = "UPWORK_KEY";
/// Environment variable holding the consumer secret.
pub const CONSUMER_SECRET_VAR: &str = "UPWORK_SECRET";

/// Application key pair issued by the API provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
	/// Public consumer key, sent as `oauth_consumer_key`.
	pub key: String,
	/// Consumer secret; first half of every signing key.
	pub secret: TokenSecret,
}
impl ConsumerCredentials {
	/// Creates credentials from explicit values.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { key: key.into(), secret: TokenSecret::new(secret) }
	}

	/// Reads credentials from `UPWORK_KEY` / `UPWORK_SECRET`.
	pub fn from_env() -> Result<Self> {
		let read = |var: &'static str| {
			std::env::var(var)
				.ok()
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingEnv { var })
		};

		Ok(Self::new(read(CONSUMER_KEY_VAR)?, read(CONSUMER_SECRET_VAR)?))
	}
}
impl Debug for ConsumerCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConsumerCredentials")
			.field("key", &self.key)
			.field("secret", &self.secret)
			.finish()
	}
}
