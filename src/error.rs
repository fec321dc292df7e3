//! Crate-level error types shared across the handshake, feed model, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// A required request parameter was not supplied.
	#[error("Required parameter `{0}` is missing.")]
	MissingParameter(&'static str),
	/// The request-token endpoint did not hand out a token + secret pair.
	#[error("Can't get request token: {reason}.")]
	TokenAcquisition {
		/// Human-readable reason string.
		reason: String,
	},
	/// The authorization redirect did not carry an `oauth_verifier`.
	#[error("Can't get verifier: {reason}.")]
	Verifier {
		/// Human-readable reason string.
		reason: String,
	},
	/// The access-token endpoint did not hand out a token + secret pair.
	#[error("Can't get access token: {reason}.")]
	AccessToken {
		/// Human-readable reason string.
		reason: String,
	},
	/// The device has no network connectivity.
	#[error("Network is unreachable.")]
	Offline,
	/// The API answered with a non-success HTTP status.
	#[error("API responded with HTTP {status}.")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Response body preview.
		body: String,
	},
	/// The API answered with a body that does not match the expected shape.
	#[error("API response could not be decoded.")]
	Decode {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A request URL could not be assembled from the descriptor.
	#[error("Request URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required environment variable is absent.
	#[error("Environment variable `{var}` is not set.")]
	MissingEnv {
		/// Variable name.
		var: &'static str,
	},
	/// The signing key was rejected by the MAC implementation.
	#[error("OAuth signing key is invalid.")]
	InvalidSigningKey,
}
/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport or browser hand-off.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
