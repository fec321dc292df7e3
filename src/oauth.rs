//! OAuth 1.0a request signing (RFC 5849) and form-encoded response parsing.
//!
//! [`OAuthSigner`] is the seam the session signs through; [`HmacSha1Signer`] is the default
//! implementation. The signer is constructed explicitly from [`ConsumerCredentials`] and owned
//! by whoever builds the session, so several sessions with different consumers can coexist.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::{_prelude::*, error::ConfigError, provider::ConsumerCredentials};

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 32;
const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// HTTP method of a signed request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
	/// `GET`; parameters travel in the query string.
	#[default]
	Get,
	/// `POST`; parameters travel in a form body.
	Post,
}
impl Method {
	/// Upper-case method name used in signature base strings.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request to be signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Target URL; any query pairs already present take part in the signature.
	pub url: Url,
	/// Request parameters, including `oauth_token`/`oauth_callback`/`oauth_verifier` when
	/// relevant.
	pub params: BTreeMap<String, String>,
}

/// Signed request: the original parameters plus every `oauth_*` protocol parameter and
/// `oauth_signature`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Parameters ready to be sent as query string or form body.
	pub params: BTreeMap<String, String>,
}

/// Computes OAuth 1.0a signatures.
pub trait OAuthSigner
where
	Self: Send + Sync,
{
	/// Adds protocol parameters and a signature computed with `token_secret`.
	fn authorize(
		&self,
		request: RequestDescriptor,
		token_secret: Option<&str>,
	) -> Result<SignedRequest>;

	/// Decodes a `application/x-www-form-urlencoded` response body.
	fn de_param(&self, body: &str) -> BTreeMap<String, String> {
		de_param(body)
	}
}

/// HMAC-SHA1 signer (RFC 5849 §3.4.2).
#[derive(Clone, Debug)]
pub struct HmacSha1Signer {
	consumer: ConsumerCredentials,
}
impl HmacSha1Signer {
	/// Creates a signer for the given consumer.
	pub fn new(consumer: ConsumerCredentials) -> Self {
		Self { consumer }
	}

	/// Consumer the signer was built with.
	pub fn consumer(&self) -> &ConsumerCredentials {
		&self.consumer
	}

	/// Signs with a caller-supplied nonce and timestamp.
	pub fn authorize_with(
		&self,
		request: RequestDescriptor,
		token_secret: Option<&str>,
		nonce: &str,
		timestamp: i64,
	) -> Result<SignedRequest> {
		let RequestDescriptor { method, url, mut params } = request;

		params.insert("oauth_consumer_key".into(), self.consumer.key.clone());
		params.insert("oauth_nonce".into(), nonce.into());
		params.insert("oauth_signature_method".into(), SIGNATURE_METHOD.into());
		params.insert("oauth_timestamp".into(), timestamp.to_string());
		params.insert("oauth_version".into(), OAUTH_VERSION.into());
		params.remove("oauth_signature");

		let base = signature_base_string(method, &url, &params);
		let key = format!(
			"{}&{}",
			percent_encode(self.consumer.secret.expose()),
			percent_encode(token_secret.unwrap_or_default()),
		);
		let mut mac = HmacSha1::new_from_slice(key.as_bytes())
			.map_err(|_| ConfigError::InvalidSigningKey)?;

		mac.update(base.as_bytes());

		let signature = STANDARD.encode(mac.finalize().into_bytes());

		params.insert("oauth_signature".into(), signature);

		Ok(SignedRequest { method, url, params })
	}
}
impl OAuthSigner for HmacSha1Signer {
	fn authorize(
		&self,
		request: RequestDescriptor,
		token_secret: Option<&str>,
	) -> Result<SignedRequest> {
		let nonce = random_string(NONCE_LEN);
		let timestamp = OffsetDateTime::now_utc().unix_timestamp();

		self.authorize_with(request, token_secret, &nonce, timestamp)
	}
}

/// Decodes a form-encoded body into a sorted map; later duplicates win.
pub fn de_param(body: &str) -> BTreeMap<String, String> {
	url::form_urlencoded::parse(body.trim().as_bytes()).into_owned().collect()
}

/// RFC 3986 percent-encoding as required by RFC 5849 §3.6.
pub fn percent_encode(value: &str) -> String {
	urlencoding::encode(value).into_owned()
}

fn signature_base_string(method: Method, url: &Url, params: &BTreeMap<String, String>) -> String {
	let mut pairs: Vec<(String, String)> = url
		.query_pairs()
		.map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
		.chain(params.iter().map(|(key, value)| (percent_encode(key), percent_encode(value))))
		.collect();

	pairs.sort();

	let normalized =
		pairs.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.as_str(),
		percent_encode(&base_uri(url)),
		percent_encode(&normalized)
	)
}

fn base_uri(url: &Url) -> String {
	let mut base = url.clone();

	base.set_query(None);
	base.set_fragment(None);

	base.to_string()
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
