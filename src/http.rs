//! Transport primitives for signed API calls.
//!
//! The module exposes [`HttpTransport`] so hosts can plug in their own HTTP stack, and
//! [`ReqwestTransport`] as the default implementation. A transport only moves bytes: signing
//! happens before the request reaches it, and callers declare up front whether they expect a
//! JSON document or raw text (the handshake endpoints answer with form-encoded text).

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::TransportError;

const BODY_PREVIEW_LEN: usize = 512;

/// Boxed future returned by [`HttpTransport`] operations.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ResponseBody>> + 'a + Send>>;

/// Expected response representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
	/// Decode the body as JSON.
	#[default]
	Json,
	/// Keep the body as text.
	Text,
}

/// Decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
	/// JSON document.
	Json(Value),
	/// Raw text.
	Text(String),
}
impl ResponseBody {
	/// Returns the body as text, re-serializing JSON documents.
	pub fn into_text(self) -> String {
		match self {
			Self::Json(value) => value.to_string(),
			Self::Text(text) => text,
		}
	}

	/// Returns the body as JSON, parsing text bodies on demand.
	pub fn into_json(self) -> Result<Value> {
		match self {
			Self::Json(value) => Ok(value),
			Self::Text(text) => decode_json(text.as_bytes()),
		}
	}
}

/// Signed request handed to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// Absolute URL.
	pub url: Url,
	/// Expected response representation.
	pub format: ResponseFormat,
	/// Query parameters (GET) or form fields (POST).
	pub params: BTreeMap<String, String>,
}

/// Abstraction over the HTTP stack used for every API call.
///
/// Implementations must be `Send + Sync + 'static` so a session can share them across
/// tasks, and their futures must be `Send`. Non-success statuses map to [`Error::Http`];
/// connection failures map to [`Error::Transport`] unchanged.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Issues a GET with `params` in the query string.
	fn get(&self, request: ApiRequest) -> TransportFuture<'_>;

	/// Issues a POST with `params` as an `application/x-www-form-urlencoded` body.
	fn post(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Decodes a JSON payload, keeping the path of the first mismatch.
pub fn decode_json<T>(bytes: &[u8]) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::Decode { source })
}

/// Decodes an already parsed JSON document.
pub fn decode_value<T>(value: Value) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|source| Error::Decode { source })
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn finish(response: reqwest::Response, format: ResponseFormat) -> Result<ResponseBody> {
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			let body = String::from_utf8_lossy(&bytes).chars().take(BODY_PREVIEW_LEN).collect();

			return Err(Error::Http { status: status.as_u16(), body });
		}

		match format {
			ResponseFormat::Json => decode_json(&bytes).map(ResponseBody::Json),
			ResponseFormat::Text => Ok(ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned())),
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn get(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let ApiRequest { mut url, format, params } = request;

			if !params.is_empty() {
				url.query_pairs_mut().extend_pairs(params.iter());
			}

			let response = self.0.get(url).send().await.map_err(TransportError::from)?;

			Self::finish(response, format).await
		})
	}

	fn post(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let ApiRequest { url, format, params } = request;
			let body = url::form_urlencoded::Serializer::new(String::new())
				.extend_pairs(params.iter())
				.finish();
			let response = self
				.0
				.post(url)
				.header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
				.body(body)
				.send()
				.await
				.map_err(TransportError::from)?;

			Self::finish(response, format).await
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn text_bodies_parse_into_json_on_demand() {
		let body = ResponseBody::Text("{\"jobs\":[]}".into());

		assert_eq!(body.into_json().expect("Valid JSON text should parse."), serde_json::json!({ "jobs": [] }));
		assert!(matches!(
			ResponseBody::Text("oauth_token=abc".into()).into_json(),
			Err(Error::Decode { .. })
		));
	}

	#[test]
	fn json_bodies_render_as_text() {
		assert_eq!(ResponseBody::Json(serde_json::json!({ "a": 1 })).into_text(), "{\"a\":1}");
	}
}
