//! Request-token and access-token legs of the handshake, plus the credential purge.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, CredentialSet, TokenSecret, millis_value},
	flows::{ApiCall, Session},
	http::{HttpTransport, ResponseFormat},
	obs::{self, FlowKind},
	store::Entries,
};

const TOKEN_PARAM: &str = "oauth_token";
const TOKEN_SECRET_PARAM: &str = "oauth_token_secret";

impl<T> Session<T>
where
	T: ?Sized + HttpTransport,
{
	/// Returns a usable request token, re-acquiring it when the cached one went stale.
	///
	/// The cached token is kept when the handshake already finished (verifier and access
	/// token present) or when it is younger than [`crate::auth::REQUEST_TOKEN_TTL`]. In
	/// every other case all five credential fields are purged before a new request token is
	/// fetched.
	pub async fn ensure_request_token(&self) -> Result<TokenSecret> {
		let creds = CredentialSet::load(self.store.as_ref()).await?;

		if creds.is_reusable_at(OffsetDateTime::now_utc())
			&& let Some(token) = &creds.token
		{
			return Ok(token.clone());
		}

		tracing::debug!(?creds, "purging stale credentials");
		self.flush_credentials().await?;
		self.acquire_request_token().await
	}

	/// Fetches a new request token and persists it with its acquisition time.
	pub async fn acquire_request_token(&self) -> Result<TokenSecret> {
		obs::observe(FlowKind::RequestToken, "acquire_request_token", async {
			let call = ApiCall::post(self.descriptor.paths.request_token.as_str())
				.format(ResponseFormat::Text)
				.param("oauth_callback", self.descriptor.callback.as_str());
			let body = self.signed_request(call).await?.into_text();
			let (token, secret) = self.parse_token_pair(&body).ok_or_else(|| {
				Error::TokenAcquisition {
					reason: format!("response lacks `{TOKEN_PARAM}` or `{TOKEN_SECRET_PARAM}`"),
				}
			})?;
			let mut entries = Entries::new();

			entries.insert(
				CredentialKey::TokenTime.as_str().into(),
				millis_value(OffsetDateTime::now_utc()),
			);
			entries.insert(CredentialKey::Token.as_str().into(), Value::from(token.expose()));
			entries.insert(CredentialKey::TokenSecret.as_str().into(), Value::from(secret.expose()));
			self.store.set(entries).await?;

			Ok(token)
		})
		.await
	}

	/// Returns the cached access token or exchanges token + verifier for a new one.
	pub async fn acquire_access_token(&self) -> Result<TokenSecret> {
		obs::observe(FlowKind::AccessToken, "acquire_access_token", async {
			let creds = CredentialSet::load(self.store.as_ref()).await?;

			if let Some(access) = creds.access {
				return Ok(access);
			}

			let (Some(token), Some(verifier)) = (creds.token, creds.verifier) else {
				return Err(Error::AccessToken {
					reason: "request token or verifier is not cached".into(),
				});
			};
			let call = ApiCall::post(self.descriptor.paths.access_token.as_str())
				.format(ResponseFormat::Text)
				.param(TOKEN_PARAM, token.expose())
				.param("oauth_verifier", verifier.expose());
			let body = self.signed_request(call).await?.into_text();
			let (access, secret) = self.parse_token_pair(&body).ok_or_else(|| {
				Error::AccessToken {
					reason: format!("response lacks `{TOKEN_PARAM}` or `{TOKEN_SECRET_PARAM}`"),
				}
			})?;
			let mut entries = Entries::new();

			entries.insert(CredentialKey::Access.as_str().into(), Value::from(access.expose()));
			entries.insert(CredentialKey::Token.as_str().into(), Value::from(access.expose()));
			entries.insert(CredentialKey::TokenSecret.as_str().into(), Value::from(secret.expose()));
			self.store.set(entries).await?;

			Ok(access)
		})
		.await
	}

	/// Removes every credential field from the store.
	pub async fn flush_credentials(&self) -> Result<()> {
		self.store.remove(&CredentialKey::LABELS).await?;

		Ok(())
	}

	fn parse_token_pair(&self, body: &str) -> Option<(TokenSecret, TokenSecret)> {
		let mut parsed = self.signer.de_param(body);
		let mut take = |key: &str| parsed.remove(key).filter(|value| !value.is_empty());

		Some((TokenSecret::new(take(TOKEN_PARAM)?), TokenSecret::new(take(TOKEN_SECRET_PARAM)?)))
	}
}
