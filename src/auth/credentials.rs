//! Persisted OAuth 1.0a credential set, its store keys, and the request-token freshness rule.

// self
use crate::{
	_prelude::*,
	store::{Entries, KeyValueStore},
};

/// How long a request token stays reusable before the user has completed authorization.
pub const REQUEST_TOKEN_TTL: Duration = Duration::minutes(4);

/// Redacted secret wrapper keeping tokens, verifiers, and signing secrets out of logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Store keys backing a [`CredentialSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKey {
	/// Request token, replaced by the access token once the exchange completes.
	Token,
	/// Secret paired with [`CredentialKey::Token`]; signs every request.
	TokenSecret,
	/// Verifier returned by the authorization redirect.
	Verifier,
	/// Access token.
	Access,
	/// Unix milliseconds at which the request token was acquired.
	TokenTime,
}
impl CredentialKey {
	/// Every credential key, in purge order.
	pub const ALL: [Self; 5] =
		[Self::Token, Self::TokenSecret, Self::Verifier, Self::Access, Self::TokenTime];
	/// Every credential key as its store label.
	pub const LABELS: [&'static str; 5] =
		["token", "token_secret", "verifier", "access", "token_time"];

	/// Returns the store label for this key.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Token => "token",
			Self::TokenSecret => "token_secret",
			Self::Verifier => "verifier",
			Self::Access => "access",
			Self::TokenTime => "token_time",
		}
	}
}
impl Display for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Snapshot of the five persisted credential fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
	/// Request token (or access token once exchanged).
	pub token: Option<TokenSecret>,
	/// Secret paired with `token`.
	pub token_secret: Option<TokenSecret>,
	/// Verifier from the authorization redirect.
	pub verifier: Option<TokenSecret>,
	/// Access token.
	pub access: Option<TokenSecret>,
	/// Instant the request token was acquired.
	pub token_time: Option<OffsetDateTime>,
}
impl CredentialSet {
	/// Reads the credential set from `store`.
	pub async fn load(store: &dyn KeyValueStore) -> Result<Self> {
		let entries = store.get(&CredentialKey::LABELS).await?;

		Ok(Self::from_entries(&entries))
	}

	/// Builds a credential set from raw store entries.
	///
	/// Empty strings count as absent. `token_time` accepts either a JSON number or a numeric
	/// string holding unix milliseconds.
	pub fn from_entries(entries: &Entries) -> Self {
		let secret = |key: CredentialKey| {
			entries
				.get(key.as_str())
				.and_then(Value::as_str)
				.filter(|value| !value.is_empty())
				.map(TokenSecret::new)
		};
		let token_time = entries.get(CredentialKey::TokenTime.as_str()).and_then(parse_millis);

		Self {
			token: secret(CredentialKey::Token),
			token_secret: secret(CredentialKey::TokenSecret),
			verifier: secret(CredentialKey::Verifier),
			access: secret(CredentialKey::Access),
			token_time,
		}
	}

	/// Returns `true` when the user already granted access and the exchange completed.
	pub fn is_authorized(&self) -> bool {
		self.verifier.is_some() && self.access.is_some()
	}

	/// Decides whether the cached request token may be reused at `now`.
	///
	/// A token and its secret must both be present, and either the handshake has already
	/// produced a verifier + access token, or the token is younger than
	/// [`REQUEST_TOKEN_TTL`].
	pub fn is_reusable_at(&self, now: OffsetDateTime) -> bool {
		if self.token.is_none() || self.token_secret.is_none() {
			return false;
		}
		if self.is_authorized() {
			return true;
		}

		match self.token_time {
			Some(acquired) => now - acquired < REQUEST_TOKEN_TTL,
			None => false,
		}
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let redact = |secret: &Option<TokenSecret>| secret.as_ref().map(|_| "<redacted>");

		f.debug_struct("CredentialSet")
			.field("token", &redact(&self.token))
			.field("token_secret", &redact(&self.token_secret))
			.field("verifier", &redact(&self.verifier))
			.field("access", &redact(&self.access))
			.field("token_time", &self.token_time)
			.finish()
	}
}

/// Encodes an instant the way it is persisted under [`CredentialKey::TokenTime`].
pub fn millis_value(instant: OffsetDateTime) -> Value {
	let millis = instant.unix_timestamp_nanos() / 1_000_000;

	Value::from(i64::try_from(millis).unwrap_or(i64::MAX))
}

fn parse_millis(value: &Value) -> Option<OffsetDateTime> {
	let millis = match value {
		Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|f| f as i64))?,
		Value::String(text) => text.trim().parse::<i64>().ok()?,
		_ => return None,
	};

	OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	fn request_token_only(acquired: OffsetDateTime) -> CredentialSet {
		CredentialSet {
			token: Some(TokenSecret::new("request-token")),
			token_secret: Some(TokenSecret::new("request-secret")),
			token_time: Some(acquired),
			..Default::default()
		}
	}

	#[test]
	fn request_token_expires_after_four_minutes() {
		let acquired = macros::datetime!(2025-11-10 12:00 UTC);
		let creds = request_token_only(acquired);

		assert!(creds.is_reusable_at(acquired + Duration::seconds(239)));
		assert!(!creds.is_reusable_at(acquired + Duration::minutes(4)));
		assert!(!creds.is_reusable_at(acquired + Duration::hours(1)));
	}

	#[test]
	fn authorized_credentials_never_expire() {
		let acquired = macros::datetime!(2025-11-10 12:00 UTC);
		let creds = CredentialSet {
			verifier: Some(TokenSecret::new("verifier")),
			access: Some(TokenSecret::new("access")),
			..request_token_only(acquired)
		};

		assert!(creds.is_reusable_at(acquired + Duration::days(30)));
	}

	#[test]
	fn missing_secret_or_timestamp_forces_reacquisition() {
		let now = macros::datetime!(2025-11-10 12:00 UTC);
		let no_secret = CredentialSet { token_secret: None, ..request_token_only(now) };
		let no_time = CredentialSet { token_time: None, ..request_token_only(now) };

		assert!(!no_secret.is_reusable_at(now));
		assert!(!no_time.is_reusable_at(now));
		assert!(!CredentialSet::default().is_reusable_at(now));
	}

	#[test]
	fn entries_parse_numbers_strings_and_blank_values() {
		let mut entries = Entries::new();

		entries.insert("token".into(), json!("abc"));
		entries.insert("token_secret".into(), json!(""));
		entries.insert("token_time".into(), json!("1700000000000"));

		let creds = CredentialSet::from_entries(&entries);

		assert_eq!(creds.token.as_ref().map(TokenSecret::expose), Some("abc"));
		assert!(creds.token_secret.is_none());
		assert_eq!(
			creds.token_time.map(OffsetDateTime::unix_timestamp),
			Some(1_700_000_000)
		);

		let instant = macros::datetime!(2025-11-10 12:00 UTC);

		entries.insert("token_time".into(), millis_value(instant));

		assert_eq!(CredentialSet::from_entries(&entries).token_time, Some(instant));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let creds = request_token_only(macros::datetime!(2025-11-10 12:00 UTC));
		let rendered = format!("{creds:?}");

		assert!(!rendered.contains("request-secret"));
		assert!(rendered.contains("<redacted>"));
		assert_eq!(format!("{}", TokenSecret::new("x")), "<redacted>");
	}
}
