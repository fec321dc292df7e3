// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use upwatcher::{
	_preludet::*,
	auth::{CredentialKey, VerifierWaitState, millis_value},
	flows::Session,
	store::KeyValueStore,
};

const REQUEST_PATH: &str = "/api/auth/v1/oauth/token/request";
const ACCESS_PATH: &str = "/api/auth/v1/oauth/token/access";
const REDIRECT: &str = "oauth2upwatcher://foo?oauth_token=req-token&oauth_verifier=verifier-it";

async fn mock_request_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(REQUEST_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).body(
				"oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
			);
		})
		.await
}

async fn mock_access_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(ACCESS_PATH);
			then.status(200).body("oauth_token=access-token&oauth_token_secret=access-secret");
		})
		.await
}

async fn stored(harness: &TestHarness, key: CredentialKey) -> Option<Value> {
	harness.store.get_one(key.as_str()).await.expect("Store read should succeed.")
}

async fn seed_request_token(harness: &TestHarness, age: Duration, verifier: Option<&str>) {
	let mut entries = BTreeMap::from([
		(CredentialKey::Token.as_str().to_owned(), Value::from("cached-token")),
		(CredentialKey::TokenSecret.as_str().to_owned(), Value::from("cached-secret")),
		(
			CredentialKey::TokenTime.as_str().to_owned(),
			millis_value(OffsetDateTime::now_utc() - age),
		),
	]);

	if let Some(verifier) = verifier {
		entries.insert(CredentialKey::Verifier.as_str().to_owned(), Value::from(verifier));
	}

	harness.store.set(entries).await.expect("Seeding credentials should succeed.");
}

#[tokio::test]
async fn full_handshake_persists_every_credential() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;
	let access_mock = mock_access_token(&server).await;

	harness.browser.redirect_to(REDIRECT);

	let access = harness
		.session
		.ensure_access_token()
		.await
		.expect("Handshake should complete against the mock API.");

	assert_eq!(access.expose(), "access-token");

	request_mock.assert_calls_async(1).await;
	access_mock.assert_calls_async(1).await;

	let opened = harness.browser.opened();

	assert_eq!(opened.len(), 1);
	assert!(opened[0].path().ends_with("/services/api/auth"));
	assert!(opened[0].query_pairs().any(|(key, value)| key == "oauth_token" && value == "req-token"));
	assert_eq!(stored(&harness, CredentialKey::Access).await, Some(Value::from("access-token")));
	assert_eq!(stored(&harness, CredentialKey::Token).await, Some(Value::from("access-token")));
	assert_eq!(
		stored(&harness, CredentialKey::TokenSecret).await,
		Some(Value::from("access-secret"))
	);
	assert_eq!(stored(&harness, CredentialKey::Verifier).await, Some(Value::from("verifier-it")));
	assert!(stored(&harness, CredentialKey::TokenTime).await.is_some());

	let wait = harness.session.last_verifier_wait().expect("A verifier wait should be recorded.");

	assert_eq!(wait.state(), VerifierWaitState::Completed);
	assert_eq!(wait.transitions(), 1);
	assert_eq!(harness.lifecycle.listener_count(), 0);

	let again = harness
		.session
		.ensure_access_token()
		.await
		.expect("Completed handshake should be reused.");

	assert_eq!(again.expose(), "access-token");

	request_mock.assert_calls_async(1).await;
	access_mock.assert_calls_async(1).await;
	assert_eq!(harness.browser.opened().len(), 1);
}

#[tokio::test]
async fn fresh_request_token_is_reused() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;

	seed_request_token(&harness, Duration::minutes(1), None).await;

	let token =
		harness.session.ensure_request_token().await.expect("Fresh token should be reused.");

	assert_eq!(token.expose(), "cached-token");

	request_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn stale_request_token_purges_every_field() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;

	seed_request_token(&harness, Duration::minutes(5), Some("old-verifier")).await;

	let token =
		harness.session.ensure_request_token().await.expect("Stale token should be replaced.");

	assert_eq!(token.expose(), "req-token");

	request_mock.assert_calls_async(1).await;

	assert_eq!(stored(&harness, CredentialKey::Verifier).await, None);
	assert_eq!(stored(&harness, CredentialKey::Access).await, None);
	assert_eq!(stored(&harness, CredentialKey::TokenSecret).await, Some(Value::from("req-secret")));
}

#[tokio::test]
async fn stale_request_token_purges_a_lone_access_token() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;

	seed_request_token(&harness, Duration::minutes(5), None).await;
	harness
		.store
		.set_one(CredentialKey::Access.as_str(), Value::from("orphan-access"))
		.await
		.expect("Seeding the access token should succeed.");

	let token =
		harness.session.ensure_request_token().await.expect("Stale token should be replaced.");

	assert_eq!(token.expose(), "req-token");

	request_mock.assert_calls_async(1).await;

	assert_eq!(stored(&harness, CredentialKey::Access).await, None);
	assert_eq!(stored(&harness, CredentialKey::Verifier).await, None);
	assert_eq!(stored(&harness, CredentialKey::Token).await, Some(Value::from("req-token")));
	assert_eq!(stored(&harness, CredentialKey::TokenSecret).await, Some(Value::from("req-secret")));

	let time = stored(&harness, CredentialKey::TokenTime)
		.await
		.and_then(|value| value.as_i64())
		.expect("Acquisition time should be stored.");

	let minute_ago = millis_value(OffsetDateTime::now_utc() - Duration::minutes(1))
		.as_i64()
		.expect("Millisecond timestamps should be integers.");

	assert!(time > minute_ago);
}

#[tokio::test]
async fn request_token_without_secret_is_rejected() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(POST).path(REQUEST_PATH);
			then.status(200).body("oauth_token=only-token&oauth_callback_confirmed=true");
		})
		.await;

	let err = harness
		.session
		.ensure_access_token()
		.await
		.expect_err("A response without a token secret should fail.");

	assert!(matches!(err, Error::TokenAcquisition { .. }));
	assert!(harness.store.is_empty());
	assert!(harness.browser.opened().is_empty());
}

#[tokio::test]
async fn request_token_http_failure_passes_through() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(POST).path(REQUEST_PATH);
			then.status(401).body("oauth_problem=signature_invalid");
		})
		.await;

	let err = harness
		.session
		.ensure_access_token()
		.await
		.expect_err("An HTTP failure should surface.");

	match err {
		Error::Http { status, body } => {
			assert_eq!(status, 401);
			assert!(body.contains("signature_invalid"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn redirect_without_verifier_fails_and_releases_the_listener() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;
	let access_mock = mock_access_token(&server).await;

	harness.browser.redirect_to("oauth2upwatcher://foo?oauth_token=req-token&denied=1");

	let err = harness
		.session
		.ensure_access_token()
		.await
		.expect_err("A redirect without a verifier should fail.");

	assert!(matches!(err, Error::Verifier { .. }));

	request_mock.assert_calls_async(1).await;
	access_mock.assert_calls_async(0).await;

	let wait = harness.session.last_verifier_wait().expect("A verifier wait should be recorded.");

	assert_eq!(wait.state(), VerifierWaitState::Completed);
	assert_eq!(wait.transitions(), 1);
	assert_eq!(harness.lifecycle.listener_count(), 0);
}

#[tokio::test]
async fn deep_link_from_an_earlier_login_is_ignored() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;
	let access_mock = mock_access_token(&server).await;

	harness.lifecycle.set_initial_url("oauth2upwatcher://foo?oauth_token=old&oauth_verifier=old");
	harness.browser.resume_without_link();

	let err = harness
		.session
		.ensure_access_token()
		.await
		.expect_err("A resume without a fresh deep link should fail.");

	assert!(matches!(err, Error::Verifier { .. }));

	request_mock.assert_calls_async(1).await;
	access_mock.assert_calls_async(0).await;

	assert_eq!(stored(&harness, CredentialKey::Verifier).await, None);
	assert_eq!(harness.lifecycle.initial_url(), None);
	assert_eq!(harness.lifecycle.listener_count(), 0);
}

#[tokio::test]
async fn verifier_wait_honors_the_timeout() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let _request_mock = mock_request_token(&server).await;
	let session =
		Session::clone(&harness.session).with_verifier_timeout(StdDuration::from_millis(50));
	let err = session.ensure_access_token().await.expect_err("The verifier wait should time out.");

	assert!(matches!(err, Error::Verifier { .. }));
	assert_eq!(harness.lifecycle.listener_count(), 0);
}

#[tokio::test]
async fn concurrent_logins_share_one_handshake() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;
	let access_mock = mock_access_token(&server).await;

	harness.browser.redirect_to(REDIRECT);

	let first = harness.session.clone();
	let second = harness.session.clone();
	let (a, b) = tokio::join!(first.ensure_access_token(), second.ensure_access_token());

	assert_eq!(a.expect("First login should succeed.").expose(), "access-token");
	assert_eq!(b.expect("Second login should succeed.").expose(), "access-token");

	request_mock.assert_calls_async(1).await;
	access_mock.assert_calls_async(1).await;
	assert_eq!(harness.browser.opened().len(), 1);
}

#[tokio::test]
async fn logout_forgets_every_credential() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());

	seed_request_token(&harness, Duration::minutes(1), Some("verifier")).await;
	harness.session.logout().await.expect("Logout should succeed.");

	assert!(harness.store.is_empty());
}

#[tokio::test]
async fn logout_cancels_an_abandoned_authorization() {
	let server = MockServer::start_async().await;
	let harness = build_test_session(&server.base_url());
	let request_mock = mock_request_token(&server).await;
	let access_mock = mock_access_token(&server).await;
	let login = harness.session.ensure_access_token();
	let logout = async {
		while harness.lifecycle.listener_count() == 0 {
			tokio::time::sleep(StdDuration::from_millis(5)).await;
		}

		harness.session.logout().await
	};
	let (login, logout) = tokio::join!(login, logout);

	assert!(matches!(login, Err(Error::Verifier { .. })));

	logout.expect("Logout should succeed once the wait is cancelled.");
	request_mock.assert_calls_async(1).await;
	access_mock.assert_calls_async(0).await;

	let wait = harness.session.last_verifier_wait().expect("A verifier wait should be recorded.");

	assert_eq!(wait.state(), VerifierWaitState::Completed);
	assert_eq!(harness.browser.opened().len(), 1);
	assert_eq!(harness.lifecycle.listener_count(), 0);
	assert!(harness.store.is_empty());
}
