//! OAuth 1.0a three-legged handshake and signed request dispatch.
//!
//! [`Session`] owns the signer, the transport, the credential store, and the deep-link
//! collaborators. The handshake legs live in submodules: `handshake` (request + access token
//! exchanges and the freshness rule), `verifier` (browser hand-off), `login` (serialized
//! orchestration), and `request` (signed calls against arbitrary endpoints).

pub mod request;

mod handshake;
mod login;
mod verifier;

pub use request::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::VerifierWait,
	http::HttpTransport,
	link::{AppLifecycle, BrowserLauncher},
	net::{AssumeOnline, Reachability},
	oauth::OAuthSigner,
	provider::ProviderDescriptor,
	store::KeyValueStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestTransport, oauth::HmacSha1Signer, provider::ConsumerCredentials};

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = Session<ReqwestTransport>;

/// Authenticated API session against a single provider descriptor.
///
/// Every handshake step persists its output through [`Session::store`], so a login that was
/// interrupted (process killed while the user sat on the authorization page, for example)
/// resumes from the last completed step. Only the verifier wait itself is tied to the live
/// process because it listens for the app returning to the foreground.
pub struct Session<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound API call.
	pub transport: Arc<T>,
	/// OAuth 1.0a signer owned by this session.
	pub signer: Arc<dyn OAuthSigner>,
	/// Persistent store for credentials (and, via the feed model, settings and feeds).
	pub store: Arc<dyn KeyValueStore>,
	/// API endpoints and paging defaults.
	pub descriptor: ProviderDescriptor,
	/// Connectivity probe consulted before API calls that need a login.
	pub reachability: Arc<dyn Reachability>,
	/// External browser used for the authorization page.
	pub browser: Arc<dyn BrowserLauncher>,
	/// App lifecycle hub delivering the foreground-resume signal.
	pub lifecycle: AppLifecycle,
	/// Optional upper bound on the verifier wait; `None` waits indefinitely.
	pub verifier_timeout: Option<StdDuration>,
	login_guard: Arc<AsyncMutex<()>>,
	last_verifier_wait: Arc<Mutex<Option<Arc<VerifierWait>>>>,
}
impl<T> Session<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a session around the caller-provided transport.
	pub fn with_transport(
		descriptor: ProviderDescriptor,
		signer: Arc<dyn OAuthSigner>,
		store: Arc<dyn KeyValueStore>,
		browser: Arc<dyn BrowserLauncher>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			signer,
			store,
			descriptor,
			reachability: Arc::new(AssumeOnline),
			browser,
			lifecycle: AppLifecycle::default(),
			verifier_timeout: None,
			login_guard: Default::default(),
			last_verifier_wait: Default::default(),
		}
	}

	/// Replaces the connectivity probe.
	pub fn with_reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
		self.reachability = reachability;

		self
	}

	/// Shares an existing lifecycle hub with the host application.
	pub fn with_lifecycle(mut self, lifecycle: AppLifecycle) -> Self {
		self.lifecycle = lifecycle;

		self
	}

	/// Bounds the verifier wait.
	pub fn with_verifier_timeout(mut self, timeout: StdDuration) -> Self {
		self.verifier_timeout = Some(timeout);

		self
	}

	/// The most recent verifier wait started by this session, if any.
	pub fn last_verifier_wait(&self) -> Option<Arc<VerifierWait>> {
		self.last_verifier_wait.lock().clone()
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestTransport> {
	/// Creates a session that signs with HMAC-SHA1 for `consumer` and talks to the API over a
	/// fresh reqwest client.
	pub fn new(
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
		store: Arc<dyn KeyValueStore>,
		browser: Arc<dyn BrowserLauncher>,
	) -> Self {
		Self::with_transport(
			descriptor,
			Arc::new(HmacSha1Signer::new(consumer)),
			store,
			browser,
			ReqwestTransport::default(),
		)
	}
}
impl<T> Clone for Session<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			signer: self.signer.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			reachability: self.reachability.clone(),
			browser: self.browser.clone(),
			lifecycle: self.lifecycle.clone(),
			verifier_timeout: self.verifier_timeout,
			login_guard: self.login_guard.clone(),
			last_verifier_wait: self.last_verifier_wait.clone(),
		}
	}
}
impl<T> Debug for Session<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("descriptor", &self.descriptor)
			.field("verifier_timeout", &self.verifier_timeout)
			.finish()
	}
}
