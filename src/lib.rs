//! Job-feed client core for the Upwork API: OAuth 1.0a three-legged login with persisted,
//! expiry-aware credentials, settings-driven paged feeds, and pure state reducers for the UI
//! layer.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod feeds;
pub mod flows;
pub mod http;
pub mod link;
pub mod net;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod state;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicBool, Ordering};
	// self
	use crate::{
		flows::Session,
		http::ReqwestTransport,
		link::{AppLifecycle, AppState, BrowserLauncher},
		oauth::{HmacSha1Signer, OAuthSigner},
		provider::{ConsumerCredentials, ProviderDescriptor},
		store::{KeyValueStore, MemoryStore},
	};

	/// Session type alias used by reqwest-backed integration tests.
	pub type ReqwestTestSession = Session<ReqwestTransport>;

	/// Consumer key shared by the test fixtures.
	pub const TEST_CONSUMER_KEY: &str = "consumer-it";
	/// Consumer secret shared by the test fixtures.
	pub const TEST_CONSUMER_SECRET: &str = "consumer-secret-it";

	/// Browser double that records every opened URL and, when a redirect is configured,
	/// immediately plays the role of the user returning to the app through the deep link.
	#[derive(Debug)]
	pub struct RecordingBrowser {
		lifecycle: AppLifecycle,
		redirect: Mutex<Option<String>>,
		bare_resume: AtomicBool,
		opened: Mutex<Vec<Url>>,
	}
	impl RecordingBrowser {
		/// Creates a browser bound to `lifecycle` with no redirect configured.
		pub fn new(lifecycle: AppLifecycle) -> Self {
			Self {
				lifecycle,
				redirect: Mutex::new(None),
				bare_resume: AtomicBool::new(false),
				opened: Mutex::new(Vec::new()),
			}
		}

		/// Sets the deep link the simulated user lands on after authorizing.
		pub fn redirect_to(&self, url: impl Into<String>) {
			*self.redirect.lock() = Some(url.into());
		}

		/// Makes the simulated user switch back to the app without following any deep link.
		pub fn resume_without_link(&self) {
			self.bare_resume.store(true, Ordering::Relaxed);
		}

		/// URLs opened so far, oldest first.
		pub fn opened(&self) -> Vec<Url> {
			self.opened.lock().clone()
		}
	}
	impl BrowserLauncher for RecordingBrowser {
		fn open_url(&self, url: &Url) -> Result<()> {
			self.opened.lock().push(url.clone());

			if let Some(redirect) = self.redirect.lock().clone() {
				self.lifecycle.resume_with_url(redirect);
			} else if self.bare_resume.load(Ordering::Relaxed) {
				self.lifecycle.change_state(AppState::Active);
			}

			Ok(())
		}
	}

	/// Everything a test needs to drive a session and inspect its collaborators.
	#[derive(Debug)]
	pub struct TestHarness {
		/// Session under test.
		pub session: Arc<ReqwestTestSession>,
		/// Store backing the session.
		pub store: Arc<MemoryStore>,
		/// Lifecycle hub the browser double resumes through.
		pub lifecycle: AppLifecycle,
		/// Browser double.
		pub browser: Arc<RecordingBrowser>,
	}

	/// Builds a descriptor whose endpoints all point at `base_url` (usually an `httpmock`
	/// server).
	pub fn test_descriptor(base_url: &str) -> ProviderDescriptor {
		ProviderDescriptor::upwork()
			.base_url(base_url)
			.build()
			.expect("Test descriptor should build for a loopback base URL.")
	}

	/// Constructs a [`Session`] backed by an in-memory store, the HMAC-SHA1 signer, the reqwest
	/// transport, and a [`RecordingBrowser`].
	pub fn build_test_session(base_url: &str) -> TestHarness {
		let store = Arc::new(MemoryStore::default());
		let lifecycle = AppLifecycle::default();
		let browser = Arc::new(RecordingBrowser::new(lifecycle.clone()));
		let signer: Arc<dyn OAuthSigner> = Arc::new(HmacSha1Signer::new(
			ConsumerCredentials::new(TEST_CONSUMER_KEY, TEST_CONSUMER_SECRET),
		));
		let session = Session::with_transport(
			test_descriptor(base_url),
			signer,
			store.clone() as Arc<dyn KeyValueStore>,
			browser.clone() as Arc<dyn BrowserLauncher>,
			ReqwestTransport::default(),
		)
		.with_lifecycle(lifecycle.clone());

		TestHarness { session: Arc::new(session), store, lifecycle, browser }
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
