//! Browser hand-off that yields the OAuth verifier.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, CredentialSet, TokenSecret, VerifierWait, parse_verifier},
	flows::Session,
	http::HttpTransport,
	link::{AppState, LifecycleSubscription},
	obs::{self, FlowKind},
};

impl<T> Session<T>
where
	T: ?Sized + HttpTransport,
{
	/// Returns the cached verifier or sends the user to the authorization page and waits for
	/// the app to come back with one.
	///
	/// The wait resolves on the first [`AppState::Active`] event after the browser was opened.
	/// Only a deep link delivered during the wait counts: one recorded earlier is discarded
	/// before the browser opens. If the app resumes without a link carrying an
	/// `oauth_verifier`, the call fails with [`Error::Verifier`], as it does when
	/// [`Session::logout`] cancels the wait. The lifecycle listener is removed on every exit
	/// path.
	pub async fn acquire_verifier(&self) -> Result<TokenSecret> {
		obs::observe(FlowKind::Verifier, "acquire_verifier", async {
			let creds = CredentialSet::load(self.store.as_ref()).await?;

			if let Some(verifier) = creds.verifier {
				return Ok(verifier);
			}

			let Some(token) = creds.token else {
				return Err(Error::Verifier { reason: "no request token to authorize".into() });
			};
			let wait = Arc::new(VerifierWait::default());

			*self.last_verifier_wait.lock() = Some(wait.clone());

			let mut subscription = self.lifecycle.subscribe();
			let outcome = self.await_verifier(&mut subscription, &wait, token.expose()).await;

			subscription.unsubscribe();
			wait.complete();

			let verifier = outcome?;

			self.store
				.set_one(CredentialKey::Verifier.as_str(), Value::from(verifier.as_str()))
				.await?;

			Ok(TokenSecret::new(verifier))
		})
		.await
	}

	async fn await_verifier(
		&self,
		subscription: &mut LifecycleSubscription,
		wait: &VerifierWait,
		token: &str,
	) -> Result<String> {
		let authorize_url = self.descriptor.authorize_url(token)?;

		if self.lifecycle.take_initial_url().is_some() {
			tracing::debug!("discarding deep link recorded before the hand-off");
		}

		self.browser.open_url(&authorize_url)?;
		tracing::debug!(url = %authorize_url, "waiting for the authorization redirect");

		let resumed = async {
			tokio::select! {
				link = self.next_resume(subscription) => link,
				_ = wait.cancelled() =>
					Err(Error::Verifier { reason: "wait cancelled by logout".into() }),
			}
		};
		let link = match self.verifier_timeout {
			Some(limit) => tokio::time::timeout(limit, resumed).await.map_err(|_| {
				Error::Verifier { reason: format!("no redirect within {limit:?}") }
			})??,
			None => resumed.await?,
		};

		link.as_deref().and_then(parse_verifier).ok_or_else(|| Error::Verifier {
			reason: "redirect did not carry an oauth_verifier".into(),
		})
	}

	async fn next_resume(
		&self,
		subscription: &mut LifecycleSubscription,
	) -> Result<Option<String>> {
		loop {
			match subscription.next().await {
				Some(AppState::Active) => return Ok(self.lifecycle.take_initial_url()),
				Some(state) => tracing::trace!(?state, "ignoring lifecycle change"),
				None =>
					return Err(Error::Verifier {
						reason: "lifecycle listener closed before the app resumed".into(),
					}),
			}
		}
	}
}
