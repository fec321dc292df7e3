//! Serialized login orchestration.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::Session,
	http::HttpTransport,
	obs::{self, FlowKind},
};

impl<T> Session<T>
where
	T: ?Sized + HttpTransport,
{
	/// Runs the three handshake legs and returns the access token.
	///
	/// Concurrent callers queue on a session-wide lock; the ones that wake after a successful
	/// login find every credential cached and return without touching the network.
	pub async fn ensure_access_token(&self) -> Result<TokenSecret> {
		let _guard = self.login_guard.lock().await;

		obs::observe(FlowKind::Login, "ensure_access_token", async {
			self.ensure_request_token().await?;
			self.acquire_verifier().await?;
			self.acquire_access_token().await
		})
		.await
	}

	/// Alias for [`Session::ensure_access_token`] that discards the token.
	pub async fn login(&self) -> Result<()> {
		self.ensure_access_token().await.map(|_| ())
	}

	/// Forgets every credential so the next call starts a fresh handshake.
	///
	/// A login blocked on the browser redirect is cancelled first and fails with
	/// [`Error::Verifier`]. A login still fetching its request token is waited for.
	pub async fn logout(&self) -> Result<()> {
		if let Some(wait) = self.last_verifier_wait()
			&& wait.cancel()
		{
			tracing::debug!("cancelling the pending verifier wait");
		}

		let _guard = self.login_guard.lock().await;

		tracing::info!("dropping cached credentials");

		self.flush_credentials().await
	}
}
