//! Network reachability checks consulted before calls that need the remote API.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Reachability::check`].
pub type ReachabilityFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Connectivity probe; resolves when online and fails with [`Error::Offline`] otherwise.
pub trait Reachability
where
	Self: Send + Sync,
{
	/// Checks connectivity.
	fn check(&self) -> ReachabilityFuture<'_>;
}

/// Probe that always reports connectivity; the transport surfaces real failures.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeOnline;
impl Reachability for AssumeOnline {
	fn check(&self) -> ReachabilityFuture<'_> {
		Box::pin(async { Ok(()) })
	}
}

/// Probe backed by a fixed answer, toggled by the host (e.g. from platform network events).
#[derive(Debug)]
pub struct ConnectivityFlag(Mutex<bool>);
impl ConnectivityFlag {
	/// Creates a flag with the given initial state.
	pub fn new(online: bool) -> Self {
		Self(Mutex::new(online))
	}

	/// Updates the reported state.
	pub fn set_online(&self, online: bool) {
		*self.0.lock() = online;
	}
}
impl Default for ConnectivityFlag {
	fn default() -> Self {
		Self::new(true)
	}
}
impl Reachability for ConnectivityFlag {
	fn check(&self) -> ReachabilityFuture<'_> {
		let online = *self.0.lock();

		Box::pin(async move { if online { Ok(()) } else { Err(Error::Offline) } })
	}
}

/// Probe that issues a `HEAD` against a URL; any HTTP answer counts as online.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct HttpProbe {
	client: ReqwestClient,
	url: Url,
}
#[cfg(feature = "reqwest")]
impl HttpProbe {
	/// Creates a probe for `url` using `client`.
	pub fn new(client: ReqwestClient, url: Url) -> Self {
		Self { client, url }
	}
}
#[cfg(feature = "reqwest")]
impl Reachability for HttpProbe {
	fn check(&self) -> ReachabilityFuture<'_> {
		Box::pin(async move {
			match self.client.head(self.url.clone()).send().await {
				Ok(_) => Ok(()),
				Err(e) if e.is_connect() || e.is_timeout() => {
					tracing::debug!(error = %e, "reachability probe failed");

					Err(Error::Offline)
				},
				Err(e) => Err(crate::error::TransportError::from(e).into()),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn connectivity_flag_reports_offline() {
		let flag = ConnectivityFlag::default();

		flag.check().await.expect("Default flag should report online.");
		flag.set_online(false);

		assert!(matches!(flag.check().await, Err(Error::Offline)));
		AssumeOnline.check().await.expect("AssumeOnline never fails.");
	}
}
