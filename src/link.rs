//! Deep-link bridge: handing the user to an external browser and observing the app coming
//! back to the foreground.
//!
//! The host application owns an [`AppLifecycle`] and forwards platform events into it:
//! [`AppLifecycle::set_initial_url`] when a deep link arrives and
//! [`AppLifecycle::change_state`] when the app moves between foreground and background.
//! Flows call [`AppLifecycle::subscribe`] to receive those state changes until they drop or
//! explicitly [`unsubscribe`](LifecycleSubscription::unsubscribe).

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
// self
use crate::_prelude::*;
#[cfg(feature = "browser")] use crate::error::TransportError;

/// Opens URLs outside the application (system browser, custom tab, ...).
pub trait BrowserLauncher
where
	Self: Send + Sync,
{
	/// Hands `url` to the external browser.
	fn open_url(&self, url: &Url) -> Result<()>;
}

/// Launches the operating system's default browser.
#[cfg(feature = "browser")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;
#[cfg(feature = "browser")]
impl BrowserLauncher for SystemBrowser {
	fn open_url(&self, url: &Url) -> Result<()> {
		open::that(url.as_str()).map_err(TransportError::Io)?;

		Ok(())
	}
}

/// Foreground state reported by the host application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
	/// The app is in the foreground and receiving events.
	Active,
	/// The app is transitioning between states.
	Inactive,
	/// The app runs in the background.
	Background,
}

#[derive(Debug, Default)]
struct LifecycleInner {
	initial_url: Mutex<Option<String>>,
	listeners: Mutex<HashMap<u64, UnboundedSender<AppState>>>,
	next_id: AtomicU64,
}

/// Shared hub for app-state changes and the most recently opened deep link.
#[derive(Clone, Debug, Default)]
pub struct AppLifecycle(Arc<LifecycleInner>);
impl AppLifecycle {
	/// Records the URL the app was (re)opened with.
	pub fn set_initial_url(&self, url: impl Into<String>) {
		*self.0.initial_url.lock() = Some(url.into());
	}

	/// The URL the app was last opened with, if any.
	pub fn initial_url(&self) -> Option<String> {
		self.0.initial_url.lock().clone()
	}

	/// Removes and returns the recorded URL, so a later read only sees a newer deep link.
	pub fn take_initial_url(&self) -> Option<String> {
		self.0.initial_url.lock().take()
	}

	/// Broadcasts a state change to every registered listener.
	pub fn change_state(&self, state: AppState) {
		self.0.listeners.lock().retain(|_, sender| sender.send(state).is_ok());
	}

	/// Convenience for a deep link arriving together with the app becoming active.
	pub fn resume_with_url(&self, url: impl Into<String>) {
		self.set_initial_url(url);
		self.change_state(AppState::Active);
	}

	/// Registers a new listener.
	pub fn subscribe(&self) -> LifecycleSubscription {
		let (sender, receiver) = mpsc::unbounded_channel();
		let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);

		self.0.listeners.lock().insert(id, sender);

		LifecycleSubscription { id, hub: Arc::clone(&self.0), receiver, registered: true }
	}

	/// Number of live listeners.
	pub fn listener_count(&self) -> usize {
		self.0.listeners.lock().len()
	}
}

/// Listener registration returned by [`AppLifecycle::subscribe`].
///
/// Deregistration happens exactly once, either through
/// [`unsubscribe`](Self::unsubscribe) or on drop.
#[derive(Debug)]
pub struct LifecycleSubscription {
	id: u64,
	hub: Arc<LifecycleInner>,
	receiver: UnboundedReceiver<AppState>,
	registered: bool,
}
impl LifecycleSubscription {
	/// Waits for the next state change; `None` once deregistered.
	pub async fn next(&mut self) -> Option<AppState> {
		if !self.registered {
			return None;
		}

		self.receiver.recv().await
	}

	/// Removes the listener; returns `false` when it was already removed.
	pub fn unsubscribe(&mut self) -> bool {
		if !self.registered {
			return false;
		}

		self.registered = false;
		self.hub.listeners.lock().remove(&self.id);
		self.receiver.close();

		true
	}

	/// Whether the listener is still registered.
	pub fn is_registered(&self) -> bool {
		self.registered
	}
}
impl Drop for LifecycleSubscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}
