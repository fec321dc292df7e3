//! Verifier hand-off: parsing the deep link and tracking the one-shot wait for it.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use tokio::sync::Notify;
// self
use crate::_prelude::*;

const VERIFIER_PARAM: &str = "oauth_verifier";

/// Lifecycle of a single wait for the authorization redirect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerifierWaitState {
	/// The browser was opened and the resume signal has not been handled yet.
	#[default]
	Pending,
	/// The wait resolved (with or without a verifier) and its listener is gone.
	Completed,
}

/// One-shot guard around a verifier wait.
///
/// The state moves from [`VerifierWaitState::Pending`] to [`VerifierWaitState::Completed`]
/// exactly once; later completion attempts are ignored and do not count as transitions.
/// [`VerifierWait::cancel`] ends a pending wait early.
#[derive(Debug, Default)]
pub struct VerifierWait {
	state: Mutex<VerifierWaitState>,
	transitions: AtomicUsize,
	cancel: Notify,
}
impl VerifierWait {
	/// Current state.
	pub fn state(&self) -> VerifierWaitState {
		*self.state.lock()
	}

	/// Number of times the wait changed state (0 or 1).
	pub fn transitions(&self) -> usize {
		self.transitions.load(Ordering::Acquire)
	}

	/// Marks the wait completed; returns `false` if it already was.
	pub fn complete(&self) -> bool {
		let mut state = self.state.lock();

		if *state == VerifierWaitState::Completed {
			return false;
		}

		*state = VerifierWaitState::Completed;
		self.transitions.fetch_add(1, Ordering::AcqRel);

		true
	}

	/// Asks a pending wait to give up; returns `false` if it already completed.
	pub fn cancel(&self) -> bool {
		if self.state() == VerifierWaitState::Completed {
			return false;
		}

		self.cancel.notify_one();

		true
	}

	/// Resolves once [`VerifierWait::cancel`] was called.
	pub async fn cancelled(&self) {
		self.cancel.notified().await;
	}
}

/// Extracts a non-empty `oauth_verifier` from a resumed deep link.
///
/// Custom-scheme URLs (`oauth2upwatcher://foo?...`) are parsed as URLs first; anything that
/// fails to parse is scanned as a raw `&`-separated parameter list.
pub fn parse_verifier(link: &str) -> Option<String> {
	let found = match Url::parse(link) {
		Ok(url) => url
			.query_pairs()
			.chain(
				url.fragment()
					.map(|fragment| url::form_urlencoded::parse(fragment.as_bytes()))
					.into_iter()
					.flatten(),
			)
			.find(|(key, _)| key == VERIFIER_PARAM)
			.map(|(_, value)| value.into_owned()),
		Err(_) => link
			.rsplit_once('?')
			.map_or(link, |(_, query)| query)
			.split('&')
			.filter_map(|pair| pair.split_once('='))
			.find(|(key, _)| *key == VERIFIER_PARAM)
			.map(|(_, value)| value.to_owned()),
	};

	found.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_verifier_from_custom_scheme_links() {
		assert_eq!(
			parse_verifier("oauth2upwatcher://foo?oauth_token=abc&oauth_verifier=v3r1f13r"),
			Some("v3r1f13r".into())
		);
		assert_eq!(
			parse_verifier("oauth2upwatcher://foo#oauth_verifier=from-fragment"),
			Some("from-fragment".into())
		);
	}

	#[test]
	fn raw_parameter_lists_are_scanned() {
		assert_eq!(parse_verifier("oauth_token=abc&oauth_verifier=raw"), Some("raw".into()));
	}

	#[test]
	fn missing_or_empty_verifier_yields_none() {
		assert_eq!(parse_verifier("oauth2upwatcher://foo?oauth_token=abc"), None);
		assert_eq!(parse_verifier("oauth2upwatcher://foo?oauth_verifier="), None);
		assert_eq!(parse_verifier(""), None);
	}

	#[test]
	fn wait_completes_exactly_once() {
		let wait = VerifierWait::default();

		assert_eq!(wait.state(), VerifierWaitState::Pending);
		assert_eq!(wait.transitions(), 0);
		assert!(wait.complete());
		assert!(!wait.complete());
		assert_eq!(wait.state(), VerifierWaitState::Completed);
		assert!(!wait.cancel());
		assert_eq!(wait.transitions(), 1);
	}

	#[tokio::test]
	async fn cancel_before_the_wait_is_not_lost() {
		let wait = VerifierWait::default();

		assert!(wait.cancel());

		wait.cancelled().await;

		assert_eq!(wait.state(), VerifierWaitState::Pending);
	}
}
