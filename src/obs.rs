//! Observability helpers for the handshake and feed flows.
//!
//! Every flow runs inside a `tracing` span named `upwatcher.flow` with `flow` (handshake leg or
//! feed operation) and `stage` (call site) fields. Enable the `metrics` feature to increment
//! the `upwatcher_flow_total` counter for every attempt/success/failure, labeled by
//! `flow` + `outcome`.

// crates.io
use tracing::Instrument;
// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Request-token leg of the handshake.
	RequestToken,
	/// Browser hand-off waiting for the verifier.
	Verifier,
	/// Access-token leg of the handshake.
	AccessToken,
	/// Full login (all three legs, serialized).
	Login,
	/// Feed page fetch.
	FeedFetch,
	/// Single job lookup.
	JobInfo,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::RequestToken => "request_token",
			FlowKind::Verifier => "verifier",
			FlowKind::AccessToken => "access_token",
			FlowKind::Login => "login",
			FlowKind::FeedFetch => "feed_fetch",
			FlowKind::JobInfo => "job_info",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an `upwatcher.flow` span for `kind`, recording attempt and outcome.
pub async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = tracing::info_span!("upwatcher.flow", flow = kind.as_str(), stage);

	record(kind, FlowOutcome::Attempt);

	let result = fut.instrument(span).await;

	match &result {
		Ok(_) => record(kind, FlowOutcome::Success),
		Err(e) => {
			tracing::debug!(flow = kind.as_str(), stage, error = %e, "flow failed");
			record(kind, FlowOutcome::Failure);
		},
	}

	result
}

#[cfg(feature = "metrics")]
fn record(kind: FlowKind, outcome: FlowOutcome) {
	metrics::counter!("upwatcher_flow_total", "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
}
#[cfg(not(feature = "metrics"))]
fn record(_: FlowKind, _: FlowOutcome) {}
