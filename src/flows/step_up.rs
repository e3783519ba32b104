//! The step-up retry engine.
//!
//! A sensitive operation can be rejected with an HTTP 403 carrying a one-time
//! `x-2fa-approval` token instead of succeeding outright. The engine signs that token with the
//! caller-held key, rotates the credential context (copy-on-write, never in place), and
//! re-executes the identical [`RequestSpec`] exactly once. The caller sees either the final
//! payload or a single typed failure; nothing is ever retried a second time.

// self
use crate::{
	_prelude::*,
	flows::WiseClient,
	http::{ApiTransport, RequestSpec, TransportHandle},
	obs::{self, CallOutcome, CallSpan},
	sca::ChallengeToken,
};

/// Protocol states traversed by one logical call.
///
/// `Succeeded` and `Failed` are terminal; the `ChallengeDetected → Signing → Retrying` arc is
/// entered at most once per call, so a spec never executes more than twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepUpState {
	/// No request dispatched yet.
	Initial,
	/// First execution in flight.
	Executing,
	/// First execution failed with a resolvable challenge.
	ChallengeDetected,
	/// Possession proof being computed.
	Signing,
	/// Second and final execution in flight.
	Retrying,
	/// Terminal success.
	Succeeded,
	/// Terminal failure.
	Failed,
}
impl StepUpState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepUpState::Initial => "initial",
			StepUpState::Executing => "executing",
			StepUpState::ChallengeDetected => "challenge_detected",
			StepUpState::Signing => "signing",
			StepUpState::Retrying => "retrying",
			StepUpState::Succeeded => "succeeded",
			StepUpState::Failed => "failed",
		}
	}

	/// Returns whether `next` is a legal successor of this state.
	///
	/// Terminal states permit nothing, and `Retrying` only terminates; the protocol cannot
	/// re-enter the challenge arc.
	pub const fn permits(self, next: StepUpState) -> bool {
		matches!(
			(self, next),
			(StepUpState::Initial, StepUpState::Executing)
				| (StepUpState::Executing, StepUpState::Succeeded)
				| (StepUpState::Executing, StepUpState::ChallengeDetected)
				| (StepUpState::Executing, StepUpState::Failed)
				| (StepUpState::ChallengeDetected, StepUpState::Signing)
				| (StepUpState::ChallengeDetected, StepUpState::Failed)
				| (StepUpState::Signing, StepUpState::Retrying)
				| (StepUpState::Signing, StepUpState::Failed)
				| (StepUpState::Retrying, StepUpState::Succeeded)
				| (StepUpState::Retrying, StepUpState::Failed)
		)
	}
}
impl Display for StepUpState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Executes a request spec, transparently resolving at most one step-up challenge.
	pub async fn request(&self, spec: &RequestSpec) -> Result<Value> {
		let span = CallSpan::new(spec.operation, "request");

		obs::record_call_outcome(spec.operation, CallOutcome::Attempt);

		let result = span.instrument(self.run_protocol(spec, &span)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(spec.operation, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(spec.operation, CallOutcome::Failure),
		}

		result
	}

	/// Executes a request spec and decodes the payload into `T`.
	pub async fn request_as<T>(&self, spec: &RequestSpec) -> Result<T>
	where
		T: for<'de> Deserialize<'de>,
	{
		let payload = self.request(spec).await?;

		serde_path_to_error::deserialize(payload)
			.map_err(|source| crate::error::DecodeError { status: None, source }.into())
	}

	async fn run_protocol(&self, spec: &RequestSpec, span: &CallSpan) -> Result<Value> {
		let mut state = StepUpState::Initial;
		let snapshot = self.current_credentials();
		let handle = TransportHandle::bind(self.transport.clone(), &snapshot);

		transition(&mut state, StepUpState::Executing, span);

		let failure = match handle.execute(spec).await {
			Ok(payload) => {
				transition(&mut state, StepUpState::Succeeded, span);

				return Ok(payload);
			},
			Err(error) => error,
		};
		// Only the specific challenge signal is resolved here; every other failure passes
		// through unmodified so callers can inspect status and headers.
		let Some(token) = challenge_in(spec, &failure) else {
			transition(&mut state, StepUpState::Failed, span);

			return Err(failure);
		};

		transition(&mut state, StepUpState::ChallengeDetected, span);
		self.challenge_metrics.record_detected();
		obs::record_call_outcome(spec.operation, CallOutcome::Challenge);

		let Some(key) = snapshot.signing_key.clone() else {
			self.challenge_metrics.record_failed();
			transition(&mut state, StepUpState::Failed, span);

			return Err(Error::MissingSigningKey);
		};

		transition(&mut state, StepUpState::Signing, span);

		let proof = match key.sign(&token) {
			Ok(proof) => proof,
			Err(error) => {
				self.challenge_metrics.record_failed();
				transition(&mut state, StepUpState::Failed, span);

				return Err(error.into());
			},
		};
		let rotated = snapshot.with_extra_headers(proof.into_headers());

		// Commit before retrying: later calls reuse the proof, while calls already in flight
		// keep the snapshot they captured.
		self.rotate_credentials(rotated.clone());

		let retry_handle = TransportHandle::bind(self.transport.clone(), &rotated);

		transition(&mut state, StepUpState::Retrying, span);

		// The retry's outcome is final either way; a second challenge is a hard failure.
		match retry_handle.execute(spec).await {
			Ok(payload) => {
				self.challenge_metrics.record_resolved();
				transition(&mut state, StepUpState::Succeeded, span);

				Ok(payload)
			},
			Err(error) => {
				self.challenge_metrics.record_failed();
				transition(&mut state, StepUpState::Failed, span);

				Err(error)
			},
		}
	}
}

/// Identifies a resolvable challenge among failures.
///
/// The spec must opt in via [`StepUpPolicy::Enabled`](crate::http::StepUpPolicy) and the
/// failure must be a 403 carrying the one-time token header; anything else is surfaced
/// verbatim.
fn challenge_in(spec: &RequestSpec, error: &Error) -> Option<ChallengeToken> {
	if !spec.step_up.is_enabled() {
		return None;
	}
	match error {
		Error::Api(failure) => ChallengeToken::detect(failure),
		_ => None,
	}
}

fn transition(state: &mut StepUpState, next: StepUpState, span: &CallSpan) {
	debug_assert!(state.permits(next), "illegal protocol transition");

	*state = next;

	span.record_transition(next.as_str());
}
