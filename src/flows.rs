//! High-level client surface: construction, the step-up engine, and per-area operations.

pub mod balances;
pub mod metrics;
pub mod profiles;
pub mod quotes;
pub mod rates;
pub mod recipients;
pub mod step_up;
pub mod transfers;

pub use balances::*;
pub use metrics::*;
pub use quotes::*;
pub use rates::*;
pub use recipients::*;
pub use step_up::*;
pub use transfers::*;

// self
use crate::{
	_prelude::*,
	auth::{CredentialContext, Credentials},
	http::ApiTransport,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestApiTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestWiseClient = WiseClient<ReqwestApiTransport>;

/// Coordinates API operations over a shared transport and a rotating credential set.
///
/// The client owns the transport and the CURRENT [`CredentialContext`]. Context reads take an
/// `Arc` snapshot and rotation swaps the whole context, so a rotation triggered by one call can
/// never tear the header set observed by another; calls already in flight keep the handle they
/// captured. The context is the client's only internal mutable state.
#[derive(Clone)]
pub struct WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Transport used for every outbound API request.
	pub transport: Arc<C>,
	/// Counters describing step-up challenge outcomes on this client.
	pub challenge_metrics: Arc<ChallengeMetrics>,
	credentials: Arc<RwLock<Arc<CredentialContext>>>,
}
impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Creates a client over a caller-provided transport.
	pub fn with_transport(
		transport: impl Into<Arc<C>>,
		credentials: Credentials,
	) -> Result<Self> {
		let context = credentials.into_context()?;

		Ok(Self {
			transport: transport.into(),
			challenge_metrics: Default::default(),
			credentials: Arc::new(RwLock::new(Arc::new(context))),
		})
	}

	/// Returns the credential context currently used for new calls.
	pub fn current_credentials(&self) -> Arc<CredentialContext> {
		self.credentials.read().clone()
	}

	/// Commits a rotated context; calls already in flight keep their snapshot.
	pub(crate) fn rotate_credentials(&self, next: CredentialContext) {
		*self.credentials.write() = Arc::new(next);
	}
}
#[cfg(feature = "reqwest")]
impl WiseClient<ReqwestApiTransport> {
	/// Creates a client over the crate's default reqwest transport.
	///
	/// The transport applies a 25-second per-request timeout; use
	/// [`WiseClient::with_transport`] with a custom [`ReqwestApiTransport`] to override it.
	pub fn new(credentials: Credentials) -> Result<Self> {
		Self::with_transport(ReqwestApiTransport::new()?, credentials)
	}
}
impl<C> Debug for WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let current = self.current_credentials();

		f.debug_struct("WiseClient")
			.field("host", &current.host.as_str())
			.field("challenge_metrics", &self.challenge_metrics)
			.finish()
	}
}
