//! User profile lookups.

// self
use crate::{
	_prelude::*,
	flows::WiseClient,
	http::{ApiTransport, Method, RequestSpec},
};

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Lists the profiles the token can act for. `GET /v2/profiles`.
	pub async fn profiles(&self) -> Result<Value> {
		self.request(&RequestSpec::new("profiles", Method::Get, "/v2/profiles")).await
	}

	/// Retrieves a profile's bank details. `GET /v1/profiles/{id}/account-details`.
	pub async fn bank_details(&self, profile_id: u64) -> Result<Value> {
		let spec = RequestSpec::new(
			"bank_details",
			Method::Get,
			format!("/v1/profiles/{profile_id}/account-details"),
		);

		self.request(&spec).await
	}
}
