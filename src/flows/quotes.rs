//! Quote creation.

// self
use crate::{
	_prelude::*,
	flows::WiseClient,
	http::{ApiTransport, Method, RequestSpec},
};

/// Body for quote creation.
///
/// `profile` travels in the body for the v2 endpoint; the v3 endpoint moved it into the path
/// and strips the field before sending.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuote {
	/// Delivery method for the funds (e.g. `BANK_TRANSFER`, `BALANCE`).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pay_out: Option<String>,
	/// Preferred funding method (e.g. `BANK_TRANSFER`).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub preferred_pay_in: Option<String>,
	/// Owning profile identifier (v2 only).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile: Option<u64>,
	/// Amount in the source currency; exactly one of the two amounts should be set.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_amount: Option<f64>,
	/// Source currency code.
	pub source_currency: String,
	/// Amount in the target currency; exactly one of the two amounts should be set.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target_amount: Option<f64>,
	/// Target currency code.
	pub target_currency: String,
}

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Creates a quote with the profile carried in the body. `POST /v2/quotes`.
	pub async fn create_quote_v2(&self, quote: &CreateQuote) -> Result<Value> {
		let spec =
			RequestSpec::new("create_quote_v2", Method::Post, "/v2/quotes").with_json_body(quote)?;

		self.request(&spec).await
	}

	/// Creates a quote owned by the profile in the path. `POST /v3/profiles/{id}/quotes`.
	pub async fn create_quote_v3(&self, profile_id: u64, quote: &CreateQuote) -> Result<Value> {
		let mut body = serde_json::to_value(quote)
			.map_err(|source| crate::error::ConfigError::InvalidBody { source })?;

		if let Some(map) = body.as_object_mut() {
			map.remove("profile");
		}

		let spec = RequestSpec::new(
			"create_quote_v3",
			Method::Post,
			format!("/v3/profiles/{profile_id}/quotes"),
		)
		.with_body(body);

		self.request(&spec).await
	}
}
