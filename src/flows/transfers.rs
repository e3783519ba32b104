//! Transfer creation, cancellation, and funding.
//!
//! Funding is one of the two operations the API may answer with a step-up challenge, so its
//! spec opts into challenge resolution explicitly.

// crates.io
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	flows::WiseClient,
	http::{ApiTransport, Method, RequestSpec},
};

/// Body for transfer creation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransfer {
	/// Idempotency key; generated when absent so accidental resubmission is safe by default.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_transaction_id: Option<Uuid>,
	/// Transfer details payload (reference, purpose, ...).
	pub details: Value,
	/// Quote the transfer is based on.
	pub quote_uuid: String,
	/// Funding account identifier, when required by the quote.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_account: Option<u64>,
	/// Recipient account identifier.
	pub target_account: u64,
}

/// Funding source for a transfer payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingType {
	/// Pay from the profile's multi-currency balance.
	Balance,
}

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Creates a transfer. `POST /v1/transfers`.
	///
	/// A missing `customer_transaction_id` is filled with a fresh UUID before submission.
	pub async fn create_transfer(&self, transfer: &CreateTransfer) -> Result<Value> {
		let mut transfer = transfer.clone();

		transfer.customer_transaction_id.get_or_insert_with(Uuid::new_v4);

		let spec = RequestSpec::new("create_transfer", Method::Post, "/v1/transfers")
			.with_json_body(&transfer)?;

		self.request(&spec).await
	}

	/// Cancels a transfer. `PUT /v1/transfers/{id}/cancel`.
	pub async fn cancel_transfer(&self, transfer_id: u64) -> Result<Value> {
		let spec = RequestSpec::new(
			"cancel_transfer",
			Method::Put,
			format!("/v1/transfers/{transfer_id}/cancel"),
		);

		self.request(&spec).await
	}

	/// Funds a transfer from the profile's balance.
	/// `POST /v3/profiles/{profile}/transfers/{transfer}/payments`.
	///
	/// Step-up capable: a 403 challenge on this call is signed and retried once.
	pub async fn fund_transfer(
		&self,
		profile_id: u64,
		transfer_id: u64,
		funding: FundingType,
	) -> Result<Value> {
		let spec = RequestSpec::new(
			"fund_transfer",
			Method::Post,
			format!("/v3/profiles/{profile_id}/transfers/{transfer_id}/payments"),
		)
		.with_body(serde_json::json!({ "type": funding }))
		.with_step_up();

		self.request(&spec).await
	}
}
