//! Recipient account management.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	flows::WiseClient,
	http::{ApiTransport, Method, RequestSpec},
};

/// Body for recipient account creation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipientAccount {
	/// Full name of the account holder.
	pub account_holder_name: String,
	/// Account currency code.
	pub currency: String,
	/// Bank-detail payload; its shape depends on `currency` and `kind`.
	pub details: Value,
	/// Whether the recipient account belongs to the customer.
	pub owned_by_customer: bool,
	/// Owning profile identifier.
	pub profile: u64,
	/// Recipient type (e.g. `sort_code`, `iban`, `email`).
	#[serde(rename = "type")]
	pub kind: String,
}

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Creates a recipient account. `POST /v1/accounts`.
	pub async fn create_recipient_account(
		&self,
		recipient: &CreateRecipientAccount,
	) -> Result<Value> {
		let spec = RequestSpec::new("create_recipient_account", Method::Post, "/v1/accounts")
			.with_json_body(recipient)?;

		self.request(&spec).await
	}

	/// Deletes a recipient account. `DELETE /v1/accounts/{id}`.
	pub async fn delete_recipient_account(&self, account_id: u64) -> Result<Value> {
		let spec = RequestSpec::new(
			"delete_recipient_account",
			Method::Delete,
			format!("/v1/accounts/{account_id}"),
		);

		self.request(&spec).await
	}

	/// Lists a profile's recipient accounts for a currency.
	/// `GET /v1/accounts?profile=..&currency=..`.
	pub async fn recipient_accounts(&self, profile_id: u64, currency: &str) -> Result<Value> {
		let query = form_urlencoded::Serializer::new(String::new())
			.append_pair("profile", &profile_id.to_string())
			.append_pair("currency", currency)
			.finish();
		let spec = RequestSpec::new(
			"recipient_accounts",
			Method::Get,
			format!("/v1/accounts?{query}"),
		);

		self.request(&spec).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recipient_body_renames_kind_to_type() {
		let recipient = CreateRecipientAccount {
			account_holder_name: "Ada Lovelace".to_owned(),
			currency: "GBP".to_owned(),
			details: serde_json::json!({ "sortCode": "40-30-20", "accountNumber": "12345678" }),
			owned_by_customer: false,
			profile: 42,
			kind: "sort_code".to_owned(),
		};
		let body = serde_json::to_value(&recipient).expect("Recipient body should serialize.");

		assert_eq!(body["type"], "sort_code");
		assert_eq!(body["accountHolderName"], "Ada Lovelace");
		assert!(body.get("kind").is_none());
	}
}
