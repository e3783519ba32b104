//! Multi-currency account balances, conversions, and statements.
//!
//! The balance statement is one of the two operations the API may answer with a step-up
//! challenge, so its spec opts into challenge resolution explicitly.

// crates.io
use url::form_urlencoded;
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	flows::{WiseClient, rates::rfc3339},
	http::{ApiTransport, Method, RequestSpec},
};

/// Balance account types listed by default.
pub const DEFAULT_BALANCE_TYPES: &[BalanceType] = &[BalanceType::Savings, BalanceType::Standard];

/// Balance account type filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceType {
	/// Savings jars.
	Savings,
	/// Standard currency balances.
	Standard,
}
impl BalanceType {
	/// Returns the API's label for the balance type.
	pub const fn as_str(self) -> &'static str {
		match self {
			BalanceType::Savings => "SAVINGS",
			BalanceType::Standard => "STANDARD",
		}
	}
}
impl Display for BalanceType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Statement detail level; `Compact` groups card transactions, `Flat` lists every one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatementKind {
	/// Grouped statement lines.
	#[default]
	Compact,
	/// One line per transaction.
	Flat,
}
impl StatementKind {
	/// Returns the API's label for the statement kind.
	pub const fn as_str(self) -> &'static str {
		match self {
			StatementKind::Compact => "COMPACT",
			StatementKind::Flat => "FLAT",
		}
	}
}

/// Parameters for a balance statement lookup.
#[derive(Clone, Debug)]
pub struct BalanceStatementQuery {
	/// Owning profile identifier.
	pub profile_id: u64,
	/// Balance identifier within the profile.
	pub balance_id: u64,
	/// Restricts the statement to one currency.
	pub currency: Option<String>,
	/// Start of the statement window.
	pub start_date: OffsetDateTime,
	/// End of the statement window.
	pub end_date: OffsetDateTime,
	/// Statement detail level.
	pub kind: StatementKind,
}

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Lists a profile's balances. `GET /v3/profiles/{id}/balances?types=..`.
	///
	/// An empty `types` slice falls back to [`DEFAULT_BALANCE_TYPES`].
	pub async fn balances(&self, profile_id: u64, types: &[BalanceType]) -> Result<Value> {
		let types = if types.is_empty() { DEFAULT_BALANCE_TYPES } else { types };
		let joined =
			types.iter().map(|kind| kind.as_str()).collect::<Vec<_>>().join(",");
		let query =
			form_urlencoded::Serializer::new(String::new()).append_pair("types", &joined).finish();
		let spec = RequestSpec::new(
			"balances",
			Method::Get,
			format!("/v3/profiles/{profile_id}/balances?{query}"),
		);

		self.request(&spec).await
	}

	/// Converts between a profile's balances using a prepared quote.
	/// `POST /v2/profiles/{id}/balance-movements`.
	///
	/// The conversion is idempotent under the `x-idempotence-uuid` header; a missing
	/// `idempotence_uuid` is filled with a fresh UUID.
	pub async fn convert_currencies(
		&self,
		profile_id: u64,
		quote_id: &str,
		idempotence_uuid: Option<Uuid>,
	) -> Result<Value> {
		let idempotence_uuid = idempotence_uuid.unwrap_or_else(Uuid::new_v4);
		let spec = RequestSpec::new(
			"convert_currencies",
			Method::Post,
			format!("/v2/profiles/{profile_id}/balance-movements"),
		)
		.with_body(serde_json::json!({ "quoteId": quote_id }))
		.with_header("x-idempotence-uuid", idempotence_uuid.to_string());

		self.request(&spec).await
	}

	/// Retrieves a balance statement.
	/// `GET /v1/profiles/{p}/balance-statements/{b}/statement.json?..`.
	///
	/// Step-up capable: a 403 challenge on this call is signed and retried once.
	pub async fn balance_statement(&self, query: &BalanceStatementQuery) -> Result<Value> {
		let mut pairs = form_urlencoded::Serializer::new(String::new());

		pairs.append_pair("profileId", &query.profile_id.to_string());
		pairs.append_pair("balanceId", &query.balance_id.to_string());
		pairs.append_pair("startDate", &rfc3339(&query.start_date)?);
		pairs.append_pair("endDate", &rfc3339(&query.end_date)?);

		if let Some(currency) = &query.currency {
			pairs.append_pair("currency", currency);
		}

		pairs.append_pair("type", query.kind.as_str());

		let (profile_id, balance_id) = (query.profile_id, query.balance_id);
		let query = pairs.finish();
		let spec = RequestSpec::new(
			"balance_statement",
			Method::Get,
			format!(
				"/v1/profiles/{profile_id}/balance-statements/{balance_id}/statement.json?{query}"
			),
		)
		.with_step_up();

		self.request(&spec).await
	}
}
