//! Exchange-rate listings.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::WiseClient,
	http::{ApiTransport, Method, RequestSpec},
};

/// Query parameters for the exchange-rate listing; every field is optional.
#[derive(Clone, Debug, Default)]
pub struct ExchangeRatesQuery {
	/// Source currency code.
	pub base_currency: Option<String>,
	/// Start of a historical range.
	pub from: Option<OffsetDateTime>,
	/// Aggregation granularity for historical ranges (`day`, `hour`, or `minute`).
	pub group: Option<String>,
	/// Target currency code.
	pub target_currency: Option<String>,
	/// Point-in-time rate lookup.
	pub time: Option<OffsetDateTime>,
	/// End of a historical range.
	pub to: Option<OffsetDateTime>,
}

impl<C> WiseClient<C>
where
	C: ?Sized + ApiTransport,
{
	/// Lists exchange rates. `GET /v1/rates`.
	pub async fn exchange_rates(&self, query: &ExchangeRatesQuery) -> Result<Value> {
		let mut pairs = form_urlencoded::Serializer::new(String::new());

		if let Some(value) = &query.base_currency {
			pairs.append_pair("baseCurrency", value);
		}
		if let Some(value) = &query.from {
			pairs.append_pair("from", &rfc3339(value)?);
		}
		if let Some(value) = &query.group {
			pairs.append_pair("group", value);
		}
		if let Some(value) = &query.target_currency {
			pairs.append_pair("targetCurrency", value);
		}
		if let Some(value) = &query.time {
			pairs.append_pair("time", &rfc3339(value)?);
		}
		if let Some(value) = &query.to {
			pairs.append_pair("to", &rfc3339(value)?);
		}

		let query = pairs.finish();
		let path = if query.is_empty() {
			"/v1/rates".to_owned()
		} else {
			format!("/v1/rates?{query}")
		};

		self.request(&RequestSpec::new("exchange_rates", Method::Get, path)).await
	}
}

pub(crate) fn rfc3339(moment: &OffsetDateTime) -> Result<String, ConfigError> {
	use time::format_description::well_known::Rfc3339;

	Ok(moment.format(&Rfc3339)?)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn timestamps_render_as_rfc3339() {
		let rendered = rfc3339(&datetime!(2024-03-01 12:30:00 UTC))
			.expect("A UTC timestamp should format.");

		assert_eq!(rendered, "2024-03-01T12:30:00Z");
	}
}
