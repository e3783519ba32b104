//! Demonstrates retrieving a balance statement, the second step-up-capable operation, against
//! a mock API that answers without a challenge.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::macros::datetime;
use url::Url;
// self
use wise_client::{
	auth::Credentials,
	flows::{BalanceStatementQuery, ReqwestWiseClient, StatementKind},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let statement_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/profiles/7/balance-statements/9/statement.json")
				.query_param("type", "COMPACT");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"transactions\":[]}");
		})
		.await;
	let credentials = Credentials::new()
		.sandbox_api_token("demo-sandbox-token")
		.base_url(Url::parse(&server.url("/"))?);
	let client = ReqwestWiseClient::new(credentials)?;
	let statement = client
		.balance_statement(&BalanceStatementQuery {
			profile_id: 7,
			balance_id: 9,
			currency: Some("EUR".to_owned()),
			start_date: datetime!(2024-03-01 00:00:00 UTC),
			end_date: datetime!(2024-03-31 23:59:59 UTC),
			kind: StatementKind::Compact,
		})
		.await?;

	println!("Statement: {statement}.");

	statement_mock.assert_async().await;

	Ok(())
}
