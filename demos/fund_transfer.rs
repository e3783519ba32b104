//! Demonstrates funding a transfer through the step-up engine: the mock API rejects the first
//! attempt with a 403 challenge, and the client signs the token and retries transparently.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use wise_client::{
	auth::Credentials,
	flows::{FundingType, WiseClient},
	sca::ScaKey,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let challenge_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v3/profiles/7/transfers/42/payments")
				.header_missing("x-2fa-approval");
			then.status(403)
				.header("x-2fa-approval", "one-time-token")
				.header("content-type", "application/json")
				.body("{\"error\":\"approval required\"}");
		})
		.await;
	let payment_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v3/profiles/7/transfers/42/payments")
				.header("x-2fa-approval", "one-time-token")
				.header_exists("x-signature");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"type\":\"BALANCE\",\"status\":\"COMPLETED\"}");
		})
		.await;
	let credentials = Credentials::new()
		.sandbox_api_token("demo-sandbox-token")
		.signing_key(ScaKey::from_bytes(&[0x42; 32])?)
		.base_url(Url::parse(&server.url("/"))?);
	let client = WiseClient::new(credentials)?;
	let payment = client.fund_transfer(7, 42, FundingType::Balance).await?;

	println!("Payment settled: {payment}.");
	println!(
		"Challenges resolved on this client: {}.",
		client.challenge_metrics.resolved(),
	);

	challenge_mock.assert_async().await;
	payment_mock.assert_async().await;

	Ok(())
}
