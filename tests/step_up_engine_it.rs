// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use wise_client::{
	auth::Credentials,
	error::Error,
	flows::{FundingType, WiseClient},
	http::ReqwestApiTransport,
	sca::{ChallengeToken, ScaKey, verify_proof},
};

const PAYMENT_PATH: &str = "/v3/profiles/7/transfers/42/payments";
const TOKEN: &str = "one-time-token";

fn test_signing_key() -> ScaKey {
	ScaKey::from_bytes(&[0x42; 32]).expect("Fixed 32-byte key should load for engine tests.")
}

fn build_client(server: &MockServer, key: Option<ScaKey>) -> WiseClient<ReqwestApiTransport> {
	let mut credentials = Credentials::new()
		.api_token("test-api-token")
		.base_url(Url::parse(&server.url("/")).expect("Mock server URL should parse."));

	if let Some(key) = key {
		credentials = credentials.signing_key(key);
	}

	WiseClient::new(credentials).expect("Client should build from test credentials.")
}

fn expected_signature() -> String {
	test_signing_key()
		.sign(&ChallengeToken::new(TOKEN))
		.expect("Signing the fixed token should succeed.")
		.signature
}

#[tokio::test]
async fn plain_success_makes_exactly_one_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"status\":\"COMPLETED\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	let payment = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect("Unchallenged funding should succeed.");

	assert_eq!(payment, serde_json::json!({ "status": "COMPLETED" }));

	mock.assert_calls_async(1).await;

	assert_eq!(client.challenge_metrics.detected(), 0);
}

#[tokio::test]
async fn challenge_is_signed_and_retried_exactly_once() {
	let server = MockServer::start_async().await;
	let challenge_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header_missing("x-2fa-approval");
			then.status(403)
				.header("x-2fa-approval", TOKEN)
				.header("content-type", "application/json")
				.body("{\"error\":\"approval required\"}");
		})
		.await;
	let retry_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(PAYMENT_PATH)
				.header("x-2fa-approval", TOKEN)
				.header("x-signature", expected_signature().as_str());
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"status\":\"ok\"}");
		})
		.await;
	let key = test_signing_key();
	let client = build_client(&server, Some(key.clone()));
	let payment = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect("Challenged funding should succeed after the signed retry.");

	assert_eq!(payment, serde_json::json!({ "status": "ok" }));
	// The signature the retry carried verifies against the key's public half.
	assert!(verify_proof(&key.verifying_key(), &ChallengeToken::new(TOKEN), &expected_signature()));

	challenge_mock.assert_calls_async(1).await;
	retry_mock.assert_calls_async(1).await;

	assert_eq!(client.challenge_metrics.detected(), 1);
	assert_eq!(client.challenge_metrics.resolved(), 1);
	assert_eq!(client.challenge_metrics.failed(), 0);
}

#[tokio::test]
async fn resolved_challenge_rotates_the_current_context() {
	let server = MockServer::start_async().await;
	let _challenge_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header_missing("x-2fa-approval");
			then.status(403).header("x-2fa-approval", TOKEN).body("");
		})
		.await;
	let _retry_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header("x-2fa-approval", TOKEN);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"status\":\"ok\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));

	assert!(client.current_credentials().extra_headers.is_empty());

	client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect("Challenged funding should succeed after the signed retry.");

	let rotated = client.current_credentials();

	assert_eq!(rotated.extra_headers.get("x-2fa-approval").map(String::as_str), Some(TOKEN));
	assert_eq!(
		rotated.extra_headers.get("x-signature").map(String::as_str),
		Some(expected_signature().as_str()),
	);
}

#[tokio::test]
async fn challenge_without_signing_key_fails_without_retry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH);
			then.status(403)
				.header("x-2fa-approval", "abc123")
				.header("content-type", "application/json")
				.body("{\"error\":\"approval required\"}");
		})
		.await;
	let client = build_client(&server, None);
	let error = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect_err("A challenge without a key should fail.");

	assert!(matches!(error, Error::MissingSigningKey));

	mock.assert_calls_async(1).await;

	assert_eq!(client.challenge_metrics.detected(), 1);
	assert_eq!(client.challenge_metrics.failed(), 1);
}

#[tokio::test]
async fn non_challenge_failures_surface_verbatim() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH);
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"error\":\"boom\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	let error = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect_err("A 500 should fail.");
	let Error::Api(failure) = error else {
		panic!("A 500 should surface as an API failure, got: {error:?}.");
	};

	assert_eq!(failure.status, 500);
	assert_eq!(failure.body_json(), Some(serde_json::json!({ "error": "boom" })));

	mock.assert_calls_async(1).await;

	assert_eq!(client.challenge_metrics.detected(), 0);
}

#[tokio::test]
async fn forbidden_without_token_header_is_not_a_challenge() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH);
			then.status(403)
				.header("content-type", "application/json")
				.body("{\"error\":\"forbidden\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	let error = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect_err("A plain 403 should fail.");
	let Error::Api(failure) = error else {
		panic!("A plain 403 should surface as an API failure, got: {error:?}.");
	};

	assert_eq!(failure.status, 403);
	assert_eq!(failure.header("x-2fa-approval"), None);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn challenges_on_unflagged_operations_surface_verbatim() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/profiles");
			then.status(403)
				.header("x-2fa-approval", "abc123")
				.header("content-type", "application/json")
				.body("{\"error\":\"approval required\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	let error = client.profiles().await.expect_err("The challenged listing should fail.");
	let Error::Api(failure) = error else {
		panic!("An unflagged operation should surface the 403, got: {error:?}.");
	};

	// The operation never opted into step-up resolution, so the token is for the caller.
	assert_eq!(failure.status, 403);
	assert_eq!(failure.header("x-2fa-approval"), Some("abc123"));

	mock.assert_calls_async(1).await;

	assert_eq!(client.challenge_metrics.detected(), 0);
}

#[tokio::test]
async fn second_challenge_on_the_retry_is_a_hard_failure() {
	let server = MockServer::start_async().await;
	let challenge_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header_missing("x-2fa-approval");
			then.status(403)
				.header("x-2fa-approval", TOKEN)
				.header("content-type", "application/json")
				.body("{\"error\":\"approval required\"}");
		})
		.await;
	let retry_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header("x-2fa-approval", TOKEN);
			then.status(403)
				.header("x-2fa-approval", "another-token")
				.header("content-type", "application/json")
				.body("{\"error\":\"approval required\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	let error = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect_err("A re-challenged retry should fail.");
	let Error::Api(failure) = error else {
		panic!("The second challenge should surface as an API failure, got: {error:?}.");
	};

	assert_eq!(failure.status, 403);
	assert_eq!(failure.header("x-2fa-approval"), Some("another-token"));

	// One first attempt, one retry, never a third call.
	challenge_mock.assert_calls_async(1).await;
	retry_mock.assert_calls_async(1).await;

	assert_eq!(client.challenge_metrics.detected(), 1);
	assert_eq!(client.challenge_metrics.resolved(), 0);
	assert_eq!(client.challenge_metrics.failed(), 1);
}

#[tokio::test]
async fn concurrent_unchallenged_call_never_sees_the_proof_headers() {
	let server = MockServer::start_async().await;
	// The listing response is held open so the challenged call rotates the context while the
	// listing is still in flight; its matcher rejects any request carrying proof headers.
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/profiles").header_missing("x-2fa-approval");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":7}]")
				.delay(std::time::Duration::from_millis(300));
		})
		.await;
	let _challenge_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header_missing("x-2fa-approval");
			then.status(403).header("x-2fa-approval", TOKEN).body("");
		})
		.await;
	let _retry_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header("x-2fa-approval", TOKEN);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"status\":\"ok\"}");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	let listing_client = client.clone();
	let listing = tokio::spawn(async move { listing_client.profiles().await });

	// Give the listing time to leave before resolving the challenge.
	tokio::time::sleep(std::time::Duration::from_millis(100)).await;

	let payment = client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect("Challenged funding should succeed after the signed retry.");
	let listing = listing
		.await
		.expect("The listing task should not panic.")
		.expect("The concurrent listing should succeed without proof headers.");

	assert_eq!(payment, serde_json::json!({ "status": "ok" }));
	assert_eq!(listing, serde_json::json!([{ "id": 7 }]));

	listing_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn calls_bound_before_rotation_keep_their_snapshot() {
	let server = MockServer::start_async().await;
	let _challenge_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header_missing("x-2fa-approval");
			then.status(403).header("x-2fa-approval", TOKEN).body("");
		})
		.await;
	let _retry_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(PAYMENT_PATH).header("x-2fa-approval", TOKEN);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"status\":\"ok\"}");
		})
		.await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/profiles").header_missing("x-2fa-approval");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let client = build_client(&server, Some(test_signing_key()));
	// Snapshot semantics, without racing: a handle bound before the challenge resolves must
	// keep its pre-rotation header set.
	let snapshot = client.current_credentials();
	let handle = wise_client::http::TransportHandle::bind(client.transport.clone(), &snapshot);

	client
		.fund_transfer(7, 42, FundingType::Balance)
		.await
		.expect("Challenged funding should succeed after the signed retry.");

	assert!(
		client.current_credentials().extra_headers.contains_key("x-2fa-approval"),
		"The resolved challenge should have rotated the current context.",
	);

	let spec = wise_client::http::RequestSpec::new(
		"profiles",
		wise_client::http::Method::Get,
		"/v2/profiles",
	);

	handle.execute(&spec).await.expect("The pre-rotation handle should stay proof-free.");

	listing_mock.assert_calls_async(1).await;
}
