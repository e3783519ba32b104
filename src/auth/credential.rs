//! Environments, construction parameters, and the immutable credential context.

// self
use crate::{_prelude::*, auth::ApiToken, error::ConfigError, sca::ScaKey};

/// Target API environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
	/// Live API host.
	Production,
	/// Sandbox API host.
	Sandbox,
}
impl Environment {
	const PRODUCTION_HOST: &'static str = "https://api.transferwise.com";
	const SANDBOX_HOST: &'static str = "https://api.sandbox.transferwise.tech";

	/// Returns the fixed API host for the environment.
	pub fn host(self) -> Result<Url, ConfigError> {
		let raw = match self {
			Environment::Production => Self::PRODUCTION_HOST,
			Environment::Sandbox => Self::SANDBOX_HOST,
		};

		Url::parse(raw).map_err(|source| ConfigError::InvalidHost { source })
	}
}

/// Construction parameters for a client.
///
/// Exactly one of [`api_token`](Credentials::api_token) and
/// [`sandbox_api_token`](Credentials::sandbox_api_token) must be supplied; the sandbox variant
/// selects the sandbox host. The signing key is optional, but any operation that triggers a
/// step-up challenge fails without one (the server, not the client, decides which calls need
/// step-up authentication).
#[derive(Debug, Default)]
pub struct Credentials {
	api_token: Option<ApiToken>,
	sandbox_api_token: Option<ApiToken>,
	signing_key: Option<ScaKey>,
	base_url: Option<Url>,
}
impl Credentials {
	/// Starts an empty credential set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the production API token.
	pub fn api_token(mut self, token: impl Into<String>) -> Self {
		self.api_token = Some(ApiToken::new(token));

		self
	}

	/// Sets the sandbox API token, targeting the sandbox host.
	pub fn sandbox_api_token(mut self, token: impl Into<String>) -> Self {
		self.sandbox_api_token = Some(ApiToken::new(token));

		self
	}

	/// Attaches the private key used to satisfy step-up challenges.
	pub fn signing_key(mut self, key: ScaKey) -> Self {
		self.signing_key = Some(key);

		self
	}

	/// Overrides the API host; intended for tests and self-hosted gateways.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Validates the parameters and produces the initial credential context.
	pub fn into_context(self) -> Result<CredentialContext, ConfigError> {
		let (token, environment) = match (self.api_token, self.sandbox_api_token) {
			(Some(token), None) => (token, Environment::Production),
			(None, Some(token)) => (token, Environment::Sandbox),
			(None, None) => return Err(ConfigError::MissingApiToken),
			(Some(_), Some(_)) => return Err(ConfigError::AmbiguousApiToken),
		};
		let host = match self.base_url {
			Some(url) => url,
			None => environment.host()?,
		};

		Ok(CredentialContext { host, token, signing_key: self.signing_key, extra_headers: BTreeMap::new() })
	}
}

/// Immutable snapshot of everything needed to bind an outbound transport handle.
///
/// Contexts are exchanged by value: rotating the extra-header set produces a NEW context
/// rather than mutating a shared one, so concurrent calls can never observe a half-updated
/// header set.
#[derive(Clone, Debug)]
pub struct CredentialContext {
	/// Base API host every request path is joined onto.
	pub host: Url,
	/// Bearer token attached to every request.
	pub token: ApiToken,
	/// Optional private key used to satisfy step-up challenges.
	pub signing_key: Option<ScaKey>,
	/// Rotating header set; replaced wholesale when a challenge is satisfied.
	pub extra_headers: BTreeMap<String, String>,
}
impl CredentialContext {
	/// Returns a new context with the extra-header set replaced wholesale.
	pub fn with_extra_headers(&self, extra_headers: BTreeMap<String, String>) -> Self {
		Self { extra_headers, ..self.clone() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn environments_resolve_to_fixed_hosts() {
		assert_eq!(
			Environment::Production.host().expect("Production host should parse.").as_str(),
			"https://api.transferwise.com/",
		);
		assert_eq!(
			Environment::Sandbox.host().expect("Sandbox host should parse.").as_str(),
			"https://api.sandbox.transferwise.tech/",
		);
	}

	#[test]
	fn credentials_require_exactly_one_token() {
		assert!(matches!(
			Credentials::new().into_context(),
			Err(ConfigError::MissingApiToken)
		));
		assert!(matches!(
			Credentials::new().api_token("a").sandbox_api_token("b").into_context(),
			Err(ConfigError::AmbiguousApiToken)
		));
	}

	#[test]
	fn sandbox_token_selects_sandbox_host() {
		let context = Credentials::new()
			.sandbox_api_token("sandbox-token")
			.into_context()
			.expect("Sandbox credentials should validate.");

		assert_eq!(context.host.as_str(), "https://api.sandbox.transferwise.tech/");
		assert_eq!(context.token.expose(), "sandbox-token");
	}

	#[test]
	fn with_extra_headers_replaces_wholesale() {
		let context = Credentials::new()
			.api_token("token")
			.into_context()
			.expect("Production credentials should validate.");
		let first = context.with_extra_headers(BTreeMap::from([
			("x-idempotence-uuid".to_owned(), "u-1".to_owned()),
		]));
		let second = first.with_extra_headers(BTreeMap::from([
			("x-2fa-approval".to_owned(), "abc123".to_owned()),
		]));

		assert!(context.extra_headers.is_empty());
		assert_eq!(first.extra_headers.len(), 1);
		assert_eq!(second.extra_headers.len(), 1);
		assert!(second.extra_headers.contains_key("x-2fa-approval"));
		assert!(!second.extra_headers.contains_key("x-idempotence-uuid"));
	}
}
