//! Transport primitives for API calls.
//!
//! The module exposes [`ApiTransport`] as the crate's only dependency on an HTTP stack,
//! alongside the value types flowing through it: a [`RequestSpec`] describes one logical call,
//! a [`TransportHandle`] binds a credential snapshot to a ready transport, and
//! [`OutboundRequest`]/[`RawResponse`] carry the wire-level exchange. Handles are immutable;
//! rotating headers always produces a new handle while requests already in flight keep the one
//! they were issued.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	auth::CredentialContext,
	error::{ApiFailure, ConfigError, DecodeError, TransportError},
};

/// HTTP methods used by the API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// DELETE.
	Delete,
	/// GET.
	Get,
	/// POST.
	Post,
	/// PUT.
	Put,
}
impl Method {
	/// Returns the canonical method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Delete => "DELETE",
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Delete => Self::DELETE,
			Method::Get => Self::GET,
			Method::Post => Self::POST,
			Method::Put => Self::PUT,
		}
	}
}

/// Per-operation flag declaring whether a 403 challenge may be resolved by signing and
/// retrying.
///
/// Which operations require step-up authentication is decided by the server, but which
/// operations are ALLOWED to resolve a challenge is declared here, per spec value, instead of
/// being an accident of the code path an operation happens to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepUpPolicy {
	/// Challenges are never resolved; a 403 is surfaced verbatim.
	#[default]
	Disabled,
	/// A single challenge may be satisfied by signing its token and retrying once.
	Enabled,
}
impl StepUpPolicy {
	/// Returns whether challenge resolution is allowed.
	pub const fn is_enabled(self) -> bool {
		matches!(self, StepUpPolicy::Enabled)
	}
}

/// Self-describing request value; re-executable verbatim when a challenge is retried.
#[derive(Clone, Debug)]
pub struct RequestSpec {
	/// Stable operation label used for spans and metrics.
	pub operation: &'static str,
	/// HTTP method.
	pub method: Method,
	/// Path plus query string, including the version prefix.
	pub path: String,
	/// Optional JSON body.
	pub body: Option<Value>,
	/// Request-scoped headers (lowercased names), e.g. idempotence identifiers.
	pub headers: BTreeMap<String, String>,
	/// Whether the step-up engine may resolve a challenge for this operation.
	pub step_up: StepUpPolicy,
}
impl RequestSpec {
	/// Creates a spec for the given operation, method, and path.
	pub fn new(operation: &'static str, method: Method, path: impl Into<String>) -> Self {
		Self {
			operation,
			method,
			path: path.into(),
			body: None,
			headers: BTreeMap::new(),
			step_up: StepUpPolicy::default(),
		}
	}

	/// Attaches a JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` to JSON and attaches it.
	pub fn with_json_body<T>(self, body: &T) -> Result<Self, ConfigError>
	where
		T: Serialize,
	{
		let body = serde_json::to_value(body).map_err(|source| ConfigError::InvalidBody { source })?;

		Ok(self.with_body(body))
	}

	/// Attaches a request-scoped header; the name is lowercased.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Marks the operation as allowed to resolve a step-up challenge.
	pub fn with_step_up(mut self) -> Self {
		self.step_up = StepUpPolicy::Enabled;

		self
	}
}

/// A fully prepared HTTP request handed to the transport.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Complete header set (lowercased names).
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<Value>,
}

/// Raw HTTP response handed back by the transport.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers; implementations must lowercase the names.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Returns whether the status code is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Boxed future type returned by [`ApiTransport::send`].
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Abstraction over HTTP transports capable of performing one API round trip.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared across clients and the futures they
/// return must own whatever state they need, keeping in-flight requests independent of later
/// handle rotations.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type Error: 'static + Send + Sync + StdError;

	/// Performs exactly one HTTP round trip for the prepared request.
	///
	/// Implementations must not retry, redirect into a second call, or reorder headers; the
	/// retry protocol above this trait depends on one call per invocation.
	fn send(
		&self,
		request: OutboundRequest,
	) -> TransportFuture<'_, Result<RawResponse, Self::Error>>;
}

/// Immutable binding of a credential snapshot to a ready transport.
///
/// A handle's header set is fully determined by the [`CredentialContext`] used to bind it and
/// never changes afterwards; rotating credentials yields a NEW handle. Superseded handles are
/// simply dropped.
pub struct TransportHandle<C>
where
	C: ?Sized + ApiTransport,
{
	transport: Arc<C>,
	base: Url,
	headers: BTreeMap<String, String>,
}
impl<C> TransportHandle<C>
where
	C: ?Sized + ApiTransport,
{
	/// Binds a credential snapshot to the transport.
	///
	/// Pure: no I/O, always succeeds for a valid context. The composed set carries the bearer
	/// credential, a JSON content type, a cache-disabling directive, and the context's
	/// extra headers on top.
	pub fn bind(transport: Arc<C>, context: &CredentialContext) -> Self {
		let mut headers = BTreeMap::from([
			("authorization".to_owned(), format!("Bearer {}", context.token.expose())),
			("content-type".to_owned(), "application/json".to_owned()),
			("cache-control".to_owned(), "no-cache".to_owned()),
		]);

		headers.extend(context.extra_headers.clone());

		Self { transport, base: context.host.clone(), headers }
	}

	/// Returns the composed header set (primarily for diagnostics and tests).
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Executes one request spec, performing exactly one network call.
	///
	/// Non-2xx responses come back as [`ApiFailure`] values carrying status, headers, and raw
	/// body so callers can branch on the specific rejection. A 2xx with an empty body decodes
	/// to [`Value::Null`].
	pub async fn execute(&self, spec: &RequestSpec) -> Result<Value> {
		let url = self.base.join(&spec.path).map_err(|source| ConfigError::InvalidPath {
			path: spec.path.clone(),
			source,
		})?;
		let mut headers = self.headers.clone();

		headers.extend(spec.headers.clone());

		let request =
			OutboundRequest { method: spec.method, url, headers, body: spec.body.clone() };
		let response =
			self.transport.send(request).await.map_err(TransportError::network)?;

		if !response.is_success() {
			return Err(ApiFailure {
				status: response.status,
				headers: response.headers,
				body: response.body,
			}
			.into());
		}

		decode_payload(&response)
	}
}
impl<C> Clone for TransportHandle<C>
where
	C: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			base: self.base.clone(),
			headers: self.headers.clone(),
		}
	}
}
impl<C> Debug for TransportHandle<C>
where
	C: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TransportHandle")
			.field("base", &self.base.as_str())
			.field("headers", &self.headers.keys())
			.finish()
	}
}

fn decode_payload(response: &RawResponse) -> Result<Value> {
	if response.body.is_empty() {
		return Ok(Value::Null);
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError { status: Some(response.status), source }.into())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestApiTransport::new`] applies the crate's default request timeout; wrap a custom
/// [`ReqwestClient`] with [`with_client`](ReqwestApiTransport::with_client) to override
/// timeouts, proxies, or TLS settings.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestApiTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestApiTransport {
	/// Default per-request timeout applied by [`ReqwestApiTransport::new`].
	pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(25);

	/// Builds a transport with the crate's default configuration.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(Self::DEFAULT_TIMEOUT).build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestApiTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestApiTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestApiTransport {
	type Error = ReqwestError;

	fn send(
		&self,
		request: OutboundRequest,
	) -> TransportFuture<'_, Result<RawResponse, Self::Error>> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method.into(), request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.map(|(name, value)| {
					(
						name.as_str().to_owned(),
						String::from_utf8_lossy(value.as_bytes()).into_owned(),
					)
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, headers, body })
		})
	}
}
