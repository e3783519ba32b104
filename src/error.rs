//! Client-level error types shared across transport, signing, and flows.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Signing key material was rejected or the primitive refused to sign.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// API rejected the request with a non-2xx status that is not a resolvable challenge.
	#[error(transparent)]
	Api(#[from] ApiFailure),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Successful response carried a payload that could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The server demanded step-up authentication but no SCA signing key is configured.
	///
	/// This is a configuration defect: the operation cannot be completed by retrying, so the
	/// challenge is surfaced without a second request.
	#[error("A step-up challenge was issued but no SCA signing key is configured.")]
	MissingSigningKey,
}

/// Configuration and validation failures raised while building a client or a request.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The API host URL cannot be parsed.
	#[error("API host URL is invalid.")]
	InvalidHost {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request path could not be joined onto the API host.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A timestamp could not be rendered into a query parameter.
	#[error("Timestamp could not be formatted.")]
	InvalidTimestamp(#[from] time::error::Format),
	/// A request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	InvalidBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},

	/// Neither a production nor a sandbox API token was supplied.
	#[error("An api_token or sandbox_api_token must be supplied.")]
	MissingApiToken,
	/// Both token variants were supplied; the target environment is ambiguous.
	#[error("api_token and sandbox_api_token are mutually exclusive.")]
	AmbiguousApiToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while loading SCA key material or producing a signature.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// Raw key bytes have the wrong length for the signing primitive.
	#[error("SCA signing key must be {expected} bytes, got {actual}.")]
	InvalidKeyLength {
		/// Required key length in bytes.
		expected: usize,
		/// Length of the supplied material.
		actual: usize,
	},
	/// PKCS#8 document could not be parsed into a signing key.
	#[error("SCA signing key PEM could not be parsed: {reason}.")]
	InvalidPem {
		/// Parser diagnostic rendered as text.
		reason: String,
	},
	/// The signing primitive rejected the signing request.
	#[error("Challenge token could not be signed.")]
	Rejected {
		/// Underlying signature failure.
		#[source]
		source: ed25519_dalek::SignatureError,
	},
}

/// Non-2xx API response, preserved verbatim for the caller to inspect.
///
/// Status, headers, and raw body survive unmodified so callers can branch on specific
/// rejections and the step-up engine can recognize a challenge among them.
#[derive(Debug, ThisError)]
#[error("API request was rejected with HTTP status {status}.")]
pub struct ApiFailure {
	/// HTTP status code returned by the API.
	pub status: u16,
	/// Response headers with lowercased names.
	pub headers: BTreeMap<String, String>,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl ApiFailure {
	/// Looks up a response header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the response body as UTF-8 text, replacing invalid sequences.
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Attempts to decode the response body as JSON.
	pub fn body_json(&self) -> Option<serde_json::Value> {
		serde_json::from_slice(&self.body).ok()
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// A successful response whose payload could not be decoded into the requested shape.
#[derive(Debug, ThisError)]
#[error("Response payload could not be decoded.")]
pub struct DecodeError {
	/// HTTP status code of the response that failed to decode, when available.
	pub status: Option<u16>,
	/// Structured parsing failure.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn failure(status: u16, headers: &[(&str, &str)]) -> ApiFailure {
		ApiFailure {
			status,
			headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
			body: b"{\"errors\":[]}".to_vec(),
		}
	}

	#[test]
	fn header_lookup_is_case_insensitive() {
		let failure = failure(403, &[("x-2fa-approval", "abc123")]);

		assert_eq!(failure.header("X-2FA-Approval"), Some("abc123"));
		assert_eq!(failure.header("x-2fa-approval"), Some("abc123"));
		assert_eq!(failure.header("x-signature"), None);
	}

	#[test]
	fn body_accessors_expose_raw_payload() {
		let failure = failure(422, &[]);

		assert_eq!(failure.body_text(), "{\"errors\":[]}");
		assert_eq!(failure.body_json(), Some(serde_json::json!({ "errors": [] })));
	}
}
