//! Strong-customer-authentication domain: challenge tokens, signed proofs, and signing keys.

pub mod signer;

pub use signer::*;

// self
use crate::{_prelude::*, error::ApiFailure};

/// Response header carrying the one-time challenge token, replayed with the retried request.
pub const X_2FA_APPROVAL: &str = "x-2fa-approval";
/// Request header carrying the base64 signature over the challenge token.
pub const X_SIGNATURE: &str = "x-signature";

/// HTTP status used to signal a step-up challenge.
const CHALLENGE_STATUS: u16 = 403;

/// One-time token issued inside a challenge response.
///
/// Ephemeral by contract: extracted from a single failure, signed once, and discarded with the
/// proof that carries it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeToken(String);
impl ChallengeToken {
	/// Wraps a raw token value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Extracts a challenge token from a failure, if the failure is a step-up challenge.
	///
	/// Only a 403 carrying the `x-2fa-approval` header qualifies; every other failure is an
	/// ordinary rejection.
	pub fn detect(failure: &ApiFailure) -> Option<Self> {
		if failure.status != CHALLENGE_STATUS {
			return None;
		}

		failure.header(X_2FA_APPROVAL).map(Self::new)
	}

	/// Returns the raw token value.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for ChallengeToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Possession proof derived from a challenge token, attached to the retried request.
#[derive(Clone, Debug)]
pub struct SignedProof {
	/// The one-time token being approved.
	pub token: ChallengeToken,
	/// Base64-encoded signature over the token.
	pub signature: String,
}
impl SignedProof {
	/// Renders the proof as the extra-header set carried by the retried request.
	pub fn into_headers(self) -> BTreeMap<String, String> {
		BTreeMap::from([
			(X_2FA_APPROVAL.to_owned(), self.token.0),
			(X_SIGNATURE.to_owned(), self.signature),
		])
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn failure(status: u16, headers: &[(&str, &str)]) -> ApiFailure {
		ApiFailure {
			status,
			headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
			body: Vec::new(),
		}
	}

	#[test]
	fn detect_requires_status_and_header() {
		let challenge = failure(403, &[(X_2FA_APPROVAL, "abc123")]);
		let plain_403 = failure(403, &[("content-type", "application/json")]);
		let not_403 = failure(500, &[(X_2FA_APPROVAL, "abc123")]);

		assert_eq!(ChallengeToken::detect(&challenge), Some(ChallengeToken::new("abc123")));
		assert_eq!(ChallengeToken::detect(&plain_403), None);
		assert_eq!(ChallengeToken::detect(&not_403), None);
	}

	#[test]
	fn proof_headers_carry_token_and_signature() {
		let proof =
			SignedProof { token: ChallengeToken::new("abc123"), signature: "c2lnbg==".to_owned() };
		let headers = proof.into_headers();

		assert_eq!(headers.get(X_2FA_APPROVAL).map(String::as_str), Some("abc123"));
		assert_eq!(headers.get(X_SIGNATURE).map(String::as_str), Some("c2lnbg=="));
	}
}
