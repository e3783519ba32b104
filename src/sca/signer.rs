//! Challenge signing over caller-held private keys.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, pkcs8::DecodePrivateKey};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	error::SigningError,
	sca::{ChallengeToken, SignedProof},
};

/// Ed25519 private key used to satisfy step-up challenges.
///
/// Construction validates the key material, so a malformed key is rejected before any request
/// is made rather than at challenge time. `Debug` output never reveals the key.
#[derive(Clone)]
pub struct ScaKey(SigningKey);
impl ScaKey {
	/// Length of a raw Ed25519 private key in bytes.
	pub const RAW_LEN: usize = 32;

	/// Loads a key from raw private-key bytes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
		let bytes: &[u8; Self::RAW_LEN] = bytes.try_into().map_err(|_| {
			SigningError::InvalidKeyLength { expected: Self::RAW_LEN, actual: bytes.len() }
		})?;

		Ok(Self(SigningKey::from_bytes(bytes)))
	}

	/// Loads a key from a PKCS#8 PEM document.
	pub fn from_pkcs8_pem(pem: &str) -> Result<Self, SigningError> {
		SigningKey::from_pkcs8_pem(pem)
			.map(Self)
			.map_err(|e| SigningError::InvalidPem { reason: e.to_string() })
	}

	/// Returns the public half, used to verify signatures produced by this key.
	pub fn verifying_key(&self) -> VerifyingKey {
		self.0.verifying_key()
	}

	/// Signs a one-time challenge token, producing the proof replayed with the retry.
	///
	/// The token's raw bytes are hashed with SHA-256 and the digest is signed; the signature is
	/// emitted base64-encoded. The result is deterministic for a fixed `(key, token)` pair, but
	/// callers should compare signatures by verification rather than byte equality.
	pub fn sign(&self, token: &ChallengeToken) -> Result<SignedProof, SigningError> {
		let digest = Sha256::digest(token.as_str().as_bytes());
		let signature =
			self.0.try_sign(&digest).map_err(|source| SigningError::Rejected { source })?;

		Ok(SignedProof {
			token: token.clone(),
			signature: BASE64.encode(signature.to_bytes()),
		})
	}
}
impl Debug for ScaKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScaKey").field(&"<redacted>").finish()
	}
}

/// Verifies a base64 signature over a challenge token against a public key.
pub fn verify_proof(key: &VerifyingKey, token: &ChallengeToken, signature_b64: &str) -> bool {
	let Ok(raw) = BASE64.decode(signature_b64) else {
		return false;
	};
	let Ok(signature) = Signature::from_slice(&raw) else {
		return false;
	};
	let digest = Sha256::digest(token.as_str().as_bytes());

	key.verify_strict(&digest, &signature).is_ok()
}
