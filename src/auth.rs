//! Auth-domain values: secret API tokens, environments, and the credential context.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
