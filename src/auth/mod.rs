pub mod error;
pub mod verifier;

pub use error::AuthError;
pub use verifier::{Claims, CredentialVerifier, JwtVerifier};
