use thiserror::Error;

/// Reasons a connection's bearer credential is refused.
///
/// Every variant is reported to the client as the same `unauthorized` error;
/// the distinction only reaches the logs.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,
    #[error("Token expired")]
    Expired,
    #[error("Token carries no user id")]
    MissingUserId,
    #[error("Invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::InvalidToken(err),
        }
    }
}
