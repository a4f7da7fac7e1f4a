use thiserror::Error;

use super::messages::ClientMessage;

/// Reasons a client text frame is rejected.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("empty frame")]
    Empty,
}

/// Parse one client text frame. Out-of-range symbols and unknown wait
/// choices surface as [`ProtocolError::Malformed`].
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    if text.trim().is_empty() {
        return Err(ProtocolError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}
