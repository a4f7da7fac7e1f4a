// Protocol module: wire message types, the symbol model, and frame parsing

pub mod messages;
pub mod types;
pub mod validation;

pub use messages::{
    ClientMessage, ServerMessage, ERROR_OPPONENT_DISCONNECTED, ERROR_SINGLEPLAYER_MODE,
    ERROR_UNAUTHORIZED, WAITING_TIMEOUT,
};
pub use types::{InvalidSymbol, PlayerId, RoomId, Symbol, WaitChoice};
pub use validation::{parse_client_message, ProtocolError};
