// WebSocket module
//
// - handler: upgrade handler and credential check (entry point)
// - connection: per-connection read loop and single writer task
// - sending: message serialization onto the socket
// - routes: HTTP route setup (/ws, /health)

mod connection;
mod handler;
mod routes;
mod sending;

pub use handler::{websocket_handler, ConnectQuery};
pub use routes::create_router;
