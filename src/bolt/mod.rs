//! Bolt protocol plumbing: the wire codec (`message`, `framing`), version
//! negotiation (`handshake`), the connection state machine (`state`), and
//! the connection actor that ties them together (`connection`).

pub mod connection;
pub mod framing;
pub mod handshake;
pub mod message;
pub mod state;

pub use connection::Connection;
pub use handshake::BoltVersion;
pub use state::ConnectionState;
