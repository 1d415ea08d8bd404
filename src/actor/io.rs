//! Message protocol spoken with TCP/UDP transport actors.
//!
//! The transport itself ships separately; these are the envelopes a
//! transport manager exchanges with its handler actors.

use std::net::SocketAddr;

use crate::actor::ActorRef;

/// Start listening on `address`; the handler receives `Bound` and then
/// a `Connected` per accepted peer.
#[derive(Debug, Clone)]
pub struct Bind {
    pub handler: ActorRef,
    pub address: SocketAddr,
}

/// Listening was set up.
#[derive(Debug, Clone)]
pub struct Bound {
    pub address: SocketAddr,
}

/// Open a connection to `address` on behalf of `handler`.
#[derive(Debug, Clone)]
pub struct Connect {
    pub handler: ActorRef,
    pub address: SocketAddr,
}

/// A connection was established.
#[derive(Debug, Clone)]
pub struct Connected {
    pub remote: SocketAddr,
}

/// Payload to write to the peer.
#[derive(Debug, Clone)]
pub struct Write {
    pub data: Vec<u8>,
}

/// Payload received from the peer.
#[derive(Debug, Clone)]
pub struct Received {
    pub data: Vec<u8>,
}

/// The peer closed the connection.
#[derive(Debug, Clone, Copy)]
pub struct PeerClosed;

/// A transport command could not be carried out.
#[derive(Debug, Clone)]
pub struct CommandFail {
    pub reason: String,
}
