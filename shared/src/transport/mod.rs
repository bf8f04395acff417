pub mod error;

use crate::ClientId;

use self::error::TransportError;

/// Outbound half of the message exchange used by the allocation protocol.
///
/// Framing, delivery and connection lifecycle belong to the implementor.
/// Messages from one sender must arrive in the order they were sent. Inbound
/// payloads are pushed into the protocol by the application, together with the
/// sender's `ClientId`.
pub trait MessageSender: Send + Sync {
    /// Send a payload to the current session host
    fn send_to_host(&self, payload: &[u8]) -> Result<(), TransportError>;

    /// Send a payload to a specific client
    fn send_to_client(&self, client_id: &ClientId, payload: &[u8]) -> Result<(), TransportError>;
}
