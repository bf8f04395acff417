//! # Synckey Server
//! The host side of the synckey allocation protocol. Owns the session's lease
//! table and answers key requests, confirmations and cancellations from
//! connected clients.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use synckey_shared::{
        AllocationMessage, ClientId, CorrelationId, HostType, KeyId, Lease, LeaseConfig,
        LeaseError, LeaseStore, MessageSender, NamespaceFilter, SessionRole, SessionRoleCell,
        TransportError,
    };
}

mod error;
mod events;
mod host;

pub use error::SynckeyServerError;
pub use events::{
    ConfirmationRejectedEvent, ErrorEvent, HostEvent, HostEvents, KeysGrantedEvent,
    RequestRejectedEvent, ReservationCancelledEvent, ReservationConfirmedEvent,
    ReservationExpiredEvent,
};
pub use host::{HostConfig, KeyHost};
