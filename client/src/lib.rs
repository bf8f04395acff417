//! # Synckey Client
//! The client side of the synckey allocation protocol. Requests batches of
//! synchronization channel keys from the session host, confirms the grants,
//! and hands the keys back to the caller once they are leased.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use synckey_shared::{
        AllocationMessage, CorrelationId, KeyId, MessageSender, NamespaceFilter, TransportError,
    };
}

mod error;
mod key_client;
mod request;

pub use error::AllocationError;
pub use key_client::KeyClient;
pub use request::{ExchangePhase, KeyRequest};
