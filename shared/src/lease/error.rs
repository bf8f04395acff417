use thiserror::Error;

use crate::{CorrelationId, KeyId, NamespaceFilter};

/// Errors raised by the `LeaseStore`. These stay on the host, the protocol
/// translates them into response messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaseError {
    /// Not enough free keys in the namespace
    #[error("Namespace {namespace} has {available} free keys but {requested} were requested. Nothing was reserved")]
    Exhausted {
        namespace: NamespaceFilter,
        requested: u8,
        available: usize,
    },

    /// The group was swept (or never existed) before the confirmation arrived
    #[error("Reservation {correlation_id} expired before it was confirmed")]
    ConfirmationWindowExpired {
        correlation_id: CorrelationId,
    },

    /// A core key collides with a key that is already live
    #[error("Key {id} in namespace {namespace} is already reserved and cannot be claimed by the core batch")]
    KeyAlreadyReserved {
        namespace: NamespaceFilter,
        id: KeyId,
    },
}
