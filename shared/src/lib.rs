//! # Synckey Shared
//! Common functionality shared between synckey-server & synckey-client crates:
//! the authoritative lease store, the allocation protocol messages, and the
//! transport & session-role seams both sides plug into.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod correlation_id;
mod lease;
mod messages;
mod namespace;
mod session;
mod transport;
mod types;

pub use correlation_id::CorrelationId;
pub use lease::{
    error::LeaseError, lease::Lease, lease_config::LeaseConfig, lease_store::LeaseStore,
};
pub use messages::{
    allocation_message::{AllocationMessage, MessageDirection},
    error::MessageError,
};
pub use namespace::NamespaceFilter;
pub use session::{SessionRole, SessionRoleCell};
pub use transport::{error::TransportError, MessageSender};
pub use types::{ClientId, HostType, KeyId, CORE_OWNER, KEY_SPACE};
