use std::sync::atomic::{AtomicBool, Ordering};

use crate::HostType;

/// Tells the allocation protocol whether the local peer currently holds host
/// authority. Consulted on every inbound message, so implementations must be
/// cheap and may change their answer at any time.
pub trait SessionRole: Send + Sync {
    fn host_type(&self) -> HostType;

    fn is_host(&self) -> bool {
        self.host_type() == HostType::Server
    }
}

/// A `SessionRole` backed by an atomic flag, flipped when the session
/// migrates host authority between peers
pub struct SessionRoleCell {
    is_host: AtomicBool,
}

impl SessionRoleCell {
    pub fn new(host_type: HostType) -> Self {
        Self {
            is_host: AtomicBool::new(host_type == HostType::Server),
        }
    }

    pub fn set(&self, host_type: HostType) {
        self.is_host
            .store(host_type == HostType::Server, Ordering::Release);
    }
}

impl SessionRole for SessionRoleCell {
    fn host_type(&self) -> HostType {
        if self.is_host.load(Ordering::Acquire) {
            HostType::Server
        } else {
            HostType::Client
        }
    }
}

impl SessionRole for HostType {
    fn host_type(&self) -> HostType {
        *self
    }
}
