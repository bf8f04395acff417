use std::{collections::HashMap, time::Duration};

use synckey_shared::{ClientId, CorrelationId, NamespaceFilter};

/// What the host remembers about one grant: the store correlation id it
/// reserved the keys under, where they live, and when they were granted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GrantRecord {
    pub reservation: CorrelationId,
    pub namespace: NamespaceFilter,
    pub count: u8,
    pub granted_at: Duration,
    pub confirmed: bool,
}

/// Maps a client's request id onto the reservation the host produced for it.
/// Request ids are chosen by clients, so they are only trusted together with
/// the sender's `ClientId`.
///
/// Confirmed records live as long as their leases. Unconfirmed records are
/// kept one extra reservation window past their expiry, so a confirmation
/// that crossed the sweep on the wire is still attributed to its namespace.
pub(crate) struct GrantRegistry {
    grants: HashMap<(ClientId, CorrelationId), GrantRecord>,
}

impl GrantRegistry {
    pub fn new() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    pub fn contains(&self, client_id: &ClientId, request: &CorrelationId) -> bool {
        self.grants.contains_key(&(*client_id, *request))
    }

    pub fn get(&self, client_id: &ClientId, request: &CorrelationId) -> Option<&GrantRecord> {
        self.grants.get(&(*client_id, *request))
    }

    pub fn insert(&mut self, client_id: &ClientId, request: &CorrelationId, record: GrantRecord) {
        self.grants.insert((*client_id, *request), record);
    }

    pub fn confirm(&mut self, client_id: &ClientId, request: &CorrelationId) {
        if let Some(record) = self.grants.get_mut(&(*client_id, *request)) {
            record.confirmed = true;
        }
    }

    pub fn remove(&mut self, client_id: &ClientId, request: &CorrelationId) -> Option<GrantRecord> {
        self.grants.remove(&(*client_id, *request))
    }

    pub fn remove_client(&mut self, client_id: &ClientId) {
        self.grants.retain(|(owner, _), _| owner != client_id);
    }

    /// Forgets unconfirmed grants older than twice `reservation_timeout`.
    /// Their leases expired one window earlier. Returns how many were dropped.
    pub fn drop_stale(&mut self, clock: Duration, reservation_timeout: Duration) -> usize {
        let retention = reservation_timeout.saturating_mul(2);
        let before = self.grants.len();
        self.grants.retain(|_, record| {
            record.confirmed || clock.saturating_sub(record.granted_at) < retention
        });
        before - self.grants.len()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }
}
