use std::{mem, sync::Arc, time::Duration};

use log::{debug, info, warn};

use synckey_shared::{
    AllocationMessage, ClientId, CorrelationId, KeyId, LeaseError, LeaseStore, MessageDirection,
    MessageSender, NamespaceFilter, SessionRole,
};

use crate::{
    events::HostEvents,
    host::{
        grant_registry::{GrantRecord, GrantRegistry},
        HostConfig,
    },
    SynckeyServerError,
};

/// Host side of the key allocation protocol.
///
/// Owns the session's `LeaseStore` and answers request, confirm and cancel
/// messages from clients. Every inbound message and tick is ignored unless the
/// session role says this peer currently holds host authority.
pub struct KeyHost {
    store: LeaseStore,
    grants: GrantRegistry,
    sender: Arc<dyn MessageSender>,
    role: Arc<dyn SessionRole>,
    incoming_events: HostEvents,
}

impl KeyHost {
    pub fn new(
        config: HostConfig,
        sender: Arc<dyn MessageSender>,
        role: Arc<dyn SessionRole>,
    ) -> Self {
        Self {
            store: LeaseStore::new(config.lease),
            grants: GrantRegistry::new(),
            sender,
            role,
            incoming_events: HostEvents::new(),
        }
    }

    pub fn is_host(&self) -> bool {
        self.role.is_host()
    }

    pub fn store(&self) -> &LeaseStore {
        &self.store
    }

    /// Number of grants the host is still tracking, confirmed or not
    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    /// Returns every event queued since the last call
    pub fn take_events(&mut self) -> HostEvents {
        mem::replace(&mut self.incoming_events, HostEvents::new())
    }

    // Incoming messages

    /// Handles a raw payload received from `sender_id`
    pub fn receive(&mut self, sender_id: &ClientId, payload: &[u8]) {
        if !self.is_host() {
            debug!("not the session host, ignoring payload from client {}", sender_id);
            return;
        }

        match AllocationMessage::de(payload) {
            Ok(message) => self.receive_message(sender_id, message),
            Err(error) => {
                warn!("dropping malformed message from client {}: {}", sender_id, error);
            }
        }
    }

    /// Handles an already decoded message received from `sender_id`
    pub fn receive_message(&mut self, sender_id: &ClientId, message: AllocationMessage) {
        if !self.is_host() {
            debug!(
                "not the session host, ignoring {} from client {}",
                message.name(),
                sender_id
            );
            return;
        }

        if message.direction() != MessageDirection::ToHost {
            warn!(
                "dropping {} from client {}, it is only ever sent by the host",
                message.name(),
                sender_id
            );
            return;
        }

        match message {
            AllocationMessage::RequestKeys {
                request,
                count,
                namespace,
            } => self.handle_request_keys(sender_id, &request, count, &namespace),
            AllocationMessage::ConfirmReservation { request } => {
                self.handle_confirm_reservation(sender_id, &request)
            }
            AllocationMessage::CancelReservation { request } => {
                self.handle_cancel_reservation(sender_id, &request)
            }
            _ => {}
        }
    }

    fn handle_request_keys(
        &mut self,
        sender_id: &ClientId,
        request: &CorrelationId,
        count: u8,
        namespace: &NamespaceFilter,
    ) {
        if self.grants.contains(sender_id, request) {
            warn!(
                "client {} repeated request {}, ignoring the duplicate",
                sender_id, request
            );
            return;
        }

        let reservation = CorrelationId::generate();
        match self
            .store
            .reserve_keys(count, &reservation, sender_id, namespace)
        {
            Ok(keys) => {
                self.grants.insert(
                    sender_id,
                    request,
                    GrantRecord {
                        reservation,
                        namespace: *namespace,
                        count,
                        granted_at: self.store.clock(),
                        confirmed: false,
                    },
                );
                self.incoming_events
                    .push_grant(sender_id, namespace, keys.clone());
                self.send(
                    sender_id,
                    AllocationMessage::KeysGranted {
                        request: *request,
                        keys,
                    },
                );
            }
            Err(LeaseError::Exhausted { available, .. }) => {
                info!(
                    "rejecting request {} from client {}: {} keys asked, {} free in {}",
                    request, sender_id, count, available, namespace
                );
                self.incoming_events
                    .push_rejection(sender_id, namespace, count);
                self.send(
                    sender_id,
                    AllocationMessage::RequestRejected { request: *request },
                );
            }
            Err(error) => {
                warn!("unexpected error reserving keys for client {}: {}", sender_id, error);
            }
        }
    }

    fn handle_confirm_reservation(&mut self, sender_id: &ClientId, request: &CorrelationId) {
        let Some(record) = self.grants.get(sender_id, request).copied() else {
            // nothing left to confirm, the grant was forgotten after its sweep
            debug!(
                "client {} confirmed unknown request {}, rejecting",
                sender_id, request
            );
            self.send(
                sender_id,
                AllocationMessage::ConfirmationRejected { request: *request },
            );
            return;
        };

        if record.count == 0 {
            // empty grants hold no leases
            self.grants.remove(sender_id, request);
            self.incoming_events
                .push_confirmation(sender_id, &record.namespace, Vec::new());
            self.send(
                sender_id,
                AllocationMessage::ConfirmationAccepted { request: *request },
            );
            return;
        }

        match self.store.confirm_keys(&record.reservation, sender_id) {
            Ok(keys) => {
                self.grants.confirm(sender_id, request);
                self.incoming_events
                    .push_confirmation(sender_id, &record.namespace, keys);
                self.send(
                    sender_id,
                    AllocationMessage::ConfirmationAccepted { request: *request },
                );
            }
            Err(LeaseError::ConfirmationWindowExpired { .. }) => {
                info!(
                    "confirmation of request {} from client {} arrived after the reservation expired",
                    request, sender_id
                );
                self.grants.remove(sender_id, request);
                self.incoming_events
                    .push_late_confirmation(sender_id, &record.namespace);
                self.send(
                    sender_id,
                    AllocationMessage::ConfirmationRejected { request: *request },
                );
            }
            Err(error) => {
                warn!("unexpected error confirming keys for client {}: {}", sender_id, error);
            }
        }
    }

    fn handle_cancel_reservation(&mut self, sender_id: &ClientId, request: &CorrelationId) {
        let Some(record) = self.grants.remove(sender_id, request) else {
            debug!(
                "client {} cancelled unknown request {}, nothing to free",
                sender_id, request
            );
            return;
        };

        let freed = self.store.free_keys(&record.reservation, sender_id);
        self.incoming_events
            .push_cancellation(sender_id, &record.namespace, freed);
    }

    // Time

    /// Must be called regularly with the time elapsed since the previous call,
    /// reclaims every reservation that was not confirmed in time
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.is_host() {
            return;
        }

        self.store.update(elapsed);
        let expired = self.store.flush();
        self.incoming_events.push_expirations(expired);

        let dropped = self
            .grants
            .drop_stale(self.store.clock(), self.store.config().reservation_timeout);
        if dropped > 0 {
            debug!("forgot {} grants that were never confirmed", dropped);
        }
    }

    // Host-owned keys

    /// Permanently claims `ids` in `namespace` for the host process itself
    pub fn reserve_core_keys(
        &mut self,
        ids: &[KeyId],
        namespace: &NamespaceFilter,
    ) -> Result<(), LeaseError> {
        self.store.reserve_core_keys(ids, namespace)
    }

    // Connections

    /// Releases everything a departed client held
    pub fn disconnect_client(&mut self, client_id: &ClientId) {
        let freed = self.store.free_owner(client_id);
        self.grants.remove_client(client_id);
        info!(
            "client {} disconnected, released {} keys",
            client_id, freed
        );
    }

    // Private

    fn send(&mut self, client_id: &ClientId, message: AllocationMessage) {
        let payload = match message.to_bytes() {
            Ok(payload) => payload,
            Err(source) => {
                warn!("failed to encode {} for client {}: {}", message.name(), client_id, source);
                self.incoming_events.push_error(SynckeyServerError::Encode {
                    client_id: *client_id,
                    message: message.name(),
                    source,
                });
                return;
            }
        };

        debug!("sending {} to client {}", message.name(), client_id);

        if let Err(source) = self.sender.send_to_client(client_id, &payload) {
            warn!("failed to send {} to client {}: {}", message.name(), client_id, source);
            self.incoming_events
                .push_error(SynckeyServerError::Transport {
                    client_id: *client_id,
                    message: message.name(),
                    source,
                });
        }
    }
}
