use std::{mem, vec::IntoIter};

use synckey_shared::{ClientId, KeyId, Lease, NamespaceFilter};

use crate::SynckeyServerError;

/// Everything the host did since the last `KeyHost::take_events()`, for
/// whatever presentation layer wants to show it
pub struct HostEvents {
    grants: Vec<(ClientId, NamespaceFilter, Vec<KeyId>)>,
    rejections: Vec<(ClientId, NamespaceFilter, u8)>,
    confirmations: Vec<(ClientId, NamespaceFilter, Vec<KeyId>)>,
    late_confirmations: Vec<(ClientId, NamespaceFilter)>,
    cancellations: Vec<(ClientId, NamespaceFilter, usize)>,
    expirations: Vec<Lease>,
    errors: Vec<SynckeyServerError>,

    empty: bool,
}

impl HostEvents {
    pub(crate) fn new() -> Self {
        Self {
            grants: Vec::new(),
            rejections: Vec::new(),
            confirmations: Vec::new(),
            late_confirmations: Vec::new(),
            cancellations: Vec::new(),
            expirations: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: HostEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: HostEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_grant(
        &mut self,
        client_id: &ClientId,
        namespace: &NamespaceFilter,
        keys: Vec<KeyId>,
    ) {
        self.grants.push((*client_id, *namespace, keys));
        self.empty = false;
    }

    pub(crate) fn push_rejection(
        &mut self,
        client_id: &ClientId,
        namespace: &NamespaceFilter,
        count: u8,
    ) {
        self.rejections.push((*client_id, *namespace, count));
        self.empty = false;
    }

    pub(crate) fn push_confirmation(
        &mut self,
        client_id: &ClientId,
        namespace: &NamespaceFilter,
        keys: Vec<KeyId>,
    ) {
        self.confirmations.push((*client_id, *namespace, keys));
        self.empty = false;
    }

    pub(crate) fn push_late_confirmation(
        &mut self,
        client_id: &ClientId,
        namespace: &NamespaceFilter,
    ) {
        self.late_confirmations.push((*client_id, *namespace));
        self.empty = false;
    }

    pub(crate) fn push_cancellation(
        &mut self,
        client_id: &ClientId,
        namespace: &NamespaceFilter,
        freed: usize,
    ) {
        self.cancellations.push((*client_id, *namespace, freed));
        self.empty = false;
    }

    pub(crate) fn push_expirations(&mut self, leases: Vec<Lease>) {
        if leases.is_empty() {
            return;
        }
        self.expirations.extend(leases);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: SynckeyServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait HostEvent {
    type Iter;

    fn iter(events: &mut HostEvents) -> Self::Iter;

    fn has(events: &HostEvents) -> bool;
}

// KeysGrantedEvent
pub struct KeysGrantedEvent;
impl HostEvent for KeysGrantedEvent {
    type Iter = IntoIter<(ClientId, NamespaceFilter, Vec<KeyId>)>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.grants);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.grants.is_empty()
    }
}

// RequestRejectedEvent
pub struct RequestRejectedEvent;
impl HostEvent for RequestRejectedEvent {
    type Iter = IntoIter<(ClientId, NamespaceFilter, u8)>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.rejections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.rejections.is_empty()
    }
}

// ReservationConfirmedEvent
pub struct ReservationConfirmedEvent;
impl HostEvent for ReservationConfirmedEvent {
    type Iter = IntoIter<(ClientId, NamespaceFilter, Vec<KeyId>)>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.confirmations);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.confirmations.is_empty()
    }
}

// ConfirmationRejectedEvent
pub struct ConfirmationRejectedEvent;
impl HostEvent for ConfirmationRejectedEvent {
    type Iter = IntoIter<(ClientId, NamespaceFilter)>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.late_confirmations);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.late_confirmations.is_empty()
    }
}

// ReservationCancelledEvent
pub struct ReservationCancelledEvent;
impl HostEvent for ReservationCancelledEvent {
    type Iter = IntoIter<(ClientId, NamespaceFilter, usize)>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.cancellations);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.cancellations.is_empty()
    }
}

// ReservationExpiredEvent
pub struct ReservationExpiredEvent;
impl HostEvent for ReservationExpiredEvent {
    type Iter = IntoIter<Lease>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.expirations);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.expirations.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl HostEvent for ErrorEvent {
    type Iter = IntoIter<SynckeyServerError>;

    fn iter(events: &mut HostEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &HostEvents) -> bool {
        !events.errors.is_empty()
    }
}
