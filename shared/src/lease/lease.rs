use std::time::Duration;

use crate::{ClientId, CorrelationId, KeyId, NamespaceFilter, CORE_OWNER};

/// One reserved key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lease {
    id: KeyId,
    namespace: NamespaceFilter,
    correlation_id: CorrelationId,
    owner_id: ClientId,
    /// Offset on the owning store's clock
    reserved_at: Duration,
    confirmed: bool,
    permanent: bool,
}

impl Lease {
    pub(crate) fn reserved(
        id: KeyId,
        namespace: NamespaceFilter,
        correlation_id: CorrelationId,
        owner_id: ClientId,
        reserved_at: Duration,
    ) -> Self {
        Self {
            id,
            namespace,
            correlation_id,
            owner_id,
            reserved_at,
            confirmed: false,
            permanent: false,
        }
    }

    pub(crate) fn core(id: KeyId, namespace: NamespaceFilter, reserved_at: Duration) -> Self {
        Self {
            id,
            namespace,
            correlation_id: CorrelationId::nil(),
            owner_id: CORE_OWNER,
            reserved_at,
            confirmed: true,
            permanent: true,
        }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn namespace(&self) -> &NamespaceFilter {
        &self.namespace
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn owner_id(&self) -> &ClientId {
        &self.owner_id
    }

    pub fn reserved_at(&self) -> Duration {
        self.reserved_at
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn age(&self, clock: Duration) -> Duration {
        clock.saturating_sub(self.reserved_at)
    }

    /// Unconfirmed, non-core leases expire once their age reaches the timeout
    pub fn is_expired(&self, clock: Duration, reservation_timeout: Duration) -> bool {
        !self.confirmed && !self.permanent && self.age(clock) >= reservation_timeout
    }

    pub(crate) fn belongs_to(&self, correlation_id: &CorrelationId, owner_id: &ClientId) -> bool {
        !self.permanent && self.correlation_id == *correlation_id && self.owner_id == *owner_id
    }

    pub(crate) fn confirm(&mut self) {
        self.confirmed = true;
    }
}
