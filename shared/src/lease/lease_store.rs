use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use log::{debug, info};

use crate::{
    lease::{error::LeaseError, lease::Lease, lease_config::LeaseConfig},
    ClientId, CorrelationId, KeyId, NamespaceFilter, KEY_SPACE,
};

/// Authoritative table of key leases, partitioned by namespace.
///
/// The store has no timer of its own. Whoever owns it advances the clock with
/// `update()` and reclaims stale reservations with `flush()`. Every mutation
/// takes `&mut self`, so a store shared between threads must sit behind a
/// single lock.
pub struct LeaseStore {
    config: LeaseConfig,
    clock: Duration,
    namespaces: HashMap<NamespaceFilter, BTreeMap<KeyId, Lease>>,
}

impl LeaseStore {
    pub fn new(config: LeaseConfig) -> Self {
        Self {
            config,
            clock: Duration::ZERO,
            namespaces: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LeaseConfig {
        &self.config
    }

    /// Time accumulated through `update()` since the store was created
    pub fn clock(&self) -> Duration {
        self.clock
    }

    // Reservation

    /// Reserves `count` free keys in `namespace`, lowest values first.
    /// Either every key is reserved or none is.
    pub fn reserve_keys(
        &mut self,
        count: u8,
        correlation_id: &CorrelationId,
        owner_id: &ClientId,
        namespace: &NamespaceFilter,
    ) -> Result<Vec<KeyId>, LeaseError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let free_keys: Vec<KeyId> = match self.namespaces.get(namespace) {
            Some(leases) => (0..=KeyId::MAX)
                .filter(|id| !leases.contains_key(id))
                .take(count as usize)
                .collect(),
            None => (0..count).collect(),
        };

        if free_keys.len() < count as usize {
            return Err(LeaseError::Exhausted {
                namespace: *namespace,
                requested: count,
                available: self.free_count(namespace),
            });
        }

        let leases = self.namespaces.entry(*namespace).or_default();
        for id in &free_keys {
            leases.insert(
                *id,
                Lease::reserved(*id, *namespace, *correlation_id, *owner_id, self.clock),
            );
        }

        debug!(
            "reserved keys {:?} in {} for client {} ({})",
            free_keys, namespace, owner_id, correlation_id
        );

        Ok(free_keys)
    }

    /// Claims an exact set of keys for the host itself. Core keys are
    /// confirmed on insertion and never expire.
    pub fn reserve_core_keys(
        &mut self,
        ids: &[KeyId],
        namespace: &NamespaceFilter,
    ) -> Result<(), LeaseError> {
        if let Some(leases) = self.namespaces.get(namespace) {
            if let Some(id) = ids.iter().find(|id| leases.contains_key(*id)) {
                return Err(LeaseError::KeyAlreadyReserved {
                    namespace: *namespace,
                    id: *id,
                });
            }
        }

        let leases = self.namespaces.entry(*namespace).or_default();
        for id in ids {
            leases.insert(*id, Lease::core(*id, *namespace, self.clock));
        }

        info!("reserved core keys {:?} in {}", ids, namespace);

        Ok(())
    }

    // Confirmation

    /// Confirms every lease in the group and returns their keys.
    ///
    /// The group is all-or-nothing: if it is already gone, or its window has
    /// elapsed on the store clock, the remaining leases are removed and the
    /// call fails.
    pub fn confirm_keys(
        &mut self,
        correlation_id: &CorrelationId,
        owner_id: &ClientId,
    ) -> Result<Vec<KeyId>, LeaseError> {
        let group = self.group_keys(correlation_id, owner_id);
        if group.is_empty() {
            return Err(LeaseError::ConfirmationWindowExpired {
                correlation_id: *correlation_id,
            });
        }

        let clock = self.clock;
        let timeout = self.config.reservation_timeout;
        let expired = self
            .group(correlation_id, owner_id)
            .iter()
            .any(|lease| lease.is_expired(clock, timeout));
        if expired {
            self.free_keys(correlation_id, owner_id);
            return Err(LeaseError::ConfirmationWindowExpired {
                correlation_id: *correlation_id,
            });
        }

        let mut confirmed = Vec::with_capacity(group.len());
        for (namespace, id) in group {
            if let Some(lease) = self
                .namespaces
                .get_mut(&namespace)
                .and_then(|leases| leases.get_mut(&id))
            {
                lease.confirm();
                confirmed.push(id);
            }
        }

        debug!(
            "confirmed keys {:?} for client {} ({})",
            confirmed, owner_id, correlation_id
        );

        Ok(confirmed)
    }

    // Release

    /// Removes every lease in the group, confirmed or not. Returns how many
    /// leases were removed; freeing an unknown group removes nothing.
    pub fn free_keys(&mut self, correlation_id: &CorrelationId, owner_id: &ClientId) -> usize {
        let removed = self.remove_where(|lease| lease.belongs_to(correlation_id, owner_id));
        if !removed.is_empty() {
            debug!(
                "freed {} keys for client {} ({})",
                removed.len(),
                owner_id,
                correlation_id
            );
        }
        removed.len()
    }

    /// Removes every non-core lease held by a client, used when it leaves
    /// the session
    pub fn free_owner(&mut self, owner_id: &ClientId) -> usize {
        let removed =
            self.remove_where(|lease| !lease.is_permanent() && lease.owner_id() == owner_id);
        if !removed.is_empty() {
            info!("freed {} keys held by client {}", removed.len(), owner_id);
        }
        removed.len()
    }

    // Time

    /// Advances the store clock. Leases are only removed by `flush()`.
    pub fn update(&mut self, elapsed: Duration) {
        self.clock = self.clock.saturating_add(elapsed);
    }

    /// Sweeps every unconfirmed lease whose reservation window has elapsed,
    /// returning the removed leases
    pub fn flush(&mut self) -> Vec<Lease> {
        let clock = self.clock;
        let timeout = self.config.reservation_timeout;
        let expired = self.remove_where(|lease| lease.is_expired(clock, timeout));
        if !expired.is_empty() {
            info!("swept {} expired key reservations", expired.len());
        }
        expired
    }

    // Queries

    pub fn lease(&self, namespace: &NamespaceFilter, id: &KeyId) -> Option<&Lease> {
        self.namespaces.get(namespace)?.get(id)
    }

    pub fn leases(&self, namespace: &NamespaceFilter) -> impl Iterator<Item = &Lease> {
        self.namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|leases| leases.values())
    }

    pub fn group(&self, correlation_id: &CorrelationId, owner_id: &ClientId) -> Vec<&Lease> {
        self.namespaces
            .values()
            .flat_map(|leases| leases.values())
            .filter(|lease| lease.belongs_to(correlation_id, owner_id))
            .collect()
    }

    pub fn live_count(&self, namespace: &NamespaceFilter) -> usize {
        self.namespaces
            .get(namespace)
            .map_or(0, |leases| leases.len())
    }

    pub fn free_count(&self, namespace: &NamespaceFilter) -> usize {
        KEY_SPACE - self.live_count(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.values().all(|leases| leases.is_empty())
    }

    // Private

    fn group_keys(
        &self,
        correlation_id: &CorrelationId,
        owner_id: &ClientId,
    ) -> Vec<(NamespaceFilter, KeyId)> {
        self.group(correlation_id, owner_id)
            .into_iter()
            .map(|lease| (*lease.namespace(), lease.id()))
            .collect()
    }

    fn remove_where<F: Fn(&Lease) -> bool>(&mut self, predicate: F) -> Vec<Lease> {
        let mut removed = Vec::new();
        for leases in self.namespaces.values_mut() {
            let ids: Vec<KeyId> = leases
                .values()
                .filter(|lease| predicate(lease))
                .map(|lease| lease.id())
                .collect();
            for id in ids {
                if let Some(lease) = leases.remove(&id) {
                    removed.push(lease);
                }
            }
        }
        removed
    }
}

impl Default for LeaseStore {
    fn default() -> Self {
        Self::new(LeaseConfig::default())
    }
}
