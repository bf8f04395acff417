use tokio::sync::oneshot;

use synckey_shared::{KeyId, NamespaceFilter};

use crate::AllocationError;

pub(crate) type ExchangeResult = Result<Vec<KeyId>, AllocationError>;

/// Where an in-flight request stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangePhase {
    /// `RequestKeys` sent, waiting for a grant or a rejection
    AwaitingGrant,
    /// Grant received and `ConfirmReservation` sent, waiting for the verdict
    AwaitingConfirmation,
}

pub(crate) enum ExchangeState {
    AwaitingGrant,
    AwaitingConfirmation { keys: Vec<KeyId> },
}

/// Client-side bookkeeping for one request. Completing it consumes it, so the
/// waiting `KeyRequest` is resolved exactly once.
pub(crate) struct Exchange {
    namespace: NamespaceFilter,
    count: u8,
    state: ExchangeState,
    completion: oneshot::Sender<ExchangeResult>,
}

impl Exchange {
    pub fn new(
        namespace: NamespaceFilter,
        count: u8,
        completion: oneshot::Sender<ExchangeResult>,
    ) -> Self {
        Self {
            namespace,
            count,
            state: ExchangeState::AwaitingGrant,
            completion,
        }
    }

    pub fn namespace(&self) -> &NamespaceFilter {
        &self.namespace
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn phase(&self) -> ExchangePhase {
        match self.state {
            ExchangeState::AwaitingGrant => ExchangePhase::AwaitingGrant,
            ExchangeState::AwaitingConfirmation { .. } => ExchangePhase::AwaitingConfirmation,
        }
    }

    pub fn granted(&mut self, keys: Vec<KeyId>) {
        self.state = ExchangeState::AwaitingConfirmation { keys };
    }

    /// Resolves with the granted keys, or an empty list if no grant was seen
    pub fn confirm(self) {
        let keys = match self.state {
            ExchangeState::AwaitingConfirmation { keys } => keys,
            ExchangeState::AwaitingGrant => Vec::new(),
        };
        // the caller may have stopped waiting already
        let _ = self.completion.send(Ok(keys));
    }

    pub fn fail(self, error: AllocationError) {
        let _ = self.completion.send(Err(error));
    }
}
