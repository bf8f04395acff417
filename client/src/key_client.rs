use std::{collections::HashMap, sync::Arc};

use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use synckey_shared::{
    AllocationMessage, CorrelationId, MessageDirection, MessageSender, NamespaceFilter,
};

use crate::{
    request::{
        exchange::{Exchange, ExchangePhase},
        KeyRequest,
    },
    AllocationError,
};

/// Client side of the key allocation protocol.
///
/// Cheap to clone; every clone shares the same table of in-flight requests.
/// The application feeds payloads from the host into `receive()`, which never
/// blocks, and awaits the `KeyRequest`s returned by `request_keys()`.
#[derive(Clone)]
pub struct KeyClient {
    inner: Arc<ClientInner>,
}

impl KeyClient {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                sender,
                exchanges: Mutex::new(HashMap::new()),
            }),
        }
    }

    // Requests

    /// Asks the host for `count` keys in `namespace`. The returned request
    /// resolves with the keys once the host has accepted the confirmation.
    pub fn request_keys(&self, count: u8, namespace: NamespaceFilter) -> KeyRequest {
        let (completion, receiver) = oneshot::channel();
        let request = CorrelationId::generate();
        let key_request = KeyRequest::new(request, receiver, Arc::downgrade(&self.inner));

        let exchange = Exchange::new(namespace, count, completion);
        if count == 0 {
            exchange.confirm();
            return key_request;
        }

        // registered before sending, an inline transport may answer immediately
        self.inner.exchanges.lock().insert(request, exchange);

        debug!("requesting {} keys in {} ({})", count, namespace, request);

        if let Err(error) = self.inner.send(&AllocationMessage::RequestKeys {
            request,
            count,
            namespace,
        }) {
            self.inner.fail(&request, error);
        }

        key_request
    }

    /// Asks the host for a single key in `namespace`
    pub fn request_single_key(&self, namespace: NamespaceFilter) -> KeyRequest {
        self.request_keys(1, namespace)
    }

    /// Gives a batch back to the host. A request that is still pending is
    /// cancelled; for a completed one the host frees the confirmed keys.
    pub fn release_keys(&self, request: &CorrelationId) -> Result<(), AllocationError> {
        if self.inner.cancel(request) {
            return Ok(());
        }

        debug!("releasing keys of request {}", request);
        self.inner
            .send(&AllocationMessage::CancelReservation { request: *request })
    }

    pub fn pending_count(&self) -> usize {
        self.inner.exchanges.lock().len()
    }

    pub fn phase(&self, request: &CorrelationId) -> Option<ExchangePhase> {
        self.inner
            .exchanges
            .lock()
            .get(request)
            .map(|exchange| exchange.phase())
    }

    /// Fails every pending request with `AllocationError::Disconnected`,
    /// typically because the connection to the host was lost
    pub fn shutdown(&self) {
        let exchanges: Vec<Exchange> = self
            .inner
            .exchanges
            .lock()
            .drain()
            .map(|(_, exchange)| exchange)
            .collect();
        for exchange in exchanges {
            exchange.fail(AllocationError::Disconnected);
        }
    }

    // Incoming messages

    /// Handles a raw payload received from the host
    pub fn receive(&self, payload: &[u8]) {
        match AllocationMessage::de(payload) {
            Ok(message) => self.receive_message(message),
            Err(error) => warn!("dropping malformed message from host: {}", error),
        }
    }

    /// Handles an already decoded message received from the host
    pub fn receive_message(&self, message: AllocationMessage) {
        if message.direction() != MessageDirection::ToClient {
            warn!("dropping {}, it is only ever sent to the host", message.name());
            return;
        }

        let request = *message.request();
        match message {
            AllocationMessage::KeysGranted { keys, .. } => self.handle_grant(&request, keys),
            AllocationMessage::RequestRejected { .. } => {
                let Some(exchange) = self.inner.take_in_phase(&request, ExchangePhase::AwaitingGrant)
                else {
                    return;
                };
                debug!("request {} rejected by host", request);
                let error = AllocationError::Exhausted {
                    namespace: *exchange.namespace(),
                    requested: exchange.count(),
                };
                exchange.fail(error);
            }
            AllocationMessage::ConfirmationAccepted { .. } => {
                let Some(exchange) = self
                    .inner
                    .take_in_phase(&request, ExchangePhase::AwaitingConfirmation)
                else {
                    return;
                };
                debug!("request {} confirmed by host", request);
                exchange.confirm();
            }
            AllocationMessage::ConfirmationRejected { .. } => {
                let Some(exchange) = self
                    .inner
                    .take_in_phase(&request, ExchangePhase::AwaitingConfirmation)
                else {
                    return;
                };
                debug!("request {} expired before confirmation", request);
                let error = AllocationError::ReservationExpired {
                    namespace: *exchange.namespace(),
                };
                exchange.fail(error);
            }
            _ => {}
        }
    }

    fn handle_grant(&self, request: &CorrelationId, keys: Vec<u8>) {
        {
            let mut exchanges = self.inner.exchanges.lock();
            let Some(exchange) = exchanges.get_mut(request) else {
                debug!("grant for unknown request {}, dropping", request);
                return;
            };
            if exchange.phase() != ExchangePhase::AwaitingGrant {
                warn!("duplicate grant for request {}, dropping", request);
                return;
            }
            debug!("request {} granted keys {:?}", request, keys);
            exchange.granted(keys);
        }

        if let Err(error) = self
            .inner
            .send(&AllocationMessage::ConfirmReservation { request: *request })
        {
            self.inner.fail(request, error);
        }
    }
}

pub(crate) struct ClientInner {
    sender: Arc<dyn MessageSender>,
    exchanges: Mutex<HashMap<CorrelationId, Exchange>>,
}

impl ClientInner {
    /// Removes the exchange and tells the host to release its reservation.
    /// Returns `false` if the exchange had already completed.
    pub(crate) fn cancel(&self, request: &CorrelationId) -> bool {
        let Some(exchange) = self.exchanges.lock().remove(request) else {
            return false;
        };

        debug!("cancelling request {}", request);

        match self.send(&AllocationMessage::CancelReservation { request: *request }) {
            Ok(()) => exchange.fail(AllocationError::Cancelled),
            Err(error) => exchange.fail(error),
        }
        true
    }

    fn send(&self, message: &AllocationMessage) -> Result<(), AllocationError> {
        let payload = message.to_bytes()?;
        self.sender.send_to_host(&payload)?;
        Ok(())
    }

    fn fail(&self, request: &CorrelationId, error: AllocationError) {
        let exchange = self.exchanges.lock().remove(request);
        if let Some(exchange) = exchange {
            warn!("request {} failed: {}", request, error);
            exchange.fail(error);
        }
    }

    fn take_in_phase(&self, request: &CorrelationId, phase: ExchangePhase) -> Option<Exchange> {
        let mut exchanges = self.exchanges.lock();
        let Some(exchange) = exchanges.get(request) else {
            debug!("response for unknown request {}, dropping", request);
            return None;
        };
        if exchange.phase() != phase {
            warn!(
                "unexpected response for request {} while {:?}, dropping",
                request,
                exchange.phase()
            );
            return None;
        }
        exchanges.remove(request)
    }
}
