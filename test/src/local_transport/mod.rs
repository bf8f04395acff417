/// In-memory transport for E2E testing
/// Routes allocation payloads between one host and its clients without network I/O

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use synckey_shared::{ClientId, MessageSender, TransportError};

/// Id the host uses when it talks to itself through the hub
pub const HOST_CLIENT_ID: ClientId = 0;

#[derive(Default)]
struct HubQueues {
    to_host: VecDeque<(ClientId, Vec<u8>)>,
    to_clients: HashMap<ClientId, VecDeque<Vec<u8>>>,
    disconnected: HashSet<ClientId>,
    failing: HashSet<ClientId>,
}

/// Shared message queues of one test session
#[derive(Clone, Default)]
pub struct LocalHub {
    queues: Arc<Mutex<HubQueues>>,
}

impl LocalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender used by the `KeyHost`
    pub fn host_sender(&self) -> Arc<dyn MessageSender> {
        Arc::new(LocalSender {
            queues: self.queues.clone(),
            local_id: HOST_CLIENT_ID,
        })
    }

    /// Registers a client and returns the sender its `KeyClient` uses
    pub fn client_sender(&self, client_id: ClientId) -> Arc<dyn MessageSender> {
        self.queues.lock().to_clients.entry(client_id).or_default();
        Arc::new(LocalSender {
            queues: self.queues.clone(),
            local_id: client_id,
        })
    }

    pub fn pop_to_host(&self) -> Option<(ClientId, Vec<u8>)> {
        self.queues.lock().to_host.pop_front()
    }

    pub fn pop_to_client(&self, client_id: &ClientId) -> Option<Vec<u8>> {
        self.queues.lock().to_clients.get_mut(client_id)?.pop_front()
    }

    pub fn pending_to_host(&self) -> usize {
        self.queues.lock().to_host.len()
    }

    pub fn pending_to_client(&self, client_id: &ClientId) -> usize {
        self.queues
            .lock()
            .to_clients
            .get(client_id)
            .map_or(0, |queue| queue.len())
    }

    /// Every send from or to `client_id` fails with `TransportError::Disconnected`
    pub fn disconnect(&self, client_id: ClientId) {
        self.queues.lock().disconnected.insert(client_id);
    }

    /// Every send from or to `client_id` fails with `TransportError::SendFailed`
    pub fn fail_sends(&self, client_id: ClientId) {
        self.queues.lock().failing.insert(client_id);
    }
}

struct LocalSender {
    queues: Arc<Mutex<HubQueues>>,
    local_id: ClientId,
}

impl LocalSender {
    fn check(queues: &HubQueues, client_id: &ClientId) -> Result<(), TransportError> {
        if queues.disconnected.contains(client_id) {
            return Err(TransportError::Disconnected);
        }
        if queues.failing.contains(client_id) {
            return Err(TransportError::SendFailed {
                reason: format!("local hub refuses traffic for client {}", client_id),
            });
        }
        Ok(())
    }
}

impl MessageSender for LocalSender {
    fn send_to_host(&self, payload: &[u8]) -> Result<(), TransportError> {
        let mut queues = self.queues.lock();
        Self::check(&queues, &self.local_id)?;
        queues.to_host.push_back((self.local_id, payload.to_vec()));
        Ok(())
    }

    fn send_to_client(&self, client_id: &ClientId, payload: &[u8]) -> Result<(), TransportError> {
        let mut queues = self.queues.lock();
        Self::check(&queues, client_id)?;
        let Some(queue) = queues.to_clients.get_mut(client_id) else {
            return Err(TransportError::UnknownClient {
                client_id: *client_id,
            });
        };
        queue.push_back(payload.to_vec());
        Ok(())
    }
}
