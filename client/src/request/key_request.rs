use std::{
    future::Future,
    pin::Pin,
    sync::Weak,
    task::{Context, Poll},
};

use tokio::sync::oneshot;

use synckey_shared::{CorrelationId, KeyId};

use crate::{key_client::ClientInner, request::exchange::ExchangeResult, AllocationError};

/// A pending key request. Resolves once the host confirms the grant, or with
/// the reason it failed.
///
/// Dropping an unresolved request cancels it, which tells the host to release
/// whatever it already reserved.
#[must_use = "dropping a KeyRequest cancels it"]
pub struct KeyRequest {
    request: CorrelationId,
    receiver: oneshot::Receiver<ExchangeResult>,
    client: Weak<ClientInner>,
}

impl KeyRequest {
    pub(crate) fn new(
        request: CorrelationId,
        receiver: oneshot::Receiver<ExchangeResult>,
        client: Weak<ClientInner>,
    ) -> Self {
        Self {
            request,
            receiver,
            client,
        }
    }

    /// Temporary id matching the host's responses to this request
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.request
    }

    /// Abandons the request. Returns `false` if it had already completed.
    ///
    /// Awaiting a cancelled request yields `AllocationError::Cancelled`, or the
    /// transport error if the cancellation could not be sent.
    pub fn cancel(&mut self) -> bool {
        match self.client.upgrade() {
            Some(client) => client.cancel(&self.request),
            None => false,
        }
    }
}

impl Future for KeyRequest {
    type Output = Result<Vec<KeyId>, AllocationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(AllocationError::Disconnected)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for KeyRequest {
    fn drop(&mut self) {
        if let Some(client) = self.client.upgrade() {
            client.cancel(&self.request);
        }
    }
}
