//! Keys held by a client that leaves the session go back to the pool.

use synckey_client::AllocationError;
use synckey_shared::{NamespaceFilter, TransportError};
use synckey_test::{deliver_to_host, exchange_messages, TestSession};

#[tokio::test]
async fn disconnect_releases_confirmed_and_pending_keys() {
    let mut session = TestSession::default();
    session
        .host
        .reserve_core_keys(&[0], &NamespaceFilter::Room)
        .expect("core key");
    let leaving = session.add_client(1);
    let staying = session.add_client(2);

    let confirmed = leaving.request_keys(3, NamespaceFilter::Room);
    let kept = staying.request_keys(2, NamespaceFilter::Room);
    exchange_messages(&mut session);
    assert!(confirmed.await.is_ok());
    let kept = kept.await.expect("second client keys");

    let _pending = leaving.request_keys(4, NamespaceFilter::Player);
    deliver_to_host(&mut session);

    session.host.disconnect_client(&1);

    let store = session.host.store();
    assert_eq!(store.live_count(&NamespaceFilter::Room), 1 + kept.len());
    assert_eq!(store.live_count(&NamespaceFilter::Player), 0);
    assert!(store.lease(&NamespaceFilter::Room, &0).is_some());
    assert_eq!(session.host.grant_count(), 1);
}

#[tokio::test]
async fn lost_host_fails_pending_requests() {
    let mut session = TestSession::default();
    let client = session.add_client(1);

    let request = client.request_keys(2, NamespaceFilter::Room);
    client.shutdown();

    assert_eq!(request.await, Err(AllocationError::Disconnected));
    exchange_messages(&mut session);
    assert_eq!(client.pending_count(), 0);
}

#[tokio::test]
async fn disconnected_transport_error_reaches_the_caller() {
    let mut session = TestSession::default();
    let client = session.add_client(1);
    session.hub.disconnect(1);

    let result = client.request_keys(2, NamespaceFilter::Room).await;

    assert_eq!(
        result,
        Err(AllocationError::Transport(TransportError::Disconnected))
    );
    assert_eq!(session.hub.pending_to_host(), 0);
}
