//! Transport failures are never retried or swallowed.

use std::time::Duration;

use synckey_client::AllocationError;
use synckey_server::{ErrorEvent, SynckeyServerError};
use synckey_shared::{NamespaceFilter, TransportError};
use synckey_test::{deliver_to_clients, deliver_to_host, exchange_messages, TestSession};

#[tokio::test]
async fn failed_confirmation_send_fails_the_request() {
    let mut session = TestSession::default();
    let client = session.add_client(1);

    let request = client.request_keys(2, NamespaceFilter::Room);
    deliver_to_host(&mut session);
    session.hub.fail_sends(1);
    deliver_to_clients(&mut session);

    match request.await {
        Err(AllocationError::Transport(TransportError::SendFailed { reason })) => {
            assert!(reason.contains("client 1"));
        }
        other => panic!("expected the transport error, got {:?}", other),
    }
    assert_eq!(client.pending_count(), 0);
}

#[test]
fn host_reports_undeliverable_responses_as_events() {
    let mut session = TestSession::with_timeout(Duration::from_millis(20));
    let client = session.add_client(1);

    let _request = client.request_keys(2, NamespaceFilter::Room);
    session.hub.disconnect(1);
    deliver_to_host(&mut session);

    let errors: Vec<_> = session.host.take_events().read::<ErrorEvent>().collect();
    assert_eq!(
        errors,
        vec![SynckeyServerError::Transport {
            client_id: 1,
            message: "KeysGranted",
            source: TransportError::Disconnected,
        }]
    );

    // the grant stays reserved until the sweep reclaims it
    assert_eq!(session.host.store().live_count(&NamespaceFilter::Room), 2);
    session.host.tick(Duration::from_millis(20));
    assert_eq!(session.host.store().live_count(&NamespaceFilter::Room), 0);
}

#[tokio::test]
async fn malformed_host_payloads_are_dropped() {
    let mut session = TestSession::default();
    let client = session.add_client(1);

    let request = client.request_keys(1, NamespaceFilter::Room);
    client.receive(&[2, 0, 0]);
    client.receive(&[99; 17]);
    assert_eq!(client.pending_count(), 1);

    exchange_messages(&mut session);
    assert_eq!(request.await.map(|keys| keys.len()), Ok(1));
}
