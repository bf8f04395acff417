//! Only the peer holding host authority may touch the lease table.

use std::{sync::Arc, time::Duration};

use synckey_server::{HostConfig, KeyHost, KeysGrantedEvent};
use synckey_shared::{
    AllocationMessage, CorrelationId, HostType, LeaseConfig, NamespaceFilter,
};
use synckey_test::{deliver_to_host, exchange_messages, LocalHub, TestSession};

#[test]
fn non_host_ignores_requests() {
    let mut session = TestSession::default();
    let client = session.add_client(1);
    session.role.set(HostType::Client);

    let _request = client.request_keys(2, NamespaceFilter::Room);
    assert_eq!(deliver_to_host(&mut session), 1);

    assert!(session.host.store().is_empty());
    assert_eq!(session.hub.pending_to_client(&1), 0);
    assert!(session.host.take_events().is_empty());
}

#[tokio::test]
async fn requests_resume_once_authority_is_regained() {
    let mut session = TestSession::default();
    let client = session.add_client(1);

    session.role.set(HostType::Client);
    let ignored = client.request_keys(1, NamespaceFilter::Room);
    exchange_messages(&mut session);
    assert_eq!(client.pending_count(), 1);

    session.role.set(HostType::Server);
    let served = client.request_keys(1, NamespaceFilter::Room);
    exchange_messages(&mut session);

    assert_eq!(served.await.map(|keys| keys.len()), Ok(1));
    drop(ignored);
}

#[test]
fn non_host_does_not_sweep() {
    let mut session = TestSession::with_timeout(Duration::from_millis(20));
    let client = session.add_client(1);

    let _request = client.request_keys(2, NamespaceFilter::Room);
    deliver_to_host(&mut session);
    assert_eq!(session.host.store().live_count(&NamespaceFilter::Room), 2);

    session.role.set(HostType::Client);
    session.host.tick(Duration::from_millis(50));
    assert_eq!(session.host.store().live_count(&NamespaceFilter::Room), 2);
    assert_eq!(session.host.store().clock(), Duration::ZERO);

    session.role.set(HostType::Server);
    session.host.tick(Duration::from_millis(20));
    assert_eq!(session.host.store().live_count(&NamespaceFilter::Room), 0);
}

#[test]
fn host_type_works_as_a_fixed_role() {
    let hub = LocalHub::new();
    let _client_sender = hub.client_sender(3);
    let mut host = KeyHost::new(
        HostConfig {
            lease: LeaseConfig::new(Duration::from_secs(1)),
        },
        hub.host_sender(),
        Arc::new(HostType::Server),
    );

    host.receive_message(
        &3,
        AllocationMessage::RequestKeys {
            request: CorrelationId::generate(),
            count: 2,
            namespace: NamespaceFilter::Player,
        },
    );

    assert!(host.is_host());
    assert_eq!(host.store().live_count(&NamespaceFilter::Player), 2);
    assert_eq!(hub.pending_to_client(&3), 1);
}

#[test]
fn host_drops_malformed_and_misdirected_messages() {
    let mut session = TestSession::default();
    session.add_client(1);

    session.host.receive(&1, &[]);
    session.host.receive(&1, &[42; 17]);
    session.host.receive_message(
        &1,
        AllocationMessage::KeysGranted {
            request: CorrelationId::generate(),
            keys: vec![0, 1],
        },
    );

    assert!(session.host.store().is_empty());
    assert!(session.host.take_events().is_empty());
    assert_eq!(session.hub.pending_to_client(&1), 0);
}

#[test]
fn duplicate_request_is_granted_once() {
    let mut session = TestSession::default();
    session.add_client(1);
    let request = CorrelationId::generate();
    let message = AllocationMessage::RequestKeys {
        request,
        count: 2,
        namespace: NamespaceFilter::Room,
    };

    session.host.receive_message(&1, message.clone());
    session.host.receive_message(&1, message);

    assert_eq!(session.host.store().live_count(&NamespaceFilter::Room), 2);
    assert_eq!(session.host.grant_count(), 1);
    let grants: Vec<_> = session
        .host
        .take_events()
        .read::<KeysGrantedEvent>()
        .collect();
    assert_eq!(grants.len(), 1);
}

#[test]
fn same_request_id_from_different_clients_is_not_confused() {
    let mut session = TestSession::default();
    session.add_client(1);
    session.add_client(2);
    let request = CorrelationId::generate();

    for client_id in [1, 2] {
        session.host.receive_message(
            &client_id,
            AllocationMessage::RequestKeys {
                request,
                count: 1,
                namespace: NamespaceFilter::Room,
            },
        );
    }
    session
        .host
        .receive_message(&2, AllocationMessage::CancelReservation { request });

    let store = session.host.store();
    assert_eq!(store.live_count(&NamespaceFilter::Room), 1);
    assert!(store.leases(&NamespaceFilter::Room).all(|lease| lease.owner_id() == &1));
}

#[test]
fn empty_request_is_granted_and_accepted() {
    let mut session = TestSession::default();
    session.add_client(1);
    let request = CorrelationId::generate();

    session.host.receive_message(
        &1,
        AllocationMessage::RequestKeys {
            request,
            count: 0,
            namespace: NamespaceFilter::Room,
        },
    );
    session
        .host
        .receive_message(&1, AllocationMessage::ConfirmReservation { request });

    let responses: Vec<_> = std::iter::from_fn(|| session.hub.pop_to_client(&1))
        .map(|payload| AllocationMessage::de(&payload).expect("host sent malformed payload"))
        .collect();
    assert_eq!(
        responses,
        vec![
            AllocationMessage::KeysGranted {
                request,
                keys: Vec::new(),
            },
            AllocationMessage::ConfirmationAccepted { request },
        ]
    );
    assert!(session.host.store().is_empty());
    assert_eq!(session.host.grant_count(), 0);
}
