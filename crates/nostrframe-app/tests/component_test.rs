//! Base component behavior: validation, connection barrier and rendering.

use std::time::Duration;

use nostrframe_app::{Component, Element, Lifecycle, ViewBody};
use nostrframe_core::{BarrierError, BarrierState, ChannelKey, ServiceError, Status};
use nostrframe_harness::{RecordingHost, ScriptedService, settle};

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    false
}

fn component(service: &ScriptedService) -> (Component<ScriptedService, RecordingHost>, RecordingHost) {
    let host = RecordingHost::new("nostr-follow");
    (Component::new(service.clone(), host.clone()), host)
}

#[tokio::test]
async fn attach_connects_and_renders_ready() {
    let service = ScriptedService::new();
    let (component, host) = component(&service);

    component.on_attach();
    assert_eq!(component.status(), Status::Loading);
    settle().await;

    assert_eq!(component.status(), Status::Ready);
    assert_eq!(component.barrier_state(), BarrierState::Fulfilled);
    assert_eq!(host.last_view().unwrap().body, ViewBody::Ready { entity: None, author: None });
    assert_eq!(service.connect_count(), 1);
}

#[tokio::test]
async fn waiters_follow_a_reset_barrier() {
    let service = ScriptedService::held();
    let (component, _host) = component(&service);

    component.on_attach();
    settle().await;

    let waiter = tokio::spawn({
        let component = component.clone();
        async move { component.ensure_connected().await }
    });
    settle().await;

    component.set_attribute("relays", "wss://relay.example.com");
    settle().await;
    assert_eq!(service.connect_count(), 2);

    // Result of the superseded attempt does not release the waiter.
    assert!(service.complete_connect(Ok(())));
    settle().await;
    assert!(!waiter.is_finished());
    assert_eq!(component.barrier_state(), BarrierState::Pending);
    assert_eq!(component.channel_status(&ChannelKey::CONNECTION), Status::Loading);

    assert!(service.complete_connect(Ok(())));
    assert_eq!(waiter.await.unwrap(), Ok(()));
    assert_eq!(component.channel_status(&ChannelKey::CONNECTION), Status::Ready);
}

#[tokio::test]
async fn waiters_observe_connection_failure() {
    let service = ScriptedService::new().connect_with(Err(ServiceError::Timeout));
    let (component, host) = component(&service);

    component.on_attach();
    settle().await;

    assert_eq!(component.ensure_connected().await, Err(BarrierError::ConnectionFailed));
    assert_eq!(component.status(), Status::Error);
    assert_eq!(
        host.status_notifications().last().and_then(|n| n.error_message.clone()).as_deref(),
        Some("Unable to connect to relays")
    );
}

#[tokio::test]
async fn detached_component_reflects_but_does_not_render() {
    let service = ScriptedService::new();
    let (component, host) = component(&service);

    component.set_attribute("theme", "sepia");

    assert_eq!(host.reflected("connection-status").as_deref(), Some("error"));
    assert_eq!(host.reflected("status").as_deref(), Some("error"));
    assert!(host.renders().is_empty());
    assert_eq!(service.connect_count(), 0);
}

#[tokio::test]
async fn relay_change_while_detached_does_not_connect() {
    let service = ScriptedService::new();
    let (component, _host) = component(&service);

    component.on_attach();
    settle().await;
    component.on_detach();

    component.set_attribute("relays", "wss://relay.example.com");
    settle().await;

    assert_eq!(service.connect_count(), 1);
    assert_eq!(component.channel_status(&ChannelKey::CONNECTION), Status::Idle);
    assert_eq!(component.barrier_state(), BarrierState::Pending);

    component.on_attach();
    settle().await;
    assert_eq!(service.connect_count(), 2);
    assert_eq!(component.status(), Status::Ready);
}

#[tokio::test]
async fn fixing_validation_while_connecting_restores_loading() {
    let service = ScriptedService::held();
    let (component, _host) = component(&service);

    component.on_attach();
    settle().await;

    component.set_attribute("theme", "sepia");
    assert_eq!(component.status(), Status::Error);

    component.set_attribute("theme", "dark");
    assert_eq!(component.channel_status(&ChannelKey::CONNECTION), Status::Loading);
    assert_eq!(service.connect_count(), 1);

    // Completion while the theme was invalid is picked up on restore.
    component.set_attribute("theme", "sepia");
    assert!(service.complete_connect(Ok(())));
    settle().await;
    assert_eq!(component.status(), Status::Error);
    assert_eq!(component.barrier_state(), BarrierState::Fulfilled);

    component.set_attribute("theme", "light");
    assert_eq!(component.status(), Status::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completion_racing_a_relay_change_never_settles_the_new_attempt() {
    for round in 0..50 {
        let service = ScriptedService::held();
        let (component, _host) = component(&service);

        component.on_attach();
        assert!(eventually(|| service.pending() == 1).await);

        // Either lands before the reset or is superseded by it.
        let completer = tokio::spawn({
            let service = service.clone();
            async move { service.complete_connect(Ok(())) }
        });
        component.set_attribute("relays", "wss://relay.example.com");
        assert!(completer.await.unwrap());

        assert!(eventually(|| service.connect_count() == 2 && service.pending() == 1).await);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(component.barrier_state(), BarrierState::Pending, "round {round}");
        assert_eq!(component.channel_status(&ChannelKey::CONNECTION), Status::Loading, "round {round}");

        assert!(service.complete_connect(Ok(())));
        assert_eq!(component.ensure_connected().await, Ok(()));
        assert!(eventually(|| component.status() == Status::Ready).await, "round {round}");
    }
}
