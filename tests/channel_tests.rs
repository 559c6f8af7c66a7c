//! Live sync channel behavior under paused time: handshake, liveness probe,
//! reconnection policy, roster dispatch, and teardown.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::sleep;

use locshare::domain::{ParticipantId, ResolvedLocation};
use locshare::sync::{ChannelState, SyncChannel};

use common::{roster_recorder, ConnectOutcome, FakeConnector};

fn initial_location(id: &str) -> ResolvedLocation {
    ResolvedLocation {
        user_id: ParticipantId::from(id),
        latitude: 10.0,
        longitude: 20.0,
        heading: 0.0,
        timestamp: 1,
        accuracy: 30.0,
    }
}

fn connect(connector: &FakeConnector) -> (SyncChannel, tokio::sync::mpsc::UnboundedReceiver<Vec<ResolvedLocation>>) {
    let (observer, rosters) = roster_recorder();
    let channel = SyncChannel::connect(
        connector.clone(),
        "ws://test/ws/s1".to_owned(),
        ParticipantId::from("u1"),
        initial_location("u1"),
        observer,
    );
    (channel, rosters)
}

#[tokio::test(start_paused = true)]
async fn open_announces_current_location() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(channel.state(), ChannelState::Open);
    let sent = connector.handle(0).sent_json();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["type"], "location_update");
    assert_eq!(sent[0]["data"]["userId"], "u1");
    assert_eq!(sent[0]["data"]["latitude"], 10.0);
}

#[tokio::test(start_paused = true)]
async fn liveness_probe_fires_every_thirty_seconds() {
    let connector = FakeConnector::always_succeeding();
    let (_channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    let pings = |handle: &common::TransportHandle| {
        handle
            .sent_json()
            .iter()
            .filter(|msg| msg["type"] == "ping")
            .count()
    };

    let handle = connector.handle(0);
    sleep(Duration::from_secs(29)).await;
    assert_eq!(pings(&handle), 0);
    sleep(Duration::from_secs(2)).await;
    assert_eq!(pings(&handle), 1);
    sleep(Duration::from_secs(30)).await;
    assert_eq!(pings(&handle), 2);
}

#[tokio::test(start_paused = true)]
async fn send_location_transmits_while_open() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    channel.send_location(11.0, 21.0, 90.0);
    sleep(Duration::from_millis(10)).await;

    let sent = connector.handle(0).sent_json();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1]["type"], "location_update");
    assert_eq!(sent[1]["data"]["latitude"], 11.0);
    assert_eq!(sent[1]["data"]["heading"], 90.0);
}

#[tokio::test(start_paused = true)]
async fn abnormal_closure_reconnects_after_five_seconds() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    connector.handle(0).push_close(1006);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(channel.state(), ChannelState::Disconnected);

    // Not yet: the delay is a full five seconds.
    sleep(Duration::from_secs(4)).await;
    assert_eq!(connector.attempt_count(), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(connector.attempt_count(), 2);
    assert_eq!(channel.state(), ChannelState::Open);

    // The fresh connection gets its own announcement.
    let sent = connector.handle(1).sent_json();
    assert_eq!(sent[0]["type"], "location_update");
}

#[tokio::test(start_paused = true)]
async fn handshake_failure_retries_like_a_closure() {
    let connector = FakeConnector::new(vec![ConnectOutcome::Failure]);
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(connector.attempt_count(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);

    sleep(Duration::from_secs(6)).await;
    assert_eq!(connector.attempt_count(), 2);
    assert_eq!(channel.state(), ChannelState::Open);
}

#[tokio::test(start_paused = true)]
async fn normal_closure_from_server_is_terminal() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    connector.handle(0).push_close(1000);
    sleep(Duration::from_secs(20)).await;

    assert_eq!(connector.attempt_count(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn close_is_idempotent_and_sends_normal_closure() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    channel.close();
    channel.close();
    sleep(Duration::from_secs(20)).await;

    assert_eq!(connector.attempt_count(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);
    let (code, _reason) = connector.handle(0).close_frame().unwrap();
    assert_eq!(code, 1000);
}

#[tokio::test(start_paused = true)]
async fn close_cancels_a_pending_reconnect() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    connector.handle(0).push_close(1006);
    sleep(Duration::from_secs(1)).await;
    channel.close();
    sleep(Duration::from_secs(20)).await;

    // No new Connecting transition after the explicit close.
    assert_eq!(connector.attempt_count(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn close_during_handshake_is_terminal() {
    let connector = FakeConnector::new(vec![ConnectOutcome::Hang]);
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(channel.state(), ChannelState::Connecting);

    channel.close();
    sleep(Duration::from_secs(20)).await;

    assert_eq!(connector.attempt_count(), 1);
    assert_eq!(channel.state(), ChannelState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn roster_excludes_local_participant_and_preserves_order() {
    let connector = FakeConnector::always_succeeding();
    let (_channel, mut rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    let frame = serde_json::json!({
        "type": "all_locations",
        "data": [
            {"userId": "u3", "latitude": 3.0, "longitude": 3.5, "timestamp": 3},
            {"userId": "u1", "latitude": 1.0, "longitude": 1.5, "timestamp": 1},
            {"userId": "u2", "latitude": 2.0, "longitude": 2.5, "timestamp": 2}
        ]
    });
    connector.handle(0).push_text(&frame.to_string());
    sleep(Duration::from_millis(10)).await;

    let roster = rosters.try_recv().unwrap();
    let ids: Vec<&str> = roster.iter().map(|l| l.user_id.as_str()).collect();
    assert_eq!(ids, vec!["u3", "u2"]);
    assert_eq!(roster[0].latitude, 3.0);
    assert_eq!(roster[1].longitude, 2.5);
}

#[tokio::test(start_paused = true)]
async fn each_roster_message_replaces_the_previous_snapshot() {
    let connector = FakeConnector::always_succeeding();
    let (_channel, mut rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    let handle = connector.handle(0);
    handle.push_text(
        r#"{"type":"all_locations","data":[{"userId":"u2","latitude":2.0,"longitude":2.0,"timestamp":1}]}"#,
    );
    handle.push_text(r#"{"type":"all_locations","data":[]}"#);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(rosters.try_recv().unwrap().len(), 1);
    assert_eq!(rosters.try_recv().unwrap().len(), 0);
    assert!(rosters.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn malformed_and_unknown_frames_are_dropped() {
    let connector = FakeConnector::always_succeeding();
    let (channel, mut rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    let handle = connector.handle(0);
    handle.push_text("this is not json");
    handle.push_text(r#"{"type":"server_notice","data":"hello"}"#);
    handle.push_text(r#"{"type":"pong"}"#);
    handle.push_text(
        r#"{"type":"all_locations","data":[{"userId":"u2","latitude":2.0,"longitude":2.0,"timestamp":1}]}"#,
    );
    sleep(Duration::from_millis(10)).await;

    // Only the valid roster frame produced a callback; nothing escalated
    // and the channel stayed open.
    let roster = rosters.try_recv().unwrap();
    assert_eq!(roster.len(), 1);
    assert!(rosters.try_recv().is_err());
    assert_eq!(channel.state(), ChannelState::Open);
}

#[tokio::test(start_paused = true)]
async fn updates_while_disconnected_are_dropped_but_inform_the_reconnect() {
    let connector = FakeConnector::always_succeeding();
    let (channel, _rosters) = connect(&connector);
    sleep(Duration::from_millis(10)).await;

    connector.handle(0).push_close(1006);
    sleep(Duration::from_secs(1)).await;

    // Dropped: the channel is between connections.
    channel.send_location(99.0, 88.0, 45.0);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(connector.handle(0).sent_json().len(), 1);

    // After the reconnect, the announcement carries the latest coordinates.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(channel.state(), ChannelState::Open);
    let sent = connector.handle(1).sent_json();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["data"]["latitude"], 99.0);
    assert_eq!(sent[0]["data"]["longitude"], 88.0);
}
