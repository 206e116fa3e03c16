use std::sync::Arc;
use std::time::Duration;

use roomlink_client::{SignalMessage, SignalingChannel, SignalingError};

use crate::integration::{TEST_TIMEOUT, init_tracing};
use crate::utils::{MockInboundChannel, MockPoster, test_params, test_post_url};

fn channel(
    poster: &MockPoster,
) -> (
    Arc<SignalingChannel>,
    tokio::sync::mpsc::UnboundedReceiver<SignalingError>,
) {
    SignalingChannel::new(Arc::new(poster.clone()), Arc::new(MockInboundChannel::new()))
}

#[tokio::test]
async fn test_messages_wait_for_room_parameters() {
    init_tracing();

    let poster = MockPoster::new();
    let (channel, _failures) = channel(&poster);

    channel.enqueue("m1");
    channel.enqueue("m2");
    assert_eq!(channel.flush().await.expect("flush"), 0);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(poster.attempts(), 0);
    assert_eq!(channel.queued(), vec!["m1", "m2"]);

    assert!(channel.set_parameters(Arc::new(test_params())));
    channel.request_flush();

    assert!(poster.wait_for_posts(2, 2000).await);
    assert_eq!(poster.bodies().await, vec!["m1", "m2"]);
    assert!(channel.is_empty());
}

#[tokio::test]
async fn test_messages_are_posted_in_order() {
    init_tracing();

    let poster = MockPoster::new();
    let (channel, _failures) = channel(&poster);
    channel.set_parameters(Arc::new(test_params()));

    let sent: Vec<String> = (1..=20).map(|i| format!("m{i}")).collect();
    for message in &sent {
        channel.enqueue(message.clone());
    }

    assert!(poster.wait_for_posts(sent.len(), 2000).await);
    assert_eq!(poster.bodies().await, sent);
    assert!(
        poster
            .posts()
            .await
            .iter()
            .all(|p| p.url == test_post_url())
    );
}

#[tokio::test]
async fn test_failed_post_keeps_the_rest_queued() {
    init_tracing();

    let poster = MockPoster::failing_after(2);
    let (channel, _failures) = channel(&poster);
    for i in 1..=4 {
        // Without parameters this only queues.
        channel.deliver(format!("m{i}")).await.expect("queue");
    }

    channel.set_parameters(Arc::new(test_params()));
    let result = channel.flush().await;

    assert!(matches!(result, Err(SignalingError::Delivery(_))));
    assert_eq!(poster.bodies().await, vec!["m1", "m2"]);
    assert_eq!(channel.queued(), vec!["m3", "m4"]);

    poster.recover();
    assert_eq!(channel.flush().await.expect("flush after recovery"), 2);
    assert_eq!(poster.bodies().await, vec!["m1", "m2", "m3", "m4"]);
    assert!(channel.is_empty());
}

#[tokio::test]
async fn test_background_failure_is_reported() {
    init_tracing();

    let poster = MockPoster::failing_after(0);
    let (channel, mut failures) = channel(&poster);
    channel.set_parameters(Arc::new(test_params()));

    channel.enqueue("m1");

    let failure = tokio::time::timeout(TEST_TIMEOUT, failures.recv())
        .await
        .expect("No failure reported");
    assert!(matches!(failure, Some(SignalingError::Delivery(_))));
    assert_eq!(channel.queued(), vec!["m1"]);
}

#[tokio::test]
async fn test_concurrent_flushes_never_resend() {
    init_tracing();

    let poster = MockPoster::new().with_delay(Duration::from_millis(10));
    let (channel, _failures) = channel(&poster);
    channel.set_parameters(Arc::new(test_params()));

    for i in 1..=5 {
        channel.enqueue(format!("m{i}"));
    }
    let (a, b) = tokio::join!(channel.flush(), channel.flush());
    a.expect("first flush");
    b.expect("second flush");

    assert!(poster.wait_for_posts(5, 2000).await);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(poster.bodies().await, vec!["m1", "m2", "m3", "m4", "m5"]);
    assert_eq!(poster.attempts(), 5);
    assert_eq!(poster.max_in_flight(), 1);
}

#[tokio::test]
async fn test_deliver_flushes_inline() {
    init_tracing();

    let poster = MockPoster::new();
    let (channel, _failures) = channel(&poster);
    channel.set_parameters(Arc::new(test_params()));

    let bye = SignalMessage::Bye.to_json().expect("encode bye");
    channel.deliver(bye.clone()).await.expect("deliver");

    assert_eq!(poster.bodies().await, vec![bye]);
}

#[tokio::test]
async fn test_parameters_are_set_once() {
    init_tracing();

    let (channel, _failures) = channel(&MockPoster::new());
    let first = Arc::new(test_params());

    assert!(channel.set_parameters(Arc::clone(&first)));
    assert!(!channel.set_parameters(Arc::new(test_params())));
    assert!(Arc::ptr_eq(channel.parameters().expect("parameters"), &first));
}
