use std::time::Duration;

use starlay_types::ControlEvent;
use tokio::time::timeout;

use crate::controller::ChannelSet;
use crate::hotkey::request_capture;

#[tokio::test]
async fn test_pending_capture_collapses_presses() {
    let channels = ChannelSet::new();
    let (capture_tx, capture_rx) = channels.capture;

    assert!(request_capture(&capture_tx));
    assert!(!request_capture(&capture_tx));
    assert!(!request_capture(&capture_tx));

    let rx = capture_rx.to_async();
    let result = timeout(Duration::from_secs(2), rx.recv()).await;
    assert!(matches!(result, Ok(Ok(ControlEvent::CaptureNow))));
    assert!(rx.is_empty());

    // Mailbox is free again once the tick thread took the request
    assert!(request_capture(&capture_tx));
}

#[tokio::test]
async fn test_capture_after_close_is_dropped() {
    let (capture_tx, capture_rx) = ChannelSet::new().capture;
    drop(capture_rx);
    assert!(!request_capture(&capture_tx));
}

#[tokio::test]
async fn test_console_events_keep_order() {
    let (control_tx, control_rx) = ChannelSet::new().control;

    tokio::task::spawn_blocking(move || {
        control_tx
            .send(ControlEvent::EditTranslation("Hello".to_string()))
            .expect("send failed");
        control_tx.send(ControlEvent::SaveTranslation).expect("send failed");
    });

    let rx = control_rx.to_async();
    let first = timeout(Duration::from_secs(2), rx.recv()).await;
    let second = timeout(Duration::from_secs(2), rx.recv()).await;

    match (first, second) {
        (Ok(Ok(ControlEvent::EditTranslation(text))), Ok(Ok(ControlEvent::SaveTranslation))) => {
            assert_eq!(text, "Hello");
        }
        other => panic!("Unexpected events: {other:?}"),
    }
}
