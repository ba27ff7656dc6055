//! Integration tests for the sampler backend lifecycle
//!
//! These tests run the complete backend thread against a scripted mock
//! link and validate:
//! - Startup and shutdown
//! - The color stream reaching the frontend
//! - Capture events and the settle pause
//! - Reconnection after device churn
//! - Overrun recovery under both strategies
//!
//! Run with: cargo test --features mock-link

#![cfg(feature = "mock-link")]

use std::thread;
use std::time::Duration;

use swatchbooth::backend::{KioskEvent, SamplerBackend};
use swatchbooth::config::{AppConfig, OverrunStrategy};
use swatchbooth::link::MockLink;
use swatchbooth::types::{LinkState, Rgb};

/// Config with test-friendly timings so nothing sleeps for real seconds
fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.sampling.reconnect_delay_ms = 20;
    config.sampling.settle_delay_ms = 300;
    config
}

#[test]
fn test_backend_startup_and_shutdown() {
    let (backend, frontend) = SamplerBackend::new(fast_config());

    let handle = thread::spawn(move || backend.run_with_link(Box::new(MockLink::new())));

    thread::sleep(Duration::from_millis(50));
    frontend.shutdown();

    let result = handle.join();
    assert!(result.is_ok(), "Backend thread should exit cleanly");

    let events = frontend.drain();
    assert!(
        events.iter().any(|e| matches!(e, KioskEvent::Shutdown)),
        "Should receive a shutdown event"
    );
}

#[test]
fn test_color_stream_reaches_frontend() {
    let (backend, frontend) = SamplerBackend::new(fast_config());
    let link = MockLink::new().with_lines(["255,0,0", "0,255,0"]);

    let handle = thread::spawn(move || backend.run_with_link(Box::new(link)));
    thread::sleep(Duration::from_millis(100));

    let events = frontend.drain();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, KioskEvent::LinkStatus(LinkState::Connected))),
        "Should report the link as connected"
    );
    assert!(
        events
            .iter()
            .any(|e| matches!(e, KioskEvent::ColorUpdate(c) if *c == Rgb::new(255, 0, 0))),
        "Should receive the first decoded color"
    );
    // The cell always holds the newest color
    assert_eq!(frontend.current_color(), Some(Rgb::new(0, 255, 0)));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_capture_pauses_sampling_for_the_settle_delay() {
    let (backend, frontend) = SamplerBackend::new(fast_config());
    let link = MockLink::new().with_lines(["1,2,3@", "9,9,9"]);

    let handle = thread::spawn(move || backend.run_with_link(Box::new(link)));
    thread::sleep(Duration::from_millis(100));

    let events = frontend.drain();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, KioskEvent::CaptureRequested(c) if *c == Rgb::new(1, 2, 3))),
        "Should receive a capture event for the flagged sample"
    );
    // Still inside the settle pause; the next line is unread
    assert_eq!(frontend.current_color(), Some(Rgb::new(1, 2, 3)));

    // After the settle delay sampling resumes
    thread::sleep(Duration::from_millis(400));
    assert_eq!(frontend.current_color(), Some(Rgb::new(9, 9, 9)));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_reconnects_after_device_churn() {
    let (backend, frontend) = SamplerBackend::new(fast_config());
    let link = MockLink::new().failing_opens(2).with_lines(["4,5,6"]);

    let handle = thread::spawn(move || backend.run_with_link(Box::new(link)));

    // Two failed attempts at 20ms backoff, then a connect and a decode
    thread::sleep(Duration::from_millis(200));

    let events = frontend.drain();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, KioskEvent::LinkStatus(LinkState::Connected))),
        "Should eventually connect"
    );
    assert_eq!(frontend.current_color(), Some(Rgb::new(4, 5, 6)));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_overrun_discard_keeps_the_backend_running() {
    let (backend, frontend) = SamplerBackend::new(fast_config());
    let link = MockLink::new().with_backlog(100).with_lines(["7,7,7"]);

    let handle = thread::spawn(move || backend.run_with_link(Box::new(link)));
    thread::sleep(Duration::from_millis(100));

    // Recovery happened in place and the next line still decoded
    assert_eq!(frontend.current_color(), Some(Rgb::new(7, 7, 7)));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_overrun_restart_request_stops_the_backend() {
    let mut config = fast_config();
    config.recovery.overrun_strategy = OverrunStrategy::RequestRestart;

    let (backend, frontend) = SamplerBackend::new(config);
    let link = MockLink::new().with_backlog(100).with_lines(["7,7,7"]);

    let handle = thread::spawn(move || backend.run_with_link(Box::new(link)));

    // The backend stops on its own; no shutdown command needed
    handle.join().unwrap();

    let events = frontend.drain();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, KioskEvent::RestartRequested)),
        "Should ask the host for a restart"
    );
    assert!(
        events.iter().any(|e| matches!(e, KioskEvent::Shutdown)),
        "Should still announce the shutdown"
    );
    // The flagged backlog never became a sample
    assert_eq!(frontend.current_color(), None);
}

#[test]
fn test_stats_reporting() {
    let (backend, frontend) = SamplerBackend::new(fast_config());
    let link = MockLink::new().with_lines(["1,1,1", "garbage", "2,2,2"]);

    let handle = thread::spawn(move || backend.run_with_link(Box::new(link)));

    // Stats are published every 500ms
    thread::sleep(Duration::from_millis(700));

    let events = frontend.drain();
    let stats = events.iter().find_map(|e| match e {
        KioskEvent::Stats(s) => Some(s.clone()),
        _ => None,
    });
    let stats = stats.expect("Should receive statistics updates");
    assert_eq!(stats.lines_decoded, 2);
    assert_eq!(stats.lines_rejected, 1);

    frontend.shutdown();
    handle.join().unwrap();
}
