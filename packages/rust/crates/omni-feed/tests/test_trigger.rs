//! Tests for `VisibilityTrigger` and `Sentinel` wired to a `SharedWindow`.

use std::sync::atomic::{AtomicUsize, Ordering};

use omni_feed::{FeedError, FeedEvent, FeedEventBus, SharedWindow, WindowController};

fn shared(initial: usize, step: usize) -> SharedWindow {
    SharedWindow::new(WindowController::new(initial, step), FeedEventBus::new(16))
}

#[test]
fn enter_grows_once_and_redundant_enter_is_noop() {
    let window = shared(20, 20);
    window.refresh_total(100).unwrap();
    let trigger = window.trigger();

    assert!(trigger.on_enter_attention_region());
    assert!(!trigger.on_enter_attention_region());
    assert_eq!(window.fetch_limit(), 40);

    trigger.on_leave_attention_region();
    trigger.on_leave_attention_region();
    assert!(!window.snapshot().attentive);

    assert!(trigger.on_enter_attention_region());
    assert_eq!(window.fetch_limit(), 60);
}

#[test]
fn trigger_does_not_grow_past_known_total() {
    let window = shared(20, 20);
    window.refresh_total(5).unwrap();
    let trigger = window.trigger();

    assert!(!trigger.on_enter_attention_region());
    assert_eq!(window.fetch_limit(), 20);
    // Nothing fetched yet, so the sentinel stays mounted.
    assert!(trigger.is_renderable());

    window.report_fetched(5).unwrap();
    assert!(!trigger.is_renderable());
}

#[test]
fn detached_window_makes_trigger_inert() {
    let window = shared(20, 20);
    let trigger = window.trigger();
    assert!(trigger.is_attached());

    window.detach();
    assert!(!trigger.is_attached());
    assert!(!trigger.is_renderable());
    assert!(!trigger.on_enter_attention_region());
    assert_eq!(window.fetch_limit(), 20);
    assert!(matches!(window.grow(), Err(FeedError::Detached)));
    assert!(matches!(window.begin_refresh(), Err(FeedError::Detached)));
}

#[test]
fn dropped_window_makes_trigger_inert() {
    let window = shared(20, 20);
    let trigger = window.trigger();
    drop(window);
    assert!(!trigger.is_attached());
    assert!(!trigger.on_enter_attention_region());
}

#[tokio::test]
async fn growth_pulse_publishes_limit_event() {
    let window = shared(20, 20);
    let mut rx = window.events().subscribe();

    window.trigger().on_enter_attention_region();

    let event = rx.recv().await.unwrap();
    assert_eq!(event, FeedEvent::LimitGrew { limit: 40 });
}

#[tokio::test]
async fn detach_publishes_once() {
    let window = shared(20, 20);
    let mut rx = window.events().subscribe();
    window.detach();
    window.detach();

    assert_eq!(rx.recv().await.unwrap(), FeedEvent::Detached);
    assert!(rx.try_recv().is_err());
}

#[test]
fn no_growth_lands_after_concurrent_detach() {
    const THREADS: usize = 4;
    const PULSES: usize = 2_000;

    let window = SharedWindow::new(
        WindowController::new(20, 20),
        FeedEventBus::new(THREADS * PULSES * 2),
    );
    let mut rx = window.events().subscribe();
    let finished = AtomicUsize::new(0);

    let limit_at_detach = std::thread::scope(|scope| {
        for _ in 0..THREADS {
            let trigger = window.trigger();
            let finished = &finished;
            scope.spawn(move || {
                for _ in 0..PULSES {
                    trigger.on_enter_attention_region();
                    trigger.on_leave_attention_region();
                }
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }
        while window.fetch_limit() < 1_000 && finished.load(Ordering::SeqCst) < THREADS {
            std::thread::yield_now();
        }
        window.detach();
        window.fetch_limit()
    });

    assert_eq!(window.fetch_limit(), limit_at_detach);

    let mut last_growth = None;
    let mut detached = false;
    while let Ok(event) = rx.try_recv() {
        assert!(!detached, "event published after detach: {event:?}");
        match event {
            FeedEvent::LimitGrew { limit } => last_growth = Some(limit),
            FeedEvent::Detached => detached = true,
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(detached);
    assert_eq!(last_growth.unwrap_or(20), limit_at_detach);
}
