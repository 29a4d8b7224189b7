//! Tests for the scripted scroll session behind `omni-feed simulate`.

use omni_feed::{FeedError, FeedEvent, Simulation, SimulationOptions, WindowConfig, item_label};

fn config(initial: usize, step: usize) -> WindowConfig {
    WindowConfig::default()
        .with_initial_size(initial)
        .with_step_size(step)
}

#[tokio::test]
async fn session_scrolls_to_the_end_of_the_collection() {
    let simulation = Simulation::new(config(20, 20), SimulationOptions::default()).unwrap();

    let mut limits = Vec::new();
    let report = simulation
        .run(|cycle| limits.push(cycle.window.limit))
        .await
        .unwrap();

    assert_eq!(limits, vec![20, 40, 60, 80, 100]);
    assert_eq!(report.cycles, 5);
    assert_eq!(report.items, 95);
    assert!(!report.appended);
    assert_eq!(report.window.total, Some(95));
    assert!(report.window.reached_limit);
    assert!(!report.window.has_more);
    assert!(simulation.feed().is_closed());
}

#[tokio::test]
async fn upstream_append_resumes_growth() {
    let options = SimulationOptions {
        total: 30,
        append_after: Some(30),
        append: 25,
        ..SimulationOptions::default()
    };
    let simulation = Simulation::new(config(20, 20), options).unwrap();

    let mut cycles = Vec::new();
    let report = simulation.run(|cycle| cycles.push(*cycle)).await.unwrap();

    assert_eq!(report.cycles, 3);
    assert!(report.appended);
    assert_eq!(report.items, 55);
    assert_eq!(report.window.total, Some(55));
    assert!(!report.window.has_more);

    // Second cycle reached the old total, then learned about the append.
    let second = cycles[1].window;
    assert_eq!(second.fetched_len, 30);
    assert_eq!(second.total, Some(55));
    assert!(!second.reached_limit);
    assert!(second.has_more);
    assert_eq!(cycles[2].window.limit, 60);
}

#[tokio::test]
async fn cycle_cap_stops_before_the_end() {
    let options = SimulationOptions {
        max_cycles: 2,
        ..SimulationOptions::default()
    };
    let simulation = Simulation::new(config(20, 20), options).unwrap();

    let report = simulation.run(|_| {}).await.unwrap();

    assert_eq!(report.cycles, 2);
    assert_eq!(report.items, 40);
    assert!(report.window.has_more);
    assert!(simulation.feed().is_closed());
}

#[tokio::test]
async fn session_ends_with_detached_event() {
    let simulation = Simulation::new(config(50, 50), SimulationOptions::default()).unwrap();
    let mut rx = simulation.feed().subscribe();

    simulation.run(|_| {}).await.unwrap();

    let mut last = None;
    while let Ok(event) = rx.try_recv() {
        last = Some(event);
    }
    assert_eq!(last, Some(FeedEvent::Detached));
    assert_eq!(simulation.feed().items().last(), Some(&item_label(94)));
}

#[test]
fn zero_step_is_rejected() {
    let err = Simulation::new(config(20, 0), SimulationOptions::default()).unwrap_err();
    assert!(matches!(err, FeedError::InvalidConfig(_)));
}
