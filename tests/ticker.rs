//! Integration tests for the async timer driver.

use court_rotation_web::boundary::{ImmediateWriter, LogToneEmitter};
use court_rotation_web::ticker::spawn_ticker;
use court_rotation_web::{InMemoryRoster, Player, RoundOrchestrator, RoundPhase, SessionConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn shared_orchestrator() -> Arc<Mutex<RoundOrchestrator>> {
    let roster = Arc::new(InMemoryRoster::with_players(
        (0..8).map(|i| Player::new(format!("P{i}"), 5)).collect(),
    ));
    let config = SessionConfig {
        seed: Some(1),
        ..SessionConfig::default()
    };
    let mut orch = RoundOrchestrator::new(
        config,
        roster.clone(),
        Arc::new(ImmediateWriter::new(roster)),
        Arc::new(LogToneEmitter),
    );
    orch.start().unwrap();
    Arc::new(Mutex::new(orch))
}

fn remaining(shared: &Arc<Mutex<RoundOrchestrator>>) -> u32 {
    shared.lock().unwrap().remaining_secs()
}

#[tokio::test]
async fn ticker_counts_down_until_cancelled() {
    let shared = shared_orchestrator();
    let handle = spawn_ticker(shared.clone(), Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(remaining(&shared) < 720);

    handle.cancel();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let frozen = remaining(&shared);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(remaining(&shared), frozen);
    assert!(handle.is_finished());
}

#[tokio::test]
async fn ticker_stops_itself_after_end() {
    let shared = shared_orchestrator();
    let handle = spawn_ticker(shared.clone(), Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(20)).await;
    shared.lock().unwrap().end();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_finished());
    assert_eq!(shared.lock().unwrap().phase(), RoundPhase::Idle);
}

#[tokio::test]
async fn restarted_session_ignores_old_ticker() {
    let shared = shared_orchestrator();
    let old = spawn_ticker(shared.clone(), Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(20)).await;
    shared.lock().unwrap().start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(old.is_finished());
    assert_eq!(remaining(&shared), 720);
}
