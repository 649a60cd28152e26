//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Integration tests for worker supervision.
//!
//! These tests verify restart budgets, cooperative stop, and lifecycle
//! events as observed through the supervisor's public surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tandem::worker::{
    StopOutcome, Supervisor, SupervisorConfig, WorkerContext, WorkerDefinition, WorkerError,
    WorkerEvent, WorkerOptions, WorkerStatus,
};
use tokio::sync::broadcast;
use tokio::time::timeout;

async fn next_event(events: &mut broadcast::Receiver<WorkerEvent>) -> WorkerEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for worker event")
        .expect("event channel closed")
}

async fn wait_for(
    events: &mut broadcast::Receiver<WorkerEvent>,
    matches: impl Fn(&WorkerEvent) -> bool,
) -> WorkerEvent {
    loop {
        let event = next_event(events).await;
        if matches(&event) {
            return event;
        }
    }
}

fn always_failing(runs: Arc<AtomicU32>) -> WorkerDefinition {
    WorkerDefinition::from_fn("flaky", move |_ctx| {
        let runs = Arc::clone(&runs);
        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Err(WorkerError::failed("lost upstream"))
        }
    })
}

#[tokio::test]
async fn test_restart_budget_is_honoured() {
    let supervisor = Supervisor::new(SupervisorConfig::default());
    let mut events = supervisor.subscribe();
    let runs = Arc::new(AtomicU32::new(0));

    supervisor.start(always_failing(Arc::clone(&runs)).with_options(
        WorkerOptions::default()
            .with_max_restarts(2)
            .with_restart_delay(Duration::from_millis(10)),
    ));

    let gave_up = wait_for(&mut events, |e| matches!(e, WorkerEvent::GaveUp { .. })).await;
    assert_eq!(
        gave_up,
        WorkerEvent::GaveUp {
            id: "flaky".to_string(),
            restart_count: 2,
        }
    );
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert!(supervisor.status("flaky").is_none());
    assert!(supervisor.active_workers().is_empty());
}

#[tokio::test]
async fn test_event_sequence_for_one_restart() {
    let supervisor = Supervisor::new(SupervisorConfig::default());
    let mut events = supervisor.subscribe();
    let runs = Arc::new(AtomicU32::new(0));

    supervisor.start(always_failing(Arc::clone(&runs)).with_options(
        WorkerOptions::default()
            .with_max_restarts(1)
            .with_restart_delay(Duration::from_millis(5)),
    ));

    let mut seen = Vec::new();
    loop {
        let event = next_event(&mut events).await;
        let terminal = event.is_terminal();
        seen.push(event);
        if terminal {
            break;
        }
    }

    assert!(matches!(seen[0], WorkerEvent::Started { .. }));
    assert!(matches!(seen[1], WorkerEvent::Crashed { restart_count: 0, .. }));
    assert!(matches!(seen[2], WorkerEvent::Restarting { attempt: 1, .. }));
    assert!(matches!(seen[3], WorkerEvent::Crashed { restart_count: 1, .. }));
    assert!(matches!(seen[4], WorkerEvent::GaveUp { restart_count: 1, .. }));
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let supervisor = Supervisor::new(SupervisorConfig::default());
    let definition = WorkerDefinition::from_fn("ticker", |ctx: WorkerContext| async move {
        ctx.cancelled().await;
        Ok(())
    });

    supervisor.start(definition);
    assert_eq!(
        supervisor.status("ticker").map(|w| w.status),
        Some(WorkerStatus::Running)
    );

    assert_eq!(supervisor.stop("ticker").await, StopOutcome::Stopped);
    assert_eq!(supervisor.stop("ticker").await, StopOutcome::NotFound);
    assert_eq!(supervisor.stop("ticker").await, StopOutcome::NotFound);
    assert_eq!(supervisor.stop("never-started").await, StopOutcome::NotFound);
    assert!(supervisor.active_workers().is_empty());
}

#[tokio::test]
async fn test_stop_during_restart_delay_prevents_restart() {
    let supervisor = Supervisor::new(SupervisorConfig::default());
    let mut events = supervisor.subscribe();
    let runs = Arc::new(AtomicU32::new(0));

    supervisor.start(
        always_failing(Arc::clone(&runs))
            .with_options(WorkerOptions::default().with_restart_delay(Duration::from_secs(30))),
    );

    wait_for(&mut events, |e| matches!(e, WorkerEvent::Restarting { .. })).await;
    assert_eq!(
        supervisor.status("flaky").map(|w| w.status),
        Some(WorkerStatus::Restarting)
    );

    let outcome = timeout(Duration::from_secs(5), supervisor.stop("flaky"))
        .await
        .expect("stop must not wait out the restart delay");
    assert_eq!(outcome, StopOutcome::Stopped);
    assert_eq!(
        wait_for(&mut events, |e| e.is_terminal()).await,
        WorkerEvent::Stopped {
            id: "flaky".to_string()
        }
    );
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_uncooperative_worker_is_aborted_on_stop() {
    let supervisor = Supervisor::new(
        SupervisorConfig::default().with_stop_timeout(Duration::from_millis(50)),
    );
    supervisor.start(WorkerDefinition::from_fn("stubborn", |_ctx| async {
        std::future::pending::<()>().await;
        Ok(())
    }));

    let outcome = timeout(Duration::from_secs(5), supervisor.stop("stubborn"))
        .await
        .expect("stop must abort after the stop timeout");
    assert_eq!(outcome, StopOutcome::Stopped);
    assert!(supervisor.status("stubborn").is_none());
}

#[tokio::test]
async fn test_shutdown_waits_for_every_worker() {
    let supervisor = Supervisor::new(SupervisorConfig::default());
    let finished = Arc::new(AtomicU32::new(0));

    for id in ["a", "b", "c"] {
        let finished = Arc::clone(&finished);
        supervisor.start(WorkerDefinition::from_fn(id, move |ctx: WorkerContext| {
            let finished = Arc::clone(&finished);
            async move {
                ctx.cancelled().await;
                tokio::time::sleep(Duration::from_millis(20)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));
    }
    assert_eq!(supervisor.active_workers().len(), 3);

    supervisor.shutdown().await;
    assert_eq!(finished.load(Ordering::SeqCst), 3);
    assert!(supervisor.active_workers().is_empty());
}

#[tokio::test]
async fn test_worker_sees_restart_count_and_recovers() {
    let supervisor = Supervisor::new(SupervisorConfig::default());
    let mut events = supervisor.subscribe();

    supervisor.start(
        WorkerDefinition::from_fn("recovering", |ctx: WorkerContext| async move {
            if ctx.restart_count() < 2 {
                return Err(WorkerError::failed(format!("attempt {}", ctx.restart_count())));
            }
            Ok(())
        })
        .with_options(WorkerOptions::default().with_restart_delay(Duration::from_millis(5))),
    );

    let done = wait_for(&mut events, |e| e.is_terminal()).await;
    assert_eq!(
        done,
        WorkerEvent::Completed {
            id: "recovering".to_string()
        }
    );
    assert!(supervisor.status("recovering").is_none());
}
