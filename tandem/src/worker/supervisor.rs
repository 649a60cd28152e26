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

//! The worker supervisor.

use crate::worker::{
    ContextFactory, WorkerContext, WorkerDefinition, WorkerError, WorkerEvent, WorkerInstance,
    WorkerStatus,
};
use futures_util::FutureExt;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Supervisor configuration.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// How long `stop` and `shutdown` wait for a run task before aborting it
    /// (default: 5s).
    pub stop_timeout: Duration,

    /// Lifecycle events buffered per subscriber (default: 64).
    pub event_capacity: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stop_timeout: Duration::from_secs(5),
            event_capacity: 64,
        }
    }
}

impl SupervisorConfig {
    /// Sets the stop timeout.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

/// Result of [`Supervisor::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A live worker was stopped.
    Stopped,
    /// No live worker had that id.
    NotFound,
}

/// Starts, restarts, and stops long-running background workers.
///
/// At most one instance per worker id is live at a time. Each instance runs
/// on its own task:
///
/// ```text
/// (absent) --start--> Running
/// Running  --returns Ok--> Stopped                  (removed)
/// Running  --fails or panics--> Crashed
/// Crashed  --restart allowed--> Restarting --delay--> Running
/// Crashed  --budget spent--> Stopped                 (removed, gave up)
/// Running | Restarting --stop--> Stopped             (removed)
/// ```
///
/// Stopping is cooperative: the stop signal is visible to the handler
/// through its [`WorkerContext`], and a handler that ignores it runs until
/// it returns or until the stop timeout elapses and its task is aborted.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tandem::worker::{StopOutcome, Supervisor, SupervisorConfig, WorkerDefinition};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let supervisor = Supervisor::new(SupervisorConfig::default());
/// let ticker = WorkerDefinition::from_fn("ticker", |ctx| async move {
///     while !ctx.is_cancelled() {
///         tokio::time::sleep(Duration::from_millis(10)).await;
///     }
///     Ok(())
/// });
///
/// supervisor.start(ticker);
/// assert_eq!(supervisor.active_workers().len(), 1);
/// assert_eq!(supervisor.stop("ticker").await, StopOutcome::Stopped);
/// assert_eq!(supervisor.stop("ticker").await, StopOutcome::NotFound);
/// # }
/// ```
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

struct Shared {
    config: SupervisorConfig,
    definitions: parking_lot::Mutex<HashMap<String, WorkerDefinition>>,
    workers: parking_lot::Mutex<HashMap<String, Slot>>,
    context_factory: parking_lot::RwLock<Option<Arc<dyn ContextFactory>>>,
    events: broadcast::Sender<WorkerEvent>,
    generations: AtomicU64,
}

struct Slot {
    instance: WorkerInstance,
    generation: u64,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Supervisor {
    /// Creates a supervisor with no workers.
    pub fn new(config: SupervisorConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                config,
                definitions: parking_lot::Mutex::new(HashMap::new()),
                workers: parking_lot::Mutex::new(HashMap::new()),
                context_factory: parking_lot::RwLock::new(None),
                events,
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Installs the hook that fills in each run's context.
    pub fn with_context_factory(self, factory: impl ContextFactory) -> Self {
        *self.shared.context_factory.write() = Some(Arc::new(factory));
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.shared.config
    }

    /// Subscribes to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerEvent> {
        self.shared.events.subscribe()
    }

    /// Remembers `definition` and starts it if its options say so.
    ///
    /// Returns the live instance when the worker was started.
    pub fn register(&self, definition: WorkerDefinition) -> Option<WorkerInstance> {
        let previous = self
            .shared
            .definitions
            .lock()
            .insert(definition.id().to_string(), definition.clone());
        if previous.is_some() {
            warn!(
                worker = %definition.id(),
                "Worker registered twice, replacing earlier definition"
            );
        }

        definition
            .options()
            .auto_start
            .then(|| self.start(definition))
    }

    /// Starts a previously registered worker.
    pub fn start_registered(&self, id: &str) -> Result<WorkerInstance, WorkerError> {
        let definition = self
            .shared
            .definitions
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| WorkerError::NotRegistered { id: id.to_string() })?;
        Ok(self.start(definition))
    }

    /// Starts a worker, or returns the live instance if one exists.
    ///
    /// The first run begins immediately, without the restart delay.
    pub fn start(&self, definition: WorkerDefinition) -> WorkerInstance {
        let mut workers = self.shared.workers.lock();
        if let Some(slot) = workers.get(definition.id()) {
            warn!(
                worker = %definition.id(),
                status = %slot.instance.status,
                "Worker already running"
            );
            return slot.instance.clone();
        }

        let id = definition.id().to_string();
        let generation = self.shared.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        let instance = WorkerInstance::running(&id);

        info!(worker = %id, "Worker started");
        self.shared.emit(WorkerEvent::Started { id: id.clone() });
        let task = tokio::spawn(run_worker(
            Arc::clone(&self.shared),
            definition,
            generation,
            cancel.clone(),
        ));
        workers.insert(
            id,
            Slot {
                instance: instance.clone(),
                generation,
                cancel,
                task: Some(task),
            },
        );
        drop(workers);
        instance
    }

    /// Stops a live worker and waits for its task to end.
    ///
    /// Stopping an id with no live worker is not an error.
    pub async fn stop(&self, id: &str) -> StopOutcome {
        let Some(slot) = self.shared.workers.lock().remove(id) else {
            debug!(worker = %id, "Stop requested for unknown worker");
            return StopOutcome::NotFound;
        };

        info!(worker = %id, status = %slot.instance.status, "Stopping worker");
        slot.cancel.cancel();
        self.shared.join(id, slot).await;
        self.shared.emit(WorkerEvent::Stopped { id: id.to_string() });
        StopOutcome::Stopped
    }

    /// Stops every live worker and waits for all of them to end.
    pub async fn shutdown(&self) {
        let slots: Vec<(String, Slot)> = self.shared.workers.lock().drain().collect();
        if slots.is_empty() {
            return;
        }

        info!(count = slots.len(), "Shutting down workers");
        for (_, slot) in &slots {
            slot.cancel.cancel();
        }

        join_all(slots.into_iter().map(|(id, slot)| async move {
            self.shared.join(&id, slot).await;
            self.shared.emit(WorkerEvent::Stopped { id });
        }))
        .await;
        info!("All workers stopped");
    }

    /// Snapshot of one worker's state, if it is live.
    pub fn status(&self, id: &str) -> Option<WorkerInstance> {
        self.shared
            .workers
            .lock()
            .get(id)
            .map(|slot| slot.instance.clone())
    }

    /// Snapshots of every live worker, sorted by id.
    pub fn active_workers(&self) -> Vec<WorkerInstance> {
        let mut instances: Vec<_> = self
            .shared
            .workers
            .lock()
            .values()
            .map(|slot| slot.instance.clone())
            .collect();
        instances.sort_by(|a, b| a.id.cmp(&b.id));
        instances
    }

    /// Ids of every registered definition, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.shared.definitions.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("config", &self.shared.config)
            .field("workers", &self.shared.workers.lock().len())
            .finish()
    }
}

impl Shared {
    fn emit(&self, event: WorkerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn context_for(
        &self,
        id: &str,
        restart_count: u32,
        cancel: &CancellationToken,
    ) -> WorkerContext {
        let mut ctx = WorkerContext::new(id, restart_count, cancel.clone());
        let factory = self.context_factory.read().clone();
        if let Some(factory) = factory {
            factory.build(&mut ctx);
        }
        ctx
    }

    /// Applies `f` to the slot if it still belongs to `generation`.
    fn update(&self, id: &str, generation: u64, f: impl FnOnce(&mut WorkerInstance)) {
        if let Some(slot) = self.workers.lock().get_mut(id) {
            if slot.generation == generation {
                f(&mut slot.instance);
            }
        }
    }

    /// Removes the slot if it still belongs to `generation`.
    fn retire(&self, id: &str, generation: u64) -> bool {
        let mut workers = self.workers.lock();
        match workers.get(id) {
            Some(slot) if slot.generation == generation => {
                workers.remove(id);
                true
            }
            _ => false,
        }
    }

    async fn join(&self, id: &str, mut slot: Slot) {
        let Some(mut task) = slot.task.take() else {
            return;
        };

        match tokio::time::timeout(self.config.stop_timeout, &mut task).await {
            Ok(Ok(())) => debug!(worker = %id, "Worker task ended"),
            Ok(Err(e)) => warn!(worker = %id, error = %e, "Worker task ended abnormally"),
            Err(_) => {
                warn!(
                    worker = %id,
                    timeout = ?self.config.stop_timeout,
                    "Worker ignored stop request, aborting"
                );
                task.abort();
            }
        }
    }
}

async fn run_worker(
    shared: Arc<Shared>,
    definition: WorkerDefinition,
    generation: u64,
    cancel: CancellationToken,
) {
    let id = definition.id();
    let options = *definition.options();
    let mut restart_count = 0;

    loop {
        let ctx = shared.context_for(id, restart_count, &cancel);
        let outcome = AssertUnwindSafe(definition.handler().run(ctx))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic_message(panic.as_ref())),
        };

        if cancel.is_cancelled() {
            // `stop` or `shutdown` owns the rest of the teardown.
            debug!(worker = %id, "Worker run ended after stop request");
            return;
        }

        let Some(failure) = failure else {
            if shared.retire(id, generation) {
                info!(worker = %id, restart_count, "Worker completed");
                shared.emit(WorkerEvent::Completed { id: id.to_string() });
            }
            return;
        };

        error!(worker = %id, error = %failure, restart_count, "Worker crashed");
        shared.update(id, generation, |instance| {
            instance.status = WorkerStatus::Crashed;
            instance.last_error = Some(failure.clone());
        });
        shared.emit(WorkerEvent::Crashed {
            id: id.to_string(),
            error: failure,
            restart_count,
        });

        if !options.allows_restart(restart_count) {
            if shared.retire(id, generation) {
                error!(
                    worker = %id,
                    restart_count,
                    max_restarts = options.max_restarts,
                    "Worker gave up, not restarting"
                );
                shared.emit(WorkerEvent::GaveUp {
                    id: id.to_string(),
                    restart_count,
                });
            }
            return;
        }

        shared.update(id, generation, |instance| {
            instance.status = WorkerStatus::Restarting;
        });
        warn!(
            worker = %id,
            attempt = restart_count + 1,
            delay = ?options.restart_delay,
            "Restarting worker"
        );
        shared.emit(WorkerEvent::Restarting {
            id: id.to_string(),
            attempt: restart_count + 1,
            delay: options.restart_delay,
        });

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(worker = %id, "Restart cancelled by stop request");
                return;
            }
            _ = tokio::time::sleep(options.restart_delay) => {}
        }

        restart_count += 1;
        shared.update(id, generation, |instance| {
            instance.status = WorkerStatus::Running;
            instance.restart_count = restart_count;
            instance.started_at = SystemTime::now();
        });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
