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

//! Worker definitions and their restart options.

use crate::worker::{WorkerContext, WorkerError};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The body of a worker.
///
/// Returning `Ok(())` ends the worker cleanly. Returning an error or
/// panicking is a crash and is subject to the restart policy.
#[async_trait]
pub trait WorkerHandler: Send + Sync + 'static {
    /// Runs the worker once.
    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError>;
}

/// Adapts an async closure into a [`WorkerHandler`].
pub struct FnWorker<F>(F);

impl<F> FnWorker<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> WorkerHandler for FnWorker<F>
where
    F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
        (self.0)(ctx).await
    }
}

/// Restart policy and start behaviour of a worker.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tandem::worker::WorkerOptions;
///
/// let options = WorkerOptions::default()
///     .with_max_restarts(2)
///     .with_restart_delay(Duration::from_millis(10));
/// assert!(options.auto_restart);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Restart after a crash (default: true).
    pub auto_restart: bool,

    /// Pause before each restart (default: 1s). Never applied before the first run.
    pub restart_delay: Duration,

    /// Restarts allowed after crashes; `0` means unlimited (default: 0).
    pub max_restarts: u32,

    /// Start as soon as the worker is registered (default: true).
    pub auto_start: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            auto_restart: true,
            restart_delay: Duration::from_secs(1),
            max_restarts: 0,
            auto_start: true,
        }
    }
}

impl WorkerOptions {
    /// Enables or disables restarting after crashes.
    pub fn with_auto_restart(mut self, enabled: bool) -> Self {
        self.auto_restart = enabled;
        self
    }

    /// Sets the pause before each restart.
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Bounds the number of restarts; `0` means unlimited.
    pub fn with_max_restarts(mut self, max: u32) -> Self {
        self.max_restarts = max;
        self
    }

    /// Enables or disables starting on registration.
    pub fn with_auto_start(mut self, enabled: bool) -> Self {
        self.auto_start = enabled;
        self
    }

    /// Returns `true` if a worker that has restarted `restart_count` times
    /// may restart once more.
    pub fn allows_restart(&self, restart_count: u32) -> bool {
        self.auto_restart && (self.max_restarts == 0 || restart_count < self.max_restarts)
    }
}

/// An immutable worker description: id, body, and options.
#[derive(Clone)]
pub struct WorkerDefinition {
    id: String,
    handler: Arc<dyn WorkerHandler>,
    options: WorkerOptions,
}

impl WorkerDefinition {
    /// Creates a definition with default options.
    pub fn new(id: impl Into<String>, handler: impl WorkerHandler) -> Self {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
            options: WorkerOptions::default(),
        }
    }

    /// Creates a definition from an async closure.
    pub fn from_fn<F, Fut>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
    {
        Self::new(id, FnWorker::new(f))
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: WorkerOptions) -> Self {
        self.options = options;
        self
    }

    /// The worker id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The restart options.
    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    pub(crate) fn handler(&self) -> &Arc<dyn WorkerHandler> {
        &self.handler
    }
}

impl fmt::Debug for WorkerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerDefinition")
            .field("id", &self.id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
