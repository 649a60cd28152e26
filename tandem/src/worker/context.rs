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

//! The context handed to each worker run.

use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Per-run context for a worker handler.
///
/// A fresh context is built for every run attempt, first by the supervisor
/// and then by the installed [`ContextFactory`], if any.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    worker_id: String,
    restart_count: u32,
    cancellation: CancellationToken,
    values: HashMap<String, Value>,
}

impl WorkerContext {
    pub(crate) fn new(
        worker_id: impl Into<String>,
        restart_count: u32,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            restart_count,
            cancellation,
            values: HashMap::new(),
        }
    }

    /// The worker's id.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Restarts that preceded this run; `0` on the first run.
    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Returns `true` once the worker was asked to stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Completes when the worker is asked to stop.
    ///
    /// Long-running handlers should select on this so that a stop does not
    /// have to wait for the supervisor's stop timeout.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// A clone of the stop signal, for handing to spawned subtasks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Reads a value placed by the context factory.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stores a value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }
}

/// Host-supplied hook that fills in each run's context.
///
/// Invoked once per run attempt, including restarts.
pub trait ContextFactory: Send + Sync + 'static {
    /// Adds host state to `ctx`.
    fn build(&self, ctx: &mut WorkerContext);
}

impl<F> ContextFactory for F
where
    F: Fn(&mut WorkerContext) + Send + Sync + 'static,
{
    fn build(&self, ctx: &mut WorkerContext) {
        self(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_factory_closure_fills_context() {
        let factory = |ctx: &mut WorkerContext| {
            ctx.insert("region", json!("eu-west"));
        };

        let token = CancellationToken::new();
        let mut ctx = WorkerContext::new("sync", 2, token.clone());
        factory.build(&mut ctx);

        assert_eq!(ctx.worker_id(), "sync");
        assert_eq!(ctx.restart_count(), 2);
        assert_eq!(ctx.get("region"), Some(&json!("eu-west")));
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
