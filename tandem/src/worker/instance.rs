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

//! Run-state snapshots and lifecycle events.

use serde::Serialize;
use std::fmt;
use std::time::{Duration, SystemTime};

/// Where a worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    /// The handler is executing.
    Running,
    /// Terminal: ended cleanly, gave up, or was stopped.
    Stopped,
    /// The handler failed; the restart decision is pending.
    Crashed,
    /// Waiting out the restart delay.
    Restarting,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Crashed => "crashed",
            Self::Restarting => "restarting",
        };
        f.write_str(name)
    }
}

/// A copy of a worker's run-state.
///
/// Snapshots are detached from the supervisor; changing one has no effect
/// on the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerInstance {
    /// The worker id.
    pub id: String,
    /// Current status.
    pub status: WorkerStatus,
    /// When the current run began.
    pub started_at: SystemTime,
    /// Restarts performed so far.
    pub restart_count: u32,
    /// Message of the most recent crash.
    pub last_error: Option<String>,
}

impl WorkerInstance {
    pub(crate) fn running(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: WorkerStatus::Running,
            started_at: SystemTime::now(),
            restart_count: 0,
            last_error: None,
        }
    }
}

/// Lifecycle notifications broadcast by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// A worker was started.
    Started {
        /// Worker id
        id: String,
    },
    /// The handler returned normally; the worker is gone.
    Completed {
        /// Worker id
        id: String,
    },
    /// The handler failed or panicked.
    Crashed {
        /// Worker id
        id: String,
        /// Failure message
        error: String,
        /// Restarts performed before this crash
        restart_count: u32,
    },
    /// A restart is scheduled.
    Restarting {
        /// Worker id
        id: String,
        /// Which restart this is, starting at 1
        attempt: u32,
        /// Delay before the restart
        delay: Duration,
    },
    /// The restart budget is spent or restarts are disabled; the worker is gone.
    GaveUp {
        /// Worker id
        id: String,
        /// Restarts performed
        restart_count: u32,
    },
    /// The worker was stopped explicitly.
    Stopped {
        /// Worker id
        id: String,
    },
}

impl WorkerEvent {
    /// The id of the worker the event is about.
    pub fn worker_id(&self) -> &str {
        match self {
            Self::Started { id }
            | Self::Completed { id }
            | Self::Crashed { id, .. }
            | Self::Restarting { id, .. }
            | Self::GaveUp { id, .. }
            | Self::Stopped { id } => id,
        }
    }

    /// Returns `true` for events after which the worker no longer exists.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::GaveUp { .. } | Self::Stopped { .. }
        )
    }
}
