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

//! Supervised background workers.
//!
//! A [`WorkerDefinition`] names a long-running handler and its restart
//! policy. The [`Supervisor`] runs each definition on its own task,
//! restarts it after crashes within its budget, and stops it on request.

mod context;
mod definition;
mod error;
mod instance;
mod supervisor;

pub use context::{ContextFactory, WorkerContext};
pub use definition::{FnWorker, WorkerDefinition, WorkerHandler, WorkerOptions};
pub use error::WorkerError;
pub use instance::{WorkerEvent, WorkerInstance, WorkerStatus};
pub use supervisor::{StopOutcome, Supervisor, SupervisorConfig};
