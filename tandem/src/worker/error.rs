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

//! Worker error types.

use thiserror::Error;

/// Errors raised by worker handlers and by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// A handler run failed. Drives the restart policy.
    #[error("{0}")]
    Failed(String),

    /// No definition is registered under this id.
    #[error("worker {id} is not registered")]
    NotRegistered {
        /// The requested worker id
        id: String,
    },
}

impl WorkerError {
    /// Creates a handler failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<String> for WorkerError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<&str> for WorkerError {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_string())
    }
}
