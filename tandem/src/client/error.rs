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

//! Error types for client calls.

use crate::protocol::Stats;
use crate::serialization::{DeserializationError, SerializationError};
use crate::transport::TransportError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors a call can complete with.
#[derive(Debug, Error)]
pub enum CallError {
    /// The connection could not be established.
    ///
    /// Every caller that joined the same attempt sees the same error.
    #[error("connection failed: {0}")]
    Connection(#[source] Arc<TransportError>),

    /// The connection closed before the response arrived.
    #[error("connection closed before a response arrived")]
    ConnectionClosed,

    /// No response arrived within the configured timeout.
    #[error("call to {method} timed out after {timeout:?}")]
    Timeout {
        /// The method that was called
        method: String,
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// The server answered with a failure.
    #[error("{message}")]
    Remote {
        /// The server's error message
        message: String,
        /// Rate-limit bookkeeping sent with the failure
        stats: Stats,
    },

    /// The request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] SerializationError),

    /// The result could not be converted to the requested type.
    #[error("failed to decode result: {0}")]
    Decode(#[from] DeserializationError),

    /// The request frame could not be written to the connection.
    #[error("failed to send request: {0}")]
    Send(#[source] TransportError),
}

impl CallError {
    /// Returns the server's message for [`CallError::Remote`].
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` if the call may succeed when retried on a new connection.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_recoverable(),
            Self::ConnectionClosed | Self::Timeout { .. } | Self::Send(_) => true,
            Self::Remote { .. } | Self::Encode(_) | Self::Decode(_) => false,
        }
    }
}
