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

//! Transport layer error types.
//!
//! Transport errors are the lowest layer of the error hierarchy. They are
//! local to one connection: the client manager turns them into
//! [`CallError`](crate::client::CallError)s for every caller tied to the
//! broken connection, and the server ends the affected session.

use std::io;
use thiserror::Error;

/// Errors that can occur in the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish a connection to the remote endpoint.
    #[error("failed to connect to {address}: {reason}")]
    ConnectionFailed {
        /// The address that failed to connect
        address: String,
        /// Why the attempt failed
        reason: String,
    },

    /// Connection was lost during operation.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Description of why the connection was lost
        reason: String,
    },

    /// Failed to hand a frame to the peer.
    #[error("send failed: {reason}")]
    SendFailed {
        /// Description of the failure
        reason: String,
    },

    /// Transport is already closed.
    #[error("transport is closed")]
    Closed,

    /// Failed to bind to the specified address.
    #[error("failed to bind to {address}: {source}")]
    BindFailed {
        /// The address that failed to bind
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An unexpected I/O error occurred.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// WebSocket-specific error occurred.
    #[cfg(feature = "websocket")]
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl TransportError {
    /// Returns `true` if a fresh connection attempt may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. }
            | Self::ConnectionLost { .. }
            | Self::SendFailed { .. } => true,

            Self::Io { source } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),

            #[cfg(feature = "websocket")]
            Self::WebSocket(e) => {
                use tokio_tungstenite::tungstenite::Error as WsError;
                matches!(
                    e,
                    WsError::Io(_) | WsError::ConnectionClosed | WsError::AlreadyClosed
                )
            }

            Self::Closed | Self::BindFailed { .. } => false,
        }
    }

    /// Creates a connection-failed error.
    pub fn connection_failed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Creates a connection-lost error.
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        Self::ConnectionLost {
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_is_recoverable() {
        let error = TransportError::connection_failed("ws://127.0.0.1:1/rpc", "refused");
        assert!(error.is_recoverable());
        assert!(error.to_string().contains("ws://127.0.0.1:1/rpc"));
    }

    #[test]
    fn test_closed_not_recoverable() {
        assert!(!TransportError::Closed.is_recoverable());
    }

    #[test]
    fn test_transient_io_error_is_recoverable() {
        let error = TransportError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(error.is_recoverable());

        let error = TransportError::from(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(!error.is_recoverable());
    }
}
