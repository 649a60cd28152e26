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

//! Top-level error type.
//!
//! Each layer has its own error type, and [`TandemError`] composes them for
//! callers that want a single type:
//!
//! 1. **Transport**: connection failures ([`TransportError`]), local to one
//!    connection
//! 2. **Codec**: frames that cannot be encoded or decoded
//! 3. **Call**: client-side call failures ([`CallError`]), including
//!    failures reported by the server
//! 4. **Handler**: method and interceptor failures ([`HandlerError`]),
//!    which the dispatcher turns into failure responses
//! 5. **Worker**: worker crashes and lookups ([`WorkerError`]), absorbed by
//!    the supervisor
//!
//! # Examples
//!
//! ```rust
//! use tandem::TandemError;
//! use tandem::transport::TransportError;
//!
//! let error: TandemError = TransportError::Closed.into();
//! assert!(error.is_transport_error());
//! ```

use crate::client::CallError;
use crate::serialization::{DecodeError, DeserializationError, SerializationError};
use crate::server::HandlerError;
use crate::transport::TransportError;
use crate::worker::WorkerError;
use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum TandemError {
    /// A transport-layer error occurred.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A payload could not be decoded into the requested type.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] DeserializationError),

    /// A frame decoded under neither wire encoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A client call failed.
    #[error("call failed: {0}")]
    Call(#[from] CallError),

    /// A method handler or interceptor failed.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// A worker failed or was not found.
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),
}

impl TandemError {
    /// Returns `true` if this is a transport-layer error.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if this is a codec error.
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::Serialization(_) | Self::Deserialization(_) | Self::Decode(_)
        )
    }

    /// Returns `true` if retrying on a fresh connection may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_recoverable(),
            Self::Call(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Convenience alias for results using [`TandemError`].
pub type Result<T, E = TandemError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_convert() {
        let error: TandemError = TransportError::Closed.into();
        assert!(error.is_transport_error());
        assert!(!error.is_retryable());

        let error: TandemError = SerializationError::new("bad").into();
        assert!(error.is_codec_error());

        let error: TandemError = CallError::ConnectionClosed.into();
        assert!(error.is_retryable());
        assert_eq!(error.to_string(), "call failed: connection closed before a response arrived");
    }

    #[test]
    fn test_handler_and_worker_messages() {
        let error: TandemError = HandlerError::new("nope").into();
        assert_eq!(error.to_string(), "handler error: nope");

        let error: TandemError = WorkerError::failed("crash").into();
        assert_eq!(error.to_string(), "worker error: crash");
    }
}
