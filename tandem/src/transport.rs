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

//! Transport layer abstractions.
//!
//! A transport is a connected, message-framed duplex channel. Each frame is
//! one request or one response: binary frames carry MessagePack and text
//! frames carry JSON. Implementations included here:
//!
//! - [`MemoryTransport`]: in-memory channels for testing and in-process use
//! - [`WebSocketTransport`]: WebSocket over TCP (requires `websocket` feature)
//!
//! Client code opens transports through a [`Connector`]; servers accept
//! them from a [`TransportListener`]. Either side splits a transport into a
//! [`FrameSink`] and a [`FrameSource`] so reads and writes run on separate
//! tasks.
//!
//! # Examples
//!
//! ```rust
//! use tandem::transport::{Connector, TransportListener, memory};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (connector, listener) = memory::channel(8);
//! let client = connector.connect().await?;
//! let server = listener.accept().await?;
//! println!("{} <-> {}", client.metadata().id, server.metadata().id);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod fallback;
pub mod memory;
mod traits;
mod types;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use error::TransportError;
pub use fallback::{FnHttpFallback, HttpFallback};
pub use memory::{MemoryConnector, MemoryListener, MemoryTransport};
pub use traits::{Connector, FrameSink, FrameSource, Handshake, Transport, TransportListener};
pub use types::{Frame, TransportId, TransportMetadata};

#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConfig, WebSocketConnector, WebSocketListener, WebSocketTransport};
