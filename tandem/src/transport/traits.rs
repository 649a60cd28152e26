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

use crate::transport::{Frame, TransportError, TransportMetadata};
use async_trait::async_trait;
use futures_util::future::BoxFuture;

/// The outbound half of a transport.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends one frame to the peer.
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Closes the outbound half, signalling a clean close to the peer.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// The inbound half of a transport.
#[async_trait]
pub trait FrameSource: Send {
    /// Receives the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly.
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// Core transport abstraction for a connected, message-framed duplex channel.
///
/// A transport is exclusively owned by one session. It is split into its
/// two halves once so reading and writing can proceed on separate tasks.
///
/// # Implementations
///
/// - [`MemoryTransport`](crate::transport::MemoryTransport): in-process channels
/// - [`WebSocketTransport`](crate::transport::WebSocketTransport): WebSocket
///   over TCP (requires the `websocket` feature)
pub trait Transport: Send + 'static {
    /// Returns metadata about this transport.
    fn metadata(&self) -> &TransportMetadata;

    /// Splits the transport into its outbound and inbound halves.
    fn split(self: Box<Self>) -> (Box<dyn FrameSink>, Box<dyn FrameSource>);
}

/// Establishes client-side transports.
///
/// Each call to [`connect`](Connector::connect) is one handshake attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a new transport to the server.
    async fn connect(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// A server-side handshake that has not run yet.
///
/// Resolves to the connected transport once the peer completes the
/// handshake, or to an error if it fails or times out.
pub type Handshake = BoxFuture<'static, Result<Box<dyn Transport>, TransportError>>;

/// Accepts server-side transports.
///
/// Accepting is split in two. [`incoming`](TransportListener::incoming)
/// waits for the next raw connection and hands back its [`Handshake`]
/// without driving it, so the caller can complete handshakes on their own
/// tasks while it keeps accepting.
///
/// # Examples
///
/// ```rust,no_run
/// use tandem::transport::TransportListener;
///
/// # async fn example<L>(listener: &L) -> Result<(), Box<dyn std::error::Error>>
/// # where
/// #     L: TransportListener,
/// # {
/// loop {
///     let handshake = listener.incoming().await?;
///     tokio::spawn(async move {
///         if let Ok(transport) = handshake.await {
///             println!("accepted {}", transport.metadata().id);
///         }
///     });
/// }
/// # }
/// ```
#[async_trait]
pub trait TransportListener: Send + Sync {
    /// Waits for the next incoming connection and returns its pending
    /// handshake.
    async fn incoming(&self) -> Result<Handshake, TransportError>;

    /// Waits for the next connection and completes its handshake inline.
    async fn accept(&self) -> Result<Box<dyn Transport>, TransportError> {
        self.incoming().await?.await
    }

    /// Returns a printable form of the address this listener is bound to.
    fn local_addr(&self) -> Result<String, TransportError>;
}
