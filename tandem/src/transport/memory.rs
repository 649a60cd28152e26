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

//! In-memory transport implementation.
//!
//! This module provides a transport built on Tokio `mpsc` channels. It is
//! useful for testing and for in-process clients that want the full RPC
//! path without network I/O.

use crate::transport::{
    Connector, Frame, FrameSink, FrameSource, Handshake, Transport, TransportError, TransportId,
    TransportListener, TransportMetadata,
};
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future;
use tokio::sync::{Mutex, mpsc};

/// Default buffer size for memory transport channels.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// In-memory transport implementation.
///
/// # Examples
///
/// ```rust
/// use tandem::transport::{Frame, MemoryTransport, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (client, server) = MemoryTransport::pair(16);
/// let (mut client_tx, _client_rx) = Box::new(client).split();
/// let (_server_tx, mut server_rx) = Box::new(server).split();
///
/// client_tx.send(Frame::Text("hello".to_string())).await?;
/// assert_eq!(server_rx.recv().await?, Some(Frame::Text("hello".to_string())));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    metadata: TransportMetadata,
    tx: mpsc::Sender<Frame>,
    rx: mpsc::Receiver<Frame>,
}

impl MemoryTransport {
    /// Creates a pair of connected transports.
    ///
    /// Frames sent on one are received on the other. A sender waits once
    /// `buffer` frames are queued.
    pub fn pair(buffer: usize) -> (Self, Self) {
        let buffer = buffer.max(1);
        let (tx_a, rx_b) = mpsc::channel(buffer);
        let (tx_b, rx_a) = mpsc::channel(buffer);

        let a = Self {
            metadata: TransportMetadata::new(TransportId::next(), "memory"),
            tx: tx_a,
            rx: rx_a,
        };
        let b = Self {
            metadata: TransportMetadata::new(TransportId::next(), "memory"),
            tx: tx_b,
            rx: rx_b,
        };

        (a, b)
    }

    /// Creates a pair with the default buffer size.
    pub fn default_pair() -> (Self, Self) {
        Self::pair(DEFAULT_BUFFER_SIZE)
    }
}

impl Transport for MemoryTransport {
    fn metadata(&self) -> &TransportMetadata {
        &self.metadata
    }

    fn split(self: Box<Self>) -> (Box<dyn FrameSink>, Box<dyn FrameSource>) {
        let this = *self;
        (
            Box::new(MemorySink { tx: Some(this.tx) }),
            Box::new(MemorySource { rx: this.rx }),
        )
    }
}

struct MemorySink {
    tx: Option<mpsc::Sender<Frame>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame)
            .await
            .map_err(|_| TransportError::connection_lost("peer dropped"))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // Dropping the sender is the close signal for the peer's receiver.
        self.tx = None;
        Ok(())
    }
}

struct MemorySource {
    rx: mpsc::Receiver<Frame>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

/// Creates a connected connector/listener pair.
///
/// Every [`Connector::connect`] call on the returned connector produces a
/// fresh [`MemoryTransport`] pair and hands the server half to the listener.
pub fn channel(backlog: usize) -> (MemoryConnector, MemoryListener) {
    let (tx, rx) = mpsc::channel(backlog.max(1));
    (
        MemoryConnector {
            tx,
            buffer: DEFAULT_BUFFER_SIZE,
        },
        MemoryListener { rx: Mutex::new(rx) },
    )
}

/// Client half of an in-memory [`channel`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    tx: mpsc::Sender<MemoryTransport>,
    buffer: usize,
}

impl MemoryConnector {
    /// Sets the per-connection frame buffer size.
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, TransportError> {
        let (client, server) = MemoryTransport::pair(self.buffer);
        self.tx
            .send(server)
            .await
            .map_err(|_| TransportError::connection_failed("memory", "listener dropped"))?;
        Ok(Box::new(client))
    }
}

/// Server half of an in-memory [`channel`].
#[derive(Debug)]
pub struct MemoryListener {
    rx: Mutex<mpsc::Receiver<MemoryTransport>>,
}

#[async_trait]
impl TransportListener for MemoryListener {
    async fn incoming(&self) -> Result<Handshake, TransportError> {
        let transport = self.rx.lock().await.recv().await.ok_or(TransportError::Closed)?;
        // In-memory transports are connected as soon as they arrive.
        Ok(future::ready(Ok(Box::new(transport) as Box<dyn Transport>)).boxed())
    }

    fn local_addr(&self) -> Result<String, TransportError> {
        Ok("memory".to_string())
    }
}
