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

//! WebSocket transport implementation.
//!
//! One persistent WebSocket carries one client session. Binary messages
//! carry MessagePack frames and text messages carry JSON frames; the
//! transport passes both through unchanged.
//!
//! The listener only upgrades requests addressed to its configured path
//! and refuses every other path with `404 Not Found` during the handshake.
//! A peer that does not finish the upgrade within
//! [`WebSocketConfig::handshake_timeout`] is dropped.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tandem::transport::{TransportListener, WebSocketConfig, WebSocketListener};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let listener = WebSocketListener::bind("127.0.0.1:8080", WebSocketConfig::default()).await?;
//! let transport = listener.accept().await?;
//! # Ok(())
//! # }
//! ```

use crate::transport::{
    Connector, Frame, FrameSink, FrameSource, Handshake, Transport, TransportError, TransportId,
    TransportListener, TransportMetadata,
};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use http::StatusCode;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig as ProtocolConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, accept_hdr_async_with_config, connect_async_with_config,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default path the RPC endpoint is mounted at.
pub const DEFAULT_RPC_PATH: &str = "/rpc";

/// Configuration for WebSocket transport.
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Path the listener upgrades (default: `/rpc`)
    pub path: String,

    /// Maximum size of a single WebSocket frame (default: 16 MB)
    pub max_frame_size: usize,

    /// Maximum size of a complete message (default: 64 MB)
    pub max_message_size: usize,

    /// Disable Nagle's algorithm on client sockets (default: true)
    pub nodelay: bool,

    /// Time a peer has to complete the upgrade after connecting (default: 10s)
    pub handshake_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_RPC_PATH.to_string(),
            max_frame_size: 16 * 1024 * 1024,   // 16 MB
            max_message_size: 64 * 1024 * 1024, // 64 MB
            nodelay: true,
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

impl WebSocketConfig {
    /// Sets the upgrade path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the maximum message size.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets the upgrade deadline for accepted connections.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    fn protocol_config(&self) -> ProtocolConfig {
        let mut config = ProtocolConfig::default();
        config.max_frame_size = Some(self.max_frame_size);
        config.max_message_size = Some(self.max_message_size);
        config
    }
}

/// WebSocket transport implementation.
pub struct WebSocketTransport {
    stream: WsStream,
    metadata: TransportMetadata,
}

impl WebSocketTransport {
    /// Connects to a WebSocket endpoint, e.g. `ws://127.0.0.1:8080/rpc`.
    pub async fn connect(url: &str, config: &WebSocketConfig) -> Result<Self, TransportError> {
        let (stream, _) =
            connect_async_with_config(url, Some(config.protocol_config()), config.nodelay)
                .await
                .map_err(|e| TransportError::connection_failed(url, e.to_string()))?;

        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: WsStream) -> Self {
        let (local_addr, peer_addr) = match stream.get_ref() {
            MaybeTlsStream::Plain(tcp) => (tcp.local_addr().ok(), tcp.peer_addr().ok()),
            _ => (None, None),
        };

        let mut metadata = TransportMetadata::new(TransportId::next(), "websocket");
        if let Some(addr) = peer_addr {
            metadata = metadata.with_peer_addr(addr);
        }
        if let Some(addr) = local_addr {
            metadata = metadata.with_local_addr(addr);
        }

        Self { stream, metadata }
    }
}

impl Transport for WebSocketTransport {
    fn metadata(&self) -> &TransportMetadata {
        &self.metadata
    }

    fn split(self: Box<Self>) -> (Box<dyn FrameSink>, Box<dyn FrameSource>) {
        let (sink, stream) = self.stream.split();
        (
            Box::new(WebSocketSink { sink }),
            Box::new(WebSocketSource { stream }),
        )
    }
}

struct WebSocketSink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let message = match frame {
            Frame::Binary(bytes) => Message::Binary(bytes),
            Frame::Text(text) => Message::Text(text),
        };
        self.sink.send(message).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

struct WebSocketSource {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WebSocketSource {
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Binary(bytes)) => return Ok(Some(Frame::Binary(bytes))),
                Ok(Message::Text(text)) => return Ok(Some(Frame::Text(text))),
                Ok(Message::Close(_)) => return Ok(None),
                // Control frames are answered by tungstenite itself.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

/// Client-side [`Connector`] that dials a WebSocket URL.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
    config: WebSocketConfig,
}

impl WebSocketConnector {
    /// Creates a connector for the given URL.
    pub fn new(url: impl Into<String>, config: WebSocketConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }

    /// The URL this connector dials.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, TransportError> {
        let transport = WebSocketTransport::connect(&self.url, &self.config).await?;
        Ok(Box::new(transport))
    }
}

/// WebSocket listener for accepting incoming connections.
///
/// This listener binds to a TCP address and performs the WebSocket
/// handshake for requests addressed to [`WebSocketConfig::path`].
pub struct WebSocketListener {
    listener: TcpListener,
    config: WebSocketConfig,
}

impl WebSocketListener {
    /// Binds to a local address, e.g. `127.0.0.1:8080`.
    pub async fn bind(
        addr: impl Into<String>,
        config: WebSocketConfig,
    ) -> Result<Self, TransportError> {
        let addr_str = addr.into();
        let listener =
            TcpListener::bind(&addr_str)
                .await
                .map_err(|e| TransportError::BindFailed {
                    address: addr_str,
                    source: e,
                })?;

        Ok(Self { listener, config })
    }

    /// Returns the bound socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(|e| TransportError::Io { source: e })
    }

    /// Returns the `ws://` URL clients should dial.
    pub fn url(&self) -> Result<String, TransportError> {
        Ok(format!("ws://{}{}", self.socket_addr()?, self.config.path))
    }
}

#[async_trait]
impl TransportListener for WebSocketListener {
    async fn incoming(&self) -> Result<Handshake, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| TransportError::Io { source: e })?;

        let config = self.config.clone();
        Ok(Box::pin(async move {
            let timeout = config.handshake_timeout;
            let expected = config.path.clone();
            let check_path = move |request: &Request, response: Response| {
                if request.uri().path() == expected {
                    Ok(response)
                } else {
                    let path = request.uri().path();
                    tracing::debug!(path = %path, "refusing upgrade on unknown path");
                    let mut rejection = ErrorResponse::new(Some("Not Found".to_string()));
                    *rejection.status_mut() = StatusCode::NOT_FOUND;
                    Err(rejection)
                }
            };

            let upgrade = accept_hdr_async_with_config(
                MaybeTlsStream::Plain(stream),
                check_path,
                Some(config.protocol_config()),
            );
            let stream = tokio::time::timeout(timeout, upgrade)
                .await
                .map_err(|_| {
                    TransportError::connection_failed(addr.to_string(), "handshake timed out")
                })?
                .map_err(|e| TransportError::connection_failed(addr.to_string(), e.to_string()))?;

            Ok(Box::new(WebSocketTransport::from_stream(stream)) as Box<dyn Transport>)
        }))
    }

    fn local_addr(&self) -> Result<String, TransportError> {
        Ok(self.socket_addr()?.to_string())
    }
}
