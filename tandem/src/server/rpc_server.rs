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

//! Accept loop and per-connection session tasks.

use crate::server::Dispatcher;
use crate::transport::{Frame, Transport, TransportError, TransportListener};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Serves a [`Dispatcher`] to every transport a listener accepts.
///
/// Each accepted transport becomes one [`Session`](crate::server::Session).
/// Requests on a session are dispatched concurrently, each on its own task,
/// so responses may leave in a different order than their requests arrived.
/// A single writer task per session serializes the outbound frames.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use serde_json::json;
/// use tandem::server::{Dispatcher, RpcServer, ServerConfig};
/// use tandem::transport::{WebSocketConfig, WebSocketListener};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Arc::new(Dispatcher::new(ServerConfig::default()));
/// dispatcher.register_fn("ping", |_ctx| async { Ok(json!("pong")) });
///
/// let listener = WebSocketListener::bind("127.0.0.1:8080", WebSocketConfig::default()).await?;
/// RpcServer::new(dispatcher).serve(listener).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RpcServer {
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
}

impl RpcServer {
    /// Creates a server for `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            shutdown: CancellationToken::new(),
        }
    }

    /// The dispatcher requests are handed to.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Stops accepting and ends every open session.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Accepts transports until shutdown or until the listener closes.
    ///
    /// Each handshake completes on the connection's own task, so a peer
    /// that stalls mid-handshake does not hold up later connections. A
    /// failed handshake is logged and does not stop the loop.
    pub async fn serve<L: TransportListener>(&self, listener: L) -> Result<(), TransportError> {
        info!(addr = %listener.local_addr()?, "RPC server listening");

        loop {
            let incoming = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                incoming = listener.incoming() => incoming,
            };

            match incoming {
                Ok(handshake) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let shutdown = self.shutdown.child_token();
                    tokio::spawn(async move {
                        let transport = tokio::select! {
                            _ = shutdown.cancelled() => return,
                            transport = handshake => transport,
                        };
                        match transport {
                            Ok(transport) => {
                                serve_connection(dispatcher, transport, shutdown).await
                            }
                            Err(e) => warn!(error = %e, "Handshake failed"),
                        }
                    });
                }
                Err(TransportError::Closed) => break,
                Err(e) => warn!(error = %e, "Failed to accept connection"),
            }
        }

        info!("RPC server stopped");
        Ok(())
    }

    /// Serves a single already-connected transport until it closes.
    pub async fn serve_transport(&self, transport: Box<dyn Transport>) {
        serve_connection(
            Arc::clone(&self.dispatcher),
            transport,
            self.shutdown.child_token(),
        )
        .await;
    }
}

async fn serve_connection(
    dispatcher: Arc<Dispatcher>,
    transport: Box<dyn Transport>,
    shutdown: CancellationToken,
) {
    let metadata = transport.metadata().clone();
    let transport_id = metadata.id;
    let session = Arc::new(dispatcher.new_session().with_peer(metadata.peer_addr));
    info!(
        transport_id = %transport_id,
        session = %session.id(),
        peer = ?metadata.peer_addr,
        "Session opened"
    );

    let (mut sink, mut source) = transport.split();
    let (tx, mut rx) = mpsc::channel::<Frame>(dispatcher.config().outbound_buffer.max(1));

    let writer_shutdown = shutdown.clone();
    let writer = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                _ = writer_shutdown.cancelled() => break,
                frame = rx.recv() => frame,
            };
            let Some(frame) = frame else { break };
            if let Err(e) = sink.send(frame).await {
                warn!(transport_id = %transport_id, error = %e, "Failed to send response");
                break;
            }
        }
        if let Err(e) = sink.close().await {
            debug!(transport_id = %transport_id, error = %e, "Error closing transport");
        }
    });

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = source.recv() => received,
        };

        match received {
            Ok(Some(frame)) => {
                let dispatcher = Arc::clone(&dispatcher);
                let session = Arc::clone(&session);
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(reply) = dispatcher.handle_frame_for(&session, frame).await {
                        // The writer is gone only if the connection already failed.
                        let _ = tx.send(reply).await;
                    }
                });
            }
            Ok(None) => break,
            Err(e) => {
                warn!(transport_id = %transport_id, error = %e, "Transport read failed");
                break;
            }
        }
    }

    // The writer drains replies still in flight, then closes the sink. On
    // shutdown it closes at once.
    drop(tx);
    if let Err(e) = writer.await {
        warn!(transport_id = %transport_id, error = %e, "Writer task failed");
    }
    info!(transport_id = %transport_id, session = %session.id(), "Session closed");
}
