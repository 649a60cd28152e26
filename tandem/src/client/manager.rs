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

//! The client-side connection manager.

use crate::client::{CallError, ClientConfig, PendingCalls, RequestIdGenerator};
use crate::protocol::{Request, Response, Stats};
use crate::serialization::{DeserializationError, FrameCodec, SerializationError};
use crate::transport::{Connector, Frame, FrameSink, FrameSource, TransportError, TransportId};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type CallOutcome = Result<Response, CallError>;
type ConnectResult = Result<Arc<Connection>, Arc<TransportError>>;
type ConnectAttempt = Shared<BoxFuture<'static, ConnectResult>>;

/// A successful call's result together with the server's rate-limit stats.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// The handler's result.
    pub result: Value,
    /// Rate-limit bookkeeping sent with the result.
    pub stats: Stats,
}

/// Issues calls to a server over one lazily established connection.
///
/// The manager holds at most one live connection. The first call opens it;
/// callers that arrive while the handshake is in progress join the same
/// attempt instead of starting their own. When the connection closes, every
/// call still waiting on it fails with [`CallError::ConnectionClosed`] and
/// the next call reconnects. Failed handshakes are not retried
/// automatically.
///
/// Cloning is cheap; clones share the connection.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use tandem::client::{ClientConfig, ConnectionManager};
/// use tandem::transport::{WebSocketConfig, WebSocketConnector};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connector = WebSocketConnector::new("ws://127.0.0.1:8080/rpc", WebSocketConfig::default());
/// let client = ConnectionManager::new(connector, ClientConfig::default());
///
/// let tasks = client.call("getTasks", json!({ "status": "open" })).await?;
/// println!("{tasks}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn Connector>,
    config: ClientConfig,
    codec: FrameCodec,
    ids: RequestIdGenerator,
    state: parking_lot::Mutex<ConnectionState>,
    generations: AtomicU64,
}

enum ConnectionState {
    Idle,
    Connecting {
        generation: u64,
        attempt: ConnectAttempt,
    },
    Connected(Arc<Connection>),
}

struct Connection {
    generation: u64,
    transport_id: TransportId,
    sink: Mutex<Box<dyn FrameSink>>,
    pending: PendingCalls<CallOutcome>,
    shutdown: CancellationToken,
}

impl ConnectionManager {
    /// Creates a manager. No connection is opened until the first call.
    pub fn new(connector: impl Connector, config: ClientConfig) -> Self {
        let codec = match config.max_frame_size {
            Some(size) => FrameCodec::with_max_frame_size(size),
            None => FrameCodec::new(),
        };

        Self {
            inner: Arc::new(Inner {
                connector: Arc::new(connector),
                config,
                codec,
                ids: RequestIdGenerator::new(),
                state: parking_lot::Mutex::new(ConnectionState::Idle),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Calls `method` with `args` and returns its result.
    ///
    /// # Errors
    ///
    /// Fails with [`CallError::Remote`] when the server reports a failure,
    /// and with a connection, timeout, or codec error otherwise.
    pub async fn call(&self, method: &str, args: Value) -> Result<Value, CallError> {
        self.call_with_stats(method, args)
            .await
            .map(|reply| reply.result)
    }

    /// Calls `method` with serializable arguments and deserializes the result.
    pub async fn call_typed<A, R>(&self, method: &str, args: &A) -> Result<R, CallError>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let args = serde_json::to_value(args).map_err(SerializationError::from)?;
        let result = self.call(method, args).await?;
        Ok(serde_json::from_value(result).map_err(DeserializationError::from)?)
    }

    /// Calls `method` and returns the result along with the server's stats.
    pub async fn call_with_stats(&self, method: &str, args: Value) -> Result<Reply, CallError> {
        let id = self.inner.ids.next();
        let request = Request::new(id.clone(), method, args);
        let frame = self.inner.codec.encode(&request, self.inner.config.encoding)?;

        let connection = self.connection().await?;

        // Registered before sending so a fast response cannot miss its caller.
        // On a connection already torn down the receiver comes back closed.
        let rx = connection.pending.register(id.clone()).await;
        debug!(transport_id = %connection.transport_id, id = %id, method, "Sending request");
        if let Err(e) = connection.send(frame).await {
            connection.pending.cancel(&id).await;
            return Err(CallError::Send(e));
        }

        let outcome = match self.inner.config.request_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, rx).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    connection.pending.cancel(&id).await;
                    debug!(id = %id, method, "Request timed out");
                    return Err(CallError::Timeout {
                        method: method.to_string(),
                        timeout,
                    });
                }
            },
            None => rx.await,
        };

        match outcome.map_err(|_| CallError::ConnectionClosed)?? {
            Response::Success { result, stats, .. } => Ok(Reply { result, stats }),
            Response::Failure { error, stats, .. } => Err(CallError::Remote {
                message: error,
                stats,
            }),
        }
    }

    /// Opens the connection, or joins the attempt already in progress.
    pub async fn connect(&self) -> Result<(), CallError> {
        self.connection().await.map(|_| ())
    }

    /// Returns `true` while a connection is open.
    pub fn is_connected(&self) -> bool {
        matches!(&*self.inner.state.lock(), ConnectionState::Connected(_))
    }

    /// Returns the number of calls waiting on the current connection.
    pub async fn pending_count(&self) -> usize {
        match self.inner.current() {
            Some(connection) => connection.pending.len().await,
            None => 0,
        }
    }

    /// Closes the connection and fails every call still waiting on it.
    ///
    /// An attempt in progress is abandoned; its waiters fail. The next call
    /// opens a fresh connection.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.inner.state.lock(), ConnectionState::Idle);
        let ConnectionState::Connected(connection) = previous else {
            return;
        };

        connection.shutdown.cancel();
        if let Err(e) = connection.sink.lock().await.close().await {
            debug!(transport_id = %connection.transport_id, error = %e, "Error closing transport");
        }
        let failed = connection
            .pending
            .fail_all(|| Err(CallError::ConnectionClosed))
            .await;
        info!(transport_id = %connection.transport_id, failed, "Connection closed");
    }

    async fn connection(&self) -> Result<Arc<Connection>, CallError> {
        let attempt = {
            let mut state = self.inner.state.lock();
            match &*state {
                ConnectionState::Connected(connection) => return Ok(Arc::clone(connection)),
                ConnectionState::Connecting { attempt, .. } => attempt.clone(),
                ConnectionState::Idle => {
                    let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
                    let attempt = establish(
                        Arc::downgrade(&self.inner),
                        Arc::clone(&self.inner.connector),
                        self.inner.codec.clone(),
                        generation,
                    )
                    .boxed()
                    .shared();
                    *state = ConnectionState::Connecting {
                        generation,
                        attempt: attempt.clone(),
                    };
                    attempt
                }
            }
        };

        attempt.await.map_err(CallError::Connection)
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.inner.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Inner {
    fn current(&self) -> Option<Arc<Connection>> {
        match &*self.state.lock() {
            ConnectionState::Connected(connection) => Some(Arc::clone(connection)),
            _ => None,
        }
    }

    /// Returns to idle if the state still belongs to `generation`.
    fn reset_if(&self, generation: u64) {
        let mut state = self.state.lock();
        let current = match &*state {
            ConnectionState::Connecting { generation, .. } => Some(*generation),
            ConnectionState::Connected(connection) => Some(connection.generation),
            ConnectionState::Idle => None,
        };
        if current == Some(generation) {
            *state = ConnectionState::Idle;
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let ConnectionState::Connected(connection) = self.state.get_mut() {
            connection.shutdown.cancel();
        }
    }
}

impl Connection {
    async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.sink.lock().await.send(frame).await
    }

    async fn deliver(&self, codec: &FrameCodec, frame: Frame) {
        let response: Response = match codec.decode(&frame) {
            Ok((response, _)) => response,
            Err(e) => {
                warn!(transport_id = %self.transport_id, error = %e, "Dropping undecodable frame");
                return;
            }
        };

        let id = response.id().clone();
        if !self.pending.complete(&id, Ok(response)).await {
            debug!(
                transport_id = %self.transport_id,
                id = %id,
                "Discarding response with unknown id"
            );
        }
    }
}

async fn establish(
    inner: Weak<Inner>,
    connector: Arc<dyn Connector>,
    codec: FrameCodec,
    generation: u64,
) -> ConnectResult {
    let transport = match connector.connect().await {
        Ok(transport) => transport,
        Err(e) => {
            warn!(generation, error = %e, "Connection attempt failed");
            if let Some(inner) = inner.upgrade() {
                inner.reset_if(generation);
            }
            return Err(Arc::new(e));
        }
    };

    let transport_id = transport.metadata().id;
    let (sink, source) = transport.split();
    let connection = Arc::new(Connection {
        generation,
        transport_id,
        sink: Mutex::new(sink),
        pending: PendingCalls::new(),
        shutdown: CancellationToken::new(),
    });

    let installed = match inner.upgrade() {
        Some(inner) => {
            let mut state = inner.state.lock();
            match &*state {
                ConnectionState::Connecting { generation: g, .. } if *g == generation => {
                    *state = ConnectionState::Connected(Arc::clone(&connection));
                    true
                }
                _ => false,
            }
        }
        None => false,
    };

    if !installed {
        debug!(transport_id = %transport_id, "Connection abandoned before it was ready");
        let _ = connection.sink.lock().await.close().await;
        return Err(Arc::new(TransportError::Closed));
    }

    tokio::spawn(receive_task(inner, codec, Arc::clone(&connection), source));
    info!(transport_id = %transport_id, generation, "Connected");
    Ok(connection)
}

async fn receive_task(
    inner: Weak<Inner>,
    codec: FrameCodec,
    connection: Arc<Connection>,
    mut source: Box<dyn FrameSource>,
) {
    let transport_id = connection.transport_id;
    debug!(transport_id = %transport_id, "Receive task started");

    loop {
        let received = tokio::select! {
            _ = connection.shutdown.cancelled() => break,
            received = source.recv() => received,
        };

        match received {
            Ok(Some(frame)) => connection.deliver(&codec, frame).await,
            Ok(None) => {
                info!(transport_id = %transport_id, "Connection closed by server");
                break;
            }
            Err(e) => {
                warn!(transport_id = %transport_id, error = %e, "Transport read failed");
                break;
            }
        }
    }

    if let Some(inner) = inner.upgrade() {
        inner.reset_if(connection.generation);
    }
    let failed = connection
        .pending
        .fail_all(|| Err(CallError::ConnectionClosed))
        .await;
    debug!(transport_id = %transport_id, failed, "Receive task stopped");
}
