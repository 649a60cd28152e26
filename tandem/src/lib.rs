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

#![allow(clippy::module_inception)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Tandem
//!
//! Request correlation, method dispatch, and worker supervision over a
//! persistent duplex transport.
//!
//! - **Correlated calls**: a client issues many concurrent calls over one
//!   connection; each response finds its caller by id, in any order
//! - **Two encodings**: MessagePack in binary frames, JSON in text frames,
//!   decoded defensively in either direction
//! - **Method dispatch**: named handlers behind an ordered interceptor
//!   chain, with exactly one response per request
//! - **Supervised workers**: long-running tasks restarted after crashes
//!   within a restart budget, and stopped cooperatively
//!
//! ## Architecture
//!
//! - **[`transport`]**: frame transports (WebSocket, in-memory) and the
//!   plain HTTP fallback hook
//! - **[`serialization`]**: MessagePack and JSON codecs
//! - **[`protocol`]**: request and response wire types
//! - **[`client`]**: the connection manager
//! - **[`server`]**: dispatcher, interceptors, sessions, and the accept loop
//! - **[`worker`]**: the worker supervisor
//! - **[`runtime`]**: installs definitions of every kind into one host
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use std::sync::Arc;
//! use tandem::client::{ClientConfig, ConnectionManager};
//! use tandem::server::{Dispatcher, RpcServer, ServerConfig};
//! use tandem::transport::memory;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Arc::new(Dispatcher::new(ServerConfig::default()));
//! dispatcher.register_fn("greet", |ctx| async move {
//!     let name: String = ctx.parse_args()?;
//!     Ok(json!(format!("hello, {name}")))
//! });
//!
//! let (connector, listener) = memory::channel(8);
//! let server = RpcServer::new(dispatcher);
//! tokio::spawn({
//!     let server = server.clone();
//!     async move { server.serve(listener).await }
//! });
//!
//! let client = ConnectionManager::new(connector, ClientConfig::default());
//! let greeting = client.call("greet", json!("tandem")).await?;
//! assert_eq!(greeting, json!("hello, tandem"));
//!
//! server.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod runtime;
pub mod serialization;
pub mod server;
pub mod transport;
pub mod worker;

pub use client::{CallError, ClientConfig, ConnectionManager};
pub use error::{Result, TandemError};
pub use protocol::{Request, RequestId, Response, Stats};
pub use runtime::{Definition, Runtime};
pub use serialization::Encoding;
pub use server::{Dispatcher, HandlerError, RequestContext, RpcServer, ServerConfig};
pub use transport::{Transport, TransportError};
pub use worker::{Supervisor, WorkerDefinition, WorkerError, WorkerOptions};
