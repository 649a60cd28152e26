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

//! The host object that installs definitions of every kind.
//!
//! Application code declares methods, middleware, workers, and HTTP
//! fallbacks as [`Definition`]s. [`Runtime::install`] routes each one to the
//! component that owns its kind.

use crate::server::{Dispatcher, Interceptor, MethodDefinition, RpcServer, ServerConfig};
use crate::transport::HttpFallback;
use crate::transport::fallback::not_found;
use crate::worker::{Supervisor, SupervisorConfig, WorkerDefinition, WorkerInstance};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One application definition.
#[derive(Clone)]
pub enum Definition {
    /// A named RPC method.
    Method(MethodDefinition),
    /// An interceptor appended to the dispatcher's chain.
    Middleware(Arc<dyn Interceptor>),
    /// A supervised background worker.
    Worker(WorkerDefinition),
    /// A sub-router for plain HTTP requests.
    Http(Arc<dyn HttpFallback>),
}

impl Definition {
    /// Wraps an interceptor.
    pub fn middleware(interceptor: impl Interceptor) -> Self {
        Self::Middleware(Arc::new(interceptor))
    }

    /// Wraps an HTTP fallback.
    pub fn http(fallback: impl HttpFallback) -> Self {
        Self::Http(Arc::new(fallback))
    }

    /// The kind name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Method(_) => "method",
            Self::Middleware(_) => "middleware",
            Self::Worker(_) => "worker",
            Self::Http(_) => "http",
        }
    }
}

impl From<MethodDefinition> for Definition {
    fn from(definition: MethodDefinition) -> Self {
        Self::Method(definition)
    }
}

impl From<WorkerDefinition> for Definition {
    fn from(definition: WorkerDefinition) -> Self {
        Self::Worker(definition)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(definition) => f.debug_tuple("Method").field(definition).finish(),
            Self::Worker(definition) => f.debug_tuple("Worker").field(definition).finish(),
            Self::Middleware(_) | Self::Http(_) => f.write_str(self.kind()),
        }
    }
}

/// Owns the dispatcher, the supervisor, and the HTTP fallbacks of one
/// application.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tandem::runtime::{Definition, Runtime};
/// use tandem::server::{MethodDefinition, ServerConfig};
/// use tandem::worker::SupervisorConfig;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let runtime = Runtime::new(ServerConfig::default(), SupervisorConfig::default());
/// runtime.install(MethodDefinition::from_fn("ping", |_ctx| async { Ok(json!("pong")) }).into());
/// assert!(runtime.dispatcher().has_method("ping"));
/// # }
/// ```
pub struct Runtime {
    dispatcher: Arc<Dispatcher>,
    supervisor: Supervisor,
    http: RwLock<Vec<Arc<dyn HttpFallback>>>,
}

impl Runtime {
    /// Creates an empty runtime.
    pub fn new(server: ServerConfig, supervisor: SupervisorConfig) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(server)),
            supervisor: Supervisor::new(supervisor),
            http: RwLock::new(Vec::new()),
        }
    }

    /// Replaces the supervisor, e.g. with one carrying a context factory.
    pub fn with_supervisor(mut self, supervisor: Supervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Installs one definition.
    ///
    /// Returns the worker instance when a worker definition started.
    pub fn install(&self, definition: Definition) -> Option<WorkerInstance> {
        debug!(kind = definition.kind(), "Installing definition");
        match definition {
            Definition::Method(method) => {
                self.dispatcher.register(method);
                None
            }
            Definition::Middleware(interceptor) => {
                self.dispatcher.interceptors().push(interceptor);
                None
            }
            Definition::Worker(worker) => self.supervisor.register(worker),
            Definition::Http(fallback) => {
                self.http.write().push(fallback);
                None
            }
        }
    }

    /// Installs every definition in order.
    pub fn install_all(&self, definitions: impl IntoIterator<Item = Definition>) {
        for definition in definitions {
            self.install(definition);
        }
    }

    /// The RPC dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The worker supervisor.
    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Creates an RPC server over this runtime's dispatcher.
    pub fn server(&self) -> RpcServer {
        RpcServer::new(Arc::clone(&self.dispatcher))
    }

    /// Offers a plain HTTP request to each fallback in installation order.
    ///
    /// Answers `404 Not Found` when every fallback declines.
    pub async fn handle_http(&self, request: &http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
        let fallbacks = self.http.read().clone();
        for fallback in fallbacks {
            if let Some(response) = fallback.try_handle(request).await {
                return response;
            }
        }
        debug!(path = %request.uri().path(), "No HTTP fallback claimed request");
        not_found()
    }

    /// Stops every worker and waits for them to end.
    pub async fn shutdown(&self) {
        info!("Runtime shutting down");
        self.supervisor.shutdown().await;
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dispatcher", &self.dispatcher)
            .field("supervisor", &self.supervisor)
            .field("http_fallbacks", &self.http.read().len())
            .finish()
    }
}
