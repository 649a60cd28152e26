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

//! Turns request frames into response frames.

use crate::protocol::{Request, Response};
use crate::serialization::{Encoding, FrameCodec};
use crate::server::{
    HandlerError, Interceptor, InterceptorChain, MethodDefinition, MethodRegistry, Next,
    RequestContext, ServerConfig, Session,
};
use crate::transport::Frame;
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, warn};

/// Error sent when every interceptor returned without continuing.
pub const BLOCKED_BY_MIDDLEWARE: &str = "Request blocked by middleware";

/// Error sent when the session's request budget is spent.
pub const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded";

/// Resolves requests to handlers, through the interceptor chain.
///
/// For every request that decodes, the dispatcher produces exactly one
/// response, written in the encoding the request arrived in:
///
/// 1. spent budget: `Rate limit exceeded`
/// 2. unregistered name: `Unknown method <name>`
/// 3. no interceptor continued: `Request blocked by middleware`
/// 4. handler or interceptor error or panic: its message
/// 5. otherwise the handler's result
///
/// Frames that decode in neither encoding are dropped without a reply, as
/// there is no id to answer to.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use tandem::protocol::{Request, Response};
/// use tandem::serialization::{Encoding, FrameCodec};
/// use tandem::server::{Dispatcher, ServerConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dispatcher = Dispatcher::new(ServerConfig::default());
/// dispatcher.register_fn("add", |ctx| async move {
///     let (a, b): (i64, i64) = ctx.parse_args()?;
///     Ok(json!(a + b))
/// });
///
/// let codec = FrameCodec::new();
/// let frame = codec.encode(&Request::new(1, "add", json!([2, 3])), Encoding::Json).unwrap();
/// let reply = dispatcher.handle_frame(frame).await.unwrap();
/// let (response, _): (Response, _) = codec.decode(&reply).unwrap();
/// assert!(response.is_ok());
/// # }
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    registry: MethodRegistry,
    interceptors: InterceptorChain,
    codec: FrameCodec,
    config: ServerConfig,
    local: Session,
}

impl Dispatcher {
    /// Creates a dispatcher with no methods and no interceptors.
    pub fn new(config: ServerConfig) -> Self {
        let codec = match config.max_frame_size {
            Some(size) => FrameCodec::with_max_frame_size(size),
            None => FrameCodec::new(),
        };

        Self {
            registry: MethodRegistry::new(),
            interceptors: InterceptorChain::new(),
            codec,
            local: Session::new(config.rate_limit),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The method registry.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Registers a method. A later registration under the same name wins.
    pub fn register(&self, definition: MethodDefinition) -> Option<MethodDefinition> {
        self.registry.register(definition)
    }

    /// Registers an async closure as a method.
    pub fn register_fn<F, Fut>(&self, id: impl Into<String>, f: F) -> Option<MethodDefinition>
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.registry.register(MethodDefinition::from_fn(id, f))
    }

    /// Returns `true` if `id` is registered.
    pub fn has_method(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Registered method names, sorted.
    pub fn method_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// The interceptor chain.
    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Installs `interceptor` as the only link of the chain.
    pub fn set_interceptor(&self, interceptor: impl Interceptor) {
        self.interceptors.set(Arc::new(interceptor));
    }

    /// Appends `interceptor` to the chain.
    pub fn add_interceptor(&self, interceptor: impl Interceptor) {
        self.interceptors.push(Arc::new(interceptor));
    }

    /// Removes every interceptor.
    pub fn clear_interceptors(&self) {
        self.interceptors.clear();
    }

    /// Creates a session using the configured request budget.
    pub fn new_session(&self) -> Session {
        Session::new(self.config.rate_limit)
    }

    /// Handles a frame on the dispatcher's built-in local session.
    ///
    /// Suitable for in-process callers; remote connections each get their
    /// own [`Session`] via [`handle_frame_for`](Self::handle_frame_for).
    pub async fn handle_frame(&self, frame: Frame) -> Option<Frame> {
        self.handle_frame_for(&self.local, frame).await
    }

    /// Handles one inbound frame and returns the reply frame.
    ///
    /// Returns `None` only for frames that decode as neither encoding.
    pub async fn handle_frame_for(&self, session: &Session, frame: Frame) -> Option<Frame> {
        let (request, encoding): (Request, Encoding) = match self.codec.decode(&frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(session = %session.id(), error = %e, "Dropping undecodable frame");
                return None;
            }
        };

        let response = self.dispatch(session, request).await;
        self.encode_response(response, encoding)
    }

    /// Runs one decoded request and builds its response.
    pub async fn dispatch(&self, session: &Session, request: Request) -> Response {
        let Request { id, method, args } = request;

        let stats = match session.acquire() {
            Ok(stats) => stats,
            Err(stats) => {
                debug!(session = %session.id(), method = %method, "Rate limit exceeded");
                return Response::failure(id, stats, RATE_LIMIT_EXCEEDED);
            }
        };

        let Some(definition) = self.registry.get(&method) else {
            debug!(session = %session.id(), method = %method, "Unknown method");
            return Response::failure(id, stats, format!("Unknown method {method}"));
        };

        let ctx = RequestContext::for_method(session, method, args);
        let links = self.interceptors.snapshot();
        let reached = AtomicBool::new(false);
        let next = Next::new(&links, definition.handler().as_ref(), &reached);

        match AssertUnwindSafe(next.run(ctx)).catch_unwind().await {
            Ok(Ok(_)) if !reached.load(Ordering::Acquire) => {
                debug!(
                    session = %session.id(),
                    method = %definition.id(),
                    "Request blocked by middleware"
                );
                Response::failure(id, stats, BLOCKED_BY_MIDDLEWARE)
            }
            Ok(Ok(result)) => Response::success(id, stats, result),
            Ok(Err(e)) => {
                debug!(
                    session = %session.id(),
                    method = %definition.id(),
                    error = %e,
                    "Handler failed"
                );
                Response::failure(id, stats, e.message())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    session = %session.id(),
                    method = %definition.id(),
                    panic = %message,
                    "Handler panicked"
                );
                Response::failure(id, stats, message)
            }
        }
    }

    fn encode_response(&self, response: Response, encoding: Encoding) -> Option<Frame> {
        match self.codec.encode(&response, encoding) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(id = %response.id(), error = %e, "Failed to encode response");
                let fallback = Response::failure(
                    response.id().clone(),
                    response.stats(),
                    "Failed to encode response",
                );
                match self.codec.encode(&fallback, encoding) {
                    Ok(frame) => Some(frame),
                    Err(e) => {
                        error!(
                            id = %response.id(),
                            error = %e,
                            "Failed to encode failure response"
                        );
                        None
                    }
                }
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Handler panicked".to_string()
    }
}
