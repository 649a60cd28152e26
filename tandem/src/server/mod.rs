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

//! Server side of the RPC layer.
//!
//! A [`Dispatcher`] resolves each decoded request to a registered method,
//! running it through the [`InterceptorChain`] first. [`RpcServer`] feeds
//! the dispatcher from a [`TransportListener`](crate::transport::TransportListener),
//! creating one [`Session`] per connection.

mod config;
mod context;
mod dispatcher;
mod error;
pub mod interceptor;
mod rate_limit;
mod registry;
mod rpc_server;
mod session;

pub use config::ServerConfig;
pub use context::{RequestContext, RequestKind};
pub use dispatcher::{BLOCKED_BY_MIDDLEWARE, Dispatcher, RATE_LIMIT_EXCEEDED};
pub use error::HandlerError;
pub use interceptor::{FnInterceptor, Interceptor, InterceptorChain, Next};
pub use rate_limit::{RateBudget, RateLimitConfig};
pub use registry::{FnHandler, MethodDefinition, MethodHandler, MethodRegistry};
pub use rpc_server::RpcServer;
pub use session::{Session, SessionId};
