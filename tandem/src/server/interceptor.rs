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

//! Interceptors: links that wrap every method call.
//!
//! Interceptors run in registration order. Each link receives the request
//! context and a [`Next`] continuation. Calling [`Next::run`] hands the
//! (possibly modified) context to the next link, and finally to the
//! handler; returning without calling it blocks the request.
//!
//! ```rust
//! use async_trait::async_trait;
//! use serde_json::Value;
//! use tandem::server::{HandlerError, Interceptor, Next, RequestContext};
//!
//! struct RequireIdentity;
//!
//! #[async_trait]
//! impl Interceptor for RequireIdentity {
//!     async fn intercept(
//!         &self,
//!         ctx: RequestContext,
//!         next: Next<'_>,
//!     ) -> Result<Value, HandlerError> {
//!         if ctx.identity().is_none() {
//!             return Ok(Value::Null);
//!         }
//!         next.run(ctx).await
//!     }
//! }
//! ```

use crate::server::{HandlerError, MethodHandler, RequestContext};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One link of the interceptor chain.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Inspects the request and decides whether it continues.
    ///
    /// The value returned is the response result, but only if the handler
    /// was reached. An error is reported to the caller either way.
    async fn intercept(&self, ctx: RequestContext, next: Next<'_>) -> Result<Value, HandlerError>;
}

/// The continuation handed to an [`Interceptor`].
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    handler: &'a dyn MethodHandler,
    reached: &'a AtomicBool,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        chain: &'a [Arc<dyn Interceptor>],
        handler: &'a dyn MethodHandler,
        reached: &'a AtomicBool,
    ) -> Self {
        Self {
            rest: chain,
            handler,
            reached,
        }
    }

    /// Passes the request on to the next link, or to the handler.
    pub async fn run(self, ctx: RequestContext) -> Result<Value, HandlerError> {
        match self.rest.split_first() {
            Some((link, rest)) => {
                let next = Next {
                    rest,
                    handler: self.handler,
                    reached: self.reached,
                };
                link.intercept(ctx, next).await
            }
            None => {
                self.reached.store(true, Ordering::Release);
                self.handler.call(ctx).await
            }
        }
    }
}

/// Adapts a synchronous gate into an [`Interceptor`].
///
/// The closure may modify the context. Returning `true` continues the chain,
/// `false` blocks the request.
pub struct FnInterceptor<F>(F);

impl<F> FnInterceptor<F>
where
    F: Fn(&mut RequestContext) -> bool + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&mut RequestContext) -> bool + Send + Sync + 'static,
{
    async fn intercept(
        &self,
        mut ctx: RequestContext,
        next: Next<'_>,
    ) -> Result<Value, HandlerError> {
        if (self.0)(&mut ctx) {
            next.run(ctx).await
        } else {
            Ok(Value::Null)
        }
    }
}

/// The ordered interceptor list.
///
/// Requests take a snapshot of the list, so changes made while requests are
/// in flight apply to later requests only.
#[derive(Default)]
pub struct InterceptorChain {
    links: RwLock<Arc<Vec<Arc<dyn Interceptor>>>>,
}

impl InterceptorChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole chain with a single interceptor.
    pub fn set(&self, interceptor: Arc<dyn Interceptor>) {
        *self.links.write() = Arc::new(vec![interceptor]);
    }

    /// Appends an interceptor to the end of the chain.
    pub fn push(&self, interceptor: Arc<dyn Interceptor>) {
        let mut links = self.links.write();
        let mut next = Vec::clone(&links);
        next.push(interceptor);
        *links = Arc::new(next);
    }

    /// Removes every interceptor.
    pub fn clear(&self) {
        *self.links.write() = Arc::new(Vec::new());
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    /// Returns `true` if no interceptor is installed.
    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }

    /// The current list.
    pub fn snapshot(&self) -> Arc<Vec<Arc<dyn Interceptor>>> {
        self.links.read().clone()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{FnHandler, RateLimitConfig, Session};
    use serde_json::json;

    type Ready = futures_util::future::Ready<Result<Value, HandlerError>>;

    fn handler() -> FnHandler<impl Fn(RequestContext) -> Ready> {
        FnHandler::new(|ctx: RequestContext| {
            futures_util::future::ready(Ok(json!({
                "method": ctx.method(),
                "tag": ctx.get("tag").cloned(),
            })))
        })
    }

    async fn run(chain: &InterceptorChain) -> (Result<Value, HandlerError>, bool) {
        let session = Session::new(RateLimitConfig::default());
        let ctx = RequestContext::for_method(&session, "m", Value::Null);
        let handler = handler();
        let links = chain.snapshot();
        let reached = AtomicBool::new(false);
        let result = Next::new(&links, &handler, &reached).run(ctx).await;
        (result, reached.load(Ordering::Acquire))
    }

    #[tokio::test]
    async fn test_empty_chain_reaches_handler() {
        let (result, reached) = run(&InterceptorChain::new()).await;
        assert!(reached);
        assert_eq!(result.unwrap()["method"], "m");
    }

    #[tokio::test]
    async fn test_links_run_in_order_and_mutate_context() {
        let chain = InterceptorChain::new();
        chain.push(Arc::new(FnInterceptor::new(|ctx: &mut RequestContext| {
            ctx.insert("tag", json!("first"));
            true
        })));
        chain.push(Arc::new(FnInterceptor::new(|ctx: &mut RequestContext| {
            let seen = ctx.get("tag").cloned();
            ctx.insert("tag", json!([seen, "second"]));
            true
        })));

        let (result, reached) = run(&chain).await;
        assert!(reached);
        assert_eq!(result.unwrap()["tag"], json!(["first", "second"]));
    }

    #[tokio::test]
    async fn test_any_link_can_block() {
        let chain = InterceptorChain::new();
        chain.push(Arc::new(FnInterceptor::new(|_: &mut RequestContext| true)));
        chain.push(Arc::new(FnInterceptor::new(|_: &mut RequestContext| false)));

        let (_, reached) = run(&chain).await;
        assert!(!reached);
    }

    #[tokio::test]
    async fn test_set_replaces_chain() {
        let chain = InterceptorChain::new();
        chain.push(Arc::new(FnInterceptor::new(|_: &mut RequestContext| false)));
        chain.push(Arc::new(FnInterceptor::new(|_: &mut RequestContext| false)));
        chain.set(Arc::new(FnInterceptor::new(|_: &mut RequestContext| true)));

        assert_eq!(chain.len(), 1);
        let (_, reached) = run(&chain).await;
        assert!(reached);
    }
}
