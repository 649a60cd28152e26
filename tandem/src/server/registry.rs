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

//! Method handlers and the registry that names them.

use crate::server::{HandlerError, RequestContext};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Server-side implementation of one named method.
#[async_trait]
pub trait MethodHandler: Send + Sync + 'static {
    /// Runs the method for one request.
    async fn call(&self, ctx: RequestContext) -> Result<Value, HandlerError>;
}

/// Adapts an async closure into a [`MethodHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> MethodHandler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext) -> Result<Value, HandlerError> {
        (self.0)(ctx).await
    }
}

/// A named method and its handler.
#[derive(Clone)]
pub struct MethodDefinition {
    id: String,
    handler: Arc<dyn MethodHandler>,
}

impl MethodDefinition {
    /// Creates a definition.
    pub fn new(id: impl Into<String>, handler: impl MethodHandler) -> Self {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
        }
    }

    /// Creates a definition from an async closure.
    pub fn from_fn<F, Fut>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Self::new(id, FnHandler::new(f))
    }

    /// The method name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The handler.
    pub fn handler(&self) -> &Arc<dyn MethodHandler> {
        &self.handler
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Map from method name to definition.
///
/// Written during startup, read on every request. Registering a name twice
/// replaces the earlier definition.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, MethodDefinition>>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method, returning the definition it replaced.
    pub fn register(&self, definition: MethodDefinition) -> Option<MethodDefinition> {
        let id = definition.id.clone();
        let previous = self.methods.write().insert(id.clone(), definition);
        if previous.is_some() {
            warn!(method = %id, "Method registered twice, replacing earlier handler");
        } else {
            debug!(method = %id, "Method registered");
        }
        previous
    }

    /// Looks up a method by name.
    pub fn get(&self, id: &str) -> Option<MethodDefinition> {
        self.methods.read().get(id).cloned()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.methods.read().contains_key(id)
    }

    /// Removes a method.
    pub fn remove(&self, id: &str) -> Option<MethodDefinition> {
        self.methods.write().remove(id)
    }

    /// Registered method names, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.methods.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}
