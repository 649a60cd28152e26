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

//! Per-request context handed through interceptors to the handler.

use crate::server::{Session, SessionId};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;

/// What kind of invocation a context describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A named method called over the RPC socket.
    Method,
}

/// Per-request context.
///
/// Created fresh for every request. Interceptors may rewrite the arguments,
/// set the identity, or stash values; the handler sees whatever the chain
/// left behind.
#[derive(Debug, Clone)]
pub struct RequestContext {
    kind: RequestKind,
    method: String,
    args: Value,
    session_id: SessionId,
    peer: Option<SocketAddr>,
    identity: Option<String>,
    values: HashMap<String, Value>,
}

impl RequestContext {
    /// Creates a method-call context for a request on `session`.
    pub fn for_method(session: &Session, method: impl Into<String>, args: Value) -> Self {
        Self {
            kind: RequestKind::Method,
            method: method.into(),
            args,
            session_id: session.id(),
            peer: session.peer(),
            identity: session.identity().map(str::to_owned),
            values: HashMap::new(),
        }
    }

    /// The invocation kind.
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The method being called.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw arguments.
    pub fn args(&self) -> &Value {
        &self.args
    }

    /// Mutable access to the arguments.
    pub fn args_mut(&mut self) -> &mut Value {
        &mut self.args
    }

    /// Deserializes the arguments into `T`.
    ///
    /// Absent arguments deserialize as `null`.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.args)
    }

    /// The session the request arrived on.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The remote address, if known.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// The caller's identity, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Sets the caller's identity for the rest of the chain.
    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.identity = Some(identity.into());
    }

    /// Reads a value stashed by an earlier interceptor.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stashes a value for later links and the handler.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }
}
