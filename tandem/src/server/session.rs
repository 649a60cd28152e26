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

//! Per-connection server state.

use crate::protocol::Stats;
use crate::server::{RateBudget, RateLimitConfig};
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a server-side session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocates the next process-unique session id.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// State of one connected client.
///
/// A session is created per accepted transport and is assumed to be
/// authenticated already; `identity` records who it belongs to. Its rate
/// budget is shared by every request arriving on it.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    peer: Option<SocketAddr>,
    identity: Option<String>,
    budget: parking_lot::Mutex<RateBudget>,
}

impl Session {
    /// Creates a session with the given request budget.
    pub fn new(rate_limit: RateLimitConfig) -> Self {
        Self {
            id: SessionId::next(),
            peer: None,
            identity: None,
            budget: parking_lot::Mutex::new(RateBudget::new(rate_limit)),
        }
    }

    /// Records the remote address.
    pub fn with_peer(mut self, peer: Option<SocketAddr>) -> Self {
        self.peer = peer;
        self
    }

    /// Records the authenticated identity.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The remote address, if known.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Charges one request against the budget.
    pub fn acquire(&self) -> Result<Stats, Stats> {
        self.budget.lock().try_acquire()
    }

    /// Current budget without charging anything.
    pub fn stats(&self) -> Stats {
        self.budget.lock().stats()
    }
}
