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

//! Server configuration.

use crate::serialization::Encoding;
use crate::server::RateLimitConfig;

/// Configuration for a [`Dispatcher`](crate::server::Dispatcher) and the
/// [`RpcServer`](crate::server::RpcServer) that feeds it.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tandem::serialization::Encoding;
/// use tandem::server::{RateLimitConfig, ServerConfig};
///
/// let config = ServerConfig::default()
///     .with_encoding(Encoding::Json)
///     .with_rate_limit(RateLimitConfig::new(10, Duration::from_secs(1)));
/// assert_eq!(config.advertised_encoding(), "json");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Encoding advertised to clients out of band (default: MessagePack).
    ///
    /// Replies always use the encoding their request arrived in.
    pub encoding: Encoding,

    /// Per-session request budget.
    pub rate_limit: RateLimitConfig,

    /// Reject MessagePack payloads above this size.
    pub max_frame_size: Option<usize>,

    /// Responses queued per session before request tasks wait (default: 256).
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            rate_limit: RateLimitConfig::default(),
            max_frame_size: None,
            outbound_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Sets the advertised encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the per-session request budget.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Caps the size of MessagePack payloads.
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = Some(size);
        self
    }

    /// Sets the per-session response queue length.
    pub fn with_outbound_buffer(mut self, size: usize) -> Self {
        self.outbound_buffer = size;
        self
    }

    /// The encoding name to hand to clients, e.g. in page metadata.
    pub fn advertised_encoding(&self) -> &'static str {
        self.encoding.name()
    }
}
