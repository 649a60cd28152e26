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

//! Connection manager configuration.

use crate::serialization::Encoding;
use std::time::Duration;

/// Default time a call waits for its response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`ConnectionManager`](crate::client::ConnectionManager).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tandem::client::ClientConfig;
/// use tandem::serialization::Encoding;
///
/// let config = ClientConfig::default()
///     .with_advertised_encoding(Some("json"))
///     .with_request_timeout(Duration::from_secs(5));
/// assert_eq!(config.encoding, Encoding::Json);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Encoding used for outbound requests (default: MessagePack).
    pub encoding: Encoding,

    /// How long a call waits for its response (default: 30s, `None` waits forever).
    pub request_timeout: Option<Duration>,

    /// Reject MessagePack payloads above this size.
    pub max_frame_size: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            max_frame_size: None,
        }
    }
}

impl ClientConfig {
    /// Sets the outbound encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the outbound encoding from the name the server advertised.
    ///
    /// Missing or unrecognised names select MessagePack.
    pub fn with_advertised_encoding(mut self, advertised: Option<&str>) -> Self {
        self.encoding = Encoding::from_advertised(advertised);
        self
    }

    /// Sets the per-call response timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Lets calls wait for their response indefinitely.
    pub fn without_request_timeout(mut self) -> Self {
        self.request_timeout = None;
        self
    }

    /// Caps the size of MessagePack payloads.
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = Some(size);
        self
    }
}
