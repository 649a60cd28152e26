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

//! Correlation id generation.

use crate::protocol::RequestId;
use uuid::Uuid;

/// Generates correlation ids for outbound requests.
///
/// Ids are random UUID v4 strings, so they stay unique across reconnects
/// and across clients sharing a server without any coordination.
///
/// # Example
///
/// ```rust
/// use tandem::client::RequestIdGenerator;
///
/// let generator = RequestIdGenerator::new();
/// assert_ne!(generator.next(), generator.next());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestIdGenerator;

impl RequestIdGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates the next correlation id.
    #[must_use]
    pub fn next(&self) -> RequestId {
        RequestId::Text(Uuid::new_v4().to_string())
    }
}
