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

//! Client side of the RPC layer.
//!
//! [`ConnectionManager`] owns one lazily opened connection, stamps every
//! request with a fresh correlation id, and routes each response back to
//! the caller waiting on it:
//!
//! ```text
//! call(method, args)
//!   -> encode {id, method, args}      (MessagePack or JSON)
//!   -> register id in PendingCalls
//!   -> send frame
//!   <- receive task decodes response, completes the caller by id
//! ```

mod config;
mod correlation;
mod error;
mod manager;
mod pending;

pub use config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use correlation::RequestIdGenerator;
pub use error::CallError;
pub use manager::{ConnectionManager, Reply};
pub use pending::PendingCalls;
