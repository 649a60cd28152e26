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

//! Wire data model shared by the client and the server.
//!
//! Every exchange on the duplex connection is a single [`Request`] frame
//! answered by exactly one [`Response`] frame carrying the same
//! [`RequestId`]. The types here are format-agnostic; the
//! [`serialization`](crate::serialization) layer decides whether they travel
//! as MessagePack or JSON.
//!
//! # Wire shapes
//!
//! ```text
//! request:  { id, method, args? }
//! success:  { id, ok: true,  stats: { remainingRequests, resetInSeconds }, result }
//! failure:  { id, ok: false, stats: { remainingRequests, resetInSeconds }, error }
//! ```
//!
//! `error` is always a bare string.

mod request;
mod response;

pub use request::{Request, RequestId};
pub use response::{Response, Stats};
