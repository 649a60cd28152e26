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

//! Wire codec for request and response frames.
//!
//! Frames travel in one of two interchangeable encodings:
//!
//! - **MessagePack** ([`MsgPackSerializer`]): compact binary, carried in
//!   binary transport frames. This is the default when the server does not
//!   advertise a preference.
//! - **JSON** ([`JsonSerializer`]): textual, carried in text transport frames.
//!
//! Both implement the [`Serializer`] trait. [`FrameCodec`] sits on top of the
//! pair: it picks the serializer for an [`Encoding`], wraps the bytes in the
//! matching [`Frame`](crate::transport::Frame) kind, and decodes
//! defensively. When a frame does not parse in the format its kind implies,
//! the other format is tried before a [`DecodeError`] is reported.
//!
//! # Example
//!
//! ```rust
//! use tandem::protocol::Request;
//! use tandem::serialization::{Encoding, FrameCodec};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = FrameCodec::new();
//! let request = Request::new("1", "getTasks", json!({"status": "open"}));
//!
//! let frame = codec.encode(&request, Encoding::MsgPack)?;
//! let (decoded, encoding) = codec.decode::<Request>(&frame)?;
//! assert_eq!(decoded, request);
//! assert_eq!(encoding, Encoding::MsgPack);
//! # Ok(())
//! # }
//! ```
//!
//! # Encoding negotiation
//!
//! The server advertises its preferred encoding out-of-band (for example in
//! the initial page context) using [`Encoding::name`]. Clients parse that
//! value with [`Encoding::from_advertised`], which falls back to MessagePack.

mod encoding;
mod error;
mod json;
mod msgpack;
mod traits;

pub use encoding::{Encoding, FrameCodec};
pub use error::{DecodeError, DeserializationError, SerializationError};
pub use json::JsonSerializer;
pub use msgpack::MsgPackSerializer;
pub use traits::Serializer;
