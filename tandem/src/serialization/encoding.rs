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

//! Encoding selection and defensive frame decoding.

use crate::serialization::{
    DecodeError, JsonSerializer, MsgPackSerializer, SerializationError, Serializer,
};
use crate::transport::Frame;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// One of the two interchangeable wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Compact binary MessagePack, carried in binary frames.
    #[default]
    MsgPack,
    /// Textual JSON, carried in text frames.
    Json,
}

impl Encoding {
    /// The advertised name of this encoding.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MsgPack => "msgpack",
            Self::Json => "json",
        }
    }

    /// Parses an advertised name. Matching is case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "msgpack" | "messagepack" => Some(Self::MsgPack),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Resolves a peer's advertised preference.
    ///
    /// Missing or unrecognised preferences resolve to MessagePack.
    ///
    /// ```rust
    /// use tandem::serialization::Encoding;
    ///
    /// assert_eq!(Encoding::from_advertised(Some("json")), Encoding::Json);
    /// assert_eq!(Encoding::from_advertised(None), Encoding::MsgPack);
    /// assert_eq!(Encoding::from_advertised(Some("yaml")), Encoding::MsgPack);
    /// ```
    pub fn from_advertised(advertised: Option<&str>) -> Self {
        advertised.and_then(Self::from_name).unwrap_or_default()
    }

    /// The encoding implied by a frame's kind.
    pub fn of_frame(frame: &Frame) -> Self {
        match frame {
            Frame::Binary(_) => Self::MsgPack,
            Frame::Text(_) => Self::Json,
        }
    }

    /// The other encoding.
    pub const fn other(self) -> Self {
        match self {
            Self::MsgPack => Self::Json,
            Self::Json => Self::MsgPack,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encodes values into frames and decodes frames back, in either encoding.
///
/// Cheap to clone; one instance is typically shared by a whole client or
/// server.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    json: JsonSerializer,
    msgpack: MsgPackSerializer,
}

impl FrameCodec {
    /// Creates a codec with default serializers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec whose MessagePack side rejects payloads over `max_size` bytes.
    pub fn with_max_frame_size(max_size: usize) -> Self {
        Self {
            json: JsonSerializer::new(),
            msgpack: MsgPackSerializer::new().with_max_size(max_size),
        }
    }

    /// Encodes `value` in `encoding`, wrapped in the matching frame kind.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if the value cannot be represented.
    pub fn encode<T>(&self, value: &T, encoding: Encoding) -> Result<Frame, SerializationError>
    where
        T: Serialize + ?Sized,
    {
        match encoding {
            Encoding::MsgPack => self.msgpack.serialize(value).map(Frame::Binary),
            Encoding::Json => {
                let bytes = self.json.serialize(value)?;
                String::from_utf8(bytes)
                    .map(Frame::Text)
                    .map_err(|e| SerializationError::with_source("JSON output is not UTF-8", e))
            }
        }
    }

    /// Decodes a frame, trying the encoding implied by its kind first and the
    /// other encoding second.
    ///
    /// Returns the value together with the encoding that actually parsed, so
    /// replies can be written in the same format.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when neither encoding parses.
    pub fn decode<T>(&self, frame: &Frame) -> Result<(T, Encoding), DecodeError>
    where
        T: DeserializeOwned,
    {
        let advertised = Encoding::of_frame(frame);
        let bytes = frame.as_bytes();

        let primary = match self.decode_as::<T>(bytes, advertised) {
            Ok(value) => return Ok((value, advertised)),
            Err(e) => e,
        };

        match self.decode_as::<T>(bytes, advertised.other()) {
            Ok(value) => {
                tracing::debug!(
                    advertised = %advertised,
                    actual = %advertised.other(),
                    "Frame decoded with fallback encoding"
                );
                Ok((value, advertised.other()))
            }
            Err(fallback) => Err(DecodeError::new(advertised, primary, fallback)),
        }
    }

    fn decode_as<T>(
        &self,
        bytes: &[u8],
        encoding: Encoding,
    ) -> Result<T, crate::serialization::DeserializationError>
    where
        T: DeserializeOwned,
    {
        match encoding {
            Encoding::MsgPack => self.msgpack.deserialize(bytes),
            Encoding::Json => self.json.deserialize(bytes),
        }
    }
}
