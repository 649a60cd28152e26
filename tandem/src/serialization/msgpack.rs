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

//! MessagePack serializer implementation.
//!
//! The compact binary encoding, and the default when no preference is
//! advertised. Structs are written as maps keyed by field name so that the
//! binary and textual encodings share one logical schema, and so that opaque
//! `serde_json::Value` payloads survive a round trip.

use crate::serialization::{DeserializationError, SerializationError, Serializer};

/// MessagePack serializer.
///
/// # Example
///
/// ```rust
/// use tandem::serialization::{MsgPackSerializer, Serializer};
/// use serde_json::{Value, json};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let serializer = MsgPackSerializer::new().with_max_size(1024 * 1024);
/// let payload = json!({"status": "open", "limit": 10});
///
/// let bytes = serializer.serialize(&payload)?;
/// let decoded: Value = serializer.deserialize(&bytes)?;
/// assert_eq!(decoded, payload);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MsgPackSerializer {
    max_size: Option<usize>,
}

impl MsgPackSerializer {
    /// Creates a new serializer with no size limit.
    pub fn new() -> Self {
        Self { max_size: None }
    }

    /// Rejects inbound payloads larger than `max_size` bytes before parsing.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }
}

impl Serializer for MsgPackSerializer {
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>, SerializationError>
    where
        T: serde::Serialize + ?Sized,
    {
        rmp_serde::to_vec_named(value).map_err(Into::into)
    }

    fn deserialize<T>(&self, bytes: &[u8]) -> Result<T, DeserializationError>
    where
        T: serde::de::DeserializeOwned,
    {
        if let Some(max_size) = self.max_size {
            if bytes.len() > max_size {
                return Err(DeserializationError::new(format!(
                    "Data size {} exceeds maximum allowed size {}",
                    bytes.len(),
                    max_size
                )));
            }
        }

        rmp_serde::from_slice(bytes).map_err(Into::into)
    }

    fn name(&self) -> &'static str {
        "msgpack"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Task {
        id: u32,
        name: String,
    }

    #[test]
    fn test_msgpack_nested_value() {
        let serializer = MsgPackSerializer::default();
        let value = json!({
            "tasks": [{"id": 1, "done": false}, {"id": 2, "done": true}],
            "cursor": null,
            "weights": [0.25, -1.5]
        });

        let bytes = serializer.serialize(&value).unwrap();
        let decoded: Value = serializer.deserialize(&bytes).unwrap();

        assert_eq!(value, decoded);
    }

    #[test]
    fn test_msgpack_numeric_edges() {
        let serializer = MsgPackSerializer::default();
        let value = json!([i64::MIN, i64::MAX, u64::MAX, 0, -1, 2.5]);

        let bytes = serializer.serialize(&value).unwrap();
        let decoded: Value = serializer.deserialize(&bytes).unwrap();

        assert_eq!(value, decoded);
    }

    #[test]
    fn test_msgpack_structs_use_field_names() {
        let serializer = MsgPackSerializer::default();
        let task = Task {
            id: 1,
            name: "Task 1".to_string(),
        };

        let bytes = serializer.serialize(&task).unwrap();
        let as_value: Value = serializer.deserialize(&bytes).unwrap();

        assert_eq!(as_value, json!({"id": 1, "name": "Task 1"}));
    }

    #[test]
    fn test_msgpack_invalid_data() {
        let serializer = MsgPackSerializer::default();
        let result: Result<Task, _> = serializer.deserialize(&[0xc1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_msgpack_with_max_size() {
        let serializer = MsgPackSerializer::new().with_max_size(4);
        let bytes = MsgPackSerializer::new()
            .serialize(&json!({"long": "payload"}))
            .unwrap();

        let result: Result<Value, _> = serializer.deserialize(&bytes);
        let error = result.unwrap_err();
        assert!(error.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_msgpack_name() {
        assert_eq!(MsgPackSerializer::default().name(), "msgpack");
    }
}
