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

//! Request frames and correlation identifiers.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Caller-assigned correlation identifier.
///
/// Ids are either strings or numbers on the wire. Any JSON number is
/// accepted, including fractions and integers beyond `i64`. The server
/// echoes ids back untouched and never generates one itself; uniqueness
/// among a caller's in-flight requests is the caller's responsibility.
///
/// Numeric ids compare by their canonical text, so `7` and `7.0` are
/// distinct ids.
///
/// # Example
///
/// ```rust
/// use tandem::protocol::RequestId;
///
/// let text = RequestId::from("1");
/// let number = RequestId::from(1);
/// assert_ne!(text, number);
/// assert_eq!(text.to_string(), "1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id.
    Number(Number),
    /// String id.
    Text(String),
}

impl PartialEq for RequestId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.to_string() == b.to_string(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for RequestId {}

impl Hash for RequestId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Number(n) => {
                0u8.hash(state);
                n.to_string().hash(state);
            }
            Self::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Number> for RequestId {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

/// A single method invocation.
///
/// `args` is an opaque payload. A `null` payload is omitted on the wire and
/// an absent payload decodes as `null`, so the two are indistinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id chosen by the caller.
    pub id: RequestId,
    /// Identifier of the server-side method to invoke.
    pub method: String,
    /// Method arguments.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl Request {
    /// Creates a request with the given id, method, and arguments.
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_untagged_json() {
        let text: RequestId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(text, RequestId::from("abc"));

        let number: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(number, RequestId::from(42));
    }

    #[test]
    fn test_request_omits_null_args() {
        let request = Request::new("1", "ping", Value::Null);
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded, json!({"id": "1", "method": "ping"}));
    }

    #[test]
    fn test_request_missing_args_is_null() {
        let request: Request = serde_json::from_str(r#"{"id":7,"method":"ping"}"#).unwrap();
        assert_eq!(request.id, RequestId::from(7));
        assert!(request.args.is_null());
    }

    #[test]
    fn test_request_requires_method() {
        let result: Result<Request, _> = serde_json::from_str(r#"{"id":"1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_fractional_and_large_ids_decode() {
        let fractional: Request = serde_json::from_str(r#"{"id":1.5,"method":"ping"}"#).unwrap();
        assert_eq!(fractional.id.to_string(), "1.5");

        let large: Request =
            serde_json::from_str(r#"{"id":18446744073709551615,"method":"ping"}"#).unwrap();
        assert_eq!(large.id, RequestId::from(Number::from(u64::MAX)));
    }

    #[test]
    fn test_numeric_ids_keep_their_value_through_msgpack() {
        let ids = [
            RequestId::from(Number::from(u64::MAX)),
            RequestId::from(-3),
            serde_json::from_str("1.5").unwrap(),
        ];
        for id in ids {
            let request = Request::new(id.clone(), "ping", Value::Null);
            let bytes = rmp_serde::to_vec_named(&request).unwrap();
            let decoded: Request = rmp_serde::from_slice(&bytes).unwrap();
            assert_eq!(decoded.id, id);
        }
    }

    #[test]
    fn test_numeric_ids_hash_by_value() {
        use std::collections::HashSet;

        let ids: HashSet<RequestId> = [
            RequestId::from(7),
            RequestId::from(Number::from(7u64)),
            RequestId::from("7"),
        ]
        .into_iter()
        .collect();
        assert_eq!(ids.len(), 2);
    }
}
