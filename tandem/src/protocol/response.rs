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

//! Response frames and rate-limit bookkeeping.

use super::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rate-limit bookkeeping attached to every response, success or failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Requests still allowed in the current window.
    pub remaining_requests: u64,
    /// Seconds until the window resets.
    pub reset_in_seconds: u64,
}

impl Stats {
    /// Creates a stats record.
    pub const fn new(remaining_requests: u64, reset_in_seconds: u64) -> Self {
        Self {
            remaining_requests,
            reset_in_seconds,
        }
    }
}

/// Outcome of a single request.
///
/// On the wire this is one object discriminated by `ok`; in Rust it is a
/// closed enum so that a success can never carry an error and vice versa.
///
/// # Example
///
/// ```rust
/// use tandem::protocol::{Response, RequestId, Stats};
/// use serde_json::json;
///
/// let response = Response::failure(RequestId::from("1"), Stats::default(), "boom");
/// assert!(!response.is_ok());
/// assert_eq!(
///     serde_json::to_value(&response).unwrap(),
///     json!({
///         "id": "1",
///         "ok": false,
///         "stats": {"remainingRequests": 0, "resetInSeconds": 0},
///         "error": "boom"
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireResponse", into = "WireResponse")]
pub enum Response {
    /// The handler produced a result.
    Success {
        /// Correlation id of the originating request.
        id: RequestId,
        /// Rate-limit bookkeeping.
        stats: Stats,
        /// Handler result.
        result: Value,
    },
    /// The request failed anywhere between lookup and handler completion.
    Failure {
        /// Correlation id of the originating request.
        id: RequestId,
        /// Rate-limit bookkeeping.
        stats: Stats,
        /// Human-readable error message.
        error: String,
    },
}

impl Response {
    /// Builds a success response.
    pub fn success(id: RequestId, stats: Stats, result: Value) -> Self {
        Self::Success { id, stats, result }
    }

    /// Builds a failure response.
    pub fn failure(id: RequestId, stats: Stats, error: impl Into<String>) -> Self {
        Self::Failure {
            id,
            stats,
            error: error.into(),
        }
    }

    /// Returns the correlation id.
    pub fn id(&self) -> &RequestId {
        match self {
            Self::Success { id, .. } | Self::Failure { id, .. } => id,
        }
    }

    /// Returns the rate-limit bookkeeping.
    pub fn stats(&self) -> Stats {
        match self {
            Self::Success { stats, .. } | Self::Failure { stats, .. } => *stats,
        }
    }

    /// Returns `true` for [`Response::Success`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    id: RequestId,
    ok: bool,
    #[serde(default)]
    stats: Stats,
    // Present on every success, even when the result is null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<WireResponse> for Response {
    type Error = String;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        if wire.ok {
            return Ok(Self::Success {
                id: wire.id,
                stats: wire.stats,
                result: wire.result.unwrap_or(Value::Null),
            });
        }
        match wire.error {
            Some(error) => Ok(Self::Failure {
                id: wire.id,
                stats: wire.stats,
                error,
            }),
            None => Err(format!("failure response {} has no error", wire.id)),
        }
    }
}

impl From<Response> for WireResponse {
    fn from(response: Response) -> Self {
        match response {
            Response::Success { id, stats, result } => Self {
                id,
                ok: true,
                stats,
                result: Some(result),
                error: None,
            },
            Response::Failure { id, stats, error } => Self {
                id,
                ok: false,
                stats,
                result: None,
                error: Some(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape() {
        let response = Response::success(
            RequestId::from("1"),
            Stats::new(99, 60),
            json!([{"id": 1, "name": "Task 1", "status": "open"}]),
        );

        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(
            encoded,
            json!({
                "id": "1",
                "ok": true,
                "stats": {"remainingRequests": 99, "resetInSeconds": 60},
                "result": [{"id": 1, "name": "Task 1", "status": "open"}]
            })
        );
    }

    #[test]
    fn test_null_result_keeps_result_key() {
        let response = Response::success(RequestId::from("2"), Stats::new(5, 10), Value::Null);

        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["result"], Value::Null);
        assert!(encoded.as_object().unwrap().contains_key("result"));

        let decoded: Response = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn test_failure_omits_result_key() {
        let response = Response::failure(RequestId::from("2"), Stats::new(5, 10), "nope");
        let encoded = serde_json::to_value(&response).unwrap();
        assert!(!encoded.as_object().unwrap().contains_key("result"));
        assert_eq!(encoded["error"], "nope");
    }

    #[test]
    fn test_failure_requires_error_field() {
        let raw = r#"{"id":"1","ok":false,"stats":{"remainingRequests":1,"resetInSeconds":1}}"#;
        let result: Result<Response, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_structured_error_is_rejected() {
        let result: Result<Response, _> =
            serde_json::from_str(r#"{"id":"1","ok":false,"error":{"message":"boom"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_success_without_result_is_null() {
        let response: Response = serde_json::from_str(r#"{"id":3,"ok":true}"#).unwrap();
        assert_eq!(
            response,
            Response::success(RequestId::from(3), Stats::default(), Value::Null)
        );
    }

    #[test]
    fn test_accessors() {
        let response = Response::failure(RequestId::from(5), Stats::new(1, 2), "nope");
        assert_eq!(response.id(), &RequestId::from(5));
        assert_eq!(response.stats(), Stats::new(1, 2));
        assert!(!response.is_ok());
    }
}
