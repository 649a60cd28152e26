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

//! Plain HTTP hand-off for requests that are not RPC traffic.
//!
//! Webhook-style endpoints live beside the RPC socket. The runtime offers
//! each such request to the installed [`HttpFallback`]s in order and
//! answers `404 Not Found` when all of them decline.

use async_trait::async_trait;
use http::{Request, Response, StatusCode};

/// An HTTP sub-router consulted for non-RPC requests.
#[async_trait]
pub trait HttpFallback: Send + Sync + 'static {
    /// Handles the request, or returns `None` to let the next fallback try.
    async fn try_handle(&self, request: &Request<Vec<u8>>) -> Option<Response<Vec<u8>>>;
}

/// Adapts a synchronous closure into an [`HttpFallback`].
pub struct FnHttpFallback<F>(F);

impl<F> FnHttpFallback<F>
where
    F: Fn(&Request<Vec<u8>>) -> Option<Response<Vec<u8>>> + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> HttpFallback for FnHttpFallback<F>
where
    F: Fn(&Request<Vec<u8>>) -> Option<Response<Vec<u8>>> + Send + Sync + 'static,
{
    async fn try_handle(&self, request: &Request<Vec<u8>>) -> Option<Response<Vec<u8>>> {
        (self.0)(request)
    }
}

/// The response sent when no fallback claims a request.
pub fn not_found() -> Response<Vec<u8>> {
    let mut response = Response::new(b"Not Found".to_vec());
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_fallback_declines_other_paths() {
        let hook = FnHttpFallback::new(|req: &Request<Vec<u8>>| {
            (req.uri().path() == "/webhook").then(|| Response::new(b"ok".to_vec()))
        });

        let hit = Request::builder().uri("/webhook").body(Vec::new()).unwrap();
        let miss = Request::builder().uri("/other").body(Vec::new()).unwrap();

        assert_eq!(hook.try_handle(&hit).await.unwrap().body(), b"ok");
        assert!(hook.try_handle(&miss).await.is_none());
    }

    #[test]
    fn test_not_found() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }
}
