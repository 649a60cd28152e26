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

//! End-to-end dispatch through a client, server, and in-memory transport.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tandem::client::{CallError, ClientConfig, ConnectionManager};
use tandem::serialization::Encoding;
use tandem::server::{
    BLOCKED_BY_MIDDLEWARE, Dispatcher, FnInterceptor, HandlerError, Interceptor, Next,
    RATE_LIMIT_EXCEEDED, RateLimitConfig, RequestContext, RpcServer, ServerConfig,
};
use tandem::transport::memory::{self, MemoryConnector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Task {
    id: u32,
    name: String,
    status: String,
}

#[derive(Serialize)]
struct TaskFilter<'a> {
    status: &'a str,
}

fn task_service(config: ServerConfig) -> Arc<Dispatcher> {
    let dispatcher = Arc::new(Dispatcher::new(config));
    dispatcher.register_fn("getTasks", |ctx| async move {
        let status = ctx
            .args()
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("open")
            .to_string();
        Ok(json!([{ "id": 1, "name": "Task 1", "status": status }]))
    });
    dispatcher
}

fn start_server(dispatcher: Arc<Dispatcher>) -> (RpcServer, MemoryConnector) {
    let (connector, listener) = memory::channel(8);
    let server = RpcServer::new(dispatcher);
    tokio::spawn({
        let server = server.clone();
        async move { server.serve(listener).await }
    });
    (server, connector)
}

#[tokio::test]
async fn test_get_tasks_in_both_encodings() {
    let (server, connector) = start_server(task_service(ServerConfig::default()));

    for encoding in [Encoding::MsgPack, Encoding::Json] {
        let client = ConnectionManager::new(
            connector.clone(),
            ClientConfig::default().with_encoding(encoding),
        );
        let reply = client
            .call_with_stats("getTasks", json!({ "status": "open" }))
            .await
            .unwrap();

        assert_eq!(
            reply.result,
            json!([{ "id": 1, "name": "Task 1", "status": "open" }])
        );
        assert_eq!(reply.stats.remaining_requests, 999);
        assert!(reply.stats.reset_in_seconds <= 60);
    }

    server.shutdown();
}

#[tokio::test]
async fn test_typed_call() {
    let (server, connector) = start_server(task_service(ServerConfig::default()));
    let client = ConnectionManager::new(connector, ClientConfig::default());

    let tasks: Vec<Task> = client
        .call_typed("getTasks", &TaskFilter { status: "done" })
        .await
        .unwrap();
    assert_eq!(
        tasks,
        vec![Task {
            id: 1,
            name: "Task 1".to_string(),
            status: "done".to_string(),
        }]
    );

    server.shutdown();
}

#[tokio::test]
async fn test_unknown_method() {
    let (server, connector) = start_server(task_service(ServerConfig::default()));
    let client = ConnectionManager::new(connector, ClientConfig::default());

    let err = client.call("doesNotExist", Value::Null).await.unwrap_err();
    assert_eq!(err.remote_message(), Some("Unknown method doesNotExist"));

    server.shutdown();
}

#[tokio::test]
async fn test_blocking_interceptor_never_reaches_handler() {
    let dispatcher = Arc::new(Dispatcher::new(ServerConfig::default()));
    let calls = Arc::new(AtomicUsize::new(0));
    dispatcher.register_fn("increment", {
        let calls = Arc::clone(&calls);
        move |_ctx| {
            let calls = Arc::clone(&calls);
            async move { Ok(json!(calls.fetch_add(1, Ordering::SeqCst) + 1)) }
        }
    });
    dispatcher.set_interceptor(FnInterceptor::new(|ctx: &mut RequestContext| {
        ctx.identity().is_some()
    }));

    let (server, connector) = start_server(dispatcher);
    let client = ConnectionManager::new(connector, ClientConfig::default());

    let err = client.call("increment", Value::Null).await.unwrap_err();
    assert_eq!(err.remote_message(), Some(BLOCKED_BY_MIDDLEWARE));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    server.shutdown();
}

/// Authenticates from a token in the arguments and tags the request.
struct TokenAuth;

#[async_trait::async_trait]
impl Interceptor for TokenAuth {
    async fn intercept(
        &self,
        mut ctx: RequestContext,
        next: Next<'_>,
    ) -> Result<Value, HandlerError> {
        let token = ctx
            .args()
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_string);
        match token.as_deref() {
            Some("secret") => {
                ctx.set_identity("alice");
                next.run(ctx).await
            }
            Some(_) => Err(HandlerError::new("Invalid token")),
            None => Ok(Value::Null),
        }
    }
}

#[tokio::test]
async fn test_interceptor_chain_augments_and_rejects() {
    let dispatcher = Arc::new(Dispatcher::new(ServerConfig::default()));
    dispatcher.register_fn("whoami", |ctx| async move {
        let trace = ctx.get("trace").cloned().unwrap_or(Value::Null);
        Ok(json!({ "identity": ctx.identity(), "trace": trace }))
    });
    dispatcher.add_interceptor(FnInterceptor::new(|ctx: &mut RequestContext| {
        ctx.insert("trace", json!("abc"));
        true
    }));
    dispatcher.add_interceptor(TokenAuth);

    let (server, connector) = start_server(dispatcher);
    let client = ConnectionManager::new(connector, ClientConfig::default());

    let me = client
        .call("whoami", json!({ "token": "secret" }))
        .await
        .unwrap();
    assert_eq!(me, json!({ "identity": "alice", "trace": "abc" }));

    let err = client
        .call("whoami", json!({ "token": "wrong" }))
        .await
        .unwrap_err();
    assert_eq!(err.remote_message(), Some("Invalid token"));

    let err = client.call("whoami", json!({})).await.unwrap_err();
    assert_eq!(err.remote_message(), Some(BLOCKED_BY_MIDDLEWARE));

    server.shutdown();
}

#[tokio::test]
async fn test_handler_failures_become_responses() {
    let dispatcher = Arc::new(Dispatcher::new(ServerConfig::default()));
    dispatcher.register_fn("fail", |_ctx| async { Err(HandlerError::new("boom")) });
    dispatcher.register_fn("explode", |_ctx| async {
        if true {
            panic!("handler exploded");
        }
        Ok(Value::Null)
    });
    dispatcher.register_fn("strict", |ctx| async move {
        let n: u32 = ctx.parse_args()?;
        Ok(json!(n))
    });

    let (server, connector) = start_server(dispatcher);
    let client = ConnectionManager::new(connector, ClientConfig::default());

    let err = client.call("fail", Value::Null).await.unwrap_err();
    assert_eq!(err.remote_message(), Some("boom"));

    let err = client.call("explode", Value::Null).await.unwrap_err();
    assert_eq!(err.remote_message(), Some("handler exploded"));

    let err = client.call("strict", json!("seven")).await.unwrap_err();
    assert!(err.remote_message().unwrap().starts_with("Invalid arguments"));

    // The connection outlives every failure.
    assert_eq!(client.call("strict", json!(7)).await.unwrap(), json!(7));

    server.shutdown();
}

#[tokio::test]
async fn test_rate_limit_per_connection() {
    let config = ServerConfig::default()
        .with_rate_limit(RateLimitConfig::new(2, Duration::from_secs(60)));
    let (server, connector) = start_server(task_service(config));

    let client = ConnectionManager::new(connector.clone(), ClientConfig::default());
    let first = client.call_with_stats("getTasks", json!({})).await.unwrap();
    assert_eq!(first.stats.remaining_requests, 1);
    let second = client.call_with_stats("getTasks", json!({})).await.unwrap();
    assert_eq!(second.stats.remaining_requests, 0);

    match client.call("getTasks", json!({})).await {
        Err(CallError::Remote { message, stats }) => {
            assert_eq!(message, RATE_LIMIT_EXCEEDED);
            assert_eq!(stats.remaining_requests, 0);
            assert!(stats.reset_in_seconds > 0);
        }
        other => panic!("expected rate limit, got {other:?}"),
    }

    // A second connection has its own budget.
    let other = ConnectionManager::new(connector, ClientConfig::default());
    assert!(other.call("getTasks", json!({})).await.is_ok());

    server.shutdown();
}
