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

//! End-to-end tests over real WebSocket connections.

#![cfg(feature = "websocket")]

use serde_json::{Value, json};
use std::time::Duration;
use tandem::client::{CallError, ClientConfig, ConnectionManager};
use tandem::runtime::{Definition, Runtime};
use tandem::serialization::Encoding;
use tandem::server::{FnInterceptor, MethodDefinition, RequestContext, RpcServer, ServerConfig};
use tandem::transport::{WebSocketConfig, WebSocketConnector, WebSocketListener};
use tandem::worker::{SupervisorConfig, WorkerContext, WorkerDefinition, WorkerOptions};
use tokio::net::TcpStream;

async fn start(server: RpcServer, config: WebSocketConfig) -> String {
    let listener = WebSocketListener::bind("127.0.0.1:0", config).await.unwrap();
    let url = listener.url().unwrap();
    tokio::spawn(async move { server.serve(listener).await });
    url
}

fn task_runtime() -> Runtime {
    let runtime = Runtime::new(ServerConfig::default(), SupervisorConfig::default());
    runtime.install_all([
        MethodDefinition::from_fn("getTasks", |ctx: RequestContext| async move {
            let status = ctx.args()["status"].as_str().unwrap_or("open").to_string();
            Ok(json!([{ "id": 1, "name": "Task 1", "status": status }]))
        })
        .into(),
        MethodDefinition::from_fn("whoami", |ctx: RequestContext| async move {
            Ok(json!(ctx.identity()))
        })
        .into(),
        Definition::middleware(FnInterceptor::new(|ctx: &mut RequestContext| {
            ctx.set_identity("tester");
            true
        })),
    ]);
    runtime
}

#[tokio::test]
async fn test_calls_over_websocket_in_both_encodings() {
    let runtime = task_runtime();
    let url = start(runtime.server(), WebSocketConfig::default()).await;
    assert!(url.ends_with("/rpc"));

    for encoding in [Encoding::MsgPack, Encoding::Json] {
        let connector = WebSocketConnector::new(url.clone(), WebSocketConfig::default());
        let config = ClientConfig::default().with_encoding(encoding);
        let client = ConnectionManager::new(connector, config);

        let tasks = client
            .call("getTasks", json!({ "status": "open" }))
            .await
            .unwrap();
        assert_eq!(tasks, json!([{ "id": 1, "name": "Task 1", "status": "open" }]));
        assert_eq!(client.call("whoami", Value::Null).await.unwrap(), json!("tester"));

        let err = client.call("doesNotExist", Value::Null).await.unwrap_err();
        assert_eq!(err.remote_message(), Some("Unknown method doesNotExist"));

        client.close().await;
    }
}

#[tokio::test]
async fn test_concurrent_websocket_calls_share_connection() {
    let runtime = task_runtime();
    let url = start(runtime.server(), WebSocketConfig::default()).await;
    let client = ConnectionManager::new(
        WebSocketConnector::new(url, WebSocketConfig::default()),
        ClientConfig::default(),
    );

    let calls = (0..50).map(|_| {
        let client = client.clone();
        async move { client.call("getTasks", json!({ "status": "done" })).await }
    });
    for result in futures_util::future::join_all(calls).await {
        assert_eq!(result.unwrap()[0]["status"], json!("done"));
    }
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_custom_path() {
    let runtime = task_runtime();
    let config = WebSocketConfig::default().with_path("/api/socket");
    let url = start(runtime.server(), config.clone()).await;
    assert!(url.ends_with("/api/socket"));

    let connector = WebSocketConnector::new(url, config);
    let client = ConnectionManager::new(connector, ClientConfig::default());
    assert!(client.call("getTasks", json!({})).await.is_ok());
}

#[tokio::test]
async fn test_idle_peer_does_not_block_other_clients() {
    let runtime = task_runtime();
    let listener = WebSocketListener::bind("127.0.0.1:0", WebSocketConfig::default())
        .await
        .unwrap();
    let addr = listener.socket_addr().unwrap();
    let url = listener.url().unwrap();
    let server = runtime.server();
    tokio::spawn({
        let server = server.clone();
        async move { server.serve(listener).await }
    });

    // Opens TCP and never starts the upgrade.
    let _idle = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let client = ConnectionManager::new(
        WebSocketConnector::new(url, WebSocketConfig::default()),
        ClientConfig::default(),
    );
    let tasks = tokio::time::timeout(Duration::from_secs(3), client.call("getTasks", json!({})))
        .await
        .expect("a stalled peer must not hold up the accept loop")
        .unwrap();
    assert_eq!(tasks[0]["name"], json!("Task 1"));

    server.shutdown();
}

#[tokio::test]
async fn test_connection_refused_is_not_sticky() {
    // Bind and drop to get a port nothing listens on.
    let addr = {
        let probe = WebSocketListener::bind("127.0.0.1:0", WebSocketConfig::default())
            .await
            .unwrap();
        probe.socket_addr().unwrap()
    };
    let client = ConnectionManager::new(
        WebSocketConnector::new(format!("ws://{addr}/rpc"), WebSocketConfig::default()),
        ClientConfig::default().with_request_timeout(Duration::from_secs(5)),
    );

    let err = client.call("getTasks", json!({})).await.unwrap_err();
    assert!(matches!(err, CallError::Connection(_)));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_server_shutdown_fails_outstanding_websocket_call() {
    let runtime = Runtime::new(ServerConfig::default(), SupervisorConfig::default());
    runtime.install(
        MethodDefinition::from_fn("sleep", |_ctx: RequestContext| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Value::Null)
        })
        .into(),
    );
    let server = runtime.server();
    let url = start(server.clone(), WebSocketConfig::default()).await;
    let client = ConnectionManager::new(
        WebSocketConnector::new(url, WebSocketConfig::default()),
        ClientConfig::default().without_request_timeout(),
    );

    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call("sleep", Value::Null).await }
    });
    while client.pending_count().await == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    server.shutdown();
    let result = tokio::time::timeout(Duration::from_secs(5), call)
        .await
        .expect("outstanding call must fail when the server goes away")
        .unwrap();
    assert!(matches!(result, Err(CallError::ConnectionClosed)));
}

#[tokio::test]
async fn test_runtime_hosts_workers_beside_rpc() {
    let runtime = task_runtime();
    runtime.install(
        WorkerDefinition::from_fn("heartbeat", |ctx: WorkerContext| async move {
            ctx.cancelled().await;
            Ok(())
        })
        .with_options(WorkerOptions::default())
        .into(),
    );
    let url = start(runtime.server(), WebSocketConfig::default()).await;
    let client = ConnectionManager::new(
        WebSocketConnector::new(url, WebSocketConfig::default()),
        ClientConfig::default(),
    );

    assert!(client.call("getTasks", json!({})).await.is_ok());
    assert_eq!(runtime.supervisor().active_workers().len(), 1);

    runtime.shutdown().await;
    assert!(runtime.supervisor().active_workers().is_empty());
}
