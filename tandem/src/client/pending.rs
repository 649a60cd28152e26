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

//! Tracking of in-flight calls awaiting responses.

use crate::protocol::RequestId;
use std::collections::HashMap;
use tokio::sync::{Mutex, oneshot};

/// Tracks pending calls awaiting responses.
///
/// Maps each correlation id to the completion handle of the caller that
/// issued it, so responses find their caller even when many calls are in
/// flight and the server answers out of order.
///
/// [`fail_all`](Self::fail_all) closes the table for good. Calls registered
/// afterwards get a receiver that is already closed.
///
/// # Example
///
/// ```rust
/// use tandem::client::PendingCalls;
/// use tandem::protocol::RequestId;
///
/// # async fn example() {
/// let pending = PendingCalls::<String>::new();
/// let id = RequestId::from("a1");
///
/// let rx = pending.register(id.clone()).await;
/// pending.complete(&id, "response".to_string()).await;
/// assert_eq!(rx.await.unwrap(), "response");
/// # }
/// ```
#[derive(Debug)]
pub struct PendingCalls<T> {
    table: Mutex<Table<T>>,
}

#[derive(Debug)]
struct Table<T> {
    calls: HashMap<RequestId, oneshot::Sender<T>>,
    closed: bool,
}

impl<T> PendingCalls<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                calls: HashMap::new(),
                closed: false,
            }),
        }
    }

    /// Registers a pending call and returns the receiver its caller awaits.
    ///
    /// Registering an id that is already pending replaces the older entry,
    /// whose receiver then observes a closed channel. Once the table is
    /// closed the returned receiver is closed as well.
    pub async fn register(&self, id: RequestId) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        let mut table = self.table.lock().await;
        if !table.closed {
            table.calls.insert(id, tx);
        }
        rx
    }

    /// Completes and removes the call with the given id.
    ///
    /// Returns `false` if no such call is pending or its caller has gone away.
    pub async fn complete(&self, id: &RequestId, outcome: T) -> bool {
        match self.table.lock().await.calls.remove(id) {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Removes a pending call without completing it.
    pub async fn cancel(&self, id: &RequestId) -> bool {
        self.table.lock().await.calls.remove(id).is_some()
    }

    /// Completes every pending call with an outcome built by `outcome` and
    /// closes the table.
    ///
    /// Returns the number of calls that were pending.
    pub async fn fail_all(&self, outcome: impl Fn() -> T) -> usize {
        let drained: Vec<_> = {
            let mut table = self.table.lock().await;
            table.closed = true;
            table.calls.drain().collect()
        };
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(outcome());
        }
        count
    }

    /// Returns the number of pending calls.
    pub async fn len(&self) -> usize {
        self.table.lock().await.calls.len()
    }

    /// Returns `true` if nothing is pending.
    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.calls.is_empty()
    }

    /// Returns `true` once [`fail_all`](Self::fail_all) has run.
    pub async fn is_closed(&self) -> bool {
        self.table.lock().await.closed
    }
}

impl<T> Default for PendingCalls<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_complete() {
        let pending = PendingCalls::<String>::new();
        let id = RequestId::from("42");
        let rx = pending.register(id.clone()).await;

        assert_eq!(pending.len().await, 1);
        assert!(pending.complete(&id, "response".to_string()).await);
        assert_eq!(rx.await.unwrap(), "response");
        assert!(pending.is_empty().await);
    }

    #[tokio::test]
    async fn test_complete_unknown_id() {
        let pending = PendingCalls::<String>::new();
        assert!(!pending.complete(&RequestId::from(99), "late".to_string()).await);
    }

    #[tokio::test]
    async fn test_cancel() {
        let pending = PendingCalls::<String>::new();
        let id = RequestId::from("gone");
        let rx = pending.register(id.clone()).await;

        assert!(pending.cancel(&id).await);
        assert!(rx.await.is_err());
        assert!(!pending.cancel(&id).await);
    }

    #[tokio::test]
    async fn test_out_of_order_completion() {
        let pending = PendingCalls::<u32>::new();
        let rx1 = pending.register(RequestId::from("1")).await;
        let rx2 = pending.register(RequestId::from("2")).await;
        let rx3 = pending.register(RequestId::from("3")).await;

        pending.complete(&RequestId::from("3"), 3).await;
        pending.complete(&RequestId::from("1"), 1).await;
        pending.complete(&RequestId::from("2"), 2).await;

        assert_eq!(rx1.await.unwrap(), 1);
        assert_eq!(rx2.await.unwrap(), 2);
        assert_eq!(rx3.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_fail_all_drains_table() {
        let pending = PendingCalls::<Result<(), &'static str>>::new();
        let rx1 = pending.register(RequestId::from("a")).await;
        let rx2 = pending.register(RequestId::from("b")).await;

        assert_eq!(pending.fail_all(|| Err("closed")).await, 2);
        assert_eq!(rx1.await.unwrap(), Err("closed"));
        assert_eq!(rx2.await.unwrap(), Err("closed"));
        assert!(pending.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_after_fail_all_is_closed() {
        let pending = PendingCalls::<Result<(), &'static str>>::new();
        assert_eq!(pending.fail_all(|| Err("closed")).await, 0);
        assert!(pending.is_closed().await);

        let rx = pending.register(RequestId::from("late")).await;
        assert!(rx.await.is_err());
        assert!(pending.is_empty().await);
    }
}
