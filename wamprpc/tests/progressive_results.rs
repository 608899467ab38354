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

//! Integration tests for progressive call results.

mod common;

use common::{Dealer, init_tracing, wait_until};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wamprpc::client::{CallRequest, Invocation, InvokeResult};
use wamprpc::codec::{as_i64, as_str};
use wamprpc::wamp::{Dict, FEATURE_PROGRESSIVE_CALL_RESULTS, ROLE_DEALER, Uri};
use wamprpc::{ClientError, ProgressError};

const PROG_PROC: &str = "test.progress.sum";

async fn sum_with_progress(inv: Invocation) -> InvokeResult {
    for word in ["Alpha", "Bravo", "Charlie"] {
        if let Err(e) = inv.send_progress(vec![json!(word)], Dict::new()).await {
            return InvokeResult::err_with_message(Uri::CANCELED, e.to_string());
        }
    }
    let sum: i64 = inv.args.iter().filter_map(as_i64).sum();
    InvokeResult::ok(vec![json!(sum)])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_progressive_results_in_order() {
    init_tracing();
    let dealer = Dealer::new();
    let callee = dealer.connect("callee");
    assert!(callee.has_feature(ROLE_DEALER, FEATURE_PROGRESSIVE_CALL_RESULTS));
    callee.register(PROG_PROC, sum_with_progress).await.unwrap();

    let caller = dealer.connect("caller");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let progress = Arc::clone(&seen);
    let request = CallRequest::new(PROG_PROC)
        .args((1..=10).map(|n| json!(n)).collect())
        .on_progress(move |result| {
            if let Some(word) = result.args.first().and_then(as_str) {
                progress.lock().push(word.to_string());
            }
        });

    let result = caller.call(request).await.unwrap();
    let (sum,): (i64,) = result.unpack().unwrap();
    assert_eq!(sum, 55);
    assert!(!result.is_progress());
    assert_eq!(*seen.lock(), vec!["Alpha", "Bravo", "Charlie"]);
    assert_eq!(caller.metrics().progress_received(), 3);
    assert_eq!(callee.metrics().progress_sent(), 3);

    callee.unregister(PROG_PROC).await.unwrap();
    caller.close().await.unwrap();
    callee.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_caller_without_progress_handler_gets_only_final() {
    init_tracing();
    let dealer = Dealer::new();
    let callee = dealer.connect("callee");

    let outcome = Arc::new(Mutex::new(None));
    let recorded = Arc::clone(&outcome);
    callee
        .register(PROG_PROC, move |inv: Invocation| {
            let recorded = Arc::clone(&recorded);
            async move {
                let first = inv.send_progress(vec![json!("Alpha")], Dict::new()).await;
                let second = inv.send_progress(vec![json!("Bravo")], Dict::new()).await;
                *recorded.lock() = Some((first, second));
                InvokeResult::ok(vec![json!("final")])
            }
        })
        .await
        .unwrap();

    let caller = dealer.connect("caller");
    let result = caller.call(CallRequest::new(PROG_PROC)).await.unwrap();
    assert_eq!(result.args, vec![json!("final")]);
    assert_eq!(
        outcome.lock().take(),
        Some((
            Err(ProgressError::CallerNotAccepting),
            Err(ProgressError::CallerNotAccepting)
        ))
    );
    assert_eq!(caller.metrics().progress_received(), 0);

    caller.close().await.unwrap();
    callee.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_handler_error_reaches_caller() {
    init_tracing();
    let dealer = Dealer::new();
    let callee = dealer.connect("callee");
    callee
        .register("test.fail", |inv: Invocation| async move {
            match inv.unpack::<(i64,)>() {
                Ok(_) => InvokeResult::ok(vec![]),
                Err(e) => InvokeResult::err_with_message(Uri::INVALID_ARGUMENT, e.to_string()),
            }
        })
        .await
        .unwrap();

    let caller = dealer.connect("caller");
    let error = caller
        .call(CallRequest::new("test.fail").arg("not a number"))
        .await
        .unwrap_err();
    let rpc = error.as_rpc().unwrap();
    assert_eq!(rpc.error, Uri::INVALID_ARGUMENT);
    assert!(rpc.message().is_some());
    assert!(!error.is_remote_cancel());

    caller.close().await.unwrap();
    callee.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unknown_procedure() {
    init_tracing();
    let dealer = Dealer::new();
    let caller = dealer.connect("caller");
    let error = caller
        .call(CallRequest::new("test.nobody"))
        .await
        .unwrap_err();
    assert!(matches!(&error, ClientError::Rpc(rpc) if rpc.error == Uri::NO_SUCH_PROCEDURE));
    assert_eq!(caller.active_calls(), 0);
    caller.close().await.unwrap();
    assert!(wait_until(Duration::from_secs(5), || dealer.peers() == 0).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_calls() {
    init_tracing();
    let dealer = Dealer::new();
    let callee = dealer.connect("callee");
    callee.register(PROG_PROC, sum_with_progress).await.unwrap();

    let caller = Arc::new(dealer.connect("caller"));
    let mut tasks = Vec::new();
    for n in 1..=20_i64 {
        let caller = Arc::clone(&caller);
        tasks.push(tokio::spawn(async move {
            let count = Arc::new(Mutex::new(0));
            let counter = Arc::clone(&count);
            let result = caller
                .call(
                    CallRequest::new(PROG_PROC)
                        .arg(n)
                        .arg(n)
                        .on_progress(move |_| *counter.lock() += 1),
                )
                .await
                .unwrap();
            let (sum,): (i64,) = result.unpack().unwrap();
            assert_eq!(sum, 2 * n);
            assert_eq!(*count.lock(), 3);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(caller.active_calls(), 0);
    assert!(wait_until(Duration::from_secs(5), || callee.metrics().active_handlers() == 0).await);
    assert_eq!(dealer.pending(), 0);
    caller.close().await.unwrap();
    callee.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_progress_handler_does_not_stall_other_calls() {
    init_tracing();
    let dealer = Dealer::new();
    let callee = dealer.connect("callee");
    callee
        .register("test.progress.stream", |inv: Invocation| async move {
            for n in 0..150 {
                if inv.send_progress(vec![json!(n)], Dict::new()).await.is_err() {
                    return InvokeResult::canceled();
                }
            }
            InvokeResult::ok(vec![json!(150)])
        })
        .await
        .unwrap();
    callee
        .register("test.echo", |inv: Invocation| async move {
            InvokeResult::ok(inv.args.clone())
        })
        .await
        .unwrap();

    let caller = Arc::new(dealer.connect("caller"));
    let seen = Arc::new(Mutex::new(0));
    let slow = {
        let caller = Arc::clone(&caller);
        let counter = Arc::clone(&seen);
        tokio::spawn(async move {
            let request = CallRequest::new("test.progress.stream").on_progress(move |_| {
                *counter.lock() += 1;
                std::thread::sleep(Duration::from_millis(20));
            });
            caller.call(request).await
        })
    };
    assert!(wait_until(Duration::from_secs(5), || *seen.lock() > 0).await);

    // The slow call's backlog must not hold up an unrelated call.
    let started = Instant::now();
    let fast = caller
        .call(CallRequest::new("test.echo").arg("ping"))
        .await
        .unwrap();
    let elapsed = started.elapsed();
    assert_eq!(fast.args, vec![json!("ping")]);
    assert!(
        elapsed < Duration::from_millis(500),
        "unrelated call took {elapsed:?}"
    );

    let result = slow.await.unwrap().unwrap();
    assert_eq!(result.args, vec![json!(150)]);
    assert_eq!(*seen.lock(), 150);

    caller.close().await.unwrap();
    callee.close().await.unwrap();
}
