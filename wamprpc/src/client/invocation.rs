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

//! Callee side: running invocations, progress sends and completion.
//!
//! Each INVOCATION gets an [`InvocationState`] holding its lifecycle phase
//! and the sticky `accepting` flag behind one mutex, plus the cancellation
//! token its handler observes. The handler runs on its own task. Progress
//! sends and the terminal reply are serialized per invocation, so nothing
//! can follow the terminal reply.
//!
//! ```text
//! Running ──INTERRUPT──▶ Cancelled(mode)
//!    │
//!    └──handler returns──▶ Completed
//! ```
//!
//! An invocation leaves the running table as soon as it leaves `Running`.

use super::{ClientMetrics, InvokeResult};
use crate::backpressure::{RetryMetrics, RetryOutcome, RetryPolicy, send_with_retry};
use crate::codec::{ArgsError, FromArgs, unpack, unpack_dict};
use crate::error::ProgressError;
use crate::transport::MessageSink;
use crate::wamp::{
    CancelMode, Dict, InvocationDetails, List, Message, MessageType, RegistrationId, RequestId,
    Uri, YieldOptions,
};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "observability")]
use tracing::{debug, warn};

/// An invocation handler.
///
/// [`Client::register`](super::Client::register) wraps plain async
/// closures into this form.
pub type Handler = Arc<dyn Fn(Invocation) -> BoxFuture<'static, InvokeResult> + Send + Sync>;

/// Lifecycle phase of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Running,
    Cancelled(CancelMode),
    Completed,
}

#[derive(Debug)]
pub(super) struct Lifecycle {
    pub(super) phase: Phase,
    pub(super) accepting: bool,
}

/// Shared state of one invocation.
#[derive(Debug)]
pub(crate) struct InvocationState {
    pub(super) request: RequestId,
    pub(super) lifecycle: Mutex<Lifecycle>,
    pub(super) cancel: CancellationToken,
    ordered: tokio::sync::Mutex<()>,
}

impl InvocationState {
    pub(crate) fn new(request: RequestId, receive_progress: bool) -> Self {
        Self {
            request,
            lifecycle: Mutex::new(Lifecycle {
                phase: Phase::Running,
                accepting: receive_progress,
            }),
            cancel: CancellationToken::new(),
            ordered: tokio::sync::Mutex::new(()),
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.lifecycle.lock().phase
    }

    /// True while running and the caller still takes progressive results.
    pub(crate) fn is_accepting(&self) -> bool {
        let lifecycle = self.lifecycle.lock();
        lifecycle.accepting && lifecycle.phase == Phase::Running
    }

    /// Stops accepting progress for good.
    pub(crate) fn reject(&self) {
        self.lifecycle.lock().accepting = false;
    }

    /// Marks the handler as returned and reports the phase it left.
    fn finish(&self) -> Phase {
        let previous = {
            let mut lifecycle = self.lifecycle.lock();
            let previous = lifecycle.phase;
            lifecycle.accepting = false;
            if previous == Phase::Running {
                lifecycle.phase = Phase::Completed;
            }
            previous
        };
        self.cancel.cancel();
        previous
    }
}

/// Running invocations of one session, keyed by request id.
pub(crate) struct InvocationTracker {
    pub(super) running: Mutex<HashMap<RequestId, Arc<InvocationState>>>,
    sink: Arc<dyn MessageSink>,
    retry_policy: Arc<dyn RetryPolicy>,
    retry_metrics: RetryMetrics,
    pub(super) metrics: Arc<ClientMetrics>,
    pub(super) shutdown: CancellationToken,
}

impl fmt::Debug for InvocationTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationTracker")
            .field("running", &self.running.lock().len())
            .field("retry_policy", &self.retry_policy.name())
            .finish()
    }
}

impl InvocationTracker {
    pub(crate) fn new(
        sink: Arc<dyn MessageSink>,
        retry_policy: Arc<dyn RetryPolicy>,
        metrics: Arc<ClientMetrics>,
    ) -> Self {
        Self {
            running: Mutex::new(HashMap::new()),
            sink,
            retry_policy,
            retry_metrics: RetryMetrics::new(),
            metrics,
            shutdown: CancellationToken::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.running.lock().len()
    }

    pub(crate) fn retry_metrics(&self) -> &RetryMetrics {
        &self.retry_metrics
    }

    /// Starts `handler` for an INVOCATION on its own task.
    ///
    /// Returns `false` without running anything if an invocation with the
    /// same request id is still running.
    pub(crate) fn dispatch(
        self: &Arc<Self>,
        request: RequestId,
        registration: RegistrationId,
        details: InvocationDetails,
        args: List,
        kwargs: Dict,
        handler: Handler,
    ) -> bool {
        let state = Arc::new(InvocationState::new(request, details.receive_progress));
        {
            let mut running = self.running.lock();
            if running.contains_key(&request) {
                #[cfg(feature = "observability")]
                warn!(request = %request, "Duplicate INVOCATION ignored");
                return false;
            }
            running.insert(request, Arc::clone(&state));
        }

        let invocation = Invocation {
            request,
            registration,
            details,
            args,
            kwargs,
            progress: ProgressSender {
                tracker: Arc::clone(self),
                state: Arc::clone(&state),
            },
        };

        self.metrics.record_handler_started();
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            let result = AssertUnwindSafe(handler(invocation))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    #[cfg(feature = "observability")]
                    warn!(request = %state.request, "Invocation handler panicked");
                    InvokeResult::canceled()
                });
            tracker.complete(&state, result).await;
            tracker.metrics.record_handler_finished();
        });
        true
    }

    /// Sends one progressive result, retrying under backpressure.
    async fn send_progress(
        &self,
        state: &InvocationState,
        args: List,
        kwargs: Dict,
    ) -> Result<(), ProgressError> {
        let _ordered = state.ordered.lock().await;
        if !state.is_accepting() {
            self.metrics.record_progress_rejected();
            return Err(ProgressError::CallerNotAccepting);
        }

        let message = Message::Yield {
            request: state.request,
            options: YieldOptions { progress: true },
            args,
            kwargs,
        };
        let outcome = send_with_retry(
            self.sink.as_ref(),
            message,
            self.retry_policy.as_ref(),
            &self.retry_metrics,
            &state.cancel,
        )
        .await;

        match outcome {
            RetryOutcome::Sent { .. } => {
                self.metrics.record_progress_sent();
                Ok(())
            }
            _terminal => {
                state.reject();
                self.metrics.record_progress_rejected();

                #[cfg(feature = "observability")]
                debug!(
                    request = %state.request,
                    outcome = ?_terminal,
                    "Caller stopped accepting progress"
                );
                Err(ProgressError::CallerNotAccepting)
            }
        }
    }

    /// Sends the terminal reply for a returned handler, if one is owed, and
    /// retires the invocation.
    ///
    /// A running invocation answers with its result. One cancelled in `kill`
    /// mode answers with ERROR(canceled) whatever the handler returned. Any
    /// other cancelled invocation sends nothing.
    async fn complete(&self, state: &InvocationState, result: InvokeResult) {
        let _ordered = state.ordered.lock().await;
        let previous = state.finish();
        {
            let mut running = self.running.lock();
            if running
                .get(&state.request)
                .is_some_and(|current| std::ptr::eq(current.as_ref(), state))
            {
                running.remove(&state.request);
            }
        }

        let reply = match previous {
            Phase::Running => terminal_reply(state.request, result),
            Phase::Cancelled(CancelMode::Kill) => {
                terminal_reply(state.request, InvokeResult::canceled())
            }
            Phase::Cancelled(_) | Phase::Completed => {
                #[cfg(feature = "observability")]
                debug!(
                    request = %state.request,
                    phase = ?previous,
                    "Result of cancelled invocation dropped"
                );
                return;
            }
        };

        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => {}
            sent = self.sink.send(reply) => {
                if let Err(_e) = sent {
                    #[cfg(feature = "observability")]
                    debug!(request = %state.request, error = %_e, "Terminal reply not delivered");
                }
            }
        }
    }
}

fn terminal_reply(request: RequestId, result: InvokeResult) -> Message {
    match result.error {
        Some(error) => Message::Error {
            request_type: MessageType::Invocation,
            request,
            details: Dict::new(),
            error,
            args: result.args,
            kwargs: result.kwargs,
        },
        None => Message::Yield {
            request,
            options: YieldOptions::default(),
            args: result.args,
            kwargs: result.kwargs,
        },
    }
}

/// Sends progressive results for one invocation.
///
/// Cloneable, so a handler can hand it to helper tasks. Every clone shares
/// the invocation's sticky state.
#[derive(Clone)]
pub struct ProgressSender {
    tracker: Arc<InvocationTracker>,
    state: Arc<InvocationState>,
}

impl ProgressSender {
    /// Sends one progressive result.
    ///
    /// A full link is retried according to the session's retry policy and
    /// only shows up as latency. Once the caller is gone, the invocation was
    /// interrupted, the retry budget ran out, or the handler returned, every
    /// call fails with [`ProgressError::CallerNotAccepting`] without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// [`ProgressError::CallerNotAccepting`], sticky once returned.
    pub async fn send(&self, args: List, kwargs: Dict) -> Result<(), ProgressError> {
        self.tracker.send_progress(&self.state, args, kwargs).await
    }

    /// Returns `true` while progressive results can still be sent.
    pub fn is_accepting(&self) -> bool {
        self.state.is_accepting()
    }
}

impl fmt::Debug for ProgressSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSender")
            .field("request", &self.state.request)
            .field("accepting", &self.state.is_accepting())
            .finish()
    }
}

/// One inbound call, handed to the registered handler.
#[derive(Debug)]
pub struct Invocation {
    /// Request id of the invocation.
    pub request: RequestId,
    /// Registration the call was matched to.
    pub registration: RegistrationId,
    /// Invocation details.
    pub details: InvocationDetails,
    /// Positional arguments.
    pub args: List,
    /// Keyword arguments.
    pub kwargs: Dict,
    progress: ProgressSender,
}

impl Invocation {
    /// Sends one progressive result. See [`ProgressSender::send`].
    ///
    /// # Errors
    ///
    /// [`ProgressError::CallerNotAccepting`], sticky once returned.
    pub async fn send_progress(&self, args: List, kwargs: Dict) -> Result<(), ProgressError> {
        self.progress.send(args, kwargs).await
    }

    /// Returns a cloneable handle for sending progressive results.
    pub fn progress_sender(&self) -> ProgressSender {
        self.progress.clone()
    }

    /// Resolves once the invocation is interrupted, the session closes or
    /// the handler has returned.
    pub async fn cancelled(&self) {
        self.progress.state.cancel.cancelled().await;
    }

    /// Returns `true` once [`cancelled`](Self::cancelled) would resolve.
    pub fn is_cancelled(&self) -> bool {
        self.progress.state.cancel.is_cancelled()
    }

    /// Returns a token cancelled together with this invocation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.progress.state.cancel.child_token()
    }

    /// The procedure the caller named, when known.
    pub fn procedure(&self) -> Option<&Uri> {
        self.details.procedure.as_ref()
    }

    /// Decodes the positional arguments.
    ///
    /// # Errors
    ///
    /// See [`unpack`].
    pub fn unpack<T: FromArgs>(&self) -> Result<T, ArgsError> {
        unpack(&self.args)
    }

    /// Decodes the keyword arguments.
    ///
    /// # Errors
    ///
    /// See [`unpack_dict`].
    pub fn unpack_kwargs<T: DeserializeOwned>(&self) -> Result<T, ArgsError> {
        unpack_dict(&self.kwargs)
    }
}
