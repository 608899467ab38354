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

//! Caller side: outstanding calls and their delivery queues.
//!
//! Every call owns a single-consumer queue. The session's receive task is
//! the only producer: it pushes progressive results and finally the
//! terminal outcome, in arrival order. The calling task is the only
//! consumer: it runs the progress handler for each progressive result and
//! returns once the terminal outcome arrives. Ordering of progress before
//! the terminal result therefore holds by construction.
//!
//! Pushing never waits. A slow progress handler only grows its own call's
//! backlog; the receive task keeps serving every other call and invocation
//! of the session.

use super::{CallResult, ClientMetrics};
use crate::error::ClientError;
use crate::transport::MessageSink;
use crate::wamp::{
    CallOptions, CancelMode, CancelOptions, Dict, List, Message, RequestId, RequestIdGenerator,
    Uri, Value,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "observability")]
use tracing::{debug, instrument};

/// Callback run for each progressive result, in arrival order.
pub type ProgressHandler = Box<dyn FnMut(&CallResult) + Send>;

/// A remote call, ready to be issued with [`Client::call`].
///
/// Supplying a progress handler makes the call advertise `receive_progress`.
///
/// # Examples
///
/// ```rust
/// use wamprpc::client::CallRequest;
/// use wamprpc::wamp::CancelMode;
/// use serde_json::json;
/// use std::time::Duration;
///
/// let request = CallRequest::new("com.example.progress")
///     .args(vec![json!(1), json!(2)])
///     .timeout(Duration::from_secs(1))
///     .cancel_mode(CancelMode::Kill)
///     .on_progress(|result| println!("progress: {:?}", result.args));
///
/// let options = request.options();
/// assert_eq!(options.timeout, Some(1000));
/// assert!(options.receive_progress);
/// ```
///
/// [`Client::call`]: super::Client::call
pub struct CallRequest {
    procedure: Uri,
    args: List,
    kwargs: Dict,
    timeout: Option<Duration>,
    cancel_mode: Option<CancelMode>,
    on_progress: Option<ProgressHandler>,
}

impl CallRequest {
    /// A call to `procedure` without arguments.
    pub fn new(procedure: impl Into<Uri>) -> Self {
        Self {
            procedure: procedure.into(),
            args: List::new(),
            kwargs: Dict::new(),
            timeout: None,
            cancel_mode: None,
            on_progress: None,
        }
    }

    /// Sets the positional arguments.
    pub fn args(mut self, args: List) -> Self {
        self.args = args;
        self
    }

    /// Appends one positional argument.
    pub fn arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the keyword arguments.
    pub fn kwargs(mut self, kwargs: Dict) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Asks the router to cancel the call after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sends CANCEL with `mode` if the caller abandons the call.
    ///
    /// Without a cancel mode a locally abandoned call is only forgotten; the
    /// callee is not told.
    pub fn cancel_mode(mut self, mode: CancelMode) -> Self {
        self.cancel_mode = Some(mode);
        self
    }

    /// Runs `handler` for every progressive result.
    pub fn on_progress<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&CallResult) + Send + 'static,
    {
        self.on_progress = Some(Box::new(handler));
        self
    }

    /// Returns the procedure being called.
    pub fn procedure(&self) -> &Uri {
        &self.procedure
    }

    /// Returns the CALL options this request will be sent with.
    pub fn options(&self) -> CallOptions {
        CallOptions {
            timeout: self.timeout.map(timeout_millis),
            receive_progress: self.on_progress.is_some(),
        }
    }
}

/// Whole milliseconds, rounded up so a short timeout never reads as none.
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

impl fmt::Debug for CallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRequest")
            .field("procedure", &self.procedure)
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .field("timeout", &self.timeout)
            .field("cancel_mode", &self.cancel_mode)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// One entry in a call's delivery queue.
#[derive(Debug)]
pub(crate) enum CallEvent {
    Progress(CallResult),
    Done(Result<CallResult, ClientError>),
}

impl CallEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, CallEvent::Done(_))
    }
}

#[derive(Debug, Default)]
struct CallTable {
    closed: bool,
    calls: HashMap<RequestId, mpsc::UnboundedSender<CallEvent>>,
}

/// Outstanding calls of one session, keyed by request id.
#[derive(Debug)]
pub(crate) struct CallTracker {
    table: Mutex<CallTable>,
    ids: Arc<RequestIdGenerator>,
}

impl CallTracker {
    pub(crate) fn new(ids: Arc<RequestIdGenerator>) -> Self {
        Self {
            table: Mutex::new(CallTable::default()),
            ids,
        }
    }

    /// Registers a pending call under a fresh request id.
    ///
    /// Ids still held by a live call are skipped. Returns `None` once the
    /// tracker is closed.
    pub(crate) fn register(&self) -> Option<(RequestId, mpsc::UnboundedReceiver<CallEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut table = self.table.lock();
        if table.closed {
            return None;
        }
        let request = loop {
            let id = self.ids.next();
            if !table.calls.contains_key(&id) {
                break id;
            }
        };
        table.calls.insert(request, tx);
        Some((request, rx))
    }

    /// Forgets a call. Anything arriving for it later is discarded.
    pub(crate) fn deregister(&self, request: RequestId) -> bool {
        self.table.lock().calls.remove(&request).is_some()
    }

    /// Queues `event` for the call without waiting.
    ///
    /// A terminal event deregisters the call before it is queued. Returns
    /// `false` if the call is unknown or its caller has gone away.
    pub(crate) fn deliver(&self, request: RequestId, event: CallEvent) -> bool {
        let tx = {
            let mut table = self.table.lock();
            if event.is_terminal() {
                table.calls.remove(&request)
            } else {
                table.calls.get(&request).cloned()
            }
        };
        match tx {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Drops every delivery queue and refuses new calls. Each waiting
    /// caller drains what was already queued and then resolves with
    /// [`ClientError::NotConnected`].
    pub(crate) fn close(&self) -> usize {
        let mut table = self.table.lock();
        table.closed = true;
        let pending = table.calls.len();
        table.calls.clear();
        pending
    }

    pub(crate) fn len(&self) -> usize {
        self.table.lock().calls.len()
    }

    /// Issues a call and waits until it is done.
    ///
    /// The call is done on the first of: terminal RESULT or ERROR, session
    /// close, or `cancel` firing. It is deregistered on every exit path,
    /// including the returned future being dropped.
    #[cfg_attr(
        feature = "observability",
        instrument(skip_all, fields(procedure = %request.procedure))
    )]
    pub(crate) async fn issue(
        &self,
        sink: &dyn MessageSink,
        request: CallRequest,
        cancel: &CancellationToken,
        metrics: &ClientMetrics,
    ) -> Result<CallResult, ClientError> {
        let options = request.options();
        let CallRequest {
            procedure,
            args,
            kwargs,
            cancel_mode,
            mut on_progress,
            ..
        } = request;

        let Some((id, mut rx)) = self.register() else {
            return Err(ClientError::NotConnected);
        };
        let _registered = Registered { tracker: self, request: id };

        let call = Message::Call {
            request: id,
            options,
            procedure,
            args,
            kwargs,
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ClientError::Canceled),
            sent = sink.send(call) => {
                if sent.is_err() {
                    return Err(ClientError::NotConnected);
                }
            }
        }
        metrics.record_call_issued();

        #[cfg(feature = "observability")]
        debug!(request = %id, "Call issued");

        loop {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    self.deregister(id);
                    if let Some(mode) = cancel_mode {
                        let _ = sink.try_send(Message::Cancel {
                            request: id,
                            options: CancelOptions { mode },
                        });
                    }
                    metrics.record_call_failed();

                    #[cfg(feature = "observability")]
                    debug!(request = %id, mode = ?cancel_mode, "Call canceled by caller");
                    return Err(ClientError::Canceled);
                }
                event = rx.recv() => event,
            };

            match event {
                Some(CallEvent::Progress(result)) => {
                    metrics.record_progress_received();
                    if let Some(handler) = on_progress.as_mut() {
                        handler(&result);
                    }
                }
                Some(CallEvent::Done(outcome)) => {
                    match &outcome {
                        Ok(_) => metrics.record_call_succeeded(),
                        Err(_) => metrics.record_call_failed(),
                    }
                    return outcome;
                }
                None => {
                    metrics.record_call_failed();
                    return Err(ClientError::NotConnected);
                }
            }
        }
    }
}

/// Deregisters a call when the issuing future ends or is dropped.
struct Registered<'a> {
    tracker: &'a CallTracker,
    request: RequestId,
}

impl Drop for Registered<'_> {
    fn drop(&mut self) {
        self.tracker.deregister(self.request);
    }
}
