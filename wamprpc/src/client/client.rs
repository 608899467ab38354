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

//! The client session and its receive task.

use super::call::{CallEvent, CallTracker};
use super::invocation::InvocationTracker;
use super::pending::PendingRequests;
use super::registry::Registry;
use super::{
    CallRequest, CallResult, ClientConfig, ClientMetrics, Handler, Invocation, InvokeResult,
};
use crate::backpressure::RetryMetrics;
use crate::error::{ClientError, RpcError};
use crate::transport::{MemoryTransport, MessageSink, MessageSource};
use crate::wamp::{
    Dict, Message, MessageType, RegistrationId, RequestId, RequestIdGenerator, RouterRoles, Uri,
};
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "observability")]
use tracing::{debug, info, warn};

/// A client session attached to a router.
///
/// The session owns a background task that reads every message the router
/// sends and routes it by request id to the call or invocation it belongs
/// to. Calls and registrations can be issued concurrently from any number of
/// tasks through a shared reference.
///
/// Closing the session, or losing the link to the router, resolves every
/// outstanding call with [`ClientError::NotConnected`] and cancels every
/// running invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use wamprpc::client::{CallRequest, Client, ClientConfig, InvokeResult};
/// use wamprpc::transport::MemoryTransport;
/// use wamprpc::wamp::Uri;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), wamprpc::ClientError> {
/// let (local, _router_side) = MemoryTransport::default_pair();
/// let client = Client::from_memory(ClientConfig::default(), local);
///
/// client
///     .register("com.example.add", |inv| async move {
///         let (a, b): (i64, i64) = match inv.unpack() {
///             Ok(args) => args,
///             Err(e) => {
///                 return InvokeResult::err_with_message(Uri::INVALID_ARGUMENT, e.to_string());
///             }
///         };
///         InvokeResult::ok(vec![json!(a + b)])
///     })
///     .await?;
///
/// let result = client
///     .call(CallRequest::new("com.example.add").arg(2).arg(3))
///     .await?;
/// let (sum,): (i64,) = result.unpack()?;
/// assert_eq!(sum, 5);
///
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    inner: Arc<ClientInner>,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

struct ClientInner {
    name: String,
    sink: Arc<dyn MessageSink>,
    ids: Arc<RequestIdGenerator>,
    calls: CallTracker,
    invocations: Arc<InvocationTracker>,
    registry: Registry,
    acks: PendingRequests<Message>,
    roles: RouterRoles,
    metrics: Arc<ClientMetrics>,
    closing: AtomicBool,
    closed: AtomicBool,
    shutdown: CancellationToken,
    done: CancellationToken,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.inner.name)
            .field("closed", &self.is_closed())
            .field("active_calls", &self.active_calls())
            .field("running_invocations", &self.running_invocations())
            .field("registry", &self.inner.registry)
            .finish()
    }
}

impl Client {
    /// Opens a session over an established link to the router.
    ///
    /// Spawns the receive task, so this must be called from within a tokio
    /// runtime.
    pub fn new<S, R>(config: ClientConfig, sink: S, source: R) -> Self
    where
        S: MessageSink,
        R: MessageSource,
    {
        let sink: Arc<dyn MessageSink> = Arc::new(sink);
        let ids = Arc::new(RequestIdGenerator::new());
        let metrics = Arc::new(ClientMetrics::new());

        let inner = Arc::new(ClientInner {
            calls: CallTracker::new(Arc::clone(&ids)),
            invocations: Arc::new(InvocationTracker::new(
                Arc::clone(&sink),
                config.retry_policy,
                Arc::clone(&metrics),
            )),
            name: config.client_name,
            sink,
            ids,
            registry: Registry::new(),
            acks: PendingRequests::new(),
            roles: config.router_roles,
            metrics,
            closing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            done: CancellationToken::new(),
        });

        #[cfg(feature = "observability")]
        info!(client = %inner.name, "Session opened");

        let task = tokio::spawn(receive_loop(Arc::clone(&inner), source));
        Self {
            inner,
            task: parking_lot::Mutex::new(Some(task)),
        }
    }

    /// Opens a session over one end of an in-memory link.
    pub fn from_memory(config: ClientConfig, transport: MemoryTransport) -> Self {
        let (sink, source) = transport.into_split();
        Self::new(config, sink, source)
    }

    /// Registers `handler` for `procedure` and waits for the router to
    /// accept it.
    ///
    /// The handler runs on its own task for every invocation.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AlreadyRegistered`] if this session already
    ///   registered, or is registering, the procedure
    /// - [`ClientError::Rpc`] if the router refused the registration
    /// - [`ClientError::NotConnected`] if the session closed first
    pub async fn register<F, Fut>(
        &self,
        procedure: impl Into<Uri>,
        handler: F,
    ) -> Result<RegistrationId, ClientError>
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InvokeResult> + Send + 'static,
    {
        let procedure = procedure.into();
        let handler: Handler = Arc::new(move |invocation| handler(invocation).boxed());

        let request = self.inner.ids.next();
        if !self.inner.registry.reserve(request, procedure.clone(), handler) {
            return Err(ClientError::AlreadyRegistered { procedure });
        }
        let _reservation = Reservation {
            registry: &self.inner.registry,
            request,
        };

        let reply = self
            .request_ack(
                request,
                Message::Register {
                    request,
                    options: Dict::new(),
                    procedure: procedure.clone(),
                },
            )
            .await?;

        match reply {
            Message::Registered { registration, .. } => {
                #[cfg(feature = "observability")]
                info!(
                    client = %self.inner.name,
                    procedure = %procedure,
                    registration = %registration,
                    "Procedure registered"
                );
                Ok(registration)
            }
            Message::Error {
                error,
                args,
                kwargs,
                details,
                ..
            } => Err(RpcError {
                request,
                error,
                args,
                kwargs,
                details,
            }
            .into()),
            other => Err(unexpected_reply(&other, MessageType::Register)),
        }
    }

    /// Withdraws the registration of `procedure`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotRegistered`] if this session has not registered
    ///   the procedure
    /// - [`ClientError::Rpc`] if the router refused
    /// - [`ClientError::NotConnected`] if the session closed first
    pub async fn unregister(&self, procedure: impl Into<Uri>) -> Result<(), ClientError> {
        let procedure = procedure.into();
        let Some(registration) = self.inner.registry.lookup(&procedure) else {
            return Err(ClientError::NotRegistered { procedure });
        };

        let request = self.inner.ids.next();
        let reply = self
            .request_ack(
                request,
                Message::Unregister {
                    request,
                    registration,
                },
            )
            .await?;

        match reply {
            Message::Unregistered { .. } => {
                self.inner.registry.remove(registration);

                #[cfg(feature = "observability")]
                info!(client = %self.inner.name, procedure = %procedure, "Procedure unregistered");
                Ok(())
            }
            Message::Error {
                error,
                args,
                kwargs,
                details,
                ..
            } => Err(RpcError {
                request,
                error,
                args,
                kwargs,
                details,
            }
            .into()),
            other => Err(unexpected_reply(&other, MessageType::Unregister)),
        }
    }

    /// Calls a remote procedure and waits for its final result.
    ///
    /// Progressive results are handed to the request's progress handler, in
    /// order, before this resolves.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Rpc`] if the callee or the router answered with
    ///   ERROR; [`ClientError::is_remote_cancel`] tells a router-side
    ///   cancellation such as a timeout apart
    /// - [`ClientError::NotConnected`] if the session closed first
    pub async fn call(&self, request: CallRequest) -> Result<CallResult, ClientError> {
        self.call_until(request, &CancellationToken::new()).await
    }

    /// Like [`call`](Self::call), but gives up when `cancel` fires.
    ///
    /// A call abandoned this way resolves with [`ClientError::Canceled`].
    /// If the request carries a cancel mode, a CANCEL is sent to the router;
    /// otherwise the callee is not told.
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call), plus [`ClientError::Canceled`].
    pub async fn call_until(
        &self,
        request: CallRequest,
        cancel: &CancellationToken,
    ) -> Result<CallResult, ClientError> {
        self.inner
            .calls
            .issue(
                self.inner.sink.as_ref(),
                request,
                cancel,
                &self.inner.metrics,
            )
            .await
    }

    /// Closes the session.
    ///
    /// Sends GOODBYE, stops the receive task, fails every outstanding call
    /// with [`ClientError::NotConnected`] and cancels every running
    /// invocation. Resolves once all of that is done.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] if the session was already closed.
    pub async fn close(&self) -> Result<(), ClientError> {
        if self.inner.closing.swap(true, Ordering::SeqCst) || self.is_closed() {
            return Err(ClientError::NotConnected);
        }

        let _ = self.inner.sink.try_send(Message::Goodbye {
            details: Dict::new(),
            reason: Uri::CLOSE_NORMAL,
        });
        self.inner.shutdown.cancel();

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(_e) = task.await {
                #[cfg(feature = "observability")]
                warn!(client = %self.inner.name, error = %_e, "Receive task failed");
            }
        }
        self.inner.done.cancelled().await;
        Ok(())
    }

    /// Resolves once the session is closed, locally or by the router.
    pub async fn done(&self) {
        self.inner.done.cancelled().await;
    }

    /// Returns `true` once the session is closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Session counters.
    pub fn metrics(&self) -> &ClientMetrics {
        &self.inner.metrics
    }

    /// Backpressure retry counters of progress sends.
    pub fn retry_metrics(&self) -> &RetryMetrics {
        self.inner.invocations.retry_metrics()
    }

    /// Roles and features the router announced.
    pub fn router_roles(&self) -> &RouterRoles {
        &self.inner.roles
    }

    /// Returns `true` if the router announced `feature` for `role`.
    pub fn has_feature(&self, role: &str, feature: &str) -> bool {
        self.inner.roles.has_feature(role, feature)
    }

    /// The configured client name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Calls issued and not yet resolved.
    pub fn active_calls(&self) -> usize {
        self.inner.calls.len()
    }

    /// Invocations whose handler is still running uncancelled.
    pub fn running_invocations(&self) -> usize {
        self.inner.invocations.len()
    }

    /// Procedures currently registered.
    pub fn registrations(&self) -> usize {
        self.inner.registry.len()
    }

    async fn request_ack(
        &self,
        request: RequestId,
        message: Message,
    ) -> Result<Message, ClientError> {
        let Some(reply) = self.inner.acks.register(request) else {
            return Err(ClientError::NotConnected);
        };
        let _awaiting = AwaitingAck {
            acks: &self.inner.acks,
            request,
        };
        if self.inner.sink.send(message).await.is_err() {
            return Err(ClientError::NotConnected);
        }
        reply.await.map_err(|_| ClientError::NotConnected)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

/// Releases a REGISTER reservation on every exit path. A no-op once the
/// registration was activated.
struct Reservation<'a> {
    registry: &'a Registry,
    request: RequestId,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.registry.release(self.request);
    }
}

/// Withdraws an ack wait when the request ends or its future is dropped.
struct AwaitingAck<'a> {
    acks: &'a PendingRequests<Message>,
    request: RequestId,
}

impl Drop for AwaitingAck<'_> {
    fn drop(&mut self) {
        self.acks.cancel(self.request);
    }
}

fn unexpected_reply(reply: &Message, to: MessageType) -> ClientError {
    ClientError::Protocol {
        reason: format!("unexpected {} in reply to {}", reply.message_type(), to),
    }
}

async fn receive_loop<R: MessageSource>(inner: Arc<ClientInner>, mut source: R) {
    loop {
        let message = tokio::select! {
            biased;
            () = inner.shutdown.cancelled() => break,
            message = source.recv() => message,
        };
        let Some(message) = message else {
            #[cfg(feature = "observability")]
            info!(client = %inner.name, "Router closed the link");
            break;
        };

        let flow = tokio::select! {
            biased;
            () = inner.shutdown.cancelled() => break,
            flow = inner.dispatch(message) => flow,
        };
        if flow.is_break() {
            break;
        }
    }
    inner.teardown().await;
}

impl ClientInner {
    async fn dispatch(&self, message: Message) -> ControlFlow<()> {
        match message {
            Message::Result {
                request,
                details,
                args,
                kwargs,
            } => {
                let result = CallResult {
                    request,
                    details,
                    args,
                    kwargs,
                };
                let event = if details.progress {
                    CallEvent::Progress(result)
                } else {
                    CallEvent::Done(Ok(result))
                };
                if !self.calls.deliver(request, event) {
                    #[cfg(feature = "observability")]
                    debug!(request = %request, "RESULT for no outstanding call discarded");
                }
            }
            Message::Error {
                request_type: MessageType::Call,
                request,
                details,
                error,
                args,
                kwargs,
            } => {
                let error = RpcError {
                    request,
                    error,
                    args,
                    kwargs,
                    details,
                };
                if !self
                    .calls
                    .deliver(request, CallEvent::Done(Err(error.into())))
                {
                    #[cfg(feature = "observability")]
                    debug!(request = %request, "ERROR for no outstanding call discarded");
                }
            }
            ack @ (Message::Registered { .. }
            | Message::Unregistered { .. }
            | Message::Error {
                request_type: MessageType::Register | MessageType::Unregister,
                ..
            }) => self.acknowledge(ack),
            Message::Invocation {
                request,
                registration,
                mut details,
                args,
                kwargs,
            } => match self.registry.handler(registration) {
                Some((procedure, handler)) => {
                    details.procedure.get_or_insert(procedure);
                    self.invocations
                        .dispatch(request, registration, details, args, kwargs, handler);
                }
                None => {
                    #[cfg(feature = "observability")]
                    warn!(
                        request = %request,
                        registration = %registration,
                        "INVOCATION for unknown registration"
                    );
                    let reply = Message::Error {
                        request_type: MessageType::Invocation,
                        request,
                        details: Dict::new(),
                        error: Uri::NO_SUCH_REGISTRATION,
                        args: Vec::new(),
                        kwargs: Dict::new(),
                    };
                    let _ = self.sink.send(reply).await;
                }
            },
            Message::Interrupt { request, options } => {
                self.invocations.interrupt(request, options.mode);
            }
            Message::Goodbye { reason: _reason, .. } => {
                #[cfg(feature = "observability")]
                info!(client = %self.name, reason = %_reason, "Router closed the session");
                if !self.closing.swap(true, Ordering::SeqCst) {
                    let _ = self.sink.try_send(Message::Goodbye {
                        details: Dict::new(),
                        reason: Uri::GOODBYE_AND_OUT,
                    });
                }
                return ControlFlow::Break(());
            }
            _other => {
                #[cfg(feature = "observability")]
                warn!(message_type = %_other.message_type(), "Unexpected message ignored");
            }
        }
        ControlFlow::Continue(())
    }

    fn acknowledge(&self, ack: Message) {
        let Some(request) = ack.request() else {
            return;
        };
        let registered = match ack {
            Message::Registered { registration, .. } => {
                self.registry.activate(request, registration);
                Some(registration)
            }
            _ => None,
        };
        if self.acks.complete(request, ack) {
            return;
        }

        // Nobody is waiting any more; withdraw what the router just granted.
        if let Some(registration) = registered {
            self.registry.remove(registration);
            let _ = self.sink.try_send(Message::Unregister {
                request: self.ids.next(),
                registration,
            });

            #[cfg(feature = "observability")]
            debug!(
                request = %request,
                registration = %registration,
                "Orphaned registration withdrawn"
            );
        }
    }

    async fn teardown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _calls = self.calls.close();
        let _invocations = self.invocations.interrupt_all();
        let _acks = self.acks.close();
        self.registry.clear();
        self.sink.close().await;

        #[cfg(feature = "observability")]
        info!(
            client = %self.name,
            calls = _calls,
            invocations = _invocations,
            acks = _acks,
            "Session closed"
        );
        self.done.cancel();
    }
}
