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

//! A minimal in-process dealer for integration tests.
//!
//! Routes REGISTER, UNREGISTER, CALL, CANCEL, YIELD and callee ERROR between
//! clients attached over [`MemoryTransport`] links. It enforces call
//! timeouts with INTERRUPT(killnowait) to the callee and ERROR(canceled) to
//! the caller, and answers progress for a caller that is gone with another
//! INTERRUPT, so callees can see more than one for the same invocation.
//!
//! Results are relayed with an awaiting send, so a slow caller pushes back
//! on the callee's link.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use wamprpc::client::{Client, ClientConfig};
use wamprpc::transport::{MemorySink, MemorySource, MemoryTransport, MessageSink, MessageSource};
use wamprpc::wamp::{
    CallOptions, CancelMode, Dict, InterruptOptions, InvocationDetails, List, Message, MessageType,
    RegistrationId, RequestId, ResultDetails, RouterRoles, Uri,
};

/// Link capacity used unless a test asks for another.
pub const LINK_CAPACITY: usize = 16;

type PeerId = u64;

/// An in-memory dealer. Cheap to clone.
#[derive(Clone)]
pub struct Dealer {
    inner: Arc<Inner>,
}

struct Inner {
    capacity: usize,
    next_id: AtomicU64,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    peers: HashMap<PeerId, Arc<MemorySink>>,
    procedures: HashMap<Uri, (PeerId, RegistrationId)>,
    registrations: HashMap<RegistrationId, (PeerId, Uri)>,
    invocations: HashMap<RequestId, Routed>,
    calls: HashMap<(PeerId, RequestId), RequestId>,
}

/// A call routed to a callee.
struct Routed {
    caller: PeerId,
    call: RequestId,
    callee: PeerId,
    timer: CancellationToken,
}

impl Dealer {
    pub fn new() -> Self {
        Self::with_link_capacity(LINK_CAPACITY)
    }

    pub fn with_link_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity,
                next_id: AtomicU64::new(1),
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Attaches a new client with default configuration.
    pub fn connect(&self, name: &str) -> Client {
        self.connect_with(ClientConfig::default().with_client_name(name))
    }

    /// Attaches a new client.
    pub fn connect_with(&self, config: ClientConfig) -> Client {
        let (local, remote) = MemoryTransport::pair(self.inner.capacity);
        let (sink, source) = remote.into_split();
        let peer = self.inner.next_id();
        self.inner.state.lock().peers.insert(peer, Arc::new(sink));
        tokio::spawn(serve(Arc::clone(&self.inner), peer, source));

        Client::from_memory(
            config.with_router_roles(RouterRoles::dealer_with_rpc_features()),
            local,
        )
    }

    /// Calls routed to a callee and not yet answered.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().invocations.len()
    }

    /// Clients currently attached.
    pub fn peers(&self) -> usize {
        self.inner.state.lock().peers.len()
    }
}

async fn serve(inner: Arc<Inner>, peer: PeerId, mut source: MemorySource) {
    while let Some(message) = source.recv().await {
        if let Message::Goodbye { .. } = message {
            break;
        }
        inner.handle(peer, message).await;
    }
    inner.disconnect(peer).await;
}

impl Inner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn sink(&self, peer: PeerId) -> Option<Arc<MemorySink>> {
        self.state.lock().peers.get(&peer).cloned()
    }

    async fn send_to(&self, peer: PeerId, message: Message) -> bool {
        match self.sink(peer) {
            Some(sink) => sink.send(message).await.is_ok(),
            None => false,
        }
    }

    async fn interrupt(&self, callee: PeerId, request: RequestId, mode: CancelMode) {
        let message = Message::Interrupt {
            request,
            options: InterruptOptions { mode },
        };
        self.send_to(callee, message).await;
    }

    async fn handle(self: &Arc<Self>, peer: PeerId, message: Message) {
        match message {
            Message::Register {
                request, procedure, ..
            } => {
                let reply = {
                    let mut state = self.state.lock();
                    if state.procedures.contains_key(&procedure) {
                        error(MessageType::Register, request, Uri::PROCEDURE_ALREADY_EXISTS)
                    } else {
                        let registration = RegistrationId::from(self.next_id());
                        state.procedures.insert(procedure.clone(), (peer, registration));
                        state.registrations.insert(registration, (peer, procedure));
                        Message::Registered {
                            request,
                            registration,
                        }
                    }
                };
                self.send_to(peer, reply).await;
            }
            Message::Unregister {
                request,
                registration,
            } => {
                let reply = {
                    let mut state = self.state.lock();
                    let owned = state
                        .registrations
                        .get(&registration)
                        .is_some_and(|(owner, _)| *owner == peer);
                    let removed = owned
                        .then(|| state.registrations.remove(&registration))
                        .flatten();
                    match removed {
                        Some((_, procedure)) => {
                            state.procedures.remove(&procedure);
                            Message::Unregistered { request }
                        }
                        _ => error(MessageType::Unregister, request, Uri::NO_SUCH_REGISTRATION),
                    }
                };
                self.send_to(peer, reply).await;
            }
            Message::Call {
                request,
                options,
                procedure,
                args,
                kwargs,
            } => self.route_call(peer, request, options, procedure, args, kwargs).await,
            Message::Cancel { request, options } => self.cancel(peer, request, options.mode).await,
            Message::Yield {
                request,
                options,
                args,
                kwargs,
            } => self.relay_yield(peer, request, options.progress, args, kwargs).await,
            Message::Error {
                request_type: MessageType::Invocation,
                request,
                details,
                error,
                args,
                kwargs,
            } => {
                let routed = self.forget(request);
                if let Some(routed) = routed {
                    let reply = Message::Error {
                        request_type: MessageType::Call,
                        request: routed.call,
                        details,
                        error,
                        args,
                        kwargs,
                    };
                    self.send_to(routed.caller, reply).await;
                }
            }
            _ => {}
        }
    }

    async fn route_call(
        self: &Arc<Self>,
        caller: PeerId,
        request: RequestId,
        options: CallOptions,
        procedure: Uri,
        args: List,
        kwargs: Dict,
    ) {
        let routed = {
            let mut state = self.state.lock();
            match state.procedures.get(&procedure).copied() {
                Some((callee, registration)) => {
                    let invocation = RequestId::from(self.next_id());
                    let timer = CancellationToken::new();
                    state.invocations.insert(
                        invocation,
                        Routed {
                            caller,
                            call: request,
                            callee,
                            timer: timer.clone(),
                        },
                    );
                    state.calls.insert((caller, request), invocation);
                    Some((callee, registration, invocation, timer))
                }
                None => None,
            }
        };

        let Some((callee, registration, invocation, timer)) = routed else {
            self.send_to(caller, error(MessageType::Call, request, Uri::NO_SUCH_PROCEDURE))
                .await;
            return;
        };

        if let Some(timeout) = options.timeout() {
            let inner = Arc::clone(self);
            tokio::spawn(async move {
                tokio::select! {
                    () = timer.cancelled() => {}
                    () = tokio::time::sleep(timeout) => inner.expire(invocation).await,
                }
            });
        }

        let message = Message::Invocation {
            request: invocation,
            registration,
            details: InvocationDetails {
                receive_progress: options.receive_progress,
                procedure: None,
            },
            args,
            kwargs,
        };
        if !self.send_to(callee, message).await {
            if let Some(routed) = self.forget(invocation) {
                self.send_to(
                    routed.caller,
                    error(MessageType::Call, routed.call, Uri::CANCELED),
                )
                .await;
            }
        }
    }

    async fn cancel(&self, caller: PeerId, request: RequestId, mode: CancelMode) {
        let invocation = self.state.lock().calls.get(&(caller, request)).copied();
        let Some(invocation) = invocation else {
            return;
        };
        match mode {
            // The callee's own ERROR(canceled) is relayed when it arrives.
            CancelMode::Kill => {
                let callee = self
                    .state
                    .lock()
                    .invocations
                    .get(&invocation)
                    .map(|r| r.callee);
                if let Some(callee) = callee {
                    self.interrupt(callee, invocation, CancelMode::Kill).await;
                }
            }
            CancelMode::Skip | CancelMode::KillNoWait => {
                let Some(routed) = self.forget(invocation) else {
                    return;
                };
                if mode == CancelMode::KillNoWait {
                    self.interrupt(routed.callee, invocation, CancelMode::KillNoWait)
                        .await;
                }
                self.send_to(
                    routed.caller,
                    error(MessageType::Call, routed.call, Uri::CANCELED),
                )
                .await;
            }
        }
    }

    async fn relay_yield(
        &self,
        callee: PeerId,
        invocation: RequestId,
        progress: bool,
        args: List,
        kwargs: Dict,
    ) {
        let target = {
            let state = self.state.lock();
            state
                .invocations
                .get(&invocation)
                .filter(|r| r.callee == callee)
                .map(|r| (r.caller, r.call))
        };
        let Some((caller, call)) = target else {
            // Nobody is waiting for this invocation any more.
            if progress {
                self.interrupt(callee, invocation, CancelMode::KillNoWait).await;
            }
            return;
        };
        if !progress {
            self.forget(invocation);
        }

        let result = Message::Result {
            request: call,
            details: ResultDetails { progress },
            args,
            kwargs,
        };
        if !self.send_to(caller, result).await && progress {
            self.forget(invocation);
            self.interrupt(callee, invocation, CancelMode::KillNoWait).await;
        }
    }

    async fn expire(&self, invocation: RequestId) {
        let Some(routed) = self.forget(invocation) else {
            return;
        };
        self.interrupt(routed.callee, invocation, CancelMode::KillNoWait)
            .await;
        self.send_to(
            routed.caller,
            error(MessageType::Call, routed.call, Uri::CANCELED),
        )
        .await;
    }

    async fn disconnect(&self, peer: PeerId) {
        let (interrupts, failures) = {
            let mut state = self.state.lock();
            state.peers.remove(&peer);
            state.registrations.retain(|_, (owner, _)| *owner != peer);
            state.procedures.retain(|_, (owner, _)| *owner != peer);

            let gone: Vec<RequestId> = state
                .invocations
                .iter()
                .filter(|(_, r)| r.caller == peer || r.callee == peer)
                .map(|(id, _)| *id)
                .collect();
            let mut interrupts = Vec::new();
            let mut failures = Vec::new();
            for invocation in gone {
                if let Some(routed) = state.invocations.remove(&invocation) {
                    state.calls.remove(&(routed.caller, routed.call));
                    routed.timer.cancel();
                    if routed.caller == peer {
                        interrupts.push((routed.callee, invocation));
                    } else {
                        failures.push((routed.caller, routed.call));
                    }
                }
            }
            (interrupts, failures)
        };

        for (callee, invocation) in interrupts {
            self.interrupt(callee, invocation, CancelMode::KillNoWait)
                .await;
        }
        for (caller, call) in failures {
            self.send_to(caller, error(MessageType::Call, call, Uri::CANCELED))
                .await;
        }
    }

    fn forget(&self, invocation: RequestId) -> Option<Routed> {
        let mut state = self.state.lock();
        let routed = state.invocations.remove(&invocation)?;
        state.calls.remove(&(routed.caller, routed.call));
        routed.timer.cancel();
        Some(routed)
    }
}

fn error(request_type: MessageType, request: RequestId, uri: Uri) -> Message {
    Message::Error {
        request_type,
        request,
        details: Dict::new(),
        error: uri,
        args: List::new(),
        kwargs: Dict::new(),
    }
}
