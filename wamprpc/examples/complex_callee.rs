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

//! # Complex Callee Example
//!
//! This example registers a procedure whose handler decodes mixed positional
//! arguments: a string, an integer, a list of strings and a struct whose
//! fields are matched to renamed keys.
//!
//! A caller and the callee share one process. They are joined by a tiny
//! relay that plays the router for a single procedure. In a real deployment
//! both clients would talk to a router over the network instead.
//!
//! ## What This Example Shows
//!
//! - Registering a handler with [`Client::register`]
//! - Decoding a positional argument list into a typed tuple
//! - Renamed struct keys through `#[serde(rename = "...")]`
//! - Floats without a fraction decoding into integers
//! - Reporting bad arguments as `wamp.error.invalid_argument`
//!
//! ## Running This Example
//!
//! ```bash
//! cargo run --example complex_callee
//! ```

use serde::Deserialize;
use serde_json::json;
use std::error::Error;
use wamprpc::client::{CallRequest, Client, ClientConfig, Invocation, InvokeResult};
use wamprpc::transport::{MemoryTransport, MessageSink, MessageSource};
use wamprpc::wamp::{InvocationDetails, Message, MessageType, RegistrationId, ResultDetails, Uri};

const PROCEDURE: &str = "complex-call";

#[derive(Deserialize)]
struct Complex {
    #[serde(rename = "arg_1")]
    arg1: i64,
    value: String,
}

async fn complex_call(inv: Invocation) -> InvokeResult {
    let (name, id, logs, complex): (String, i64, Vec<String>, Complex) = match inv.unpack() {
        Ok(args) => args,
        Err(e) => {
            println!("CALLEE> cannot unpack arguments: {e}");
            return InvokeResult::err_with_message(
                Uri::INVALID_ARGUMENT,
                format!("incorrect arguments: {e}"),
            );
        }
    };
    let text = format!(
        "{name} {id} {logs:?} {{arg_1: {}, value: {}}}",
        complex.arg1, complex.value
    );
    InvokeResult::ok(vec![json!(text)])
}

/// Plays the router for one procedure: answers REGISTER and UNREGISTER,
/// turns CALL into INVOCATION and relays the callee's answer back to the
/// caller. Runs until both clients have gone.
async fn relay(mut callee: MemoryTransport, mut caller: MemoryTransport) {
    let registration = RegistrationId::from(1);
    let (mut callee_open, mut caller_open) = (true, true);
    while callee_open || caller_open {
        tokio::select! {
            message = callee.recv(), if callee_open => match message {
                Some(Message::Register { request, .. }) => {
                    let reply = Message::Registered { request, registration };
                    let _ = callee.sink().send(reply).await;
                }
                Some(Message::Unregister { request, .. }) => {
                    let _ = callee.sink().send(Message::Unregistered { request }).await;
                }
                Some(Message::Yield { request, options, args, kwargs }) => {
                    let result = Message::Result {
                        request,
                        details: ResultDetails { progress: options.progress },
                        args,
                        kwargs,
                    };
                    let _ = caller.sink().send(result).await;
                }
                Some(Message::Error { request, details, error, args, kwargs, .. }) => {
                    let error = Message::Error {
                        request_type: MessageType::Call,
                        request,
                        details,
                        error,
                        args,
                        kwargs,
                    };
                    let _ = caller.sink().send(error).await;
                }
                Some(_) => {}
                None => callee_open = false,
            },
            message = caller.recv(), if caller_open => match message {
                // With a single caller its request ids can double as
                // invocation ids.
                Some(Message::Call { request, options, procedure, args, kwargs }) => {
                    let invocation = Message::Invocation {
                        request,
                        registration,
                        details: InvocationDetails {
                            receive_progress: options.receive_progress,
                            procedure: Some(procedure),
                        },
                        args,
                        kwargs,
                    };
                    let _ = callee.sink().send(invocation).await;
                }
                Some(_) => {}
                None => caller_open = false,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let (callee_end, router_callee) = MemoryTransport::default_pair();
    let (caller_end, router_caller) = MemoryTransport::default_pair();
    tokio::spawn(relay(router_callee, router_caller));

    let callee = Client::from_memory(
        ClientConfig::default().with_client_name("callee"),
        callee_end,
    );
    callee.register(PROCEDURE, complex_call).await?;
    println!("CALLEE> registered procedure {PROCEDURE} with router");

    let caller = Client::from_memory(
        ClientConfig::default().with_client_name("caller"),
        caller_end,
    );
    let request = CallRequest::new(PROCEDURE)
        .arg("Alice")
        .arg(42.0)
        .arg(json!(["first", "second"]))
        .arg(json!({"arg_1": 7, "value": "seven"}));
    let result = caller.call(request).await?;
    println!("CALLER> result: {:?}", result.args);

    let bad = caller.call(CallRequest::new(PROCEDURE).arg("Alice")).await;
    match bad {
        Err(e) => println!("CALLER> rejected as expected: {e}"),
        Ok(result) => println!("CALLER> unexpected result: {:?}", result.args),
    }

    caller.close().await?;
    callee.unregister(PROCEDURE).await?;
    callee.close().await?;
    Ok(())
}
