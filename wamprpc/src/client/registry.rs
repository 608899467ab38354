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

//! Procedures this session has registered with the router.
//!
//! A registration is reserved under its REGISTER request id while the router
//! is asked, and activated under the router-assigned registration id once
//! REGISTERED arrives. The receive task activates before it wakes the
//! registering task, so an INVOCATION can never beat its own handler.

use super::Handler;
use crate::wamp::{RegistrationId, RequestId, Uri};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

struct Registration {
    procedure: Uri,
    handler: Handler,
}

#[derive(Default)]
struct Table {
    reserved: HashMap<RequestId, Registration>,
    active: HashMap<RegistrationId, Registration>,
    by_name: HashMap<Uri, RegistrationId>,
}

impl Table {
    fn is_taken(&self, procedure: &Uri) -> bool {
        self.by_name.contains_key(procedure)
            || self.reserved.values().any(|r| r.procedure == *procedure)
    }
}

/// Registered procedures and their handlers.
pub(crate) struct Registry {
    table: Mutex<Table>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("Registry")
            .field("reserved", &table.reserved.len())
            .field("active", &table.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            table: Mutex::new(Table::default()),
        }
    }

    /// Reserves `procedure` for a REGISTER in flight.
    ///
    /// Returns `false` if the procedure is already registered or reserved.
    pub(crate) fn reserve(&self, request: RequestId, procedure: Uri, handler: Handler) -> bool {
        let mut table = self.table.lock();
        if table.is_taken(&procedure) {
            return false;
        }
        table
            .reserved
            .insert(request, Registration { procedure, handler });
        true
    }

    /// Activates the reservation made under `request`.
    pub(crate) fn activate(&self, request: RequestId, registration: RegistrationId) -> bool {
        let mut table = self.table.lock();
        let Some(entry) = table.reserved.remove(&request) else {
            return false;
        };
        table.by_name.insert(entry.procedure.clone(), registration);
        table.active.insert(registration, entry);
        true
    }

    /// Drops the reservation made under `request`.
    pub(crate) fn release(&self, request: RequestId) {
        self.table.lock().reserved.remove(&request);
    }

    /// The procedure and handler behind an active registration.
    pub(crate) fn handler(&self, registration: RegistrationId) -> Option<(Uri, Handler)> {
        self.table
            .lock()
            .active
            .get(&registration)
            .map(|r| (r.procedure.clone(), r.handler.clone()))
    }

    /// The registration id of an active procedure.
    pub(crate) fn lookup(&self, procedure: &Uri) -> Option<RegistrationId> {
        self.table.lock().by_name.get(procedure).copied()
    }

    /// Removes an active registration, returning its procedure.
    pub(crate) fn remove(&self, registration: RegistrationId) -> Option<Uri> {
        let mut table = self.table.lock();
        let entry = table.active.remove(&registration)?;
        table.by_name.remove(&entry.procedure);
        Some(entry.procedure)
    }

    pub(crate) fn len(&self) -> usize {
        self.table.lock().active.len()
    }

    pub(crate) fn clear(&self) {
        let mut table = self.table.lock();
        table.reserved.clear();
        table.active.clear();
        table.by_name.clear();
    }
}
