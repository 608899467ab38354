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

//! Cancellation of running invocations.
//!
//! INTERRUPTs arrive from the router for timeouts, caller cancellation and
//! progress sent to a caller that is gone. The router may send more than one
//! for the same request, and a late one may race the handler's own return.
//! Only the first INTERRUPT that finds the invocation running has any
//! effect. Every other one is counted and dropped.

use super::invocation::{InvocationState, InvocationTracker, Phase};
use crate::wamp::{CancelMode, RequestId};

#[cfg(feature = "observability")]
use tracing::debug;

/// What an INTERRUPT did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterruptOutcome {
    /// The invocation was running and is now cancelled.
    Applied,
    /// No running invocation had that request id.
    Ignored,
}

impl InterruptOutcome {
    pub(crate) fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl InvocationState {
    /// Moves a running invocation to `Cancelled(mode)`, stops progress and
    /// signals the handler. Returns `false` if it was no longer running.
    pub(crate) fn cancel(&self, mode: CancelMode) -> bool {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.phase != Phase::Running {
                return false;
            }
            lifecycle.phase = Phase::Cancelled(mode);
            lifecycle.accepting = false;
        }
        self.cancel.cancel();
        true
    }
}

impl InvocationTracker {
    /// Applies an INTERRUPT for `request`.
    pub(crate) fn interrupt(&self, request: RequestId, mode: CancelMode) -> InterruptOutcome {
        let state = self.running.lock().remove(&request);
        let applied = state.is_some_and(|state| state.cancel(mode));

        if applied {
            self.metrics.record_interrupt_applied();
            #[cfg(feature = "observability")]
            debug!(request = %request, mode = mode.as_str(), "Invocation interrupted");
            InterruptOutcome::Applied
        } else {
            self.metrics.record_interrupt_ignored();
            #[cfg(feature = "observability")]
            debug!(
                request = %request,
                mode = mode.as_str(),
                "INTERRUPT for no running invocation ignored"
            );
            InterruptOutcome::Ignored
        }
    }

    /// Cancels every running invocation for session shutdown.
    ///
    /// Terminal replies still in flight are abandoned and nothing further is
    /// sent. Returns the number of invocations cancelled.
    pub(crate) fn interrupt_all(&self) -> usize {
        self.shutdown.cancel();
        let drained: Vec<_> = self.running.lock().drain().map(|(_, state)| state).collect();
        drained
            .iter()
            .filter(|state| state.cancel(CancelMode::KillNoWait))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_sticky() {
        let state = InvocationState::new(RequestId::from(1), true);
        assert!(state.is_accepting());

        assert!(state.cancel(CancelMode::Kill));
        assert!(!state.is_accepting());
        assert_eq!(state.phase(), Phase::Cancelled(CancelMode::Kill));
        assert!(state.cancel.is_cancelled());

        // A second cancel neither fails nor changes the recorded mode.
        assert!(!state.cancel(CancelMode::KillNoWait));
        assert_eq!(state.phase(), Phase::Cancelled(CancelMode::Kill));
        assert!(!state.is_accepting());
    }

    #[test]
    fn test_reject_survives_cancel() {
        let state = InvocationState::new(RequestId::from(2), true);
        state.reject();
        assert!(!state.is_accepting());
        assert!(state.cancel(CancelMode::KillNoWait));
        assert!(!state.is_accepting());
    }
}
