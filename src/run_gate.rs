// Copyright (c) 2026 Realtime-Asm Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Single-slot gate: at most one parse run at a time.
///
/// A run requested while another is active is rejected, never queued. There
/// is no fairness to provide since rejection is immediate and the caller
/// simply tries again on the next save/rebuild trigger.
use std::sync::atomic::{AtomicBool, Ordering};

pub struct RunGate {
    busy: AtomicBool,
}

impl RunGate {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Non-blocking try-acquire. The returned token releases the gate when
    /// dropped, so a panicking run cannot wedge the gate shut.
    pub fn try_begin(&self) -> Option<RunToken<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| RunToken { gate: self })
    }
}

impl Default for RunGate {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RunToken<'a> {
    gate: &'a RunGate,
}

impl Drop for RunToken<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
