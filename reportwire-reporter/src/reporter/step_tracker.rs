// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use indexmap::IndexMap;
use reportwire_model::{CodeRef, ReportId};
use std::collections::VecDeque;
use tracing::warn;

/// Per-code-reference bookkeeping for step invocations.
///
/// A step may be invoked more than once per run (retries). Each invocation
/// gets its own id; open invocations form a FIFO queue so that finish events,
/// which arrive without an invocation index, are matched to the oldest open
/// invocation first. The historical start count outlives the queue: it is
/// what makes an invocation a retry, regardless of whether the earlier
/// invocations are still open.
#[derive(Debug, Default)]
pub(super) struct StepTracker {
    slots: IndexMap<CodeRef, StepSlot>,
}

#[derive(Debug, Default)]
struct StepSlot {
    open: VecDeque<ReportId>,
    started: usize,
}

impl StepTracker {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// True if the code reference already had at least one invocation in
    /// this run.
    pub(super) fn is_retry(&self, code_ref: &CodeRef) -> bool {
        self.slots
            .get(code_ref)
            .is_some_and(|slot| slot.started > 0)
    }

    /// Records a started invocation, appending it to the open queue.
    pub(super) fn record_started(&mut self, code_ref: CodeRef, id: ReportId) {
        let slot = self.slots.entry(code_ref).or_default();
        slot.open.push_back(id);
        slot.started += 1;
    }

    /// Dequeues the oldest open invocation for the code reference.
    ///
    /// Returns `None` when no invocation is open, which callers treat as a
    /// "finish without matching start" protocol error.
    pub(super) fn take_oldest(&mut self, code_ref: &CodeRef) -> Option<ReportId> {
        self.slots
            .get_mut(code_ref)
            .and_then(|slot| slot.open.pop_front())
    }

    /// The number of open invocations for a code reference.
    #[cfg(test)]
    pub(super) fn open_invocations(&self, code_ref: &CodeRef) -> usize {
        self.slots.get(code_ref).map_or(0, |slot| slot.open.len())
    }

    /// Drops all slots belonging to a finished file. Invocations still open
    /// at that point can never be finished, so they are reported before the
    /// slot is discarded.
    pub(super) fn drop_file(&mut self, file_ref: &CodeRef) {
        self.slots.retain(|code_ref, slot| {
            if !code_ref.belongs_to(file_ref) {
                return true;
            }
            if !slot.open.is_empty() {
                warn!(
                    code_ref = %code_ref,
                    open = slot.open.len(),
                    "file finished with step invocations still open, dropping them"
                );
            }
            false
        });
    }
}
