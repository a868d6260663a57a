// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::pending::PendingOperations;
use crate::transport::{StartedItem, Transport};
use indexmap::IndexMap;
use reportwire_model::{CodeRef, FinishPayload, ReportId, StartDescriptor};
use tracing::warn;

/// The set of currently open suite and test nodes, keyed by code reference.
///
/// Entries are inserted parents-first (a child's `ensure_open` always follows
/// its parent's), so reverse insertion order finishes children before their
/// parents during the file close cascade.
#[derive(Debug, Default)]
pub(super) struct SuiteTree {
    open: IndexMap<CodeRef, ReportId>,
}

impl SuiteTree {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Looks up the id of an open node.
    pub(super) fn id_of(&self, code_ref: &CodeRef) -> Option<ReportId> {
        self.open.get(code_ref).copied()
    }

    /// Opens the node described by `descriptor` if its code reference is not
    /// already open, and returns its id.
    ///
    /// Idempotent per code reference: repeated calls issue exactly one start
    /// call. The parent is resolved by code reference; an absent parent
    /// attaches the node directly under the launch. The id is recorded before
    /// the acknowledgement resolves, so later events in the same callback
    /// flow can already see it.
    pub(super) fn ensure_open(
        &mut self,
        transport: &dyn Transport,
        pending: &mut PendingOperations,
        launch_id: ReportId,
        descriptor: StartDescriptor,
        parent: Option<&CodeRef>,
    ) -> ReportId {
        if let Some(id) = self.open.get(&descriptor.code_ref) {
            return *id;
        }

        let parent_id = parent.and_then(|code_ref| self.id_of(code_ref));
        let code_ref = descriptor.code_ref.clone();
        let StartedItem { id, ack } = transport.start_item(descriptor, launch_id, parent_id);
        self.open.insert(code_ref, id);
        pending.push(ack);
        id
    }

    /// Finishes an open node and removes it from the tree.
    ///
    /// Finishing an unknown code reference is a no-op: it guards against
    /// double finishes and against files that never opened any suite.
    pub(super) fn finish(
        &mut self,
        transport: &dyn Transport,
        pending: &mut PendingOperations,
        code_ref: &CodeRef,
    ) {
        match self.open.shift_remove(code_ref) {
            Some(id) => {
                pending.push(transport.finish_item(id, FinishPayload::empty()));
            }
            None => {
                warn!(code_ref = %code_ref, "finish for a suite that is not open, skipping");
            }
        }
    }

    /// Finishes every open node belonging to `file_ref`, children before
    /// parents, and returns how many were finished.
    pub(super) fn finish_file(
        &mut self,
        transport: &dyn Transport,
        pending: &mut PendingOperations,
        file_ref: &CodeRef,
    ) -> usize {
        let to_close: Vec<CodeRef> = self
            .open
            .keys()
            .filter(|code_ref| code_ref.belongs_to(file_ref))
            .cloned()
            .collect();
        for code_ref in to_close.iter().rev() {
            self.finish(transport, pending, code_ref);
        }
        to_close.len()
    }

    /// The number of currently open nodes.
    #[cfg(test)]
    pub(super) fn open_count(&self) -> usize {
        self.open.len()
    }
}
