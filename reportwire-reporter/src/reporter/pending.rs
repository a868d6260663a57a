// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::transport::Acknowledgement;
use futures::future;
use tracing::warn;

/// Tracks every in-flight fire-and-forget remote operation.
///
/// Acknowledgements are collected as operations are issued and joined exactly
/// once, at run completion. Failed acknowledgements are logged and otherwise
/// swallowed: the local item tree is authoritative, so a failed remote call
/// does not invalidate it.
#[derive(Debug, Default)]
pub struct PendingOperations {
    acks: Vec<Acknowledgement>,
}

impl PendingOperations {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an in-flight operation.
    pub fn push(&mut self, ack: Acknowledgement) {
        self.acks.push(ack);
    }

    /// The number of operations not yet waited on.
    pub fn len(&self) -> usize {
        self.acks.len()
    }

    /// True if no operations are pending.
    pub fn is_empty(&self) -> bool {
        self.acks.is_empty()
    }

    /// Waits for every pending operation collected so far.
    ///
    /// Returns the number of operations that failed.
    pub async fn drain_all(&mut self) -> usize {
        let acks = std::mem::take(&mut self.acks);
        let mut failures = 0;
        for result in future::join_all(acks.into_iter().map(Acknowledgement::wait)).await {
            if let Err(error) = result {
                warn!("{error}");
                failures += 1;
            }
        }
        failures
    }
}
