// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The remote reporting transport interface.
//!
//! Transports are fire-and-forget at the call site: a start call hands back a
//! locally assigned [`ReportId`] synchronously, plus an [`Acknowledgement`]
//! that resolves when the backend has durably recorded the operation. The
//! reporter collects acknowledgements and joins them once at run completion;
//! it never blocks on an individual operation.
//!
//! Retry, backoff and authentication policy belong to transport
//! implementations, not to this interface.

use crate::errors::TransportError;
use futures::future::BoxFuture;
use reportwire_model::{
    Attachment, FinishPayload, LaunchDescriptor, LogPayload, ReportId, StartDescriptor,
};
use std::{fmt, future::Future};

/// The completion signal of a fire-and-forget remote operation.
pub struct Acknowledgement {
    inner: BoxFuture<'static, Result<(), TransportError>>,
}

impl Acknowledgement {
    /// Wraps a future resolving to the operation's outcome.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), TransportError>> + Send + 'static,
    {
        Acknowledgement {
            inner: Box::pin(future),
        }
    }

    /// An acknowledgement that resolves immediately with the given result.
    pub fn ready(result: Result<(), TransportError>) -> Self {
        Acknowledgement::new(std::future::ready(result))
    }

    /// Waits for the operation to complete.
    pub async fn wait(self) -> Result<(), TransportError> {
        self.inner.await
    }
}

impl fmt::Debug for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acknowledgement").finish_non_exhaustive()
    }
}

/// The result of issuing a remote "start" call.
#[derive(Debug)]
pub struct StartedItem {
    /// The locally assigned id for the new item, available synchronously.
    pub id: ReportId,

    /// Resolves once the backend has recorded the item.
    pub ack: Acknowledgement,
}

/// A remote reporting backend.
///
/// All methods are synchronous from the caller's perspective: they enqueue
/// the remote operation and return immediately. Implementations assign ids
/// locally so that callers can wire up parent/child relationships without
/// waiting for the backend.
pub trait Transport: Send {
    /// Starts the launch that all items of this run belong to.
    fn start_launch(&self, descriptor: LaunchDescriptor) -> StartedItem;

    /// Starts a suite, test or step item under the given parent.
    ///
    /// A `parent_id` of `None` attaches the item directly under the launch.
    fn start_item(
        &self,
        descriptor: StartDescriptor,
        launch_id: ReportId,
        parent_id: Option<ReportId>,
    ) -> StartedItem;

    /// Finishes a previously started item.
    fn finish_item(&self, id: ReportId, payload: FinishPayload) -> Acknowledgement;

    /// Sends a log entry, optionally with an attached file, bound to an item.
    fn send_log(
        &self,
        id: ReportId,
        payload: LogPayload,
        attachment: Option<Attachment>,
    ) -> Acknowledgement;

    /// Finishes the launch.
    fn finish_launch(&self, id: ReportId) -> Acknowledgement;
}
