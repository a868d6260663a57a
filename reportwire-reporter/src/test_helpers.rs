// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory transport support for tests.
//!
//! [`RecordingTransport`] records every call made through the
//! [`Transport`] trait and resolves acknowledgements immediately, so tests
//! can assert on exact call sequences without a backend.

use crate::{
    errors::TransportError,
    transport::{Acknowledgement, StartedItem, Transport},
};
use reportwire_model::{
    Attachment, FinishPayload, LaunchDescriptor, LogPayload, ReportId, StartDescriptor,
};
use std::sync::{Arc, Mutex};

/// One recorded transport call.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportCall {
    /// A launch start call and the id assigned to it.
    StartLaunch {
        /// The assigned launch id.
        id: ReportId,
        /// The launch descriptor as issued.
        descriptor: LaunchDescriptor,
    },

    /// An item start call and the id assigned to it.
    StartItem {
        /// The assigned item id.
        id: ReportId,
        /// The start descriptor as issued.
        descriptor: StartDescriptor,
        /// The launch the item belongs to.
        launch_id: ReportId,
        /// The parent item, or `None` for items directly under the launch.
        parent_id: Option<ReportId>,
    },

    /// An item finish call.
    FinishItem {
        /// The finished item.
        id: ReportId,
        /// The finish payload as issued.
        payload: FinishPayload,
    },

    /// A log call.
    SendLog {
        /// The item the log entry is bound to.
        id: ReportId,
        /// The log payload as issued.
        payload: LogPayload,
        /// The attached file, if any.
        attachment: Option<Attachment>,
    },

    /// A launch finish call.
    FinishLaunch {
        /// The finished launch.
        id: ReportId,
    },
}

/// A [`Transport`] that records calls and acknowledges them immediately.
///
/// Cloning shares the underlying call log, so tests can keep a handle while
/// the reporter owns a boxed clone.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    fail_acks: bool,
}

impl RecordingTransport {
    /// Creates a transport whose acknowledgements all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport whose acknowledgements all fail.
    pub fn failing() -> Self {
        RecordingTransport {
            calls: Arc::default(),
            fail_acks: true,
        }
    }

    /// Returns a snapshot of all recorded calls, in issue order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the start descriptors of all recorded item start calls, in
    /// issue order.
    pub fn started_items(&self) -> Vec<StartDescriptor> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::StartItem { descriptor, .. } => Some(descriptor),
                _ => None,
            })
            .collect()
    }

    /// Returns `(id, payload)` for all recorded item finish calls, in issue
    /// order.
    pub fn finished_items(&self) -> Vec<(ReportId, FinishPayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::FinishItem { id, payload } => Some((id, payload)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn ack(&self) -> Acknowledgement {
        if self.fail_acks {
            Acknowledgement::ready(Err(TransportError::new("injected transport failure")))
        } else {
            Acknowledgement::ready(Ok(()))
        }
    }
}

impl Transport for RecordingTransport {
    fn start_launch(&self, descriptor: LaunchDescriptor) -> StartedItem {
        let id = ReportId::new_random();
        self.record(TransportCall::StartLaunch { id, descriptor });
        StartedItem {
            id,
            ack: self.ack(),
        }
    }

    fn start_item(
        &self,
        descriptor: StartDescriptor,
        launch_id: ReportId,
        parent_id: Option<ReportId>,
    ) -> StartedItem {
        let id = ReportId::new_random();
        self.record(TransportCall::StartItem {
            id,
            descriptor,
            launch_id,
            parent_id,
        });
        StartedItem {
            id,
            ack: self.ack(),
        }
    }

    fn finish_item(&self, id: ReportId, payload: FinishPayload) -> Acknowledgement {
        self.record(TransportCall::FinishItem { id, payload });
        self.ack()
    }

    fn send_log(
        &self,
        id: ReportId,
        payload: LogPayload,
        attachment: Option<Attachment>,
    ) -> Acknowledgement {
        self.record(TransportCall::SendLog {
            id,
            payload,
            attachment,
        });
        self.ack()
    }

    fn finish_launch(&self, id: ReportId) -> Acknowledgement {
        self.record(TransportCall::FinishLaunch { id });
        self.ack()
    }
}
