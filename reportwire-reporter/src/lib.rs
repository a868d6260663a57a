// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core reporting engine for reportwire.
//!
//! This crate turns a stream of test-framework lifecycle events (run started,
//! case started, case result, file result, run complete) into a causally
//! ordered tree of remote report items: launch → suite → test → step.
//!
//! Remote operations are asynchronous and fire-and-forget: every start call
//! returns a locally assigned [`ReportId`](reportwire_model::ReportId)
//! synchronously along with an acknowledgement future, so the reporter never
//! blocks between events. All acknowledgements are joined once, at run
//! completion.
//!
//! The entry point is [`reporter::Reporter`]. The network layer is abstracted
//! behind [`transport::Transport`]; [`test_helpers::RecordingTransport`]
//! provides an in-memory implementation for tests.

pub mod config;
pub mod errors;
pub mod reporter;
pub mod test_helpers;
pub mod transport;
