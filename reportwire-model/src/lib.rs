// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model for reportwire.
//!
//! This crate contains the pure, I/O-free building blocks used by the
//! reporting engine in `reportwire-reporter`:
//!
//! * [`CodeRef`]: deterministic hierarchical identity strings for suites,
//!   tests and steps.
//! * [`StartDescriptor`] and [`LaunchDescriptor`]: the request payloads for
//!   remote "start" calls.
//! * [`FinishPayload`]: the payload for remote "finish" calls, including
//!   failure descriptions and skipped-issue markers.
//!
//! Everything in here is deterministic for identical inputs: descriptor
//! construction never touches the clock, the environment or the network.

mod code_ref;
mod descriptor;
mod items;

pub use code_ref::*;
pub use descriptor::*;
pub use items::*;
