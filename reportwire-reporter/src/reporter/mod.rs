// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The run orchestrator and its supporting state.
//!
//! The main structure in this module is [`Reporter`].

mod events;
mod imp;
mod pending;
mod step_tracker;
mod suite_tree;

pub use events::*;
pub use imp::Reporter;
pub use pending::PendingOperations;
