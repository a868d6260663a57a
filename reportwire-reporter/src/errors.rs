// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by reportwire.
//!
//! Remote failures are deliberately non-fatal: the reporter logs them at the
//! point where an acknowledgement resolves and carries on, because item
//! existence is decided from locally assigned ids, not from remote
//! acknowledgements.

use thiserror::Error;

/// An error produced by a transport operation.
///
/// Concrete transports map their underlying failures (HTTP status, I/O,
/// serialization) into this type when resolving an
/// [`Acknowledgement`](crate::transport::Acknowledgement).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("remote reporting operation failed: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Creates a new transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
