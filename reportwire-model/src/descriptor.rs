// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Attribute, CodeRef, Issue, ItemKind, ItemStatus, LogLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The payload for a remote item "start" call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StartDescriptor {
    /// The kind of item to create.
    #[serde(rename = "type")]
    pub kind: ItemKind,

    /// The display name of the item.
    pub name: String,

    /// The item's code reference.
    #[serde(rename = "codeRef")]
    pub code_ref: CodeRef,

    /// The time at which the item started.
    #[serde(rename = "startTime", with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,

    /// True if this step invocation is a retry of an earlier invocation with
    /// the same code reference. Always false for suites and tests.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retry: bool,
}

impl StartDescriptor {
    /// Creates a start descriptor for a suite.
    pub fn suite(name: impl Into<String>, code_ref: CodeRef, start_time: DateTime<Utc>) -> Self {
        Self::new(ItemKind::Suite, name, code_ref, start_time, false)
    }

    /// Creates a start descriptor for an intermediate test node.
    pub fn test(name: impl Into<String>, code_ref: CodeRef, start_time: DateTime<Utc>) -> Self {
        Self::new(ItemKind::Test, name, code_ref, start_time, false)
    }

    /// Creates a start descriptor for a step.
    pub fn step(
        name: impl Into<String>,
        code_ref: CodeRef,
        start_time: DateTime<Utc>,
        retry: bool,
    ) -> Self {
        Self::new(ItemKind::Step, name, code_ref, start_time, retry)
    }

    fn new(
        kind: ItemKind,
        name: impl Into<String>,
        code_ref: CodeRef,
        start_time: DateTime<Utc>,
        retry: bool,
    ) -> Self {
        StartDescriptor {
            kind,
            name: name.into(),
            code_ref,
            start_time,
            retry,
        }
    }
}

/// The payload for the launch "start" call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LaunchDescriptor {
    /// The launch name.
    #[serde(rename = "launch")]
    pub name: String,

    /// Free-form launch description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Launch attributes, user-supplied and system.
    pub attributes: Vec<Attribute>,

    /// The backend analysis mode, e.g. `DEBUG`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// True if this launch is a rerun of an earlier one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerun: Option<bool>,

    /// The launch this one is a rerun of.
    #[serde(rename = "rerunOf", skip_serializing_if = "Option::is_none")]
    pub rerun_of: Option<String>,

    /// The time at which the run started.
    #[serde(rename = "startTime", with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,

    /// A pre-existing launch to attach to, instead of creating a new one.
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
}

impl LaunchDescriptor {
    /// Creates a launch descriptor with the given name and start time.
    pub fn new(name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        LaunchDescriptor {
            name: name.into(),
            description: None,
            attributes: vec![],
            mode: None,
            rerun: None,
            rerun_of: None,
            start_time,
            existing_id: None,
        }
    }
}

/// The payload for a remote item "finish" call.
///
/// Suites and tests finish with an empty payload; steps carry a status and,
/// depending on the outcome and configuration, a description or an issue
/// marker.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FinishPayload {
    /// The outcome status. Absent for suites and tests, whose status is
    /// derived by the backend from their children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,

    /// A markdown description, e.g. a fenced error block for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// An issue marker overriding the backend's defect classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<Issue>,
}

impl FinishPayload {
    /// The empty payload used to finish suites and tests.
    pub fn empty() -> Self {
        FinishPayload::default()
    }

    /// The payload for a passed step.
    pub fn passed() -> Self {
        FinishPayload {
            status: Some(ItemStatus::Passed),
            ..FinishPayload::default()
        }
    }

    /// The payload for a failed step.
    ///
    /// When `extend_description` is true and a failure message is present,
    /// the payload carries a fenced error block built from the ANSI-stripped
    /// message; otherwise no description is attached.
    pub fn failed(failure_message: Option<&str>, extend_description: bool) -> Self {
        let description = match failure_message {
            Some(message) if extend_description => Some(failure_description(message)),
            _ => None,
        };
        FinishPayload {
            status: Some(ItemStatus::Failed),
            description,
            issue: None,
        }
    }

    /// The payload for a skipped step (including unrecognized outcomes).
    ///
    /// When `skipped_issue` is false, an explicit "not an issue" marker is
    /// attached so the backend does not flag the item as a defect.
    pub fn skipped(skipped_issue: bool) -> Self {
        FinishPayload {
            status: Some(ItemStatus::Skipped),
            description: None,
            issue: (!skipped_issue).then(Issue::not_issue),
        }
    }
}

/// The payload for a log call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogPayload {
    /// The log severity.
    pub level: LogLevel,

    /// The log message.
    pub message: String,

    /// The time the entry refers to.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
}

impl LogPayload {
    /// Creates a new log payload.
    pub fn new(level: LogLevel, message: impl Into<String>, time: DateTime<Utc>) -> Self {
        LogPayload {
            level,
            message: message.into(),
            time,
        }
    }
}

/// Builds the fenced error block embedded in a failed step's description.
///
/// ANSI control codes are stripped so terminal coloring from assertion
/// libraries does not leak into the backend.
pub fn failure_description(message: &str) -> String {
    format!("```error\n{}\n```", strip_ansi(message))
}

/// Strips ANSI control codes from a message.
pub fn strip_ansi(message: &str) -> String {
    strip_ansi_escapes::strip_str(message)
}
