// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A locally assigned identifier for a remote entity (launch, suite, test or
/// step).
///
/// Identifiers are handed out synchronously by the transport when a start
/// call is issued, before the remote acknowledgement resolves. All causal
/// ordering in the reporter is based on these local ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Creates a new random report ID.
    pub fn new_random() -> Self {
        ReportId(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of remote item a start descriptor creates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    /// A grouping construct at the top nesting level of a file.
    Suite,

    /// An intermediate grouping construct below the top level.
    Test,

    /// One executed test case invocation.
    Step,
}

/// The outcome carried by a step's finish payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// The invocation passed.
    Passed,

    /// The invocation failed.
    Failed,

    /// The invocation was skipped, or reported an unrecognized status.
    Skipped,
}

/// Severity of a log entry sent to the backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// An error message, e.g. a test failure.
    Error,
    /// A warning message.
    Warn,
    /// An informational message.
    Info,
    /// A debug message.
    Debug,
    /// A trace message.
    Trace,
}

/// A key/value attribute attached to a launch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute key. Bare values have no key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// The attribute value.
    pub value: String,

    /// True for attributes added by the agent itself rather than the user.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub system: bool,
}

impl Attribute {
    /// Creates a user attribute.
    pub fn new(key: Option<impl Into<String>>, value: impl Into<String>) -> Self {
        Attribute {
            key: key.map(Into::into),
            value: value.into(),
            system: false,
        }
    }

    /// Creates a system attribute.
    pub fn system(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            key: Some(key.into()),
            value: value.into(),
            system: true,
        }
    }
}

/// An issue marker carried by a finish payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The issue type identifier understood by the backend.
    #[serde(rename = "issueType")]
    pub issue_type: String,
}

impl Issue {
    /// The explicit "not an issue" marker, used so skipped items are not
    /// flagged as defects by the backend.
    pub fn not_issue() -> Self {
        Issue {
            issue_type: "NOT_ISSUE".to_owned(),
        }
    }
}

/// A file attached to a log entry, e.g. a screenshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// The file name.
    pub name: String,

    /// The MIME type of the content.
    pub mime_type: String,

    /// The raw file content.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates a new attachment.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Attachment {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn item_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ItemKind::Suite).unwrap(), r#""SUITE""#);
        assert_eq!(serde_json::to_string(&ItemKind::Test).unwrap(), r#""TEST""#);
        assert_eq!(serde_json::to_string(&ItemKind::Step).unwrap(), r#""STEP""#);
    }

    #[test]
    fn status_and_level_are_lowercase() {
        assert_eq!(serde_json::to_string(&ItemStatus::Passed).unwrap(), r#""passed""#);
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), r#""error""#);
    }

    #[test]
    fn system_flag_is_omitted_for_user_attributes() {
        let user = serde_json::to_value(Attribute::new(Some("env"), "ci")).unwrap();
        assert_eq!(user, serde_json::json!({"key": "env", "value": "ci"}));

        let system = serde_json::to_value(Attribute::system("agent", "reportwire|0.1.0")).unwrap();
        assert_eq!(
            system,
            serde_json::json!({"key": "agent", "value": "reportwire|0.1.0", "system": true})
        );
    }

    #[test]
    fn not_issue_marker() {
        let issue = serde_json::to_value(Issue::not_issue()).unwrap();
        assert_eq!(issue, serde_json::json!({"issueType": "NOT_ISSUE"}));
    }
}
