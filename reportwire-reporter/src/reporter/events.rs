// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use std::time::Duration;

/// A test lifecycle event, as dispatched by the host test runner.
///
/// Events are consumed by [`Reporter::report_event`](crate::reporter::Reporter::report_event).
/// The individual `on_*` callbacks on the reporter accept the same data in
/// unpacked form.
#[derive(Clone, Debug)]
pub enum RunEvent {
    /// The test run started.
    RunStarted,

    /// A test case invocation started running.
    ///
    /// Not dispatched by runners for skipped cases; those surface only in
    /// [`RunEvent::FileFinished`].
    CaseStarted {
        /// Path to the test file the case lives in.
        file_path: Utf8PathBuf,

        /// The case that started.
        case: CaseStart,
    },

    /// A test case invocation finished running.
    CaseFinished {
        /// Path to the test file the case lives in.
        file_path: Utf8PathBuf,

        /// The invocation's result.
        result: CaseResult,
    },

    /// All cases of a test file were reported.
    FileFinished {
        /// Path to the finished test file.
        file_path: Utf8PathBuf,

        /// Results for every case in the file, including cases that never
        /// individually started (skipped specs).
        results: Vec<CaseResult>,
    },

    /// The test run finished.
    RunFinished,
}

/// Information about a test case known when an invocation starts.
#[derive(Clone, Debug)]
pub struct CaseStart {
    /// The case's own title.
    pub title: String,

    /// Titles of the enclosing suites, outermost first.
    pub ancestor_titles: Vec<String>,
}

/// The result of one test case, as reported by the host runner.
#[derive(Clone, Debug)]
pub struct CaseResult {
    /// The case's own title.
    pub title: String,

    /// Titles of the enclosing suites, outermost first.
    pub ancestor_titles: Vec<String>,

    /// The reported outcome.
    pub status: CaseStatus,

    /// Failure messages, first message first. May carry ANSI control codes.
    pub failure_messages: Vec<String>,

    /// How long the case took to run.
    pub duration: Duration,

    /// The number of invocations the runner recorded for this case, when
    /// known. Absent is treated as exactly one invocation.
    pub invocations: Option<usize>,
}

impl CaseResult {
    /// Returns the first failure message, if any.
    pub fn first_failure(&self) -> Option<&str> {
        self.failure_messages.first().map(String::as_str)
    }
}

/// The outcome of a test case as reported by the host runner.
///
/// Anything that is neither [`Passed`](CaseStatus::Passed) nor
/// [`Failed`](CaseStatus::Failed) is reported to the backend as skipped, so
/// unknown runner statuses never crash a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaseStatus {
    /// The case passed.
    Passed,

    /// The case failed.
    Failed,

    /// The case was skipped.
    Skipped,

    /// The case is pending (declared but not implemented).
    Pending,

    /// The case is marked todo.
    Todo,

    /// The case was disabled.
    Disabled,
}

impl CaseStatus {
    /// True for every status that maps to a skipped finish.
    pub fn is_skipped(self) -> bool {
        !matches!(self, CaseStatus::Passed | CaseStatus::Failed)
    }
}
