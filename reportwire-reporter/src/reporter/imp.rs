// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    events::{CaseResult, CaseStart, CaseStatus, RunEvent},
    pending::PendingOperations,
    step_tracker::StepTracker,
    suite_tree::SuiteTree,
};
use crate::{
    config::ReporterConfig,
    transport::{StartedItem, Transport},
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use reportwire_model::{
    Attachment, CodeRef, FinishPayload, LogLevel, LogPayload, ReportId, StartDescriptor,
    full_step_name, full_test_name, strip_ansi,
};
use std::time::Duration;
use tracing::warn;

/// Maps test lifecycle events to remote report items.
///
/// The reporter is driven synchronously by the host runner's callback
/// dispatch and is never invoked concurrently with itself, so its state is a
/// set of plain maps. Remote calls are fire-and-forget; the only blocking
/// point is [`Reporter::on_run_complete`], which joins every acknowledgement
/// issued during the run.
pub struct Reporter {
    config: ReporterConfig,
    transport: Box<dyn Transport>,
    root: Utf8PathBuf,
    launch_id: Option<ReportId>,
    suites: SuiteTree,
    steps: StepTracker,
    pending: PendingOperations,
    current_step_id: Option<ReportId>,
}

impl Reporter {
    /// Creates a reporter.
    ///
    /// `root` is the working root that test file paths are made relative to
    /// when deriving code references.
    pub fn new(
        config: ReporterConfig,
        transport: Box<dyn Transport>,
        root: impl Into<Utf8PathBuf>,
    ) -> Self {
        Reporter {
            config,
            transport,
            root: root.into(),
            launch_id: None,
            suites: SuiteTree::new(),
            steps: StepTracker::new(),
            pending: PendingOperations::new(),
            current_step_id: None,
        }
    }

    /// Dispatches a test lifecycle event.
    pub async fn report_event(&mut self, event: RunEvent) {
        match event {
            RunEvent::RunStarted => self.on_run_start(),
            RunEvent::CaseStarted { file_path, case } => {
                self.on_test_case_start(&file_path, &case);
            }
            RunEvent::CaseFinished { file_path, result } => {
                self.on_test_case_result(&file_path, &result);
            }
            RunEvent::FileFinished { file_path, results } => {
                self.on_test_file_result(&file_path, &results);
            }
            RunEvent::RunFinished => self.on_run_complete().await,
        }
    }

    /// Handles run start: issues the launch start call and records the
    /// launch id as the root parent for all top-level suites.
    pub fn on_run_start(&mut self) {
        if self.launch_id.is_some() {
            warn!("run started twice, ignoring the second start");
            return;
        }
        let descriptor = self.config.launch_descriptor(Utc::now());
        let StartedItem { id, ack } = self.transport.start_launch(descriptor);
        self.launch_id = Some(id);
        self.pending.push(ack);
    }

    /// Handles a live case start: opens the case's ancestor chain (lazily,
    /// idempotently) and starts a step invocation under the nearest open
    /// ancestor.
    ///
    /// Runners do not dispatch this for skipped cases; those are reconciled
    /// in [`Reporter::on_test_file_result`].
    pub fn on_test_case_start(&mut self, file_path: &Utf8Path, case: &CaseStart) {
        if self.launch_id.is_none() {
            warn!("case started before the run, ignoring");
            return;
        }
        let file_ref = self.file_ref(file_path);
        let now = Utc::now();
        self.start_ancestors(&file_ref, &case.ancestor_titles, now, now);
        self.start_step(&file_ref, &case.title, &case.ancestor_titles, now);
    }

    /// Handles a live case result: finishes the oldest open invocation of
    /// the case's step.
    pub fn on_test_case_result(&mut self, file_path: &Utf8Path, result: &CaseResult) {
        let file_ref = self.file_ref(file_path);
        self.finish_step(&file_ref, result);
    }

    /// Handles a completed file.
    ///
    /// First reconciles cases the runner never individually started (skipped
    /// specs): their ancestor chains are opened with synthesized start times
    /// and each recorded invocation is started and finished as a pair. Then
    /// every open suite and test belonging to the file is finished, children
    /// before parents.
    pub fn on_test_file_result(&mut self, file_path: &Utf8Path, results: &[CaseResult]) {
        if self.launch_id.is_none() {
            warn!("file finished before the run started, ignoring");
            return;
        }
        let file_ref = self.file_ref(file_path);

        let skipped: Vec<&CaseResult> = results
            .iter()
            .filter(|result| result.status.is_skipped())
            .collect();

        // Synthesize start times the way the durations accumulate: the suite
        // covers every skipped case, intermediate tests only the nested ones.
        let mut suite_duration = Duration::ZERO;
        let mut test_duration = Duration::ZERO;
        for case in &skipped {
            suite_duration += case.duration;
            if case.ancestor_titles.len() != 1 {
                test_duration += case.duration;
            }
        }

        for case in skipped {
            let now = Utc::now();
            self.start_ancestors(
                &file_ref,
                &case.ancestor_titles,
                now - to_chrono(suite_duration),
                now - to_chrono(test_duration),
            );

            let invocations = case.invocations.unwrap_or(1).max(1);
            for _ in 0..invocations {
                let start_time = Utc::now() - to_chrono(case.duration);
                self.start_step(&file_ref, &case.title, &case.ancestor_titles, start_time);
                self.finish_step(&file_ref, case);
            }
        }

        self.suites
            .finish_file(self.transport.as_ref(), &mut self.pending, &file_ref);
        self.steps.drop_file(&file_ref);
    }

    /// Handles run completion: waits for every pending operation, then
    /// finishes the launch (unless it was externally supplied) and waits for
    /// that too.
    pub async fn on_run_complete(&mut self) {
        self.pending.drain_all().await;

        if self.config.launch_id.is_some() {
            // attached to an existing launch owned by someone else
            return;
        }
        let Some(launch_id) = self.launch_id.take() else {
            warn!("run completed without having started");
            return;
        };
        if let Err(error) = self.transport.finish_launch(launch_id).wait().await {
            warn!("{error}");
        }
    }

    /// Sends a log entry bound to the most recently started step.
    ///
    /// The message is ANSI-stripped. Intended for user-level reporting such
    /// as screenshots and attachments.
    pub fn send_log(&mut self, level: LogLevel, message: &str, attachment: Option<Attachment>) {
        let Some(id) = self.current_step_id else {
            warn!("log sent while no step is open, skipping");
            return;
        };
        let payload = LogPayload::new(level, strip_ansi(message), Utc::now());
        self.pending.push(self.transport.send_log(id, payload, attachment));
    }

    /// Sends a file attachment for the current step, with an optional
    /// description as the log message.
    pub fn send_attachment(&mut self, attachment: Attachment, description: Option<&str>) {
        self.send_log(LogLevel::Info, description.unwrap_or(""), Some(attachment));
    }

    fn file_ref(&self, file_path: &Utf8Path) -> CodeRef {
        CodeRef::for_file(&self.root, file_path)
    }

    /// Opens the full ancestor chain for a title chain, left to right,
    /// threading each prefix as the next prefix's parent. The top level opens
    /// as a suite, deeper levels as tests.
    fn start_ancestors(
        &mut self,
        file_ref: &CodeRef,
        ancestor_titles: &[String],
        suite_start: DateTime<Utc>,
        test_start: DateTime<Utc>,
    ) {
        let Some(launch_id) = self.launch_id else {
            return;
        };
        let mut parent: Option<CodeRef> = None;
        for (depth, title) in ancestor_titles.iter().enumerate() {
            let code_ref = match &parent {
                Some(parent_ref) => parent_ref.child(title),
                None => file_ref.child(title),
            };
            let descriptor = if depth == 0 {
                StartDescriptor::suite(title, code_ref.clone(), suite_start)
            } else {
                StartDescriptor::test(title, code_ref.clone(), test_start)
            };
            self.suites.ensure_open(
                self.transport.as_ref(),
                &mut self.pending,
                launch_id,
                descriptor,
                parent.as_ref(),
            );
            parent = Some(code_ref);
        }
    }

    /// Resolves the parent for a step: the deepest open suite or test node
    /// along the ancestor chain, falling back towards the top-level suite.
    /// Returns `None` for root-level steps, which attach directly under the
    /// launch.
    fn nearest_open_ancestor(
        &self,
        file_ref: &CodeRef,
        ancestor_titles: &[String],
    ) -> Option<ReportId> {
        for end in (1..=ancestor_titles.len()).rev() {
            let code_ref = file_ref.child(&full_test_name(&ancestor_titles[..end]));
            if let Some(id) = self.suites.id_of(&code_ref) {
                return Some(id);
            }
        }
        None
    }

    /// Starts one step invocation. The retry flag is a function of how many
    /// invocations this code reference already had, never of outcome.
    fn start_step(
        &mut self,
        file_ref: &CodeRef,
        title: &str,
        ancestor_titles: &[String],
        start_time: DateTime<Utc>,
    ) {
        let Some(launch_id) = self.launch_id else {
            return;
        };
        let code_ref = file_ref.child(&full_step_name(ancestor_titles, title));
        let retry = self.steps.is_retry(&code_ref);
        let parent_id = self.nearest_open_ancestor(file_ref, ancestor_titles);

        let descriptor = StartDescriptor::step(title, code_ref.clone(), start_time, retry);
        let StartedItem { id, ack } = self.transport.start_item(descriptor, launch_id, parent_id);
        self.steps.record_started(code_ref, id);
        self.current_step_id = Some(id);
        self.pending.push(ack);
    }

    /// Finishes the oldest open invocation of a step, classifying the
    /// outcome into the finish payload. A finish with no open invocation is
    /// reported and skipped.
    fn finish_step(&mut self, file_ref: &CodeRef, result: &CaseResult) {
        let code_ref = file_ref.child(&full_step_name(&result.ancestor_titles, &result.title));
        let Some(id) = self.steps.take_oldest(&code_ref) else {
            warn!(code_ref = %code_ref, "finish received for a step with no open invocation, skipping");
            return;
        };

        let payload = match result.status {
            CaseStatus::Passed => FinishPayload::passed(),
            CaseStatus::Failed => {
                if let Some(message) = result.first_failure() {
                    let log = LogPayload::new(LogLevel::Error, message, Utc::now());
                    self.pending.push(self.transport.send_log(id, log, None));
                }
                FinishPayload::failed(
                    result.first_failure(),
                    self.config.extend_description_with_last_error,
                )
            }
            _ => FinishPayload::skipped(self.config.skipped_issue),
        };
        self.pending.push(self.transport.finish_item(id, payload));
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero())
}
