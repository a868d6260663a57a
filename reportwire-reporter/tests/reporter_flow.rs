// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end reporter flows against the recording transport.

use camino::Utf8Path;
use reportwire_model::{Attachment, FinishPayload, ItemKind, ItemStatus, LogLevel, ReportId};
use reportwire_reporter::{
    config::ReporterConfig,
    reporter::{CaseResult, CaseStart, CaseStatus, Reporter, RunEvent},
    test_helpers::{RecordingTransport, TransportCall},
};
use std::time::Duration;

const FILE_A: &str = "/proj/tests/a.js";
const FILE_B: &str = "/proj/tests/b.js";

fn reporter_with(config: ReporterConfig, transport: &RecordingTransport) -> Reporter {
    Reporter::new(config, Box::new(transport.clone()), "/proj")
}

fn case_start(title: &str, ancestors: &[&str]) -> CaseStart {
    CaseStart {
        title: title.to_owned(),
        ancestor_titles: ancestors.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn case_result(title: &str, ancestors: &[&str], status: CaseStatus) -> CaseResult {
    CaseResult {
        title: title.to_owned(),
        ancestor_titles: ancestors.iter().map(|s| (*s).to_owned()).collect(),
        status,
        failure_messages: vec![],
        duration: Duration::from_millis(25),
        invocations: None,
    }
}

fn failed_result(title: &str, ancestors: &[&str], message: &str) -> CaseResult {
    CaseResult {
        failure_messages: vec![message.to_owned()],
        ..case_result(title, ancestors, CaseStatus::Failed)
    }
}

/// Id of the i-th step start call for the given code ref suffix.
fn step_start_ids(transport: &RecordingTransport, name: &str) -> Vec<ReportId> {
    transport
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            TransportCall::StartItem { id, descriptor, .. }
                if descriptor.kind == ItemKind::Step && descriptor.name == name =>
            {
                Some(id)
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn single_passing_test_produces_the_expected_sequence() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    reporter.on_test_case_start(file, &case_start("b", &["A"]));
    reporter.on_test_case_result(file, &case_result("b", &["A"], CaseStatus::Passed));
    reporter.on_test_file_result(file, &[case_result("b", &["A"], CaseStatus::Passed)]);
    reporter.on_run_complete().await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 6, "unexpected calls: {calls:#?}");

    let launch_id = match &calls[0] {
        TransportCall::StartLaunch { id, descriptor } => {
            assert_eq!(descriptor.name, "Unit Tests");
            *id
        }
        other => panic!("expected launch start, got {other:?}"),
    };
    let suite_id = match &calls[1] {
        TransportCall::StartItem {
            id,
            descriptor,
            launch_id: recorded_launch,
            parent_id,
        } => {
            assert_eq!(descriptor.kind, ItemKind::Suite);
            assert_eq!(descriptor.name, "A");
            assert_eq!(descriptor.code_ref.as_str(), "tests/a.js/A");
            assert_eq!(*recorded_launch, launch_id);
            assert_eq!(*parent_id, None);
            *id
        }
        other => panic!("expected suite start, got {other:?}"),
    };
    let step_id = match &calls[2] {
        TransportCall::StartItem {
            id,
            descriptor,
            parent_id,
            ..
        } => {
            assert_eq!(descriptor.kind, ItemKind::Step);
            assert_eq!(descriptor.code_ref.as_str(), "tests/a.js/A/b");
            assert!(!descriptor.retry);
            assert_eq!(*parent_id, Some(suite_id));
            *id
        }
        other => panic!("expected step start, got {other:?}"),
    };
    assert_eq!(
        calls[3],
        TransportCall::FinishItem {
            id: step_id,
            payload: FinishPayload::passed(),
        }
    );
    assert_eq!(
        calls[4],
        TransportCall::FinishItem {
            id: suite_id,
            payload: FinishPayload::empty(),
        }
    );
    assert_eq!(calls[5], TransportCall::FinishLaunch { id: launch_id });
}

#[tokio::test]
async fn retried_test_matches_finishes_fifo_and_flags_retries() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();

    // first attempt fails, second passes
    reporter.on_test_case_start(file, &case_start("b", &["A"]));
    reporter.on_test_case_result(file, &failed_result("b", &["A"], "\u{1b}[31mboom\u{1b}[0m"));
    reporter.on_test_case_start(file, &case_start("b", &["A"]));
    reporter.on_test_case_result(file, &case_result("b", &["A"], CaseStatus::Passed));

    let starts = step_start_ids(&transport, "b");
    assert_eq!(starts.len(), 2);

    let retries: Vec<bool> = transport
        .started_items()
        .into_iter()
        .filter(|descriptor| descriptor.kind == ItemKind::Step)
        .map(|descriptor| descriptor.retry)
        .collect();
    assert_eq!(retries, vec![false, true]);

    let finished = transport.finished_items();
    assert_eq!(finished.len(), 2);
    assert_eq!(finished[0].0, starts[0], "oldest invocation finishes first");
    assert_eq!(finished[1].0, starts[1]);

    assert_eq!(finished[0].1.status, Some(ItemStatus::Failed));
    assert_eq!(
        finished[0].1.description.as_deref(),
        Some("```error\nboom\n```"),
        "description is ANSI-stripped"
    );
    assert_eq!(finished[1].1, FinishPayload::passed());

    // the failed attempt also logged the raw failure message against its id
    let logs: Vec<_> = transport
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            TransportCall::SendLog { id, payload, .. } => Some((id, payload)),
            _ => None,
        })
        .collect();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].0, starts[0]);
    assert_eq!(logs[0].1.level, LogLevel::Error);
    assert_eq!(logs[0].1.message, "\u{1b}[31mboom\u{1b}[0m");
}

#[tokio::test]
async fn n_invocations_issue_n_pairs_in_order() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    for attempt in 0..4 {
        reporter.on_test_case_start(file, &case_start("b", &["A"]));
        let status = if attempt == 3 {
            CaseStatus::Passed
        } else {
            CaseStatus::Failed
        };
        let mut result = case_result("b", &["A"], status);
        if status == CaseStatus::Failed {
            result.failure_messages = vec!["boom".to_owned()];
        }
        reporter.on_test_case_result(file, &result);
    }

    let starts = step_start_ids(&transport, "b");
    let finished = transport.finished_items();
    assert_eq!(starts.len(), 4);
    assert_eq!(finished.len(), 4);
    for (i, (finish_id, _)) in finished.iter().enumerate() {
        assert_eq!(*finish_id, starts[i], "finish {i} targets start {i}");
    }

    let retries: Vec<bool> = transport
        .started_items()
        .into_iter()
        .filter(|descriptor| descriptor.kind == ItemKind::Step)
        .map(|descriptor| descriptor.retry)
        .collect();
    assert_eq!(retries, vec![false, true, true, true]);
}

#[tokio::test]
async fn nested_suites_open_once_and_wire_parents() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    reporter.on_test_case_start(file, &case_start("t1", &["Outer", "Inner"]));
    reporter.on_test_case_result(file, &case_result("t1", &["Outer", "Inner"], CaseStatus::Passed));
    // sibling under the same suites: no new suite/test starts
    reporter.on_test_case_start(file, &case_start("t2", &["Outer", "Inner"]));
    reporter.on_test_case_result(file, &case_result("t2", &["Outer", "Inner"], CaseStatus::Passed));

    let items = transport.started_items();
    let kinds: Vec<ItemKind> = items.iter().map(|descriptor| descriptor.kind).collect();
    assert_eq!(
        kinds,
        vec![ItemKind::Suite, ItemKind::Test, ItemKind::Step, ItemKind::Step]
    );
    assert_eq!(items[0].code_ref.as_str(), "tests/a.js/Outer");
    assert_eq!(items[1].code_ref.as_str(), "tests/a.js/Outer/Inner");
    assert_eq!(items[2].code_ref.as_str(), "tests/a.js/Outer/Inner/t1");

    // steps hang off the intermediate test node
    let calls = transport.calls();
    let test_id = match &calls[2] {
        TransportCall::StartItem { id, .. } => *id,
        other => panic!("unexpected call {other:?}"),
    };
    match &calls[3] {
        TransportCall::StartItem { parent_id, .. } => assert_eq!(*parent_id, Some(test_id)),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn skipped_specs_are_reconciled_from_the_file_result() {
    let transport = RecordingTransport::new();
    let config = ReporterConfig {
        skipped_issue: false,
        ..ReporterConfig::default()
    };
    let mut reporter = reporter_with(config, &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    // the runner never started this case; it only appears in the file result
    let mut skipped = case_result("someday", &["A"], CaseStatus::Pending);
    skipped.invocations = Some(2);
    reporter.on_test_file_result(file, &[skipped]);

    let items = transport.started_items();
    assert_eq!(items.len(), 3, "suite + two step invocations");
    assert_eq!(items[0].kind, ItemKind::Suite);
    assert_eq!(items[1].kind, ItemKind::Step);
    assert!(!items[1].retry);
    assert!(items[2].retry, "second synthesized invocation is a retry");

    let finished = transport.finished_items();
    // two skipped steps with the explicit marker, then the suite
    assert_eq!(finished.len(), 3);
    assert_eq!(finished[0].1, FinishPayload::skipped(false));
    assert_eq!(finished[1].1, FinishPayload::skipped(false));
    assert_eq!(finished[2].1, FinishPayload::empty());
}

#[tokio::test]
async fn file_finish_cascade_spares_other_files() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file_a = Utf8Path::new(FILE_A);
    let file_b = Utf8Path::new(FILE_B);

    reporter.on_run_start();
    reporter.on_test_case_start(file_a, &case_start("t", &["S1", "S2"]));
    reporter.on_test_case_result(file_a, &case_result("t", &["S1", "S2"], CaseStatus::Passed));
    reporter.on_test_case_start(file_b, &case_start("u", &["S3"]));
    reporter.on_test_case_result(file_b, &case_result("u", &["S3"], CaseStatus::Passed));

    reporter.on_test_file_result(file_a, &[case_result("t", &["S1", "S2"], CaseStatus::Passed)]);

    let finished_refs: Vec<String> = transport
        .calls()
        .iter()
        .filter_map(|call| match call {
            TransportCall::FinishItem { id, .. } => transport.calls().iter().find_map(|start| {
                match start {
                    TransportCall::StartItem {
                        id: started,
                        descriptor,
                        ..
                    } if started == id && descriptor.kind != ItemKind::Step => {
                        Some(descriptor.code_ref.as_str().to_owned())
                    }
                    _ => None,
                }
            }),
            _ => None,
        })
        .collect();

    assert_eq!(
        finished_refs,
        vec!["tests/a.js/S1/S2".to_owned(), "tests/a.js/S1".to_owned()],
        "a.js suites close deepest-first; b.js stays open"
    );
}

#[tokio::test]
async fn external_launch_is_not_finished() {
    let transport = RecordingTransport::new();
    let config = ReporterConfig {
        launch_id: Some("existing-launch".to_owned()),
        ..ReporterConfig::default()
    };
    let mut reporter = reporter_with(config, &transport);

    reporter.on_run_start();
    reporter.on_run_complete().await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        TransportCall::StartLaunch { descriptor, .. } => {
            assert_eq!(descriptor.existing_id.as_deref(), Some("existing-launch"));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn failed_acknowledgements_do_not_abort_the_run() {
    let transport = RecordingTransport::failing();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    reporter.on_test_case_start(file, &case_start("b", &["A"]));
    reporter.on_test_case_result(file, &case_result("b", &["A"], CaseStatus::Passed));
    reporter.on_test_file_result(file, &[case_result("b", &["A"], CaseStatus::Passed)]);
    reporter.on_run_complete().await;

    // every operation was still issued, including the launch finish
    assert!(matches!(
        transport.calls().last(),
        Some(TransportCall::FinishLaunch { .. })
    ));
}

#[tokio::test]
async fn finish_without_start_is_skipped() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    reporter.on_test_case_result(file, &case_result("ghost", &["A"], CaseStatus::Passed));

    assert_eq!(transport.finished_items().len(), 0);
}

#[tokio::test]
async fn user_logs_are_bound_to_the_current_step() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);
    let file = Utf8Path::new(FILE_A);

    reporter.on_run_start();
    reporter.on_test_case_start(file, &case_start("b", &["A"]));
    let attachment = Attachment::new("shot.png", "image/png", vec![1, 2, 3]);
    reporter.send_attachment(attachment.clone(), Some("the screenshot"));

    let step_id = step_start_ids(&transport, "b")[0];
    match transport.calls().last() {
        Some(TransportCall::SendLog {
            id,
            payload,
            attachment: sent,
        }) => {
            assert_eq!(*id, step_id);
            assert_eq!(payload.level, LogLevel::Info);
            assert_eq!(payload.message, "the screenshot");
            assert_eq!(sent.as_ref(), Some(&attachment));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn event_dispatch_drives_the_same_flow() {
    let transport = RecordingTransport::new();
    let mut reporter = reporter_with(ReporterConfig::default(), &transport);

    reporter.report_event(RunEvent::RunStarted).await;
    reporter
        .report_event(RunEvent::CaseStarted {
            file_path: FILE_A.into(),
            case: case_start("b", &["A"]),
        })
        .await;
    reporter
        .report_event(RunEvent::CaseFinished {
            file_path: FILE_A.into(),
            result: case_result("b", &["A"], CaseStatus::Passed),
        })
        .await;
    reporter
        .report_event(RunEvent::FileFinished {
            file_path: FILE_A.into(),
            results: vec![case_result("b", &["A"], CaseStatus::Passed)],
        })
        .await;
    reporter.report_event(RunEvent::RunFinished).await;

    assert!(matches!(
        transport.calls().last(),
        Some(TransportCall::FinishLaunch { .. })
    ));
}
