use std::fs;
use std::path::Path;

use booknav::config::NavConfig;
use booknav::header_tree::HeaderTree;
use booknav::parsing::heading_scanner::HeadingScanner;
use booknav::render::{render_on_this_page, render_outline};
use booknav::simulation::{Replay, ReplayError, ScrollTrace, TraceEvent};
use booknav::test_utils::fake_pages::{FakeHeading, create_fake_page};
use snapbox::{Data, assert_data_eq};

const PAGE: &str = "tests/testdata/page.html";
const TRACE: &str = "tests/testdata/trace.json";

fn load_trace() -> ScrollTrace {
    let content = fs::read_to_string(TRACE).unwrap();
    ScrollTrace::from_json(&content).unwrap()
}

#[test]
fn test_scanned_page_matches_sidebar_snapshot() {
    let headings = HeadingScanner::scan_file(PAGE).unwrap();
    let ids: Vec<_> = headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "installation",
            "from-source",
            "build-flags",
            "binaries",
            "usage",
            "advanced"
        ]
    );

    let tree = HeaderTree::build(headings, NavConfig::default().fold_level).unwrap();
    let html = format!("{}\n", render_on_this_page(&tree));
    assert_data_eq!(
        html,
        Data::read_from(Path::new("tests/testdata/on_this_page.html"), None)
    );
}

#[test]
fn test_trace_replay_over_scanned_page() {
    let headings = HeadingScanner::scan_file(PAGE).unwrap();
    let trace = load_trace();
    let mut replay = Replay::new(NavConfig::default(), headings, &trace).unwrap();
    replay.run(&trace.events).unwrap();

    let current: Vec<_> = replay
        .steps()
        .iter()
        .map(|step| step.current.clone().unwrap_or_default())
        .collect();
    assert_eq!(
        current,
        vec![
            "installation",
            "from-source",
            "build-flags",
            "build-flags",
            "build-flags",
            "build-flags",
            "usage",
            "advanced"
        ]
    );

    let thresholds: Vec<_> = replay.steps().iter().map(|step| step.threshold).collect();
    assert_eq!(
        thresholds,
        vec![150.0, 150.0, 150.0, 150.0, 150.0, 150.0, 30.0, 800.0]
    );

    let outline = render_outline(replay.state().tree().unwrap());
    assert_data_eq!(
        outline,
        Data::read_from(Path::new("tests/testdata/outline_after_trace.txt"), None)
    );
}

#[test]
fn test_steps_serialize_for_reports() {
    let trace = load_trace();
    let mut replay = Replay::new(NavConfig::default(), trace.headings().unwrap(), &trace).unwrap();
    replay.run(&trace.events[..1]).unwrap();

    let json = serde_json::to_value(replay.steps()).unwrap();
    assert_eq!(json[1]["event"], "scroll 650");
    assert_eq!(json[1]["current"], "from-source");
    assert_eq!(json[1]["suppressed"], false);
}

#[test]
fn test_click_on_heading_missing_from_page() {
    let trace = load_trace();
    let mut replay =
        Replay::new(NavConfig::default(), trace.headings().unwrap(), &trace).unwrap();
    replay.run(&trace.events[..1]).unwrap();

    let result = replay.apply(&TraceEvent::Click {
        id: "nowhere".to_string(),
    });
    assert_eq!(
        result,
        Err(ReplayError::UnknownHeading("nowhere".to_string()))
    );

    // The failed click must not open a window that swallows later scrolling
    assert!(!replay.state().is_suppressed());
    replay
        .run(&[TraceEvent::Scroll { top: 1000.0 }])
        .unwrap();
    assert_eq!(replay.current_id(), Some("build-flags"));
}

#[test]
fn test_page_written_to_disk_is_scanned() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("chapter.html");
    create_fake_page(
        &path,
        "Chapter",
        &[
            FakeHeading::new(3, "deep-start", "Deep start"),
            FakeHeading::new(2, "top", "Top"),
        ],
    )
    .unwrap();

    let headings = HeadingScanner::scan_file(path.to_str().unwrap()).unwrap();
    let tree = HeaderTree::build(headings, 3).unwrap();
    assert_eq!(
        render_outline(&tree),
        "(h2)\n  h3 #deep-start Deep start\nh2 #top Top\n"
    );
}

#[test]
fn test_missing_page_reports_path() {
    let err = HeadingScanner::scan_file("tests/testdata/missing.html").unwrap_err();
    assert!(err.to_string().contains("missing.html"));
}

#[test]
fn test_config_file_tunes_replay() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("booknav.json");
    fs::write(&path, r#"{ "down_threshold": 50, "suppression_ms": 250 }"#).unwrap();
    let config = NavConfig::load_or_default(path.to_str());
    assert_eq!(config.suppression_ms, 250);

    let trace = load_trace();
    let mut replay = Replay::new(config, trace.headings().unwrap(), &trace).unwrap();
    replay
        .run(&[
            TraceEvent::Scroll { top: 650.0 },
            TraceEvent::Click {
                id: "binaries".to_string(),
            },
            TraceEvent::Wait { ms: 100 },
        ])
        .unwrap();

    let steps = replay.steps();
    // from-source has crossed the 50px line, build-flags at 250px has not
    assert_eq!(steps[1].threshold, 50.0);
    assert_eq!(steps[1].current.as_deref(), Some("from-source"));
    assert!(steps[3].suppressed);
}
