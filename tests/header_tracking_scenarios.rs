use booknav::config::NavConfig;
use booknav::header_tree::HeaderTree;
use booknav::sidebar_scroll::{
    ActiveEntry, MemoryStore, SessionStore, SidebarRestore, SidebarScrollMemory,
};
use booknav::test_utils::test_helpers::ScenarioBuilder;
use booknav::types::Heading;

fn levels(levels: &[u8]) -> Vec<Heading> {
    levels
        .iter()
        .enumerate()
        .map(|(i, level)| Heading::new(*level, format!("h{i}"), format!("Heading {i}")))
        .collect()
}

fn thresholds(replay: &booknav::simulation::Replay) -> Vec<f64> {
    replay.steps().iter().map(|step| step.threshold).collect()
}

#[test]
fn test_sibling_and_nested_levels_form_two_roots() {
    let tree = HeaderTree::build(levels(&[2, 3, 3, 4, 2]), 3).unwrap();

    assert_eq!(tree.roots(), &[0, 4]);
    assert_eq!(tree.node(0).unwrap().children, vec![1, 2]);
    assert!(tree.node(1).unwrap().children.is_empty());
    assert_eq!(tree.node(2).unwrap().children, vec![3]);
    assert!(tree.node(4).unwrap().children.is_empty());
}

#[test]
fn test_no_node_skips_a_level() {
    for sequence in [
        &[2, 4, 6, 3][..],
        &[4, 2, 5],
        &[6],
        &[3, 3, 6, 2, 6, 4],
    ] {
        let tree = HeaderTree::build(levels(sequence), 3).unwrap();
        for id in 0..tree.len() {
            let node = tree.node(id).unwrap();
            match node.parent {
                Some(parent) => {
                    assert_eq!(tree.node(parent).unwrap().level + 1, node.level, "{sequence:?}");
                }
                None => assert_eq!(node.level, 2, "{sequence:?}"),
            }
        }
    }
}

#[test]
fn test_scrolling_down_never_raises_threshold() {
    let replay = ScenarioBuilder::new(800.0, 2000.0)
        .heading(2, "intro", 0.0)
        .heading(2, "middle", 700.0)
        .heading(2, "end", 1500.0)
        .scroll_through(0.0, 500.0, 10)
        .run()
        .unwrap();

    let values = thresholds(&replay);
    let initial = values[0];
    for pair in values.windows(2) {
        assert!(pair[1] <= pair[0], "{values:?}");
        assert!(pair[1] <= initial);
    }
    // At 500px the viewport is still 700px away from the bottom
    assert_eq!(values.last().copied(), Some(150.0));
}

#[test]
fn test_threshold_relaxes_by_distance_scrolled() {
    let replay = ScenarioBuilder::new(800.0, 4000.0)
        .heading(2, "intro", 0.0)
        .scroll(1000.0)
        .scroll(800.0)
        .scroll_through(800.0, 1000.0, 10)
        .run()
        .unwrap();

    let values = thresholds(&replay);
    assert_eq!(values[2], 300.0);
    assert_eq!(
        &values[3..],
        &[280.0, 260.0, 240.0, 220.0, 200.0, 180.0, 160.0, 150.0, 150.0, 150.0]
    );
}

#[test]
fn test_threshold_stays_non_negative() {
    let replay = ScenarioBuilder::new(700.0, 2600.0)
        .heading(2, "a", 100.0)
        .heading(3, "b", 900.0)
        .heading(2, "c", 1800.0)
        .scroll(1900.0)
        .scroll(40.0)
        .resize(300.0)
        .scroll(2300.0)
        .scroll(0.0)
        .resize(1200.0)
        .scroll(1400.0)
        .run()
        .unwrap();

    assert!(thresholds(&replay).iter().all(|t| *t >= 0.0));
}

#[test]
fn test_short_document_pins_threshold_and_marks_single_heading() {
    let replay = ScenarioBuilder::new(800.0, 600.0)
        .heading(2, "only", 450.0)
        .scroll(100.0)
        .resize(700.0)
        .run()
        .unwrap();

    for step in replay.steps() {
        assert_eq!(step.threshold, 0.0);
        assert_eq!(step.current.as_deref(), Some("only"));
    }
}

#[test]
fn test_resolver_is_idempotent_without_layout_change() {
    let mut replay = ScenarioBuilder::new(800.0, 3000.0)
        .heading(2, "a", 0.0)
        .heading(3, "b", 600.0)
        .heading(4, "c", 700.0)
        .heading(2, "d", 1600.0)
        .scroll(650.0)
        .run()
        .unwrap();

    let before = replay.state().tree().cloned();
    let current = replay.current_id().map(str::to_string);
    replay.apply(&booknav::simulation::TraceEvent::Scroll { top: 650.0 }).unwrap();
    assert_eq!(replay.state().tree().cloned(), before);
    assert_eq!(replay.current_id().map(str::to_string), current);
}

#[test]
fn test_click_suppresses_scroll_noise_then_marks_target() {
    let replay = ScenarioBuilder::new(800.0, 5000.0)
        .heading(2, "sec-1", 0.0)
        .heading(2, "sec-2", 1000.0)
        .heading(2, "sec-3", 2000.0)
        .heading(2, "sec-4", 3000.0)
        .click("sec-3")
        .scroll(2100.0)
        .wait(50)
        .scroll(1500.0)
        .wait(50)
        .frames(2)
        .run()
        .unwrap();

    let steps = replay.steps();
    let events: Vec<_> = steps.iter().map(|step| step.event.as_str()).collect();
    assert_eq!(
        events,
        vec![
            "load",
            "click #sec-3",
            "scroll 2100",
            "wait 50ms",
            "scroll 1500",
            "wait 50ms",
            "frame",
            "frame"
        ]
    );

    // Nothing moves while the window is open
    for step in &steps[1..5] {
        assert!(step.suppressed);
        assert_eq!(step.current.as_deref(), Some("sec-1"));
        assert_eq!(step.threshold, 150.0);
    }

    assert!(!steps[5].suppressed);
    assert_eq!(steps[5].at_ms, 100);
    assert_eq!(steps[6].current.as_deref(), Some("sec-1"));
    assert_eq!(steps[7].current.as_deref(), Some("sec-3"));
    // sec-3 sits 500px below the viewport top after the noise
    assert_eq!(steps[7].threshold, 530.0);
}

#[test]
fn test_click_inside_window_rearms() {
    let replay = ScenarioBuilder::new(800.0, 5000.0)
        .heading(2, "sec-1", 0.0)
        .heading(2, "sec-2", 1000.0)
        .heading(2, "sec-3", 2000.0)
        .click("sec-2")
        .wait(60)
        .click("sec-3")
        .wait(60)
        .frames(2)
        .wait(40)
        .frames(2)
        .run()
        .unwrap();

    let steps = replay.steps();
    // First timer fired at 100ms but belonged to the replaced window
    assert!(steps[4].suppressed);
    assert!(steps[5].suppressed);
    assert_eq!(steps[6].current.as_deref(), Some("sec-1"));
    assert!(!steps[7].suppressed);
    assert_eq!(steps[7].at_ms, 160);
    assert_eq!(steps[9].current.as_deref(), Some("sec-3"));
}

#[test]
fn test_sidebar_offset_survives_reload() {
    let memory = SidebarScrollMemory::new(NavConfig::default().scroll_offset_key);
    let mut store = MemoryStore::new();
    store.set("sidebar-scroll-offset", "42.5");

    let active = ActiveEntry {
        entry_top: 300.0,
        sidebar_top: 100.0,
        scroll_top: 50.0,
    };
    let restore = memory.restore(&mut store, Some(active));
    let Some(SidebarRestore::ScrollTo(scroll_top)) = restore else {
        panic!("expected a scroll position, got {restore:?}");
    };

    // Scrolling the sidebar moves the entry up by the same amount
    let entry_top = active.entry_top - (scroll_top - active.scroll_top);
    assert!((entry_top - active.sidebar_top - 42.5).abs() < 0.5);
    assert_eq!(store.get("sidebar-scroll-offset"), None);

    let restore = memory.restore(&mut store, Some(active));
    assert_eq!(restore, Some(SidebarRestore::CenterActive));
}
