use super::*;
use crate::core::{PageSpec, SegmentRef, StaticStories};
use crate::gesture::GestureKind;
use crate::navigation::OverscrollEdge;

type TestViewer = StoryViewer<StaticStories, EventLog<SegmentRef>>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn test_config() -> ViewerConfig {
    ViewerConfig {
        segment_duration_ms: 1000,
        page_animation_ms: 100,
        long_press_ms: 250,
        ..Default::default()
    }
}

fn viewer_with(stories: StaticStories, config: ViewerConfig, initial_page: usize) -> TestViewer {
    StoryViewer::new(stories, EventLog::new(), config, initial_page)
}

fn viewer(counts: &[usize]) -> TestViewer {
    viewer_with(StaticStories::from_counts(counts), test_config(), 0)
}

/// Tick until no page turn is in progress
fn settle(viewer: &mut TestViewer) {
    for _ in 0..100 {
        if !viewer.navigator().is_paging() {
            return;
        }
        viewer.tick(ms(10));
    }
    panic!("page turn never finished");
}

#[test]
fn test_initial_page_starts_running() {
    let viewer = viewer(&[3, 2]);
    let snap = viewer.snapshot();

    assert_eq!(snap.page, 0);
    assert_eq!(snap.segment, 0);
    assert_eq!(snap.phase, ClockPhase::Running);
    assert!(snap.active);
    assert_eq!(viewer.observer().segments_shown(), vec![(0, 0)]);
}

#[test]
fn test_initial_page_and_segment_are_clamped() {
    let stories = StaticStories::new(vec![PageSpec::new(1), PageSpec::new(3).starting_at(9)]);
    let viewer = viewer_with(stories, test_config(), 5);

    assert_eq!(viewer.snapshot().page, 1);
    assert_eq!(viewer.snapshot().segment, 2);
}

#[test]
fn test_advancing_past_last_segment_turns_page() {
    let mut viewer = viewer(&[3, 2]);

    viewer.tap(Region::Forward);
    viewer.tap(Region::Forward);
    assert_eq!(viewer.snapshot().segment, 2);

    viewer.tap(Region::Forward);
    assert_eq!(viewer.segment_of(0), Some(2));
    assert!(viewer.navigator().is_animating());
    assert_eq!(viewer.active_page(), None);

    settle(&mut viewer);
    let snap = viewer.snapshot();
    assert_eq!((snap.page, snap.segment), (1, 0));
    assert_eq!(snap.phase, ClockPhase::Running);
    assert_eq!(snap.progress, 0.0);
    assert_eq!(viewer.observer().pages_changed(), vec![1]);
    assert_eq!(
        viewer.observer().segments_shown(),
        vec![(0, 0), (0, 1), (0, 2), (1, 0)]
    );
}

#[test]
fn test_clock_completion_advances_segments() {
    let mut viewer = viewer(&[2, 1]);

    viewer.tick(ms(1000));
    assert_eq!(viewer.snapshot().segment, 1);
    assert_eq!(viewer.snapshot().progress, 0.0);
    assert!(viewer.clock_of(0).unwrap().is_running());

    viewer.tick(ms(1000));
    assert!(viewer.navigator().is_animating());
    settle(&mut viewer);
    assert_eq!(viewer.snapshot().page, 1);
}

#[test]
fn test_retreat_on_first_segment_of_first_page_is_noop() {
    let mut viewer = viewer(&[3, 2]);
    viewer.tick(ms(300));

    viewer.tap(Region::Back);

    let snap = viewer.snapshot();
    assert_eq!((snap.page, snap.segment), (0, 0));
    assert!(!viewer.navigator().is_paging());
    assert!(viewer.observer().pages_changed().is_empty());
    // The tap still replays the current segment
    assert_eq!(snap.progress, 0.0);
}

#[test]
fn test_tap_back_replays_previous_segment() {
    let mut viewer = viewer(&[3]);
    viewer.tap(Region::Forward);
    viewer.tick(ms(500));

    viewer.tap(Region::Back);

    let snap = viewer.snapshot();
    assert_eq!(snap.segment, 0);
    assert_eq!(snap.progress, 0.0);
    assert_eq!(snap.phase, ClockPhase::Running);
}

#[test]
fn test_tap_back_on_first_segment_goes_to_previous_page() {
    let mut viewer = viewer(&[3, 2]);
    viewer.tap(Region::Forward);
    viewer.animate_to_page(1);
    settle(&mut viewer);

    viewer.tap(Region::Back);
    settle(&mut viewer);

    assert_eq!(viewer.snapshot().page, 0);
    assert_eq!(viewer.snapshot().segment, 1);
}

#[test]
fn test_limit_fires_once_from_taps() {
    let mut viewer = viewer_with(StaticStories::from_counts(&[3, 2]), test_config(), 1);

    viewer.tap(Region::Forward);
    assert_eq!(viewer.snapshot().segment, 1);

    viewer.tap(Region::Forward);
    assert_eq!(viewer.observer().limit_count(), 1);
    assert!(viewer.limit_reached());
    let snap = viewer.snapshot();
    assert_eq!(snap.segment, 1);
    assert_eq!(snap.phase, ClockPhase::Completed);
    assert_eq!(snap.progress, 1.0);

    viewer.tap(Region::Forward);
    viewer.tick(ms(2000));
    assert_eq!(viewer.observer().limit_count(), 1);
    assert_eq!(viewer.snapshot().page, 1);
}

#[test]
fn test_limit_fires_once_from_completion_then_tap() {
    let stories = StaticStories::new(vec![PageSpec::new(2), PageSpec::new(2).starting_at(1)]);
    let mut viewer = viewer_with(stories, test_config(), 1);

    viewer.tick(ms(1000));
    assert_eq!(viewer.observer().limit_count(), 1);

    viewer.tap(Region::Forward);
    viewer.bridge().restart();
    viewer.tick(ms(1000));
    viewer.tick(ms(1000));
    assert_eq!(viewer.observer().limit_count(), 1);
}

#[test]
fn test_leaving_page_resets_clock_but_keeps_segment() {
    let mut viewer = viewer(&[3, 2]);
    viewer.tap(Region::Forward);
    viewer.tick(ms(400));
    assert_eq!(viewer.snapshot().progress, 0.4);

    viewer.animate_to_page(1);
    // Mid-transition the indicator keeps its value
    viewer.tick(ms(10));
    assert_eq!(viewer.clock_of(0).unwrap().progress(), 0.4);
    assert_eq!(viewer.clock_of(0).unwrap().phase(), ClockPhase::Paused);

    settle(&mut viewer);
    assert_eq!(viewer.clock_of(0).unwrap().progress(), 0.0);
    assert_eq!(viewer.clock_of(0).unwrap().phase(), ClockPhase::Idle);
    assert_eq!(viewer.segment_of(0), Some(1));

    viewer.animate_to_page(0);
    settle(&mut viewer);
    let snap = viewer.snapshot();
    assert_eq!((snap.page, snap.segment), (0, 1));
    assert_eq!(snap.progress, 0.0);
    assert_eq!(snap.phase, ClockPhase::Running);
}

#[test]
fn test_parked_page_keeps_segment() {
    let config = ViewerConfig {
        preload_radius: 0,
        ..test_config()
    };
    let mut viewer = viewer_with(StaticStories::from_counts(&[2, 2, 2]), config, 0);
    viewer.tap(Region::Forward);

    viewer.animate_to_page(2);
    settle(&mut viewer);
    assert!(matches!(viewer.slot(0), Some(PageSlot::Parked(_))));
    assert_eq!(viewer.segment_of(0), Some(1));
    assert!(viewer.clock_of(0).is_none());

    viewer.animate_to_page(0);
    settle(&mut viewer);
    assert_eq!(viewer.snapshot().segment, 1);
}

#[test]
fn test_dropped_page_restarts_at_initial_segment() {
    let config = ViewerConfig {
        preload_radius: 0,
        keep_alive: false,
        ..test_config()
    };
    let mut viewer = viewer_with(StaticStories::from_counts(&[2, 2, 2]), config, 0);
    viewer.tap(Region::Forward);

    viewer.animate_to_page(2);
    settle(&mut viewer);
    assert!(matches!(viewer.slot(0), Some(PageSlot::Vacant)));

    viewer.animate_to_page(0);
    settle(&mut viewer);
    assert_eq!(viewer.snapshot().segment, 0);
}

#[test]
fn test_loading_media_holds_clock() {
    let mut viewer = viewer(&[3]);
    viewer.tick(ms(200));

    viewer.set_readiness(0, MediaReadiness::Loading);
    viewer.tick(ms(500));
    assert_eq!(viewer.snapshot().progress, 0.2);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Paused);

    viewer.set_readiness(0, MediaReadiness::Available);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
    viewer.tick(ms(100));
    assert_eq!(viewer.snapshot().progress, 0.3);
}

#[test]
fn test_restart_while_loading_waits_for_media() {
    let mut viewer = viewer(&[3]);
    viewer.set_readiness(0, MediaReadiness::Loading);

    viewer.tap(Region::Forward);
    assert_eq!(viewer.snapshot().segment, 1);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Idle);

    viewer.tick(ms(500));
    assert_eq!(viewer.snapshot().progress, 0.0);

    viewer.set_readiness(0, MediaReadiness::Available);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
}

#[test]
fn test_readiness_does_not_start_inactive_page() {
    let mut viewer = viewer(&[3, 2]);
    viewer.set_readiness(1, MediaReadiness::Loading);
    viewer.set_readiness(1, MediaReadiness::Available);

    assert!(!viewer.clock_of(1).unwrap().is_running());
    assert_eq!(viewer.running_clocks(), 1);
}

#[test]
fn test_readiness_does_not_restart_after_limit() {
    let mut viewer = viewer(&[1]);
    viewer.tap(Region::Forward);
    assert!(viewer.limit_reached());

    viewer.set_readiness(0, MediaReadiness::Loading);
    viewer.set_readiness(0, MediaReadiness::Available);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Completed);
}

#[test]
fn test_gesture_for_inactive_page_is_ignored() {
    let mut viewer = viewer(&[3, 3]);
    viewer.gesture(GestureEvent::tap(1, Region::Forward));
    assert_eq!(viewer.segment_of(1), Some(0));
    assert_eq!(viewer.segment_of(0), Some(0));

    viewer.animate_to_page(1);
    viewer.gesture(GestureEvent::tap(0, Region::Forward));
    assert_eq!(viewer.segment_of(0), Some(0));
}

#[test]
fn test_press_pauses_and_release_resumes() {
    let mut viewer = viewer(&[3]);
    viewer.tick(ms(100));

    viewer.gesture(GestureEvent::new(0, Region::Back, GestureKind::PressDown));
    viewer.tick(ms(300));
    assert_eq!(viewer.snapshot().progress, 0.1);

    viewer.gesture(GestureEvent::new(0, Region::Back, GestureKind::Release));
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
    assert_eq!(viewer.snapshot().segment, 0);
}

#[test]
fn test_pointer_long_press_does_not_navigate() {
    let mut viewer = viewer(&[3]);

    viewer.dispatch(ViewerInput::Pointer(PointerInput::Down { x: 350.0, width: 400.0 }));
    for _ in 0..4 {
        viewer.tick(ms(100));
    }
    assert_eq!(viewer.snapshot().phase, ClockPhase::Paused);

    viewer.dispatch(ViewerInput::Pointer(PointerInput::Up));
    let snap = viewer.snapshot();
    assert_eq!(snap.segment, 0);
    assert_eq!(snap.phase, ClockPhase::Running);
    assert_eq!(snap.progress, 0.0);
}

#[test]
fn test_pointer_quick_tap_advances() {
    let mut viewer = viewer(&[3]);

    viewer.dispatch(ViewerInput::Pointer(PointerInput::Down { x: 350.0, width: 400.0 }));
    viewer.tick(ms(50));
    viewer.dispatch(ViewerInput::Pointer(PointerInput::Up));

    assert_eq!(viewer.snapshot().segment, 1);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
}

#[test]
fn test_bridge_commands_reach_only_active_page() {
    let mut viewer = viewer(&[3, 3]);
    let bridge = viewer.bridge().clone();
    viewer.tick(ms(500));

    bridge.pause();
    viewer.process_bridge();
    assert_eq!(viewer.snapshot().phase, ClockPhase::Paused);

    bridge.restart();
    viewer.process_bridge();
    assert_eq!(viewer.snapshot().progress, 0.0);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
    assert!(!viewer.clock_of(1).unwrap().is_running());
    assert_eq!(viewer.running_clocks(), 1);
}

#[test]
fn test_overscroll_fires_once_per_drag() {
    let mut viewer = viewer(&[2, 2]);

    for _ in 0..3 {
        viewer.scroll(ScrollUpdate::DragBy(-0.2));
    }
    viewer.scroll(ScrollUpdate::End);
    settle(&mut viewer);
    assert_eq!(viewer.observer().overscrolls(), vec![OverscrollEdge::Leading]);

    viewer.scroll(ScrollUpdate::DragBy(-0.2));
    viewer.scroll(ScrollUpdate::End);
    assert_eq!(viewer.observer().overscrolls().len(), 2);
}

#[test]
fn test_trailing_overscroll_on_last_page() {
    let mut viewer = viewer_with(StaticStories::from_counts(&[2, 2]), test_config(), 1);
    viewer.scroll(ScrollUpdate::Position(1.3));
    viewer.scroll(ScrollUpdate::Position(1.5));
    assert_eq!(viewer.observer().overscrolls(), vec![OverscrollEdge::Trailing]);
    assert!(viewer.observer().pages_changed().is_empty());
}

#[test]
fn test_aborted_drag_keeps_progress() {
    let mut viewer = viewer(&[3, 3]);
    viewer.tick(ms(300));

    viewer.scroll(ScrollUpdate::DragBy(0.2));
    assert_eq!(viewer.active_page(), None);
    assert_eq!(viewer.running_clocks(), 0);
    assert_eq!(viewer.clock_of(0).unwrap().progress(), 0.3);

    viewer.scroll(ScrollUpdate::End);
    settle(&mut viewer);
    assert_eq!(viewer.snapshot().page, 0);
    assert_eq!(viewer.snapshot().progress, 0.3);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
}

#[test]
fn test_page_turn_cut_short_after_completion_resumes_playback() {
    let mut viewer = viewer(&[2, 2]);
    viewer.tap(Region::Forward);
    viewer.tick(ms(1000));
    assert!(viewer.navigator().is_paging());

    viewer.tick(ms(10));
    assert!(viewer.animate_to_page(0));
    settle(&mut viewer);

    let snap = viewer.snapshot();
    assert_eq!((snap.page, snap.segment), (0, 1));
    assert_eq!(snap.phase, ClockPhase::Running);
    assert_eq!(snap.progress, 0.0);

    viewer.tick(ms(500));
    assert_eq!(viewer.snapshot().progress, 0.5);
}

#[test]
fn test_drag_back_during_completed_turn_resumes_playback() {
    let mut viewer = viewer(&[2, 2]);
    viewer.tap(Region::Forward);
    viewer.tick(ms(1000));
    viewer.tick(ms(10));

    viewer.scroll(ScrollUpdate::Position(0.0));
    viewer.scroll(ScrollUpdate::End);
    settle(&mut viewer);

    assert_eq!(viewer.active_page(), Some(0));
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
    viewer.tick(ms(1000));
    assert!(viewer.navigator().is_paging());
}

#[test]
fn test_loading_survives_park_and_remount() {
    let config = ViewerConfig {
        preload_radius: 0,
        ..test_config()
    };
    let mut viewer = viewer_with(StaticStories::from_counts(&[2, 2]), config, 0);
    viewer.set_readiness(0, MediaReadiness::Loading);

    viewer.animate_to_page(1);
    settle(&mut viewer);
    assert!(matches!(viewer.slot(0), Some(PageSlot::Parked(_))));

    viewer.animate_to_page(0);
    settle(&mut viewer);
    viewer.tick(ms(500));
    assert_eq!(viewer.snapshot().page, 0);
    assert_eq!(viewer.snapshot().progress, 0.0);

    viewer.set_readiness(0, MediaReadiness::Available);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
    viewer.tick(ms(500));
    assert_eq!(viewer.snapshot().progress, 0.5);
}

#[test]
fn test_loading_reported_before_mount_is_applied() {
    let mut viewer = viewer(&[1, 1, 2]);
    assert!(matches!(viewer.slot(2), Some(PageSlot::Vacant)));
    viewer.set_readiness(2, MediaReadiness::Loading);

    viewer.animate_to_page(2);
    settle(&mut viewer);
    viewer.tick(ms(500));
    let snap = viewer.snapshot();
    assert_eq!(snap.page, 2);
    assert_eq!(snap.progress, 0.0);
    assert_eq!(snap.phase, ClockPhase::Idle);

    viewer.set_readiness(2, MediaReadiness::Available);
    viewer.tick(ms(500));
    assert_eq!(viewer.snapshot().progress, 0.5);
}

#[test]
fn test_drag_to_next_page_changes_page() {
    let mut viewer = viewer(&[3, 3]);
    viewer.scroll(ScrollUpdate::DragBy(0.7));
    assert_eq!(viewer.observer().pages_changed(), vec![1]);

    viewer.scroll(ScrollUpdate::End);
    settle(&mut viewer);
    assert_eq!(viewer.active_page(), Some(1));
    assert_eq!(viewer.clock_of(0).unwrap().progress(), 0.0);
}

#[test]
fn test_empty_page_is_skipped_forward() {
    let mut viewer = viewer(&[2, 0, 1]);
    viewer.tap(Region::Forward);
    viewer.tap(Region::Forward);
    settle(&mut viewer);

    assert_eq!(viewer.active_page(), Some(2));
    assert_eq!(viewer.observer().pages_changed(), vec![1, 2]);
    assert!(!viewer.observer().segments_shown().contains(&(1, 0)));
    // No time was spent on the empty page
    let empty = viewer.clock_of(1).unwrap();
    assert_eq!(empty.phase(), ClockPhase::Idle);
    assert_eq!(empty.progress(), 0.0);
    assert_eq!(viewer.snapshot().progress, 0.0);
}

#[test]
fn test_empty_page_is_skipped_backward() {
    let mut viewer = viewer_with(StaticStories::from_counts(&[1, 0, 2]), test_config(), 2);
    viewer.tap(Region::Back);
    settle(&mut viewer);

    assert_eq!(viewer.active_page(), Some(0));
    assert_eq!(viewer.observer().pages_changed(), vec![1, 0]);
    assert_eq!(viewer.snapshot().phase, ClockPhase::Running);
}

#[test]
fn test_empty_last_page_reaches_limit() {
    let mut viewer = viewer(&[1, 0]);
    viewer.tap(Region::Forward);
    settle(&mut viewer);

    assert_eq!(viewer.active_page(), Some(1));
    assert!(viewer.limit_reached());
    assert_eq!(viewer.observer().limit_count(), 1);
    assert_eq!(viewer.running_clocks(), 0);
}

#[test]
fn test_animate_out_of_range_is_ignored() {
    let mut viewer = viewer(&[1, 1]);
    assert!(!viewer.animate_to_page(2));
    assert_eq!(viewer.active_page(), Some(0));
}

#[test]
fn test_single_running_clock_under_mixed_inputs() {
    let mut viewer = viewer(&[3, 1, 4, 2]);
    let inputs = [
        ViewerInput::Tick(ms(700)),
        ViewerInput::Gesture(GestureEvent::tap(0, Region::Forward)),
        ViewerInput::Scroll(ScrollUpdate::DragBy(0.6)),
        ViewerInput::Tick(ms(30)),
        ViewerInput::Scroll(ScrollUpdate::End),
        ViewerInput::Tick(ms(40)),
        ViewerInput::Animation(AnimationCommand::Restart),
        ViewerInput::Tick(ms(200)),
        ViewerInput::Gesture(GestureEvent::tap(1, Region::Forward)),
        ViewerInput::Tick(ms(1500)),
        ViewerInput::Readiness { page: 2, readiness: MediaReadiness::Loading },
        ViewerInput::Tick(ms(60)),
        ViewerInput::Readiness { page: 2, readiness: MediaReadiness::Available },
        ViewerInput::Gesture(GestureEvent::tap(2, Region::Back)),
        ViewerInput::Tick(ms(2500)),
    ];

    for _ in 0..4 {
        for input in inputs {
            viewer.dispatch(input);
            assert!(viewer.running_clocks() <= 1);
            if let Some(page) = viewer.active_page() {
                let segments = viewer.source().segment_count(page);
                assert!(viewer.segment_of(page).unwrap() < segments.max(1));
            }
        }
    }
}

#[test]
fn test_destroyed_page_is_rebuilt() {
    let stories = StaticStories::new(vec![PageSpec::new(3).starting_at(1), PageSpec::new(2)]);
    let mut viewer = viewer_with(stories, test_config(), 0);
    viewer.tap(Region::Forward);
    assert_eq!(viewer.segment_of(0), Some(2));

    viewer.destroy_page(0);
    assert_eq!(viewer.segment_of(0), Some(1));
    assert_eq!(viewer.active_page(), Some(0));
}

#[test]
fn test_shutdown_stops_everything() {
    let mut viewer = viewer(&[3, 3]);
    viewer.shutdown();

    viewer.tick(ms(500));
    assert_eq!(viewer.running_clocks(), 0);
    assert_eq!(viewer.bridge().subscriber_count(), 0);
}
