use std::time::Duration;

use chrono::NaiveDate;

use super::controller::*;
use crate::config::PlaybackSettings;
use crate::models::time::add_days;
use crate::models::{Activity, ElementActivityLink, ScheduleMode, VisualizationStyle};
use crate::services::LinkIndex;

fn day(n: i64) -> NaiveDate {
    add_days(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), n)
}

fn controller(span: i64) -> TimelineController {
    let mut controller = TimelineController::default();
    controller.set_bounds(ScheduleBounds::new(day(0), day(span)));
    controller
}

#[test]
fn test_set_bounds_starts_at_schedule_start() {
    let mut controller = TimelineController::default();
    assert!(controller.frame_request().is_none());

    let event = controller.set_bounds(ScheduleBounds::new(day(0), day(10)));
    assert!(matches!(event, Some(TimelineEvent::Redraw(r)) if r.date == day(0)));
    assert_eq!(controller.offset_days(), Some(0));
}

#[test]
fn test_set_bounds_clamps_current_date() {
    let mut controller = controller(10);
    controller.scrub_to(9).unwrap();
    controller.set_bounds(ScheduleBounds::new(day(0), day(5)));
    assert_eq!(controller.current_date(), Some(day(5)));

    controller.set_bounds(None);
    assert_eq!(controller.current_date(), None);
    assert_eq!(controller.play(), Err(TimelineError::NoSchedule));
}

#[test]
fn test_play_ticks_to_end_then_stops() {
    let mut controller = controller(3);
    assert_eq!(
        controller.play().unwrap(),
        TimelineEvent::StateChanged(PlaybackState::Playing)
    );

    assert!(matches!(controller.tick(), Some(TimelineEvent::Redraw(r)) if r.date == day(1)));
    assert!(matches!(controller.tick(), Some(TimelineEvent::Redraw(r)) if r.date == day(2)));
    assert!(matches!(controller.tick(), Some(TimelineEvent::Finished(r)) if r.date == day(3)));
    assert_eq!(controller.state(), PlaybackState::Stopped);
    assert_eq!(controller.tick(), None);
}

#[test]
fn test_play_at_end_rewinds() {
    let mut controller = controller(3);
    controller.scrub_to(3).unwrap();
    let event = controller.play().unwrap();
    assert!(matches!(event, TimelineEvent::Redraw(r) if r.date == day(0)));
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[test]
fn test_pause_and_stop() {
    let mut controller = controller(5);
    controller.play().unwrap();
    controller.tick();
    controller.tick();

    assert_eq!(
        controller.pause(),
        Some(TimelineEvent::StateChanged(PlaybackState::Stopped))
    );
    assert_eq!(controller.current_date(), Some(day(2)));
    assert_eq!(controller.pause(), None);

    assert!(matches!(controller.stop(), Some(TimelineEvent::Redraw(r)) if r.date == day(0)));
    assert_eq!(controller.stop(), None);
}

#[test]
fn test_scrub_clamps_and_always_redraws() {
    let mut controller = controller(10);
    assert_eq!(controller.begin_scrub(), TimelineEvent::StateChanged(PlaybackState::Scrubbing));

    let event = controller.scrub_to(25).unwrap();
    assert!(matches!(event, TimelineEvent::Redraw(r) if r.date == day(10)));
    let again = controller.scrub_to(25).unwrap();
    assert!(matches!(again, TimelineEvent::Redraw(_)));

    controller.scrub_to(-4).unwrap();
    assert_eq!(controller.current_date(), Some(day(0)));
    assert_eq!(controller.state(), PlaybackState::Scrubbing);

    assert!(controller.end_scrub().is_some());
    assert_eq!(controller.state(), PlaybackState::Stopped);
}

#[test]
fn test_scrub_while_playing_pauses() {
    let mut controller = controller(10);
    controller.play().unwrap();
    controller.scrub_to(4).unwrap();
    assert_eq!(controller.state(), PlaybackState::Stopped);
    assert_eq!(controller.tick(), None);
}

#[test]
fn test_switches_redraw_only_on_change() {
    let mut controller = controller(10);
    assert!(controller.set_mode(ScheduleMode::Planned).is_none());
    assert!(controller.set_mode(ScheduleMode::Actual).is_some());
    assert!(controller.set_style(VisualizationStyle::Opacity).is_some());
    assert!(controller.set_style(VisualizationStyle::Opacity).is_none());
    assert!(controller.set_highlight_critical_path(false).is_some());

    let request = controller.frame_request().unwrap();
    assert_eq!(request.mode, ScheduleMode::Actual);
    assert_eq!(request.style, VisualizationStyle::Opacity);
    assert!(!request.highlight_critical_path);
}

#[test]
fn test_speed_validation_and_interval() {
    let settings = PlaybackSettings {
        tick_ms: 1000,
        max_speed: 8.0,
        ..Default::default()
    };
    let mut controller = TimelineController::new(&settings);
    assert_eq!(controller.tick_interval(), Duration::from_secs(1));

    controller.set_speed(4.0).unwrap();
    assert_eq!(controller.tick_interval(), Duration::from_millis(250));

    assert_eq!(controller.set_speed(0.0), Err(TimelineError::InvalidSpeed(0.0)));
    assert!(controller.set_speed(f64::NAN).is_err());
    assert!(controller.set_speed(-2.0).is_err());
    assert_eq!(controller.speed(), 4.0);

    controller.set_speed(100.0).unwrap();
    assert_eq!(controller.speed(), 8.0);
}

#[test]
fn test_tiny_speed_saturates_interval() {
    let mut controller = TimelineController::default();
    controller.set_speed(1e-30).unwrap();
    assert_eq!(controller.tick_interval(), Duration::MAX);

    controller.set_speed(f64::MIN_POSITIVE).unwrap();
    assert_eq!(controller.tick_interval(), Duration::MAX);

    // Slow but representable
    controller.set_speed(1e-3).unwrap();
    assert_eq!(controller.tick_interval(), Duration::from_secs(1000));
}

#[test]
fn test_bounds_from_schedule_respects_mode_and_overrides() {
    let activities = vec![
        Activity::planned(1, "a", day(2), day(8)).with_actuals(Some(day(1)), Some(day(12))),
        Activity::planned(2, "b", day(4), day(6)),
    ];
    let links = LinkIndex::build(&[
        ElementActivityLink::new("x", 2).with_override(Some(day(3)), Some(day(9))),
    ]);

    let planned = ScheduleBounds::from_schedule(&activities, &links, ScheduleMode::Planned).unwrap();
    assert_eq!(planned, ScheduleBounds { start: day(2), end: day(9) });

    let actual = ScheduleBounds::from_schedule(&activities, &links, ScheduleMode::Actual).unwrap();
    assert_eq!(actual, ScheduleBounds { start: day(1), end: day(12) });

    assert!(ScheduleBounds::from_schedule(&[], &LinkIndex::default(), ScheduleMode::Planned).is_none());
}

#[test]
fn test_bounds_helpers() {
    let bounds = ScheduleBounds::new(day(0), day(10)).unwrap();
    assert_eq!(bounds.span_days(), 10);
    assert_eq!(bounds.date_at(15), day(10));
    assert_eq!(bounds.offset_of(day(-3)), 0);
    assert!(ScheduleBounds::new(day(5), day(4)).is_none());
}
