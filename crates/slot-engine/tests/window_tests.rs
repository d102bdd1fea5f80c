//! Tests for availability window construction and clock-range subtraction.

use chrono::{NaiveDate, NaiveTime, Weekday};
use slot_engine::window::{build_windows, subtract_block, ClockRange};
use slot_engine::BlockingRule;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn range(start: (u32, u32), end: (u32, u32)) -> ClockRange {
    ClockRange::new(t(start.0, start.1), t(end.0, end.1)).unwrap()
}

fn base() -> ClockRange {
    range((7, 0), (22, 0))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2026-03-16 is a Monday.
fn monday() -> NaiveDate {
    date(2026, 3, 16)
}

const WEEKDAYS: [Weekday; 5] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];
const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn work_and_sleep() -> Vec<BlockingRule> {
    vec![
        BlockingRule::new(WEEKDAYS, t(8, 0), t(19, 0)).with_reason("work"),
        BlockingRule::new(ALL_DAYS, t(22, 0), t(7, 0)).with_reason("sleep"),
    ]
}

// ── Subtraction ─────────────────────────────────────────────────────────────

#[test]
fn block_in_the_middle_splits_the_range() {
    let result = subtract_block(&[base()], t(12, 0), t(13, 0));
    assert_eq!(result, vec![range((7, 0), (12, 0)), range((13, 0), (22, 0))]);
}

#[test]
fn block_over_the_start_keeps_right_remainder() {
    let result = subtract_block(&[base()], t(0, 0), t(9, 0));
    assert_eq!(result, vec![range((9, 0), (22, 0))]);
}

#[test]
fn block_over_the_end_keeps_left_remainder() {
    let result = subtract_block(&[base()], t(21, 0), t(23, 0));
    assert_eq!(result, vec![range((7, 0), (21, 0))]);
}

#[test]
fn covering_block_removes_the_range() {
    let result = subtract_block(&[base()], t(6, 0), t(23, 0));
    assert!(result.is_empty());
}

#[test]
fn disjoint_or_touching_block_leaves_range_untouched() {
    assert_eq!(subtract_block(&[base()], t(22, 0), t(23, 0)), vec![base()]);
    assert_eq!(subtract_block(&[base()], t(5, 0), t(7, 0)), vec![base()]);
}

#[test]
fn subtraction_applies_to_every_range() {
    let ranges = vec![range((7, 0), (10, 0)), range((12, 0), (18, 0))];
    let result = subtract_block(&ranges, t(9, 0), t(13, 0));
    assert_eq!(result, vec![range((7, 0), (9, 0)), range((13, 0), (18, 0))]);
}

#[test]
fn clock_range_rejects_empty_or_inverted() {
    assert!(ClockRange::new(t(9, 0), t(9, 0)).is_err());
    assert!(ClockRange::new(t(10, 0), t(9, 0)).is_err());
}

// ── Window building ─────────────────────────────────────────────────────────

#[test]
fn no_rules_gives_base_window_for_each_day() {
    let windows = build_windows(base(), &[], 3, monday());

    assert_eq!(windows.len(), 3);
    let dates: Vec<NaiveDate> = windows.keys().copied().collect();
    assert_eq!(dates, vec![date(2026, 3, 16), date(2026, 3, 17), date(2026, 3, 18)]);
    for ranges in windows.values() {
        assert_eq!(ranges, &vec![base()]);
    }
}

#[test]
fn work_and_sleep_leave_weekday_edges_and_full_weekend() {
    let windows = build_windows(base(), &work_and_sleep(), 7, monday());

    // Work removes 08:00-19:00; sleep only touches time outside the base window.
    assert_eq!(
        windows[&monday()],
        vec![range((7, 0), (8, 0)), range((19, 0), (22, 0))]
    );
    // Saturday: no work block, sleep is outside the base window.
    assert_eq!(windows[&date(2026, 3, 21)], vec![base()]);
    assert_eq!(windows[&date(2026, 3, 22)], vec![base()]);
}

#[test]
fn monday_night_rule_leaves_only_the_early_hour() {
    let mut rules = work_and_sleep();
    rules.push(BlockingRule::new([Weekday::Mon], t(19, 0), t(23, 59)).with_reason("Monday night unavailable"));

    let windows = build_windows(base(), &rules, 7, monday());

    assert_eq!(windows[&monday()], vec![range((7, 0), (8, 0))]);
    assert_eq!(
        windows[&date(2026, 3, 17)],
        vec![range((7, 0), (8, 0)), range((19, 0), (22, 0))]
    );
}

#[test]
fn fully_covered_day_has_no_ranges() {
    let mut rules = work_and_sleep();
    rules.push(BlockingRule::new([Weekday::Mon], t(7, 0), t(8, 0)));
    rules.push(BlockingRule::new([Weekday::Mon], t(19, 0), t(22, 0)));

    let windows = build_windows(base(), &rules, 7, monday());

    assert!(windows[&monday()].is_empty());
    assert_eq!(windows[&date(2026, 3, 21)], vec![base()]);
}

#[test]
fn overnight_rule_rolls_morning_portion_onto_next_day() {
    let rules = vec![BlockingRule::new([Weekday::Mon], t(21, 0), t(9, 0))];

    let windows = build_windows(base(), &rules, 3, monday());

    assert_eq!(windows[&monday()], vec![range((7, 0), (21, 0))]);
    assert_eq!(windows[&date(2026, 3, 17)], vec![range((9, 0), (22, 0))]);
    assert_eq!(windows[&date(2026, 3, 18)], vec![base()]);
}

#[test]
fn overnight_rollover_past_horizon_is_dropped() {
    // Sunday 2026-03-22 is the last day of a 7-day horizon starting Monday.
    let rules = vec![BlockingRule::new([Weekday::Sun], t(21, 0), t(9, 0))];

    let windows = build_windows(base(), &rules, 7, monday());

    assert_eq!(windows.len(), 7);
    assert_eq!(windows[&date(2026, 3, 22)], vec![range((7, 0), (21, 0))]);
    assert!(!windows.contains_key(&date(2026, 3, 23)));
    // The Sunday before the horizon is not replayed onto the first Monday.
    assert_eq!(windows[&monday()], vec![base()]);
}

#[test]
fn overnight_rule_blocks_until_midnight_even_with_late_base_window() {
    let late_base = ClockRange::new(t(7, 0), slot_engine::window::end_of_day()).unwrap();
    let rules = vec![BlockingRule::new([Weekday::Mon], t(22, 0), t(7, 0))];

    let windows = build_windows(late_base, &rules, 1, monday());

    assert_eq!(windows[&monday()], vec![range((7, 0), (22, 0))]);
}

#[test]
fn rule_order_does_not_change_the_result() {
    let mut rules = work_and_sleep();
    rules.push(BlockingRule::new([Weekday::Wed], t(12, 0), t(20, 0)));
    rules.push(BlockingRule::new([Weekday::Sat], t(10, 0), t(11, 0)));

    let forward = build_windows(base(), &rules, 7, monday());
    rules.reverse();
    let backward = build_windows(base(), &rules, 7, monday());

    assert_eq!(forward, backward);
}

#[test]
fn zero_horizon_is_empty() {
    assert!(build_windows(base(), &work_and_sleep(), 0, monday()).is_empty());
}
