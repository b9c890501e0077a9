use tracing::trace;

use crate::clock::{format_hm, parse_clock, MINUTES_PER_DAY};
use crate::sheet::{Field, TimeEntry};

pub const DAILY_OVERTIME_THRESHOLD: f64 = 8.0;

/// Re-derives break, hours and overtime for one row after `edited` changed.
pub fn recalculate(entry: &mut TimeEntry, edited: Field) {
    match break_duration(&entry.out1, &entry.in2) {
        Some(brk) => entry.break_time = brk,
        None if matches!(edited, Field::Out1 | Field::In2) => entry.break_time.clear(),
        None => {}
    }

    match worked_minutes(&entry.in1, &entry.out1, &entry.in2, &entry.out2) {
        Some(minutes) => {
            let hours = minutes as f64 / 60.0;
            entry.hours = two_places(hours);
            entry.ot_hours = overtime(hours);
        }
        None => {
            entry.hours.clear();
            entry.ot_hours.clear();
        }
    }

    trace!(
        row = entry.id,
        brk = %entry.break_time,
        hours = %entry.hours,
        ot = %entry.ot_hours,
        "row recalculated"
    );
}

/// `None` when either bound is missing. A gap that is zero or negative is
/// recorded as no break; there is no wrap past midnight here.
pub fn break_duration(out1: &str, in2: &str) -> Option<String> {
    let out = parse_clock(out1)?;
    let back = parse_clock(in2)?;
    let diff = back - out;

    if diff > 0 {
        Some(format_hm(diff))
    } else {
        Some(String::new())
    }
}

/// Minutes in one clock-in/clock-out pair. A clock-out earlier than the
/// clock-in is taken as crossing midnight.
pub fn segment_minutes(clock_in: &str, clock_out: &str) -> Option<i64> {
    let start = parse_clock(clock_in)?;
    let end = parse_clock(clock_out)?;
    let mut diff = end - start;
    if diff < 0 {
        diff += MINUTES_PER_DAY;
    }
    Some(diff)
}

/// Sum of both segments, `None` when neither segment is complete.
pub fn worked_minutes(in1: &str, out1: &str, in2: &str, out2: &str) -> Option<i64> {
    match (segment_minutes(in1, out1), segment_minutes(in2, out2)) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0) + b.unwrap_or(0)),
    }
}

/// Hours beyond the daily threshold, empty when there are none.
pub fn overtime(hours: f64) -> String {
    if hours > DAILY_OVERTIME_THRESHOLD {
        two_places(hours - DAILY_OVERTIME_THRESHOLD)
    } else {
        String::new()
    }
}

pub fn two_places(value: f64) -> String {
    format!("{:.2}", value)
}
