use chrono::{Duration, NaiveTime, Timelike};

pub const MINUTES_PER_DAY: i64 = 1440;

const CLOCK_FORMAT: &str = "%I:%M %p";

/// Parses `h:mm AM|PM` into minutes since midnight. Anything else is `None`,
/// which callers treat as "not entered yet".
pub fn parse_clock(value: &str) -> Option<i64> {
    parse_time(value).map(|t| (t.num_seconds_from_midnight() / 60) as i64)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    // minutes are always written with two digits
    let (_, rest) = value.split_once(':')?;
    let rest = rest.as_bytes();
    if rest.len() < 3 || !rest[..2].iter().all(u8::is_ascii_digit) || rest[2].is_ascii_digit() {
        return None;
    }
    NaiveTime::parse_from_str(value, CLOCK_FORMAT).ok()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// `H:MM`, hours unpadded.
pub fn format_hm(minutes: i64) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Dropdown choices from `first` through `last` inclusive.
pub fn time_options(first: &str, last: &str, step_minutes: u32) -> Vec<String> {
    let (Some(mut current), Some(end)) = (parse_time(first), parse_time(last)) else {
        return Vec::new();
    };
    let step = Duration::minutes(i64::from(step_minutes.max(1)));

    let mut options = Vec::new();
    while current <= end {
        options.push(format_clock(current));
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        current = next;
    }
    options
}

/// Options that remain after `previous` was picked in the field before.
pub fn options_after<'a>(options: &'a [String], previous: &str) -> &'a [String] {
    if previous.is_empty() {
        return options;
    }
    match options.iter().position(|o| o == previous) {
        Some(i) => &options[i + 1..],
        None => options,
    }
}
