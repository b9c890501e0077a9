use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::weekday::Day;

/// Accepts `M/D/YYYY` (four-digit year required), `YYYY-MM-DD` and
/// `MM-DD-YYYY`. Impossible dates are rejected rather than rolled over.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.contains('/') {
        if let [m, d, y] = value.split('/').collect::<Vec<_>>()[..] {
            if digits(m, 1, 2) && digits(d, 1, 2) && digits(y, 4, 4) {
                return ymd(y, m, d);
            }
        }
    }

    match value.split('-').collect::<Vec<_>>()[..] {
        [y, m, d] if digits(y, 4, 4) && digits(m, 1, 2) && digits(d, 1, 2) => ymd(y, m, d),
        [m, d, y] if digits(m, 1, 2) && digits(d, 1, 2) && digits(y, 4, 4) => ymd(y, m, d),
        _ => None,
    }
}

fn digits(part: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    let year: i32 = y.parse().ok()?;
    if year <= 999 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
}

/// Canonical `MM/DD/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Dropdown choices for a row: every `day` from two weeks before `today`
/// through the end of the month six months ahead.
pub fn date_options(day: Day, today: NaiveDate) -> Vec<String> {
    let mut current = today - Duration::days(14);
    while Day::of_date(current) != day {
        current += Duration::days(1);
    }

    let Some(end) = today.checked_add_months(Months::new(6)).and_then(end_of_month) else {
        return Vec::new();
    };

    let mut options = Vec::new();
    while current <= end {
        options.push(format_date(current));
        current += Duration::days(7);
    }
    options
}

fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Keystroke mask used in text-entry mode. Only reformats when the value
/// grew, so deleting characters is never fought.
pub fn mask_date_input(previous: &str, typed: &str) -> String {
    if typed.len() <= previous.len() {
        return typed.to_string();
    }

    let digits: String = typed.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0..=1 => digits,
        2..=3 => format!("{}/{}", &digits[..2], &digits[2..]),
        n => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..n.min(8)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_slash_forms() {
        assert_eq!(parse_date("3/10/2025"), Some(ymd(2025, 3, 10)));
        assert_eq!(parse_date("03/10/2025"), Some(ymd(2025, 3, 10)));
        assert_eq!(parse_date(" 12/31/2024 "), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn test_parse_requires_full_year() {
        assert_eq!(parse_date("3/10/25"), None);
        assert_eq!(parse_date("03/10/202"), None);
        assert_eq!(parse_date("03/10/0999"), None);
    }

    #[test]
    fn test_parse_dash_forms() {
        assert_eq!(parse_date("2025-03-10"), Some(ymd(2025, 3, 10)));
        assert_eq!(parse_date("2025-3-9"), Some(ymd(2025, 3, 9)));
        assert_eq!(parse_date("03-10-2025"), Some(ymd(2025, 3, 10)));
        assert_eq!(parse_date("3-9-2025"), Some(ymd(2025, 3, 9)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "tomorrow", "03/10", "2025/03/10", "2/30/2025", "13/01/2025", "10-2025-03", "3/1o/2025"] {
            assert_eq!(parse_date(bad), None, "{bad}");
        }
    }

    fn canonical(value: &str) -> Option<String> {
        parse_date(value).map(format_date)
    }

    #[test]
    fn test_canonical_round_trip() {
        assert_eq!(canonical("3/9/2025").as_deref(), Some("03/09/2025"));
        assert_eq!(canonical("2025-3-9").as_deref(), Some("03/09/2025"));
        assert_eq!(canonical("03-09-2025").as_deref(), Some("03/09/2025"));
        assert_eq!(canonical("03/09/2025").as_deref(), Some("03/09/2025"));
        assert_eq!(canonical("bogus"), None);
    }

    #[test]
    fn test_date_options_land_on_weekday() {
        let today = ymd(2025, 3, 12);
        let options = date_options(Day::Monday, today);
        assert_eq!(options.first().map(String::as_str), Some("03/03/2025"));
        assert_eq!(options.last().map(String::as_str), Some("09/29/2025"));
        for option in &options {
            let date = parse_date(option).unwrap();
            assert_eq!(Day::of_date(date), Day::Monday);
        }
    }

    #[test]
    fn test_date_options_start_on_window_edge() {
        // 14 days before 3/24/2025 is Monday 3/10/2025 itself
        let options = date_options(Day::Monday, ymd(2025, 3, 24));
        assert_eq!(options[0], "03/10/2025");
    }

    #[test]
    fn test_mask_date_input() {
        assert_eq!(mask_date_input("", "0"), "0");
        assert_eq!(mask_date_input("0", "03"), "03/");
        assert_eq!(mask_date_input("03/", "03/1"), "03/1");
        assert_eq!(mask_date_input("03/1", "03/10"), "03/10/");
        assert_eq!(mask_date_input("", "03102025"), "03/10/2025");
        assert_eq!(mask_date_input("", "0310202599"), "03/10/2025");
    }

    #[test]
    fn test_mask_leaves_deletions_alone() {
        assert_eq!(mask_date_input("03/10/", "03/10"), "03/10");
        assert_eq!(mask_date_input("03/10/2025", "03/10/202"), "03/10/202");
    }
}
