use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::dates::{format_date, parse_date};
use crate::error::EditError;
use crate::hours;
use crate::weekday::{preceding, Day};

pub const ROWS: usize = 14;

pub type Rows = [TimeEntry; ROWS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Date,
    In1,
    Out1,
    In2,
    Out2,
    Sales,
    Tips,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::In1 => "in1",
            Field::Out1 => "out1",
            Field::In2 => "in2",
            Field::Out2 => "out2",
            Field::Sales => "sales",
            Field::Tips => "tips",
        }
    }

    pub fn is_time(self) -> bool {
        matches!(self, Field::In1 | Field::Out1 | Field::In2 | Field::Out2)
    }

    pub fn is_money(self) -> bool {
        matches!(self, Field::Sales | Field::Tips)
    }

    /// The time field that must be filled before this one unlocks.
    pub fn unlocked_by(self) -> Option<Field> {
        match self {
            Field::Out1 => Some(Field::In1),
            Field::In2 => Some(Field::Out1),
            Field::Out2 => Some(Field::In2),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Field::Date),
            "in1" | "in-1" => Ok(Field::In1),
            "out1" | "out-1" => Ok(Field::Out1),
            "in2" | "in-2" => Ok(Field::In2),
            "out2" | "out-2" => Ok(Field::Out2),
            "sales" => Ok(Field::Sales),
            "tips" => Ok(Field::Tips),
            other => Err(EditError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: usize,
    pub day: Day,
    pub date: String,
    pub in1: String,
    pub out1: String,
    pub in2: String,
    pub out2: String,
    #[serde(rename = "break")]
    pub break_time: String,
    pub hours: String,
    pub ot_hours: String,
    pub sales: String,
    pub tips: String,
}

impl TimeEntry {
    pub fn empty(id: usize) -> Self {
        Self {
            id,
            day: Day::for_row(id),
            date: String::new(),
            in1: String::new(),
            out1: String::new(),
            in2: String::new(),
            out2: String::new(),
            break_time: String::new(),
            hours: String::new(),
            ot_hours: String::new(),
            sales: String::new(),
            tips: String::new(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::In1 => &self.in1,
            Field::Out1 => &self.out1,
            Field::In2 => &self.in2,
            Field::Out2 => &self.out2,
            Field::Sales => &self.sales,
            Field::Tips => &self.tips,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Date => &mut self.date,
            Field::In1 => &mut self.in1,
            Field::Out1 => &mut self.out1,
            Field::In2 => &mut self.in2,
            Field::Out2 => &mut self.out2,
            Field::Sales => &mut self.sales,
            Field::Tips => &mut self.tips,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMode {
    #[default]
    Dropdown,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub row_id: usize,
    pub message: String,
}

/// What the weekday check made of a date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateVerdict {
    Unparsed,
    Matches(NaiveDate),
    Corrected(NaiveDate),
    Mismatch { date: NaiveDate, actual: Day },
}

pub fn check_weekday(value: &str, day: Day, mode: EntryMode) -> DateVerdict {
    let Some(date) = parse_date(value) else {
        return DateVerdict::Unparsed;
    };

    let actual = Day::of_date(date);
    if actual == day {
        DateVerdict::Matches(date)
    } else if mode == EntryMode::Text && day == Day::Monday {
        DateVerdict::Corrected(preceding(date, Day::Monday))
    } else {
        DateVerdict::Mismatch { date, actual }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timesheet {
    pub name: String,
    pub rows: Rows,
}

impl Default for Timesheet {
    fn default() -> Self {
        Self {
            name: String::new(),
            rows: empty_rows(),
        }
    }
}

pub fn empty_rows() -> Rows {
    std::array::from_fn(TimeEntry::empty)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub sheet: Timesheet,
    pub error: Option<EditError>,
    pub notice: Option<Notice>,
    pub verdict: Option<DateVerdict>,
}

impl EditOutcome {
    fn rejected(sheet: &Timesheet, error: EditError) -> Self {
        Self {
            sheet: sheet.clone(),
            error: Some(error),
            notice: None,
            verdict: None,
        }
    }
}

/// Applies one edit and returns the resulting sheet. A rejected edit returns
/// the sheet unchanged together with the error.
pub fn apply_edit(sheet: &Timesheet, row: usize, field: Field, raw: &str, mode: EntryMode) -> EditOutcome {
    if row >= ROWS {
        return EditOutcome::rejected(sheet, EditError::RowOutOfRange(row.saturating_add(1)));
    }

    let mut next = sheet.clone();
    let mut notice = None;
    let mut verdict = None;
    let mut value = raw.to_string();

    if field.is_money() && !valid_amount(raw) {
        debug!(row, %field, raw, "amount rejected");
        return EditOutcome::rejected(
            sheet,
            EditError::InvalidFinancialInput { row, field, value: raw.to_string() },
        );
    }

    if field == Field::Date && !raw.is_empty() {
        let day = sheet.rows[row].day;
        let checked = check_weekday(raw, day, mode);
        verdict = Some(checked);

        match checked {
            DateVerdict::Unparsed | DateVerdict::Matches(_) => {}
            DateVerdict::Corrected(date) => {
                value = format_date(date);
                notice = Some(Notice {
                    row_id: row,
                    message: format!(
                        "Date adjusted to previous {} ({}) to maintain weekly schedule.",
                        day.full_name(),
                        value
                    ),
                });
                debug!(row, raw, corrected = %value, "date auto-corrected");
            }
            DateVerdict::Mismatch { date, actual } => {
                debug!(row, raw, actual = actual.label(), expected = day.label(), "date rejected");
                return EditOutcome::rejected(
                    sheet,
                    EditError::WeekdayMismatch {
                        row,
                        value: raw.to_string(),
                        actual,
                        expected: day,
                        suggestion: format_date(preceding(date, day)),
                    },
                );
            }
        }
    }

    *next.rows[row].slot(field) = value.clone();

    if field == Field::Date {
        if let Some(date) = parse_date(&value) {
            next.rows = cascade(&next.rows, row, date);
        }
    } else if field.is_time() {
        hours::recalculate(&mut next.rows[row], field);
    }

    EditOutcome {
        sheet: next,
        error: None,
        notice,
        verdict,
    }
}

/// Re-derives every row's date so that row `row` lands on `date` and the
/// block advances one calendar day per row.
pub fn cascade(rows: &Rows, row: usize, date: NaiveDate) -> Rows {
    let mut next = rows.clone();
    let Some(anchor) = date.checked_sub_signed(Duration::days(row as i64)) else {
        return next;
    };

    for entry in next.iter_mut() {
        if let Some(d) = anchor.checked_add_signed(Duration::days(entry.id as i64)) {
            entry.date = format_date(d);
        }
    }

    debug!(row, anchor = %format_date(anchor), "dates cascaded");
    next
}

/// Last row's date, else the last dated row in order, else empty.
pub fn period_ending(rows: &Rows) -> String {
    rows.iter()
        .rev()
        .find(|r| !r.date.trim().is_empty())
        .map(|r| r.date.clone())
        .unwrap_or_default()
}

pub fn reset_all() -> Rows {
    empty_rows()
}

/// Optional leading `$`, digits, at most one decimal point. Empty passes.
pub fn valid_amount(value: &str) -> bool {
    let body = value.strip_prefix('$').unwrap_or(value);
    body.chars().filter(|c| *c == '.').count() <= 1
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// `$N.NN` rendering applied once an amount is committed.
pub fn format_amount(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let cleaned: String = value.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let amount: f64 = cleaned.parse().ok()?;
    Some(format!("${:.2}", amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn named() -> Timesheet {
        Timesheet {
            name: "Dottie".into(),
            ..Timesheet::default()
        }
    }

    #[test]
    fn test_template() {
        let rows = reset_all();
        assert_eq!(rows.len(), ROWS);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.id, i);
            assert_eq!(row.day, Day::for_row(i));
            assert!(row.date.is_empty() && row.hours.is_empty() && row.sales.is_empty());
        }
        assert_eq!(rows[7].day.label(), "Mon.");
    }

    #[test]
    fn test_monday_cascades_two_weeks() {
        let out = apply_edit(&named(), 0, Field::Date, "3/10/2025", EntryMode::Dropdown);
        assert!(out.error.is_none());
        assert_eq!(out.sheet.rows[0].date, "03/10/2025");
        assert_eq!(out.sheet.rows[6].date, "03/16/2025");
        assert_eq!(out.sheet.rows[13].date, "03/23/2025");
        assert_eq!(period_ending(&out.sheet.rows), "03/23/2025");
    }

    #[test]
    fn test_cascade_from_every_row() {
        let start = ymd(2025, 3, 10);
        for k in 0..ROWS {
            let d = start + Duration::days(k as i64);
            let out = apply_edit(&named(), k, Field::Date, &format_date(d), EntryMode::Dropdown);
            assert!(out.error.is_none(), "row {k}");
            for (i, row) in out.sheet.rows.iter().enumerate() {
                let got = parse_date(&row.date).unwrap();
                assert_eq!((got - d).num_days(), i as i64 - k as i64);
                assert_eq!(Day::of_date(got), row.day);
            }
        }
    }

    #[test]
    fn test_edit_reanchors_whole_block() {
        let first = apply_edit(&named(), 0, Field::Date, "3/10/2025", EntryMode::Dropdown).sheet;
        let moved = apply_edit(&first, 9, Field::Date, "04/02/2025", EntryMode::Dropdown).sheet;
        assert_eq!(moved.rows[0].date, "03/24/2025");
        assert_eq!(moved.rows[13].date, "04/06/2025");
    }

    #[test]
    fn test_same_date_twice_is_idempotent() {
        let once = apply_edit(&named(), 3, Field::Date, "2025-03-13", EntryMode::Dropdown).sheet;
        let twice = apply_edit(&once, 3, Field::Date, "2025-03-13", EntryMode::Dropdown).sheet;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_mode_corrects_monday() {
        let out = apply_edit(&named(), 0, Field::Date, "3/11/2025", EntryMode::Text);
        assert!(out.error.is_none());
        assert_eq!(out.sheet.rows[0].date, "03/10/2025");
        assert_eq!(out.verdict, Some(DateVerdict::Corrected(ymd(2025, 3, 10))));
        let notice = out.notice.unwrap();
        assert_eq!(notice.row_id, 0);
        assert!(notice.message.contains("03/10/2025"));
    }

    #[test]
    fn test_dropdown_mode_rejects_mismatch() {
        let sheet = named();
        let out = apply_edit(&sheet, 0, Field::Date, "3/11/2025", EntryMode::Dropdown);
        assert_eq!(out.sheet, sheet);
        assert!(out.notice.is_none());
        match out.error {
            Some(EditError::WeekdayMismatch { row, value, actual, expected, suggestion }) => {
                assert_eq!(row, 0);
                assert_eq!(value, "3/11/2025");
                assert_eq!(actual, Day::Tuesday);
                assert_eq!(expected, Day::Monday);
                assert_eq!(suggestion, "03/10/2025");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_text_mode_only_corrects_monday_rows() {
        // Row 1 is Tuesday; a Wednesday is rejected even in text mode
        let out = apply_edit(&named(), 1, Field::Date, "3/12/2025", EntryMode::Text);
        assert!(matches!(out.error, Some(EditError::WeekdayMismatch { .. })));
        assert!(out.sheet.rows.iter().all(|r| r.date.is_empty()));
    }

    #[test]
    fn test_unparseable_date_stored_raw_without_cascade() {
        let out = apply_edit(&named(), 2, Field::Date, "03/1", EntryMode::Text);
        assert!(out.error.is_none());
        assert_eq!(out.verdict, Some(DateVerdict::Unparsed));
        assert_eq!(out.sheet.rows[2].date, "03/1");
        assert!(out.sheet.rows[3].date.is_empty());
    }

    #[test]
    fn test_clearing_date_touches_one_row() {
        let dated = apply_edit(&named(), 0, Field::Date, "3/10/2025", EntryMode::Dropdown).sheet;
        let out = apply_edit(&dated, 13, Field::Date, "", EntryMode::Dropdown);
        assert_eq!(out.sheet.rows[13].date, "");
        assert_eq!(out.sheet.rows[12].date, "03/22/2025");
        assert_eq!(period_ending(&out.sheet.rows), "03/22/2025");
    }

    #[test]
    fn test_time_edits_recalculate_row() {
        let mut sheet = named();
        for (field, value) in [
            (Field::In1, "9:00 AM"),
            (Field::Out1, "5:00 PM"),
        ] {
            sheet = apply_edit(&sheet, 4, field, value, EntryMode::Text).sheet;
        }
        assert_eq!(sheet.rows[4].hours, "8.00");
        assert_eq!(sheet.rows[4].ot_hours, "");

        for (field, value) in [(Field::In2, "5:15 PM"), (Field::Out2, "6:15 PM")] {
            sheet = apply_edit(&sheet, 4, field, value, EntryMode::Text).sheet;
        }
        assert_eq!(sheet.rows[4].hours, "9.00");
        assert_eq!(sheet.rows[4].ot_hours, "1.00");
        assert_eq!(sheet.rows[4].break_time, "0:15");
    }

    #[test]
    fn test_financial_input_mask() {
        let sheet = named();
        let ok = apply_edit(&sheet, 0, Field::Sales, "$12.5", EntryMode::Dropdown);
        assert_eq!(ok.sheet.rows[0].sales, "$12.5");

        for bad in ["12.5.1", "-3", "abc", "$$1", "1$"] {
            let out = apply_edit(&ok.sheet, 0, Field::Sales, bad, EntryMode::Dropdown);
            assert!(matches!(out.error, Some(EditError::InvalidFinancialInput { .. })), "{bad}");
            assert_eq!(out.sheet.rows[0].sales, "$12.5");
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("12.5").as_deref(), Some("$12.50"));
        assert_eq!(format_amount("$7").as_deref(), Some("$7.00"));
        assert_eq!(format_amount("."), None);
        assert_eq!(format_amount("  "), None);
    }

    #[test]
    fn test_period_ending_fallback() {
        let mut rows = reset_all();
        assert_eq!(period_ending(&rows), "");
        rows[2].date = "03/12/2025".into();
        rows[5].date = "03/15/2025".into();
        assert_eq!(period_ending(&rows), "03/15/2025");
        rows[13].date = "03/23/2025".into();
        assert_eq!(period_ending(&rows), "03/23/2025");
    }

    #[test]
    fn test_row_out_of_range() {
        let out = apply_edit(&named(), 14, Field::Tips, "1", EntryMode::Dropdown);
        assert_eq!(out.error, Some(EditError::RowOutOfRange(15)));
        let out = apply_edit(&named(), usize::MAX, Field::Tips, "1", EntryMode::Dropdown);
        assert_eq!(out.error, Some(EditError::RowOutOfRange(usize::MAX)));
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("Out-1".parse::<Field>(), Ok(Field::Out1));
        assert_eq!("tips".parse::<Field>(), Ok(Field::Tips));
        assert!(matches!("hours".parse::<Field>(), Err(EditError::UnknownField(_))));
    }
}
