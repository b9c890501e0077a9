use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::options_after;
use crate::dates::{format_date, mask_date_input, parse_date};
use crate::error::EditError;
use crate::sheet::{
    apply_edit, format_amount, period_ending, reset_all, DateVerdict, EntryMode, Field, Notice, Timesheet,
    ROWS,
};
use crate::store::Snapshot;
use crate::totals::{compute_totals, PeriodTotals};
use crate::weekday::preceding;

pub const RESET_WARNING: &str =
    "Are you sure you want to clear the form? This will delete all your hard work.";

/// A rejected date still waiting on the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub row_id: usize,
    pub message: String,
    pub invalid_value: String,
}

/// Host-side state around the sheet: entry gates, pending feedback and the
/// recovery action for rejected dates.
pub struct Editor {
    pub sheet: Timesheet,
    pub mode: EntryMode,
    pub rejection: Option<Rejection>,
    pub notice: Option<Notice>,
    time_options: Vec<String>,
}

impl Editor {
    pub fn new(sheet: Timesheet, mode: EntryMode, time_options: Vec<String>) -> Self {
        Self {
            sheet,
            mode,
            rejection: None,
            notice: None,
            time_options,
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot, mode: EntryMode, time_options: Vec<String>) -> Self {
        let mut editor = Self::new(snapshot.sheet(), mode, time_options);
        editor.rejection = snapshot.validation_error.clone();
        editor.notice = snapshot.auto_correct.clone();
        editor
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.sheet.name.clone(),
            period_ending: self.period_ending(),
            rows: self.sheet.rows.to_vec(),
            validation_error: self.rejection.clone(),
            auto_correct: self.notice.clone(),
        }
    }

    pub fn period_ending(&self) -> String {
        period_ending(&self.sheet.rows)
    }

    pub fn totals(&self) -> PeriodTotals {
        compute_totals(&self.sheet.rows)
    }

    pub fn time_options(&self) -> &[String] {
        &self.time_options
    }

    pub fn set_name(&mut self, name: &str) {
        self.sheet.name = name.to_string();
    }

    /// Runs one edit through the gates and the sheet. On success returns the
    /// auto-correct notice, if the date had to be moved.
    pub fn edit(&mut self, row: usize, field: Field, raw: &str) -> Result<Option<Notice>, EditError> {
        self.check_gates(row, field, raw)?;

        let mut value = raw.trim().to_string();
        if field == Field::Date && self.mode == EntryMode::Text && value.bytes().all(|b| b.is_ascii_digit()) {
            value = mask_date_input("", &value);
        }

        let outcome = apply_edit(&self.sheet, row, field, &value, self.mode);
        if let Some(err) = outcome.error {
            if let EditError::WeekdayMismatch { row, value, .. } = &err {
                self.rejection = Some(Rejection {
                    row_id: *row,
                    message: err.to_string(),
                    invalid_value: value.clone(),
                });
            }
            return Err(err);
        }
        self.sheet = outcome.sheet;

        match outcome.verdict {
            Some(DateVerdict::Matches(_)) => {
                self.clear_feedback_for(row);
            }
            Some(DateVerdict::Corrected(_)) => {
                if self.rejection.as_ref().is_some_and(|r| r.row_id == row) {
                    self.rejection = None;
                }
                self.notice = outcome.notice.clone();
            }
            _ => {}
        }

        if field.is_money() {
            if let Some(amount) = format_amount(&value) {
                self.sheet = apply_edit(&self.sheet, row, field, &amount, self.mode).sheet;
            }
        }

        info!(row = row + 1, %field, value = %self.sheet.rows[row].get(field), "edit applied");
        Ok(outcome.notice)
    }

    fn check_gates(&self, row: usize, field: Field, raw: &str) -> Result<(), EditError> {
        if row >= ROWS {
            return Err(EditError::RowOutOfRange(row.saturating_add(1)));
        }
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        let entry = &self.sheet.rows[row];

        if field == Field::Date && self.sheet.name.trim().is_empty() {
            return Err(EditError::NameRequired);
        }
        if field == Field::In1 && entry.date.trim().is_empty() {
            return Err(EditError::DateRequired { row });
        }
        if let Some(requires) = field.unlocked_by() {
            if entry.get(requires).is_empty() {
                return Err(EditError::FieldLocked { row, field, requires });
            }
        }

        if field.is_time() && self.mode == EntryMode::Dropdown {
            let previous = field.unlocked_by().map(|f| entry.get(f)).unwrap_or("");
            if !options_after(&self.time_options, previous).iter().any(|o| o == raw) {
                return Err(EditError::NotAnOption {
                    row,
                    field,
                    value: raw.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Replaces the pending rejected date on `row` with the nearest earlier
    /// date that falls on the row's weekday.
    pub fn accept_suggestion(&mut self, row: usize) -> Result<Option<Notice>, EditError> {
        let pending = self
            .rejection
            .as_ref()
            .filter(|r| r.row_id == row)
            .and_then(|r| parse_date(&r.invalid_value))
            .ok_or(EditError::NoPendingMismatch { row })?;

        let corrected = format_date(preceding(pending, self.sheet.rows[row].day));
        debug!(row = row + 1, %corrected, "accepting suggested date");

        let notice = self.edit(row, Field::Date, &corrected)?;
        self.rejection = None;
        Ok(notice)
    }

    pub fn dismiss(&mut self) {
        self.rejection = None;
        self.notice = None;
    }

    /// Clears everything when `confirmed`; otherwise leaves the sheet alone.
    pub fn reset(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.sheet = Timesheet {
            name: String::new(),
            rows: reset_all(),
        };
        self.dismiss();
        info!("sheet reset");
        true
    }

    fn clear_feedback_for(&mut self, row: usize) {
        if self.rejection.as_ref().is_some_and(|r| r.row_id == row) {
            self.rejection = None;
        }
        if self.notice.as_ref().is_some_and(|n| n.row_id == row) {
            self.notice = None;
        }
    }
}
