//! Error types. Edit errors are always recoverable: the sheet they were
//! raised against is left exactly as it was.

use std::io;
use thiserror::Error;

use crate::sheet::Field;
use crate::weekday::Day;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    // ---------------------------
    // Raised by the sheet itself
    // ---------------------------
    #[error("{value} is a {}, but this row is for {}", .actual.full_name(), .expected.label())]
    WeekdayMismatch {
        row: usize,
        value: String,
        actual: Day,
        expected: Day,
        suggestion: String,
    },

    #[error("{value:?} is not a valid amount for {field}")]
    InvalidFinancialInput {
        row: usize,
        field: Field,
        value: String,
    },

    // ---------------------------
    // Entry gates
    // ---------------------------
    #[error("Fill out Name before entering date information")]
    NameRequired,

    #[error("Please fill out date first (row {})", .row + 1)]
    DateRequired { row: usize },

    #[error("{field} is locked until {requires} is filled in (row {})", .row + 1)]
    FieldLocked {
        row: usize,
        field: Field,
        requires: Field,
    },

    #[error("{value:?} is not one of the choices for {field} (row {})", .row + 1)]
    NotAnOption {
        row: usize,
        field: Field,
        value: String,
    },

    #[error("Row {0} does not exist (rows are 1-14)")]
    RowOutOfRange(usize),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("No rejected date is waiting on row {}", .row + 1)]
    NoPendingMismatch { row: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Review failed: {0}")]
    Review(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

pub type AppResult<T> = Result<T, AppError>;
