use serde::Serialize;

use crate::hours::two_places;
use crate::sheet::Rows;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub reg_hours: String,
    pub ot_hours: String,
    pub total_sales: String,
    pub total_tips: String,
}

/// Full recomputation over all rows; nothing is carried between calls.
pub fn compute_totals(rows: &Rows) -> PeriodTotals {
    let mut hours = 0.0;
    let mut overtime = 0.0;
    let mut sales = 0.0;
    let mut tips = 0.0;

    for row in rows {
        hours += leading_number(&row.hours).unwrap_or(0.0);
        overtime += leading_number(&row.ot_hours).unwrap_or(0.0);
        sales += leading_number(&money_chars(&row.sales)).unwrap_or(0.0);
        tips += leading_number(&money_chars(&row.tips)).unwrap_or(0.0);
    }

    PeriodTotals {
        reg_hours: two_places(hours),
        ot_hours: two_places(overtime),
        total_sales: format!("${}", two_places(sales)),
        total_tips: format!("${}", two_places(tips)),
    }
}

fn money_chars(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Longest numeric prefix (`-12.5` out of `-12.5.3`), `None` if there is none.
pub fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in value.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    value[..end].trim_end_matches('.').parse().ok()
}
