use colored::*;
use tabled::{
    settings::{object::Columns, object::Rows as TableRows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::config::Config;
use crate::editor::Editor;
use crate::sheet::{EntryMode, TimeEntry};
use crate::totals::PeriodTotals;

#[derive(Tabled)]
struct GridRow {
    #[tabled(rename = "No.")]
    number: String,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "In - 1")]
    in1: String,
    #[tabled(rename = "Out - 1")]
    out1: String,
    #[tabled(rename = "Break")]
    break_time: String,
    #[tabled(rename = "In - 2")]
    in2: String,
    #[tabled(rename = "Out - 2")]
    out2: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "O.T. Hours")]
    ot_hours: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Tips")]
    tips: String,
}

impl From<&TimeEntry> for GridRow {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            number: (entry.id + 1).to_string(),
            day: entry.day.label().to_string(),
            date: entry.date.clone(),
            in1: entry.in1.clone(),
            out1: entry.out1.clone(),
            break_time: entry.break_time.clone(),
            in2: entry.in2.clone(),
            out2: entry.out2.clone(),
            hours: entry.hours.clone(),
            ot_hours: entry.ot_hours.clone(),
            sales: entry.sales.clone(),
            tips: entry.tips.clone(),
        }
    }
}

fn totals_row(totals: &PeriodTotals) -> GridRow {
    GridRow {
        number: String::new(),
        day: String::new(),
        date: String::new(),
        in1: String::new(),
        out1: String::new(),
        break_time: String::new(),
        in2: String::new(),
        out2: "Totals:".to_string(),
        hours: totals.reg_hours.clone(),
        ot_hours: totals.ot_hours.clone(),
        sales: totals.total_sales.clone(),
        tips: totals.total_tips.clone(),
    }
}

pub fn render_grid(editor: &Editor) -> String {
    let mut rows: Vec<GridRow> = editor.sheet.rows.iter().map(GridRow::from).collect();
    rows.push(totals_row(&editor.totals()));
    let last = rows.len();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .with(Modify::new(Columns::new(8..=11)).with(Alignment::right()))
        .with(Modify::new(TableRows::single(last)).with(Alignment::right()))
        .to_string()
}

pub fn print_sheet(editor: &Editor, config: &Config) {
    if !config.sheet.business.is_empty() {
        println!("{}", config.sheet.business.to_uppercase().bold());
    }
    println!("{}", config.sheet.title.to_uppercase().bold());
    println!();

    let name = if editor.sheet.name.is_empty() { "-".dimmed() } else { editor.sheet.name.normal() };
    let period = editor.period_ending();
    let period = if period.is_empty() { "MM/DD/YYYY".dimmed() } else { period.normal() };
    println!("{} {}    {} {}", "Name:".bold(), name, "Pay Period Ending:".bold(), period);

    let mode = match editor.mode {
        EntryMode::Text => "text entry".purple(),
        EntryMode::Dropdown => "dropdown".blue(),
    };
    println!("{} {}", "Mode:".bold(), mode);
    println!();

    println!("{}", render_grid(editor));
    print_feedback(editor);
}

pub fn print_feedback(editor: &Editor) {
    if let Some(rejection) = &editor.rejection {
        println!();
        println!("{}", format!("DATE MISMATCH! (row {})", rejection.row_id + 1).red().bold());
        println!("  {}", rejection.message);
        println!(
            "  {}",
            format!("Run `timecard fix {}` to use the previous matching day.", rejection.row_id + 1).dimmed()
        );
    }
    if let Some(notice) = &editor.notice {
        println!();
        println!("{}", format!("AUTO-CORRECTED! (row {})", notice.row_id + 1).blue().bold());
        println!("  {}", notice.message);
    }
}

pub fn print_totals(totals: &PeriodTotals) {
    println!("{}", "TOTALS".cyan().bold());
    println!("  Hours:       {}", totals.reg_hours);
    println!("  O.T. Hours:  {}", totals.ot_hours);
    println!("  Sales:       {}", totals.total_sales);
    println!("  Tips:        {}", totals.total_tips);
}
