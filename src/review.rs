use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::editor::Editor;
use crate::error::{AppError, AppResult};
use crate::sheet::TimeEntry;
use crate::totals::PeriodTotals;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetData<'a> {
    pub employee_name: &'a str,
    pub pay_period_ending: String,
    pub rows: &'a [TimeEntry],
    #[serde(flatten)]
    pub totals: PeriodTotals,
}

impl<'a> TimesheetData<'a> {
    pub fn of(editor: &'a Editor) -> Self {
        Self {
            employee_name: &editor.sheet.name,
            pay_period_ending: editor.period_ending(),
            rows: &editor.sheet.rows,
            totals: editor.totals(),
        }
    }
}

/// Advisory only; nothing in here is ever written back to the sheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewResult {
    pub manager_comment: String,
    pub detected_issues: Vec<String>,
    pub suggested_total_hours: Option<f64>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

pub fn build_prompt(data: &TimesheetData, config: &Config) -> AppResult<String> {
    let workplace = if config.sheet.business.is_empty() {
        "a small restaurant".to_string()
    } else {
        format!("\"{}\"", config.sheet.business)
    };
    let body = serde_json::to_string_pretty(data)?;

    Ok(format!(
        "You are a strict but friendly payroll manager at {workplace}.\n\
         Review the following timesheet data for errors or anomalies.\n\n\
         Timesheet Data:\n{body}\n\n\
         Tasks:\n\
         1. Check that the totals (regHours, otHours, totalSales, totalTips) are consistent with the daily entries.\n\
         2. Where In/Out times exist but hours are blank, work out the hours (12-hour times with AM/PM).\n\
         3. Look for a missing employee name or missing dates.\n\
         4. Keep the comment short and friendly.\n\n\
         Return the response in JSON format."
    ))
}

fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "managerComment": {
                        "type": "STRING",
                        "description": "The manager's feedback."
                    },
                    "detectedIssues": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "List of specific issues found, if any."
                    },
                    "suggestedTotalHours": {
                        "type": "NUMBER",
                        "description": "Sum of hours calculated from the In/Out times."
                    }
                }
            }
        }
    })
}

fn parse_response(response: GenerateResponse) -> AppResult<ReviewResult> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Ok(ReviewResult::default());
    }
    serde_json::from_str(&text).map_err(|e| AppError::Review(format!("unexpected review payload: {}", e)))
}

pub fn review_timesheet(editor: &Editor, config: &Config) -> AppResult<ReviewResult> {
    let api_key = config.review_api_key().ok_or_else(|| {
        AppError::Review(format!("set {} to enable reviews", config.review.api_key_env))
    })?;

    let prompt = build_prompt(&TimesheetData::of(editor), config)?;
    let url = format!(
        "{}/models/{}:generateContent",
        config.review.endpoint.trim_end_matches('/'),
        config.review.model
    );
    debug!(%url, prompt_len = prompt.len(), "requesting review");

    let response: GenerateResponse = Client::new()
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&request_body(&prompt))
        .send()?
        .error_for_status()?
        .json()?;

    let result = parse_response(response)?;
    info!(issues = result.detected_issues.len(), "review received");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{EntryMode, Field, Timesheet};

    fn editor() -> Editor {
        let mut editor = Editor::new(Timesheet::default(), EntryMode::Text, Vec::new());
        editor.set_name("Dottie");
        editor.edit(0, Field::Date, "3/10/2025").unwrap();
        editor.edit(0, Field::In1, "9:00 AM").unwrap();
        editor.edit(0, Field::Out1, "5:00 PM").unwrap();
        editor
    }

    #[test]
    fn test_data_shape() {
        let editor = editor();
        let value = serde_json::to_value(TimesheetData::of(&editor)).unwrap();
        assert_eq!(value["employeeName"], "Dottie");
        assert_eq!(value["payPeriodEnding"], "03/23/2025");
        assert_eq!(value["regHours"], "8.00");
        assert_eq!(value["totalSales"], "$0.00");
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(14));
        assert_eq!(value["rows"][0]["otHours"], "");
        assert_eq!(value["rows"][0]["day"], "Mon.");
    }

    #[test]
    fn test_prompt_embeds_data() {
        let editor = editor();
        let mut config = Config::default();
        config.sheet.business = "Blue Plate Diner".into();
        let prompt = build_prompt(&TimesheetData::of(&editor), &config).unwrap();
        assert!(prompt.contains("\"Blue Plate Diner\""));
        assert!(prompt.contains("\"employeeName\": \"Dottie\""));
        assert!(prompt.ends_with("Return the response in JSON format."));
    }

    #[test]
    fn test_parse_response() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"managerComment\":\"Looks fine, hon.\",\"detectedIssues\":[\"Row 2 has no hours\"],\"suggestedTotalHours\":8}"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let result = parse_response(response).unwrap();
        assert_eq!(result.manager_comment, "Looks fine, hon.");
        assert_eq!(result.detected_issues, vec!["Row 2 has no hours"]);
        assert_eq!(result.suggested_total_hours, Some(8.0));
    }

    #[test]
    fn test_parse_empty_and_bad_payloads() {
        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(parse_response(empty).unwrap(), ReviewResult::default());

        let bad: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"not json"}]}}]}"#).unwrap();
        assert!(matches!(parse_response(bad), Err(AppError::Review(_))));
    }

    #[test]
    fn test_request_body_schema() {
        let body = request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["properties"]["detectedIssues"]["type"],
            "ARRAY"
        );
    }
}
