use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::editor::Rejection;
use crate::error::AppResult;
use crate::sheet::{empty_rows, Notice, Rows, TimeEntry, Timesheet, ROWS};
use crate::weekday::Day;

const SNAPSHOT_FILE: &str = "timesheet_v1.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub period_ending: String,
    #[serde(default)]
    pub rows: Vec<TimeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<Rejection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_correct: Option<Notice>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            name: String::new(),
            period_ending: String::new(),
            rows: empty_rows().to_vec(),
            validation_error: None,
            auto_correct: None,
        }
    }
}

impl Snapshot {
    /// Rebuilds the sheet, falling back to the empty template when the
    /// cached rows do not describe the fixed 14-row grid.
    pub fn sheet(&self) -> Timesheet {
        Timesheet {
            name: self.name.clone(),
            rows: rows_from(&self.rows).unwrap_or_else(|| {
                warn!("cached rows are malformed, starting from an empty sheet");
                empty_rows()
            }),
        }
    }
}

fn rows_from(rows: &[TimeEntry]) -> Option<Rows> {
    if rows.len() != ROWS {
        return None;
    }
    let well_formed = rows
        .iter()
        .enumerate()
        .all(|(i, r)| r.id == i && r.day == Day::for_row(i));
    if !well_formed {
        return None;
    }
    rows.to_vec().try_into().ok()
}

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Option<Self> {
        if let Some(path) = &config.storage.path {
            return Some(Self::at(path));
        }
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
            .map(|p| Self::at(p.join("timecard").join(SNAPSHOT_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable data is not an error; it yields the template.
    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no snapshot yet");
            return Snapshot::default();
        }

        match fs::read_to_string(&self.path).map(|c| serde_json::from_str::<Snapshot>(&c)) {
            Ok(Ok(snapshot)) => {
                debug!(path = %self.path.display(), "snapshot loaded");
                snapshot
            }
            Ok(Err(e)) => {
                warn!(error = %e, "snapshot is corrupt, ignoring it");
                Snapshot::default()
            }
            Err(e) => {
                warn!(error = %e, "snapshot unreadable, ignoring it");
                Snapshot::default()
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(snapshot)?;

        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{apply_edit, EntryMode, Field};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_template() {
        let dir = tempdir().unwrap();
        let store = Store::at(dir.path().join("nope.json"));
        let snapshot = store.load();
        assert_eq!(snapshot, Snapshot::default());
        assert_eq!(snapshot.sheet(), Timesheet::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = Store::at(dir.path().join("nested/sheet.json"));

        let sheet = Timesheet { name: "Dottie".into(), ..Timesheet::default() };
        let sheet = apply_edit(&sheet, 0, Field::Date, "3/10/2025", EntryMode::Dropdown).sheet;
        let snapshot = Snapshot {
            name: sheet.name.clone(),
            period_ending: "03/23/2025".into(),
            rows: sheet.rows.to_vec(),
            validation_error: None,
            auto_correct: None,
        };

        store.save(&snapshot).unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.sheet(), sheet);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Store::at(&path).load(), Snapshot::default());
    }

    #[test]
    fn test_wrong_row_shape_falls_back() {
        let mut snapshot = Snapshot::default();
        snapshot.name = "Dottie".into();
        snapshot.rows.pop();
        let sheet = snapshot.sheet();
        assert_eq!(sheet.name, "Dottie");
        assert_eq!(sheet.rows, empty_rows());

        let mut swapped = Snapshot::default();
        swapped.rows.swap(0, 1);
        assert_eq!(swapped.sheet().rows, empty_rows());
    }

    #[test]
    fn test_reads_camel_case_cache() {
        let json = r#"{
            "name": "Dottie",
            "periodEnding": "",
            "rows": [
                {"id":0,"day":"Mon.","date":"03/10/2025","in1":"9:00 AM","out1":"5:00 PM","in2":"","out2":"","break":"","hours":"8.00","otHours":"","sales":"$10.00","tips":""}
            ]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.rows[0].hours, "8.00");
        assert_eq!(snapshot.rows[0].day, Day::Monday);
        // one row is not a full grid
        assert_eq!(snapshot.sheet().rows, empty_rows());
    }
}
