// src/loader.rs

use crate::error::LoadError;
use crate::model::{IssueRecord, Rejection};
use crate::normalize::parse_day;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Issues read from a dump, plus the entries that could not be read as issues
#[derive(Debug, Default)]
pub struct LoadedIssues {
    pub records: Vec<IssueRecord>,
    pub rejected: Vec<Rejection>,
}

/// Read a JSON array of tracker issues. Fields other than the ones in
/// [`IssueRecord`] are ignored.
///
/// Only a file that is unreadable or not a JSON array fails the load; an entry
/// that does not fit [`IssueRecord`] is rejected on its own.
pub fn load_issues(path: &Path) -> Result<LoadedIssues, LoadError> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(LoadError::NotJson(path.to_path_buf()));
    }
    let file = fs::File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let entries: Vec<Value> = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;

    let mut loaded = LoadedIssues::default();
    for (position, entry) in entries.into_iter().enumerate() {
        let issue = entry.get("number").and_then(Value::as_u64);
        match serde_json::from_value::<IssueRecord>(entry) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                warn!(position, ?issue, "skipping unreadable entry: {e}");
                loaded.rejected.push(Rejection { issue, reason: format!("entry {position} is not an issue: {e}") });
            }
        }
    }
    info!(
        path = %path.display(),
        issues = loaded.records.len(),
        unreadable = loaded.rejected.len(),
        "loaded issues"
    );
    Ok(loaded)
}

/// Drop issues created more than `max_age_days` whole days before `today`.
///
/// Records whose creation date cannot be read are kept so the normalizer can
/// report them.
pub fn retain_recent(records: &mut Vec<IssueRecord>, today: NaiveDate, max_age_days: i64) {
    let before = records.len();
    records.retain(|r| {
        match r.created_at.as_deref().and_then(parse_day) {
            Some(created) => (today - created).num_days() <= max_age_days,
            None => true,
        }
    });
    debug!(kept = records.len(), dropped = before - records.len(), max_age_days, "applied recency filter");
}

/// Write `value` as compact JSON to `path`.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), LoadError> {
    let io_err = |source| LoadError::Io { path: path.to_path_buf(), source };
    let file = fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;
    writer.flush().map_err(io_err)?;
    info!(path = %path.display(), "saved JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: u64, created: Option<&str>) -> IssueRecord {
        IssueRecord {
            id,
            comments: 2,
            created_at: created.map(str::to_string),
            closed_at: None,
            state: Some("open".to_string()),
        }
    }

    #[test]
    fn reads_github_shaped_issues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.json");
        fs::write(
            &path,
            r#"[
                {"number": 7, "title": "crash", "comments": 3, "state": "closed",
                 "created_at": "2021-03-01T10:00:00Z", "closed_at": "2021-03-04T10:00:00Z"},
                {"number": 8, "state": "open", "created_at": "2021-03-02T10:00:00Z", "closed_at": null}
            ]"#,
        )
        .unwrap();

        let issues = load_issues(&path).unwrap().records;
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, 7);
        assert_eq!(issues[0].comments, 3);
        assert_eq!(issues[1].closed_at, None);
        assert_eq!(issues[1].comments, 0);
    }

    #[test]
    fn refuses_non_json_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("issues.txt");
        fs::write(&txt, "[]").unwrap();
        assert!(matches!(load_issues(&txt), Err(LoadError::NotJson(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(load_issues(&bad), Err(LoadError::Json { .. })));

        let object = dir.path().join("object.json");
        fs::write(&object, r#"{"number": 1}"#).unwrap();
        assert!(matches!(load_issues(&object), Err(LoadError::Json { .. })));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_issues(&missing), Err(LoadError::Io { .. })));
    }

    #[test]
    fn bad_entries_do_not_sink_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.json");
        fs::write(
            &path,
            r#"[
                {"number": 1, "state": "open", "created_at": "2021-03-01T10:00:00Z", "closed_at": null},
                {"number": 2, "created_at": "2021-03-02T10:00:00Z", "closed_at": null},
                {"number": 3, "state": "open", "created_at": 1614680000, "closed_at": null},
                {"number": 4, "state": "closed", "created_at": "2021-03-02", "closed_at": ["x"]},
                {"title": "no number", "state": "open"},
                {"number": 6, "comments": "many", "state": "open", "created_at": "2021-03-02"},
                "not an object"
            ]"#,
        )
        .unwrap();

        let loaded = load_issues(&path).unwrap();
        let ids: Vec<_> = loaded.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(loaded.records[1].state, None);
        assert_eq!(loaded.records[2].created_at.as_deref(), Some("1614680000"));
        assert_eq!(loaded.records[3].closed_at.as_deref(), Some(r#"["x"]"#));

        let rejected: Vec<_> = loaded.rejected.iter().map(|r| r.issue).collect();
        assert_eq!(rejected, vec![None, Some(6), None]);
        assert!(loaded.rejected[0].reason.starts_with("entry 4 "));

        // the good record still makes it through the engine, the rest are rejected there
        let report = crate::analyze(&loaded.records, date("2021-03-10")).unwrap();
        assert_eq!(report.window.first, 0);
        assert_eq!(report.open.get(0), Some(1));
        let engine_rejected: Vec<_> = report.rejected.iter().map(|r| r.issue).collect();
        assert_eq!(engine_rejected, vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn recency_filter_keeps_boundary_and_unreadable() {
        let mut records = vec![
            record(1, Some("2021-01-01T00:00:00Z")),
            record(2, Some("2021-02-10")),
            record(3, Some("2021-02-09")),
            record(4, Some("garbage")),
        ];
        retain_recent(&mut records, date("2021-03-22"), 40);
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn saved_issues_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.json");
        let records = vec![record(1, Some("2021-01-01"))];
        save_json(&records, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""number":1"#));
        assert_eq!(load_issues(&path).unwrap().records, records);
    }
}
