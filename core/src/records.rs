//! Filtering, counting and persisting lists of records.
//!
//! The `try_*` functions return the error. `filter_by_date` and `save` log
//! the error and fall back to an empty result or a no-op, for callers that
//! only want best-effort behavior.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::RecordError;
use crate::types::Record;

/// Records whose `createdAt` is at or after `threshold`, in input order.
///
/// All or nothing: the first record whose timestamp is missing or not
/// numeric aborts the whole filter.
pub fn try_filter_by_date(records: &[Record], threshold: f64) -> Result<Vec<Record>, RecordError> {
    let mut kept = Vec::new();
    for record in records {
        if record.created_at_secs()? >= threshold {
            kept.push(record.clone());
        }
    }
    Ok(kept)
}

/// Like [`try_filter_by_date`], but logs the failure and returns an empty list.
pub fn filter_by_date(records: &[Record], threshold: f64) -> Vec<Record> {
    match try_filter_by_date(records, threshold) {
        Ok(kept) => kept,
        Err(e) => {
            tracing::warn!(error = %e, threshold, "error filtering records");
            Vec::new()
        }
    }
}

pub fn count(records: &[Record]) -> usize {
    records.len()
}

/// Write `records` to `path` as a JSON array indented with four spaces.
///
/// The data goes to a temporary file next to the real target and is then
/// renamed over it. A symlinked `path` is followed, so the link survives and
/// the file it points at is replaced; an existing file keeps its permissions.
pub fn try_save(records: &[Record], path: impl AsRef<Path>) -> Result<(), RecordError> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| RecordError::Io {
        path: path.display().to_string(),
        source,
    };

    let target = resolve_symlinks(path).map_err(io_err)?;
    let file_name = target
        .file_name()
        .ok_or_else(|| io_err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path")))?;
    let tmp_path = target.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let result = write_pretty(records, &tmp_path).and_then(|()| {
        if let Some(permissions) = permissions {
            fs::set_permissions(&tmp_path, permissions).map_err(io_err)?;
        }
        fs::rename(&tmp_path, &target).map_err(io_err)
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Follow `path` through any chain of symlinks, including a dangling last
/// link, to the file that should actually be written.
fn resolve_symlinks(path: &Path) -> std::io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    // Bounded like the kernel's own loop limit.
    for _ in 0..40 {
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let link = fs::read_link(&current)?;
                current = match current.parent() {
                    Some(parent) if link.is_relative() => parent.join(link),
                    _ => link,
                };
            }
            _ => return Ok(current),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "too many levels of symbolic links",
    ))
}

fn write_pretty(records: &[Record], path: &Path) -> Result<(), RecordError> {
    let io_err = |source: std::io::Error| RecordError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    writer.flush().map_err(io_err)?;
    writer.get_ref().sync_all().map_err(io_err)
}

/// Like [`try_save`], but logs the outcome instead of returning it.
pub fn save(records: &[Record], path: impl AsRef<Path>) {
    let path = path.as_ref();
    match try_save(records, path) {
        Ok(()) => tracing::info!(path = %path.display(), count = records.len(), "records saved"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "error saving records"),
    }
}

/// Read a file written by [`save`].
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Record>, RecordError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::capture_logs;

    fn bakery() -> Vec<Record> {
        vec![
            Record::new("berliner", "Jelly donut", "2.99").with_created_at(1609459200),
            Record::new("croissant", "Butter croissant", "1.99").with_created_at(1640995200),
            Record::new("baguette", "French baguette", "3.49").with_created_at(1662531200),
        ]
    }

    fn stamped(secs: i64) -> Record {
        Record::default().with_created_at(secs)
    }

    #[test]
    fn filter_keeps_records_at_or_after_threshold() {
        let records = vec![stamped(1609459200), stamped(1640995200), stamped(1662531200)];
        let kept = filter_by_date(&records, 1640995200.0);
        assert_eq!(kept, records[1..].to_vec());
    }

    #[test]
    fn filter_preserves_input_order() {
        let records = vec![stamped(30), stamped(10), stamped(20), stamped(5)];
        let kept = filter_by_date(&records, 10.0);
        let secs: Vec<f64> = kept.iter().map(|r| r.created_at_secs().unwrap()).collect();
        assert_eq!(secs, vec![30.0, 10.0, 20.0]);
    }

    #[test]
    fn filter_accepts_numeric_strings() {
        let records: Vec<Record> =
            serde_json::from_value(json!([{"createdAt": "100"}, {"createdAt": 50.5}])).unwrap();
        assert_eq!(filter_by_date(&records, 60.0).len(), 1);
    }

    #[test]
    fn filter_aborts_on_missing_timestamp() {
        let mut records = bakery();
        records.push(Record::new("kouign", "Kouign-amann", "4.25"));

        assert!(matches!(
            try_filter_by_date(&records, 0.0),
            Err(RecordError::MissingCreatedAt)
        ));
        let (kept, logs) = capture_logs(|| filter_by_date(&records, 0.0));
        assert!(kept.is_empty());
        assert!(logs.contains("createdAt"), "logs: {logs}");
    }

    #[test]
    fn filter_aborts_on_non_numeric_timestamp() {
        let mut records = bakery();
        records.insert(0, Record {
            created_at: Some(json!("last tuesday")),
            ..Record::default()
        });
        assert!(filter_by_date(&records, 0.0).is_empty());
    }

    #[test]
    fn filter_of_empty_list_is_empty() {
        assert!(try_filter_by_date(&[], 0.0).unwrap().is_empty());
    }

    #[test]
    fn count_matches_length() {
        assert_eq!(count(&[]), 0);
        assert_eq!(count(&bakery()), 3);
        assert_eq!(count(&[Record::default()]), 1);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let records = bakery();

        save(&records, &path);

        assert_eq!(load(&path).unwrap(), records);
        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["sku"], "berliner");
        assert_eq!(raw[2]["createdAt"], 1662531200);
    }

    #[test]
    fn save_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        try_save(&[Record::new("berliner", "Jelly donut", "2.99")], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \""), "{text}");
    }

    #[test]
    fn save_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, "stale contents that are much longer than an empty array").unwrap();

        try_save(&[], &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn save_writes_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("link.json");
        fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink("real.json", &link).unwrap();

        try_save(&bakery(), &link).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(load(&real).unwrap(), bakery());
        assert_eq!(load(&link).unwrap(), bakery());
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, "[]").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        try_save(&bakery(), &path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn save_failure_is_logged_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("records.json");

        assert!(matches!(try_save(&bakery(), &path), Err(RecordError::Io { .. })));
        let ((), logs) = capture_logs(|| save(&bakery(), &path));
        assert!(logs.contains("error saving records"), "logs: {logs}");
        assert!(!path.exists());
    }
}
