use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use poll_logging::{poll_error, poll_info, poll_warn};
use poller_core::stats::{self, User};
use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsCmdError {
    #[error("cannot read {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No JSON files found in responses directory {0:?}")]
    NoFiles(PathBuf),
    #[error("No valid users found in any response file")]
    NoUsers,
}

/// Print the statistics report for `dir` and map the outcome to an exit code.
pub fn execute(dir: &Path) -> ExitCode {
    match analyze_dir(dir) {
        Ok(results) => {
            println!("{}", stats::to_pretty(&stats::success_report(results)));
            ExitCode::SUCCESS
        }
        Err(err) => {
            poll_error!("Stats over {:?} failed: {}", dir, err);
            let report = stats::error_report("Failed to analyze responses", &err.to_string());
            println!("{}", stats::to_pretty(&report));
            ExitCode::FAILURE
        }
    }
}

/// Statistics over every user found in `dir/*.json`, plus one entry per file.
pub fn analyze_dir(dir: &Path) -> Result<Map<String, Value>, StatsCmdError> {
    let files = json_files(dir)?;
    if files.is_empty() {
        return Err(StatsCmdError::NoFiles(dir.to_path_buf()));
    }

    let mut all_users: Vec<User> = Vec::new();
    let mut reports = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match read_users(path) {
            Ok(users) => {
                let mut report = Map::new();
                report.insert("file".into(), json!(name));
                report.extend(stats::summarize(&users));
                reports.push(Value::Object(report));
                all_users.extend(users);
            }
            Err(message) => {
                poll_warn!("Skipping {}: {}", name, message);
                reports.push(json!({ "file": name, "error": message }));
            }
        }
    }

    if all_users.is_empty() {
        return Err(StatsCmdError::NoUsers);
    }
    poll_info!(
        "Analyzed {} users from {} files in {:?}",
        all_users.len(),
        files.len(),
        dir
    );

    let mut results = stats::summarize(&all_users);
    results.insert("files_analyzed".into(), json!(files.len()));
    results.insert("files".into(), Value::Array(reports));
    Ok(results)
}

fn read_users(path: &Path) -> Result<Vec<User>, String> {
    let bytes = fs::read(path).map_err(|err| err.to_string())?;
    stats::parse_users(&String::from_utf8_lossy(&bytes)).map_err(|err| err.to_string())
}

/// `*.json` files directly under `dir`, sorted by name.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, StatsCmdError> {
    let read_err = |source| StatsCmdError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn combines_users_across_files_and_reports_each_file() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "response_20240101_000001_aaaaaaaa.json",
            r#"[{"name": "A", "age": 20, "friends": [{"hobbies": ["chess"]}]}]"#,
        );
        write(
            temp.path(),
            "response_20240101_000002_bbbbbbbb.json",
            "{\"name\": \"B\", \"age\": 40, \"friends\": [{\"hobbies\": [\"chess\"]}, {\"hobbies\": []}]}\n",
        );
        write(temp.path(), "response_20240101_000003_cccccccc.json", "Bad Gateway");
        write(temp.path(), "notes.txt", "{\"name\": \"ignored\", \"age\": 99}");

        let results = analyze_dir(temp.path()).unwrap();
        assert_eq!(results["files_analyzed"], json!(3));
        assert_eq!(results["average_age"], json!(30.0));
        assert_eq!(results["most_common_hobby"], json!("chess"));
        assert_eq!(results["users_with_most_friends"], json!(1));
        assert_eq!(results["max_friends_count"], json!(2));

        let files = results["files"].as_array().unwrap();
        assert_eq!(files[0]["file"], json!("response_20240101_000001_aaaaaaaa.json"));
        assert_eq!(files[0]["average_age"], json!(20.0));
        assert_eq!(
            files[2],
            json!({
                "file": "response_20240101_000003_cccccccc.json",
                "error": "No valid JSON objects found in input",
            })
        );
    }

    #[test]
    fn empty_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = analyze_dir(temp.path()).unwrap_err();
        assert!(matches!(err, StatsCmdError::NoFiles(_)));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = analyze_dir(&temp.path().join("absent")).unwrap_err();
        assert!(matches!(err, StatsCmdError::ReadDir { .. }));
    }

    #[test]
    fn files_without_users_are_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "response_a.json", "<html></html>");
        let err = analyze_dir(temp.path()).unwrap_err();
        assert!(matches!(err, StatsCmdError::NoUsers));
    }

    #[test]
    fn exit_code_reflects_outcome() {
        let temp = TempDir::new().unwrap();
        assert_eq!(execute(temp.path()), ExitCode::FAILURE);
        write(temp.path(), "response_a.json", r#"{"age": 1}"#);
        assert_eq!(execute(temp.path()), ExitCode::SUCCESS);
    }
}
