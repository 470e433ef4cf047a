//! Statistics over saved user-list responses.
//!
//! A response body is expected to hold user objects, either as one JSON array
//! or as a stream of objects (one per line, possibly with HTTP header lines
//! mixed in). Objects look like
//! `{"name": .., "age": .., "friends": [{"name": .., "hobbies": [..]}]}`.
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// One parsed user object.
pub type User = Map<String, Value>;

const MAX_LINES: usize = 10_000;
const MAX_OBJECTS: usize = 1_000;
const HEADER_PREFIXES: [&str; 6] = [
    "HTTP/",
    "Server:",
    "Date:",
    "Content-Type:",
    "Content-Length:",
    "Connection:",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("No valid JSON objects found in input")]
    NoObjects,
    #[error("No users provided")]
    NoUsers,
    #[error("No hobbies found in user data")]
    NoHobbies,
    #[error("No users with friends found")]
    NoFriends,
}

/// Extract user objects from a response body.
///
/// A top-level array of objects is taken as-is. Anything else is scanned for
/// balanced `{...}` spans; spans that do not parse are skipped.
pub fn parse_users(text: &str) -> Result<Vec<User>, StatsError> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        let users: Vec<User> = items.into_iter().filter_map(into_object).collect();
        if !users.is_empty() {
            return Ok(users);
        }
    }

    let mut scanner = ObjectScanner::default();
    for line in text.lines().take(MAX_LINES) {
        if scanner.is_full() {
            break;
        }
        if line.trim().is_empty() || HEADER_PREFIXES.iter().any(|p| line.starts_with(p)) {
            continue;
        }
        for c in line.chars() {
            scanner.push(c);
            if scanner.is_full() {
                break;
            }
        }
    }

    let users = scanner.finish();
    if users.is_empty() {
        Err(StatsError::NoObjects)
    } else {
        Ok(users)
    }
}

fn into_object(value: Value) -> Option<User> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Tracks brace depth outside string literals and parses each span that
/// closes back to depth zero.
#[derive(Default)]
struct ObjectScanner {
    buffer: String,
    depth: i64,
    in_string: bool,
    escaped: bool,
    users: Vec<User>,
}

impl ObjectScanner {
    fn is_full(&self) -> bool {
        self.users.len() >= MAX_OBJECTS
    }

    fn push(&mut self, c: char) {
        self.buffer.push(c);
        if self.escaped {
            self.escaped = false;
            return;
        }
        match c {
            '\\' => {
                self.escaped = true;
                return;
            }
            '"' => self.in_string = !self.in_string,
            '{' if !self.in_string => self.depth += 1,
            '}' if !self.in_string => self.depth -= 1,
            _ => {}
        }
        if self.in_string {
            return;
        }
        if self.depth < 0 {
            // Stray closing brace.
            self.buffer.clear();
            self.depth = 0;
        } else if self.depth == 0 {
            self.complete();
        }
    }

    fn complete(&mut self) {
        let parsed = serde_json::from_str::<Value>(&self.buffer)
            .ok()
            .and_then(into_object);
        self.buffer.clear();
        if let Some(user) = parsed {
            if !self.is_full() {
                self.users.push(user);
            }
        }
    }

    fn finish(mut self) -> Vec<User> {
        if !self.buffer.trim().is_empty() {
            self.complete();
        }
        self.users
    }
}

/// Mean of the numeric `age` fields; 0.0 when no user has one.
pub fn average_age(users: &[User]) -> Result<f64, StatsError> {
    if users.is_empty() {
        return Err(StatsError::NoUsers);
    }
    let ages: Vec<f64> = users
        .iter()
        .filter_map(|user| user.get("age").and_then(Value::as_f64))
        .collect();
    if ages.is_empty() {
        return Ok(0.0);
    }
    Ok(ages.iter().sum::<f64>() / ages.len() as f64)
}

/// Most frequent hobby among all users' friends. Ties go to the
/// alphabetically first hobby.
pub fn most_common_hobby(users: &[User]) -> Result<String, StatsError> {
    if users.is_empty() {
        return Err(StatsError::NoUsers);
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for friend in users.iter().flat_map(friends) {
        let hobbies = friend
            .get("hobbies")
            .and_then(Value::as_array)
            .into_iter()
            .flatten();
        for hobby in hobbies.filter_map(Value::as_str) {
            *counts.entry(hobby).or_default() += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (hobby, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((hobby, count));
        }
    }
    best.map(|(hobby, _)| hobby.to_string())
        .ok_or(StatsError::NoHobbies)
}

/// Users sharing the largest `friends` list.
pub fn users_with_most_friends(users: &[User]) -> Result<Vec<&User>, StatsError> {
    if users.is_empty() {
        return Err(StatsError::NoUsers);
    }
    let max = users.iter().map(friend_count).max().unwrap_or(0);
    if max == 0 {
        return Err(StatsError::NoFriends);
    }
    Ok(users.iter().filter(|user| friend_count(user) == max).collect())
}

fn friends(user: &User) -> impl Iterator<Item = &Value> {
    user.get("friends")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn friend_count(user: &User) -> usize {
    user.get("friends")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// All three statistics as a JSON object. A statistic that cannot be computed
/// is reported under a `*_error` key instead.
pub fn summarize(users: &[User]) -> Map<String, Value> {
    let mut results = Map::new();

    match average_age(users) {
        Ok(avg) => results.insert("average_age".into(), json!(avg)),
        Err(err) => results.insert("average_age_error".into(), json!(err.to_string())),
    };

    match most_common_hobby(users) {
        Ok(hobby) if hobby.is_empty() => results.insert("most_common_hobby".into(), json!("none")),
        Ok(hobby) => results.insert("most_common_hobby".into(), json!(hobby)),
        Err(err) => results.insert("most_common_hobby_error".into(), json!(err.to_string())),
    };

    match users_with_most_friends(users) {
        Ok(top) => {
            results.insert("users_with_most_friends".into(), json!(top.len()));
            let count = top.first().map_or(0, |user| friend_count(user));
            results.insert("max_friends_count".into(), json!(count));
        }
        Err(err) => {
            results.insert("most_friends_error".into(), json!(err.to_string()));
        }
    }

    results
}

/// `{"error": false, "results": ...}`
pub fn success_report(results: Map<String, Value>) -> Value {
    json!({ "error": false, "results": results })
}

/// `{"error": true, "message": ..., "details": ...}`; `details` is omitted
/// when empty.
pub fn error_report(message: &str, details: &str) -> Value {
    let mut report = json!({ "error": true, "message": message });
    if !details.is_empty() {
        report["details"] = json!(details);
    }
    report
}

/// Pretty-print with four-space indentation.
pub fn to_pretty(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(value: Value) -> User {
        into_object(value).unwrap()
    }

    #[test]
    fn average_ignores_non_numeric_ages() {
        let users = vec![
            user(json!({"age": 20})),
            user(json!({"age": "old"})),
            user(json!({"age": 31.0})),
        ];
        assert_eq!(average_age(&users).unwrap(), 25.5);
    }

    #[test]
    fn average_without_ages_is_zero() {
        assert_eq!(average_age(&[user(json!({"name": "x"}))]).unwrap(), 0.0);
        assert_eq!(average_age(&[]), Err(StatsError::NoUsers));
    }

    #[test]
    fn hobby_tie_goes_to_first_alphabetically() {
        let users = vec![user(json!({
            "friends": [{"hobbies": ["yoga", "chess"]}, {"hobbies": ["chess", "yoga", 7]}]
        }))];
        assert_eq!(most_common_hobby(&users).unwrap(), "chess");
    }

    #[test]
    fn friendless_users_report_errors_in_summary() {
        let results = summarize(&[user(json!({"age": 40, "friends": []}))]);
        assert_eq!(results["average_age"], json!(40.0));
        assert_eq!(
            results["most_common_hobby_error"],
            json!("No hobbies found in user data")
        );
        assert_eq!(results["most_friends_error"], json!("No users with friends found"));
        assert!(!results.contains_key("users_with_most_friends"));
    }

    #[test]
    fn error_report_omits_empty_details() {
        assert_eq!(
            error_report("Invalid arguments", ""),
            json!({"error": true, "message": "Invalid arguments"})
        );
    }

    #[test]
    fn pretty_output_uses_four_space_indent() {
        let text = to_pretty(&json!({"error": false}));
        assert_eq!(text, "{\n    \"error\": false\n}");
    }
}
