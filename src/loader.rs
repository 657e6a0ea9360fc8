//! This module provides the `RuleLoader` struct, responsible for loading rule sets from files
//! and strings.
//!
//! Two file formats are understood: the line-oriented `.rules` text format handled by
//! [`crate::parser`], and `.json` files holding the rules as stored by the web front end,
//! either as a bare array or as an object with a `challenge` name and a `rules` array.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::parser::{parse, Solution};
use crate::rules::RuleSet;
use crate::types::PuzzleError;

/// The JSON shapes accepted for rule files.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSolution {
    Rules(RuleSet),
    Tagged {
        #[serde(default)]
        challenge: Option<String>,
        rules: RuleSet,
    },
}

impl From<JsonSolution> for Solution {
    fn from(json: JsonSolution) -> Self {
        match json {
            JsonSolution::Rules(rules) => Solution {
                challenge: None,
                rules,
            },
            JsonSolution::Tagged { challenge, rules } => Solution { challenge, rules },
        }
    }
}

/// `RuleLoader` is a utility struct for loading rule sets.
pub struct RuleLoader;

impl RuleLoader {
    /// Loads a single rule file from the specified path. Files with a `.json` extension are
    /// read as JSON; anything else is read as the text format.
    ///
    /// # Returns
    ///
    /// * `Ok(Solution)` if the file is successfully read and parsed.
    /// * `Err(PuzzleError::FileError)` if the file cannot be read or its JSON is invalid.
    /// * `Err(PuzzleError::ParseError)` if the text content is not a valid rule file.
    pub fn load(path: &Path) -> Result<Solution, PuzzleError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PuzzleError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if is_json(path) {
            Self::load_from_json(&content).map_err(|e| {
                PuzzleError::FileError(format!("Invalid JSON in {}: {}", path.display(), e))
            })
        } else {
            Self::load_from_string(&content)
        }
    }

    /// Loads a solution from text in the rule file format.
    pub fn load_from_string(content: &str) -> Result<Solution, PuzzleError> {
        parse(content)
    }

    /// Loads a solution from JSON.
    pub fn load_from_json(content: &str) -> Result<Solution, serde_json::Error> {
        serde_json::from_str::<JsonSolution>(content).map(Solution::from)
    }

    /// Loads every rule file (`.rules` or `.json`) in `directory`, in path order.
    ///
    /// Directories and other files are skipped. Each element of the result is either the
    /// loaded solution with its path, or the error encountered while loading it.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Solution), PuzzleError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(PuzzleError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(PuzzleError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.retain(|path| path.is_file() && (is_json(path) || has_extension(path, "rules")));
        paths.sort();

        results.extend(paths.into_iter().map(|path| match Self::load(&path) {
            Ok(solution) => Ok((path, solution)),
            Err(e) => Err(PuzzleError::FileError(format!(
                "Failed to load rules from {}: {}",
                path.display(),
                e
            ))),
        }));

        results
    }
}

fn is_json(path: &Path) -> bool {
    has_extension(path, "json")
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map_or(false, |ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Rule, BLANK};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_text_file() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "start.rules",
            "challenge: Getting Started\nq0, _ -> q0, 1, R\n",
        );

        let solution = RuleLoader::load(&path).unwrap();
        assert_eq!(solution.challenge.as_deref(), Some("Getting Started"));
        assert_eq!(
            solution.rules.as_slice(),
            &[Rule::new(0, BLANK, 0, "1", Direction::Right)]
        );
    }

    #[test]
    fn test_load_json_array() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "start.json",
            r#"[{"state":0,"read":"_","newState":0,"write":"1","direction":"right"}]"#,
        );

        let solution = RuleLoader::load(&path).unwrap();
        assert_eq!(solution.challenge, None);
        assert_eq!(solution.rules.len(), 1);
        assert_eq!(solution.rules.get(0, BLANK).unwrap().write, "1");
    }

    #[test]
    fn test_load_json_object() {
        let json = r#"{
            "challenge": "Deletion",
            "rules": [{"state":0,"read":"🥝","newState":0,"write":"🥥","direction":"left"}]
        }"#;

        let solution = RuleLoader::load_from_json(json).unwrap();
        assert_eq!(solution.challenge.as_deref(), Some("Deletion"));
        assert_eq!(solution.rules.get(0, "🥝").unwrap().direction, Direction::Left);
    }

    #[test]
    fn test_load_invalid_files() {
        let dir = tempdir().unwrap();
        let text = write_file(dir.path(), "invalid.rules", "This is not a rule file");
        let json = write_file(dir.path(), "invalid.json", "{\"rules\": 3}");

        assert!(matches!(
            RuleLoader::load(&text),
            Err(PuzzleError::ParseError(_))
        ));
        assert!(matches!(
            RuleLoader::load(&json),
            Err(PuzzleError::FileError(_))
        ));
        assert!(matches!(
            RuleLoader::load(&dir.path().join("missing.rules")),
            Err(PuzzleError::FileError(_))
        ));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "b.rules", "q0, _ -> q0, 1, R");
        write_file(dir.path(), "a.json", "[]");
        write_file(dir.path(), "c.rules", "not valid");
        write_file(dir.path(), "ignored.txt", "This file should be ignored");
        fs::create_dir(dir.path().join("nested.rules")).unwrap();

        let results = RuleLoader::load_dir(dir.path());
        assert_eq!(results.len(), 3);

        let (first, _) = results[0].as_ref().unwrap();
        assert!(first.ends_with("a.json"));
        let (second, solution) = results[1].as_ref().unwrap();
        assert!(second.ends_with("b.rules"));
        assert_eq!(solution.rules.len(), 1);
        assert!(results[2].is_err());
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempdir().unwrap();
        let results = RuleLoader::load_dir(&dir.path().join("missing"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
