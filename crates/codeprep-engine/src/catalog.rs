use std::path::Path;

use codeprep_core::{Problem, ProblemError};

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid problem {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ProblemError,
    },
}

/// Reads one problem file and checks the shape of its test cases.
pub fn load_problem(path: &Path) -> Result<Problem, LoaderError> {
    let content = std::fs::read_to_string(path)?;
    let problem: Problem = serde_json::from_str(&content)?;
    problem.validate().map_err(|source| LoaderError::Invalid {
        id: problem.id.clone(),
        source,
    })?;
    Ok(problem)
}

/// Every `*.json` problem in `dir`, sorted by id. Files that fail to load
/// are skipped.
pub fn load_catalog(dir: &Path) -> Result<Vec<Problem>, LoaderError> {
    let mut problems = Vec::new();
    let entries = std::fs::read_dir(dir)?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match load_problem(&path) {
                Ok(problem) => problems.push(problem),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping problem"),
            }
        }
    }

    problems.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(problems)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "id": "reverse",
        "title": "Reverse String",
        "description": "Reverse s.",
        "starter": "function reverse(s) {}",
        "test_cases": [{"input": "abc", "expected": "cba"}]
    }"#;

    #[test]
    fn test_load_catalog_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("reverse.json"), VALID).unwrap();
        std::fs::write(
            dir.path().join("broken.json"),
            VALID.replace(r#""expected": "cba""#, r#""expected": [1, "x"]"#),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let problems = load_catalog(dir.path()).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].id, "reverse");
        assert_eq!(problems[0].visible_cases, 3);
    }

    #[test]
    fn test_load_problem_reports_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.json");
        std::fs::write(&path, VALID.replace(r#""input": "abc""#, r#""input": [[[[1]]]]"#)).unwrap();
        assert!(matches!(load_problem(&path), Err(LoaderError::Invalid { .. })));
    }
}
