//! JSONL test-suite loading.

use std::path::Path;

use crate::error::SuiteError;
use crate::types::TestCase;

/// Read one [`TestCase`] per non-blank line.
///
/// Fails on the first unreadable line, naming its 1-based number.
pub async fn load_test_suite(path: impl AsRef<Path>) -> Result<Vec<TestCase>, SuiteError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SuiteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    parse_test_suite(path, &content)
}

pub(crate) fn parse_test_suite(path: &Path, content: &str) -> Result<Vec<TestCase>, SuiteError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| SuiteError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_loads_cases_skipping_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"question": "Were Scott Derrickson and Ed Wood of the same nationality?", "answer": "yes", "level": "hard"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"question": "Q2", "answer": "A2"}}"#).unwrap();

        let cases = load_test_suite(file.path()).await.unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].ideal_answer, "yes");
        assert_eq!(cases[1], TestCase::new("Q2", "A2"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_test_suite("/definitely/not/here.jsonl").await.unwrap_err();
        assert!(matches!(err, SuiteError::Io { .. }));
    }

    #[test]
    fn test_bad_line_is_named() {
        let content = "{\"question\": \"q\", \"answer\": \"a\"}\n\n{\"question\": \"no answer\"}\n";
        let err = parse_test_suite(Path::new("suite.jsonl"), content).unwrap_err();
        match err {
            SuiteError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
