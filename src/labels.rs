use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Split a names file into wheel labels: one per line, trimmed, blanks dropped.
pub fn parse_labels(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read labels from `path`. A missing or blank file is reported with a hint
/// instead of reaching the planner.
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::LabelsMissing(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let labels = parse_labels(&text);
    if labels.is_empty() {
        return Err(Error::LabelsEmpty(path.to_path_buf()));
    }
    log::info!("Loaded {} labels from {}", labels.len(), path.display());
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let labels = parse_labels("  alice \n\n\tbob\r\n   \ncarol");
        assert_eq!(labels, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        assert_eq!(parse_labels("\u{feff}dave\neve\n"), vec!["dave", "eve"]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        assert_eq!(parse_labels("b\na\nb\n"), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_load_missing_file_is_reported() {
        let path = std::env::temp_dir().join("spinwheel-test-does-not-exist.txt");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(load_labels(&path), Err(Error::LabelsMissing(_))));
    }

    #[test]
    fn test_load_blank_file_is_reported() {
        let path = std::env::temp_dir().join(format!("spinwheel-blank-{}.txt", std::process::id()));
        std::fs::write(&path, "\n   \n").unwrap();
        let result = load_labels(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::LabelsEmpty(_))));
    }

    #[test]
    fn test_load_reads_names() {
        let path = std::env::temp_dir().join(format!("spinwheel-names-{}.txt", std::process::id()));
        std::fs::write(&path, "ann\nben\n").unwrap();
        let result = load_labels(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(result.unwrap(), vec!["ann", "ben"]);
    }
}
