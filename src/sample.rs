//! Bounded sampling of non-empty lines from the raw corpus file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::config::SampleConfig;
use crate::error::{DbpeError, Result};

/// Scans `source` line by line and collects lines that are non-empty after trimming.
///
/// Scanning stops after `cfg.max_lines` source lines (blank lines count), and
/// collection stops once `cfg.sample_size` lines are held. Source order is
/// preserved and lines are never split or merged; the returned lines are
/// trimmed.
pub fn sample_lines<P: AsRef<Path>>(source: P, cfg: &SampleConfig) -> Result<Vec<String>> {
    let path = source.as_ref();
    let file = File::open(path).map_err(|err| DbpeError::io(err, Some(path.to_path_buf())))?;
    let reader = BufReader::new(file);

    let mut collected = Vec::with_capacity(cfg.sample_size.unwrap_or(0).min(16_384));
    let mut scanned = 0usize;
    let mut lines = reader.lines();
    loop {
        if cfg.max_lines.is_some_and(|limit| scanned >= limit) {
            break;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|err| DbpeError::io(err, Some(path.to_path_buf())))?;
        scanned += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        collected.push(trimmed.to_string());
        if cfg.sample_size.is_some_and(|limit| collected.len() >= limit) {
            break;
        }
    }

    debug!(
        "sampled {} lines from the first {scanned} lines of {}",
        collected.len(),
        path.display()
    );
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_corpus(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("corpus.txt");
        fs::write(&path, lines.join("\n")).expect("write corpus");
        (dir, path)
    }

    #[test]
    fn collects_all_non_empty_lines_without_limits() {
        let (_dir, path) = write_corpus(&["एक", "", "दो", "   ", "तीन"]);
        let sampled = sample_lines(&path, &SampleConfig::default()).expect("sample");
        assert_eq!(sampled, vec!["एक", "दो", "तीन"]);
    }

    #[test]
    fn sample_size_caps_the_result() {
        let (_dir, path) = write_corpus(&["एक", "", "दो", "तीन", "चार"]);
        let cfg = SampleConfig {
            sample_size: Some(3),
            max_lines: Some(10),
        };
        let sampled = sample_lines(&path, &cfg).expect("sample");
        assert_eq!(sampled, vec!["एक", "दो", "तीन"]);
    }

    #[test]
    fn max_lines_bounds_the_scan() {
        let (_dir, path) = write_corpus(&["", "एक", "", "दो", "तीन"]);
        let cfg = SampleConfig {
            sample_size: Some(10),
            max_lines: Some(3),
        };
        let sampled = sample_lines(&path, &cfg).expect("sample");
        // Only the first three source lines are scanned, blank lines included.
        assert_eq!(sampled, vec!["एक"]);
    }

    #[test]
    fn fewer_matches_than_requested_is_fine() {
        let (_dir, path) = write_corpus(&["", "एक", ""]);
        let cfg = SampleConfig {
            sample_size: Some(5),
            max_lines: None,
        };
        let sampled = sample_lines(&path, &cfg).expect("sample");
        assert_eq!(sampled, vec!["एक"]);
    }

    #[test]
    fn returned_lines_are_trimmed() {
        let (_dir, path) = write_corpus(&["  एक  "]);
        let sampled = sample_lines(&path, &SampleConfig::default()).expect("sample");
        assert_eq!(sampled, vec!["एक"]);
    }

    #[test]
    fn missing_source_reports_the_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("absent.txt");
        let err = sample_lines(&path, &SampleConfig::default()).expect_err("should fail");
        assert!(matches!(err, DbpeError::Io { path: Some(p), .. } if p == path));
    }
}
