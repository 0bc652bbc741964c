use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::tagger::TrackWriter;
use crate::error::{Error, Result};
use crate::models::Outcome;

/// What a batch does when one file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the batch on the first error.
    #[default]
    FailFast,
    /// Record the error and go on with the next file.
    Continue,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub failures: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Written(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.written()
    }
}

/// Write every direct file of a directory, or a single file.
///
/// Directory entries are taken in the order the file system reports them;
/// sub-directories are not descended into. `on_item` sees every result
/// before the policy decides whether to stop.
pub fn process_path<W, F>(
    input: &Path,
    output_dir: &Path,
    writer: &mut W,
    policy: FailurePolicy,
    mut on_item: F,
) -> Result<BatchReport>
where
    W: TrackWriter + ?Sized,
    F: FnMut(&Path, &Result<Outcome>),
{
    let mut report = BatchReport::default();

    if !input.is_dir() {
        process_one(input, output_dir, writer, policy, &mut on_item, &mut report)?;
        return Ok(report);
    }

    for entry in std::fs::read_dir(input).map_err(|e| Error::file(input, e))? {
        let path = entry.map_err(|e| Error::file(input, e))?.path();
        if path.is_dir() {
            tracing::debug!("skipping directory {}", path.display());
            continue;
        }
        process_one(&path, output_dir, writer, policy, &mut on_item, &mut report)?;
    }

    Ok(report)
}

fn process_one<W, F>(
    path: &Path,
    output_dir: &Path,
    writer: &mut W,
    policy: FailurePolicy,
    on_item: &mut F,
    report: &mut BatchReport,
) -> Result<()>
where
    W: TrackWriter + ?Sized,
    F: FnMut(&Path, &Result<Outcome>),
{
    let result = writer.write(path, output_dir);
    on_item(path, &result);

    match result {
        Ok(outcome) => report.outcomes.push(outcome),
        Err(e) if policy == FailurePolicy::Continue => {
            tracing::warn!("{}: {e}", path.display());
            report.failures.push((path.to_path_buf(), e));
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Writes files named after a number, fails on anything else.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<PathBuf>,
    }

    impl TrackWriter for Recorder {
        fn write(&mut self, input: &Path, output_dir: &Path) -> Result<Outcome> {
            self.seen.push(input.to_path_buf());
            let id = crate::core::parser::parse_track_id(input)?;
            Ok(Outcome::Written(output_dir.join(format!("{id}.m4a"))))
        }
    }

    fn input_dir(names: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in names {
            std::fs::write(temp.path().join(name), b"x").unwrap();
        }
        temp
    }

    #[test]
    fn test_single_file() {
        let temp = input_dir(&["12"]);
        let mut writer = Recorder::default();

        let report = process_path(
            &temp.path().join("12"),
            Path::new("out"),
            &mut writer,
            FailurePolicy::FailFast,
            |_, _| {},
        )
        .unwrap();

        assert_eq!(report.written(), 1);
        assert_eq!(writer.seen, vec![temp.path().join("12")]);
    }

    #[test]
    fn test_directory_is_not_recursive() {
        let temp = input_dir(&["1", "2", "3"]);
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested").join("4"), b"x").unwrap();
        let mut writer = Recorder::default();
        let mut reported = 0;

        let report = process_path(
            temp.path(),
            Path::new("out"),
            &mut writer,
            FailurePolicy::FailFast,
            |_, _| reported += 1,
        )
        .unwrap();

        assert_eq!(report.written(), 3);
        assert_eq!(reported, 3);
        assert!(writer.seen.iter().all(|p| p.parent() == Some(temp.path())));
    }

    #[test]
    fn test_fail_fast_stops_batch() {
        let temp = input_dir(&["bad"]);
        let mut writer = Recorder::default();
        let mut errors = 0;

        let result = process_path(
            temp.path(),
            Path::new("out"),
            &mut writer,
            FailurePolicy::FailFast,
            |_, r| {
                if r.is_err() {
                    errors += 1;
                }
            },
        );

        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_continue_collects_failures() {
        let temp = input_dir(&["1", "bad", "2", "worse"]);
        let mut writer = Recorder::default();

        let report = process_path(
            temp.path(),
            Path::new("out"),
            &mut writer,
            FailurePolicy::Continue,
            |_, _| {},
        )
        .unwrap();

        assert_eq!(writer.seen.len(), 4);
        assert_eq!(report.written(), 2);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|(_, e)| matches!(e, Error::InvalidInput { .. })));
    }

    #[test]
    fn test_skipped_count() {
        let report = BatchReport {
            outcomes: vec![
                Outcome::Written(PathBuf::from("a.m4a")),
                Outcome::Skipped(PathBuf::from("b.m4a")),
            ],
            failures: Vec::new(),
        };
        assert_eq!(report.written(), 1);
        assert_eq!(report.skipped(), 1);
    }
}
