//! Outcome of commands working through many files

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use miette::{miette, Result};
use owo_colors::OwoColorize;
use tracing::warn;

/// Per file results of a batch, one failure never stops the others
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn new() -> Self {
        BatchReport::default()
    }

    /// Count a result, keeping the reason of a failure
    pub fn record<T, E: Display>(&mut self, path: &Path, result: std::result::Result<T, E>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(error) => {
                warn!("{}: {error}", path.display());
                self.failures.push((path.to_path_buf(), error.to_string()));
            }
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Print the summary, then fail when any item failed
    pub fn finish(self) -> Result<()> {
        println!("{self}");
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(miette!("{} of {} files failed", self.failed(), self.succeeded + self.failed()))
        }
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed",
            self.succeeded.green(),
            self.failed().red()
        )?;
        for (path, reason) in &self.failures {
            write!(f, "\n❌ {}: {reason}", path.display().red())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::BatchReport;

    #[test]
    fn failures_are_collected() {
        let mut report = BatchReport::new();
        report.record(Path::new("a.bin"), Ok::<_, String>(()));
        report.record(Path::new("b.bin"), Err::<(), _>("bad signature"));
        report.record(Path::new("c.bin"), Ok::<_, String>(()));

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].1, "bad signature");
        assert!(report.finish().is_err());
        assert!(BatchReport::new().finish().is_ok());
    }
}
