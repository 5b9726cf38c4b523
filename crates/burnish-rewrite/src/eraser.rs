//! Multi-file span erasure with all-or-nothing rollback.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use tracing::debug;

use burnish_span::{FileId, Span};

use crate::error::RewriteError;
use crate::transaction::EditTransaction;

/// A speculative whiteout of a batch of spans, possibly across many files.
///
/// The eraser groups spans by file, opens one [`EditTransaction`] per
/// distinct file, and stages a whiteout for every span. The batch is the
/// unit of atomicity the removal algorithm relies on: after a failed
/// verification, [`restore_all`](Self::restore_all) returns every touched
/// file to its pre-transaction bytes.
#[derive(Debug)]
pub struct SpanEraser {
    transactions: Vec<EditTransaction>,
}

impl SpanEraser {
    /// Opens transactions for the given spans and stages their whiteouts.
    ///
    /// `resolve` maps a span's file id to the on-disk path of that file.
    /// Spans are grouped so each distinct file is opened exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when a file cannot be read, or
    /// [`RewriteError::SpanOutOfBounds`] when a span does not fit its
    /// file's current content. Nothing has been written to disk when this
    /// fails.
    pub fn open(
        spans: &[Span],
        resolve: impl Fn(FileId) -> Utf8PathBuf,
    ) -> Result<Self, RewriteError> {
        let mut by_file: BTreeMap<usize, Vec<Span>> = BTreeMap::new();
        for span in spans {
            by_file.entry(span.file.index()).or_default().push(*span);
        }

        let mut transactions = Vec::with_capacity(by_file.len());
        for (file, file_spans) in by_file {
            let mut tx = EditTransaction::open(resolve(FileId(file)))?;
            for span in file_spans {
                tx.stage_erase(span.lo, span.hi)?;
            }
            transactions.push(tx);
        }

        debug!(
            spans = spans.len(),
            files = transactions.len(),
            "span eraser staged"
        );
        Ok(Self { transactions })
    }

    /// Number of distinct files touched by this eraser.
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.transactions.len()
    }

    /// Writes every staged whiteout to disk.
    ///
    /// Returns true when at least one file changed on disk.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] on the first file that cannot be
    /// written. Files flushed before the failure stay modified; callers
    /// treat I/O errors as fatal to the run, so no partial-flush recovery
    /// is attempted.
    pub fn flush_all(&mut self) -> Result<bool, RewriteError> {
        let mut any = false;
        for tx in &mut self.transactions {
            any = tx.flush()? || any;
        }
        Ok(any)
    }

    /// Restores every touched file to its pre-transaction content.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] on the first file that cannot be
    /// written back.
    pub fn restore_all(self) -> Result<(), RewriteError> {
        for tx in self.transactions {
            tx.restore()?;
        }
        Ok(())
    }

    /// Closes the eraser, keeping every staged whiteout.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when a pending write fails.
    pub fn commit_all(self) -> Result<(), RewriteError> {
        for tx in self.transactions {
            tx.commit()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use burnish_span::FileId;

    use super::*;

    struct Project {
        _dir: TempDir,
        files: Vec<Utf8PathBuf>,
    }

    fn project(contents: &[&str]) -> Project {
        let dir = TempDir::new().expect("create temp dir");
        let files = contents
            .iter()
            .enumerate()
            .map(|(idx, content)| {
                let path = Utf8PathBuf::from_path_buf(dir.path().join(format!("f{idx}.rs")))
                    .expect("temp path is UTF-8");
                fs::write(&path, content).expect("write fixture");
                path
            })
            .collect();
        Project { _dir: dir, files }
    }

    fn span(file: usize, lo: usize, hi: usize) -> Span {
        Span::new(FileId(file), lo, hi).expect("valid span")
    }

    #[test]
    fn erases_spans_across_files() {
        let project = project(&["unsafe fn a() {}", "pub unsafe fn b() {}"]);
        let resolve = |id: FileId| project.files[id.index()].clone();

        let mut eraser =
            SpanEraser::open(&[span(0, 0, 6), span(1, 4, 10)], resolve).expect("open");
        assert_eq!(eraser.file_count(), 2);
        assert!(eraser.flush_all().expect("flush"));
        eraser.commit_all().expect("commit");

        assert_eq!(
            fs::read_to_string(&project.files[0]).expect("read"),
            "       fn a() {}"
        );
        assert_eq!(
            fs::read_to_string(&project.files[1]).expect("read"),
            "pub        fn b() {}"
        );
    }

    #[test]
    fn groups_spans_within_one_file() {
        let project = project(&["unsafe fn a() {}\nunsafe fn b() {}\n"]);
        let resolve = |id: FileId| project.files[id.index()].clone();

        let mut eraser =
            SpanEraser::open(&[span(0, 0, 6), span(0, 17, 23)], resolve).expect("open");
        assert_eq!(eraser.file_count(), 1);
        assert!(eraser.flush_all().expect("flush"));
        eraser.commit_all().expect("commit");

        assert_eq!(
            fs::read_to_string(&project.files[0]).expect("read"),
            "       fn a() {}\n       fn b() {}\n"
        );
    }

    #[test]
    fn restore_all_is_byte_exact_across_files() {
        let originals = ["unsafe fn a() {}", "pub unsafe fn b() {}"];
        let project = project(&originals);
        let resolve = |id: FileId| project.files[id.index()].clone();

        let mut eraser =
            SpanEraser::open(&[span(0, 0, 6), span(1, 4, 10)], resolve).expect("open");
        assert!(eraser.flush_all().expect("flush"));
        eraser.restore_all().expect("restore");

        for (path, original) in project.files.iter().zip(originals) {
            assert_eq!(fs::read_to_string(path).expect("read"), original);
        }
    }

    #[test]
    fn stale_span_fails_before_any_write() {
        let project = project(&["tiny"]);
        let resolve = |id: FileId| project.files[id.index()].clone();

        let result = SpanEraser::open(&[span(0, 0, 400)], resolve);
        assert!(matches!(result, Err(RewriteError::SpanOutOfBounds { .. })));
        assert_eq!(fs::read_to_string(&project.files[0]).expect("read"), "tiny");
    }

    #[test]
    fn empty_batch_flushes_nothing() {
        let project = project(&["content"]);
        let resolve = |id: FileId| project.files[id.index()].clone();
        let mut eraser = SpanEraser::open(&[], resolve).expect("open");
        assert_eq!(eraser.file_count(), 0);
        assert!(!eraser.flush_all().expect("flush"));
        eraser.commit_all().expect("commit");
    }
}
