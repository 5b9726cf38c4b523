//! Single-file speculative edit transactions.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::RewriteError;

/// Fill byte used to whiteout erased spans.
const FILLER: char = ' ';

/// A speculative rewrite of one file.
///
/// Opening the transaction captures the file's original content. Transforms
/// are staged in memory and written out with [`flush`](Self::flush); the
/// transaction then closes through exactly one of the consuming
/// [`commit`](Self::commit) or [`restore`](Self::restore) operations, so no
/// further staging is possible once a verdict has been applied.
#[derive(Debug)]
pub struct EditTransaction {
    path: Utf8PathBuf,
    original: String,
    staged: String,
    /// What the transaction last wrote (or found) on disk.
    on_disk: String,
}

impl EditTransaction {
    /// Opens a transaction, capturing the file's current content.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the file cannot be read.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, RewriteError> {
        let path = path.into();
        let original =
            fs::read_to_string(&path).map_err(|source| RewriteError::io(path.clone(), source))?;
        Ok(Self {
            staged: original.clone(),
            on_disk: original.clone(),
            original,
            path,
        })
    }

    /// Path of the file under transaction.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Content captured when the transaction opened.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Currently staged content.
    #[must_use]
    pub fn staged(&self) -> &str {
        &self.staged
    }

    /// Stages a transform of the current content.
    ///
    /// Transforms compose: each invocation sees the output of the previous
    /// one. Burnish edits are whiteouts, so the transform must preserve
    /// content length; that is what keeps every other span of the file
    /// valid.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::LengthChanged`] when the transform altered
    /// the content length.
    pub fn stage_via(
        &mut self,
        transform: impl FnOnce(&str) -> String,
    ) -> Result<(), RewriteError> {
        let next = transform(&self.staged);
        if next.len() != self.staged.len() {
            return Err(RewriteError::LengthChanged {
                path: self.path.clone(),
                before: self.staged.len(),
                after: next.len(),
            });
        }
        self.staged = next;
        Ok(())
    }

    /// Stages a whiteout of the byte range `[lo, hi)`.
    ///
    /// The range's text is replaced with an equal number of fill bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::SpanOutOfBounds`] when the range falls
    /// outside the staged content or splits a UTF-8 character.
    pub fn stage_erase(&mut self, lo: usize, hi: usize) -> Result<(), RewriteError> {
        let out_of_bounds = || RewriteError::SpanOutOfBounds {
            path: self.path.clone(),
            lo,
            hi,
            len: self.staged.len(),
        };
        if lo >= hi {
            return Err(out_of_bounds());
        }
        let (prefix, rest) = (
            self.staged.get(..lo).ok_or_else(out_of_bounds)?,
            self.staged.get(hi..).ok_or_else(out_of_bounds)?,
        );
        let mut next = String::with_capacity(self.staged.len());
        next.push_str(prefix);
        next.extend(std::iter::repeat_n(FILLER, hi - lo));
        next.push_str(rest);
        self.staged = next;
        Ok(())
    }

    /// Writes the staged content to disk when it differs from what is
    /// currently there, reporting whether a write happened.
    ///
    /// Callers use the return value to skip redundant oracle invocations
    /// when a staged transform turned out to be the identity.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the file cannot be written.
    pub fn flush(&mut self) -> Result<bool, RewriteError> {
        if self.staged == self.on_disk {
            return Ok(false);
        }
        self.write(self.staged.clone())?;
        Ok(true)
    }

    /// Closes the transaction, keeping whatever has been staged.
    ///
    /// Staged content that was never flushed is written out first.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when a pending write fails.
    pub fn commit(mut self) -> Result<(), RewriteError> {
        let _ = self.flush()?;
        debug!(path = %self.path, "edit transaction committed");
        Ok(())
    }

    /// Closes the transaction, forcing the originally captured content
    /// back onto disk.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the file cannot be written.
    pub fn restore(mut self) -> Result<(), RewriteError> {
        if self.on_disk != self.original {
            self.write(self.original.clone())?;
        }
        debug!(path = %self.path, "edit transaction rolled back");
        Ok(())
    }

    fn write(&mut self, content: String) -> Result<(), RewriteError> {
        fs::write(&self.path, &content)
            .map_err(|source| RewriteError::io(self.path.clone(), source))?;
        self.on_disk = content;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn fixture(content: &str) -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("sample.rs"))
            .expect("temp path is UTF-8");
        fs::write(&path, content).expect("write fixture");
        (dir, path)
    }

    #[test]
    fn open_fails_on_missing_file() {
        let (dir, _) = fixture("");
        let missing = Utf8PathBuf::from_path_buf(dir.path().join("absent.rs"))
            .expect("temp path is UTF-8");
        assert!(matches!(
            EditTransaction::open(missing),
            Err(RewriteError::Io { .. })
        ));
    }

    #[test]
    fn erase_is_length_preserving() {
        let (_dir, path) = fixture("pub unsafe fn f() {}");
        let mut tx = EditTransaction::open(&path).expect("open");
        tx.stage_erase(4, 10).expect("erase in bounds");
        assert_eq!(tx.staged().len(), tx.original().len());
        assert_eq!(tx.staged(), "pub        fn f() {}");
        // Text outside the erased range is untouched.
        assert_eq!(tx.staged().get(11..), tx.original().get(11..));
    }

    #[rstest]
    #[case::past_the_end(2, 99)]
    #[case::empty_range(3, 3)]
    #[case::inverted_range(4, 1)]
    fn erase_rejects_invalid_ranges(#[case] lo: usize, #[case] hi: usize) {
        let (_dir, path) = fixture("short");
        let mut tx = EditTransaction::open(&path).expect("open");
        assert!(matches!(
            tx.stage_erase(lo, hi),
            Err(RewriteError::SpanOutOfBounds { .. })
        ));
    }

    #[test]
    fn stage_via_rejects_length_changing_transform() {
        let (_dir, path) = fixture("content");
        let mut tx = EditTransaction::open(&path).expect("open");
        assert!(matches!(
            tx.stage_via(|_| String::from("longer content")),
            Err(RewriteError::LengthChanged { .. })
        ));
    }

    #[test]
    fn flush_skips_identity_edits() {
        let (_dir, path) = fixture("content");
        let mut tx = EditTransaction::open(&path).expect("open");
        tx.stage_via(|current| current.to_owned()).expect("stage");
        assert!(!tx.flush().expect("flush"));

        tx.stage_erase(0, 3).expect("erase");
        assert!(tx.flush().expect("flush"));
        // Flushing the same staged content twice writes only once.
        assert!(!tx.flush().expect("flush"));
    }

    #[test]
    fn restore_returns_file_to_captured_bytes() {
        let (_dir, path) = fixture("original text");
        let mut tx = EditTransaction::open(&path).expect("open");
        tx.stage_erase(0, 8).expect("erase");
        assert!(tx.flush().expect("flush"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "         text");

        tx.restore().expect("restore");
        assert_eq!(fs::read_to_string(&path).expect("read"), "original text");
    }

    #[test]
    fn commit_writes_unflushed_staging() {
        let (_dir, path) = fixture("original text");
        let mut tx = EditTransaction::open(&path).expect("open");
        tx.stage_erase(9, 13).expect("erase");
        tx.commit().expect("commit");
        assert_eq!(fs::read_to_string(&path).expect("read"), "original     ");
    }

    #[test]
    fn transforms_compose_before_flush() {
        let (_dir, path) = fixture("aaa bbb ccc");
        let mut tx = EditTransaction::open(&path).expect("open");
        tx.stage_erase(0, 3).expect("first erase");
        tx.stage_erase(8, 11).expect("second erase");
        tx.commit().expect("commit");
        assert_eq!(fs::read_to_string(&path).expect("read"), "    bbb    ");
    }
}
