//! Full-tree snapshot copying between stage directories.

use std::fs;

use camino::Utf8Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::PipelineError;

/// Copies the full tree at `src` into `dst`, creating `dst`.
///
/// The whole tree is copied, build artefacts included: the dependency
/// cache carries across stages and only the project's own artefacts are
/// cleaned between passes.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when `dst` already exists or any entry
/// cannot be copied.
pub fn copy_tree(src: &Utf8Path, dst: &Utf8Path) -> Result<(), PipelineError> {
    if dst.exists() {
        return Err(PipelineError::io(
            dst.to_owned(),
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "stage directory already exists",
            ),
        ));
    }

    let mut files = 0_usize;
    for entry in WalkDir::new(src) {
        let entry = entry
            .map_err(|source| PipelineError::io(src.to_owned(), std::io::Error::other(source)))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|source| PipelineError::io(src.to_owned(), std::io::Error::other(source)))?;
        let target = dst.as_std_path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|source| PipelineError::io(dst.to_owned(), source))?;
        } else if entry.file_type().is_file() {
            let _ = fs::copy(entry.path(), &target)
                .map_err(|source| PipelineError::io(dst.to_owned(), source))?;
            files += 1;
        }
        // Symlinks inside stage trees are not expected; skip anything else.
    }

    debug!(%src, %dst, files, "stage tree copied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn copies_nested_tree_contents() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 path");
        let src = root.join("src_tree");
        fs::create_dir_all(src.join("src/nested")).expect("create tree");
        fs::write(src.join("Cargo.toml"), "[package]").expect("write");
        fs::write(src.join("src/nested/deep.rs"), "fn d() {}").expect("write");

        let dst = root.join("dst_tree");
        copy_tree(&src, &dst).expect("copy succeeds");

        assert_eq!(
            fs::read_to_string(dst.join("Cargo.toml")).expect("read"),
            "[package]"
        );
        assert_eq!(
            fs::read_to_string(dst.join("src/nested/deep.rs")).expect("read"),
            "fn d() {}"
        );
    }

    #[test]
    fn refuses_to_overwrite_an_existing_stage() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 path");
        let src = root.join("a");
        let dst = root.join("b");
        fs::create_dir_all(&src).expect("create src");
        fs::create_dir_all(&dst).expect("create dst");

        assert!(matches!(
            copy_tree(&src, &dst),
            Err(PipelineError::Io { .. })
        ));
    }
}
