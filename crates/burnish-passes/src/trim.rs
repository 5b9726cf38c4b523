//! Suppression-directive trimming.
//!
//! Transpiled crates open with a block of file-level `#![allow(...)]`
//! directives and feature gates that suppress diagnostics wholesale. This
//! pass whiteouts them one candidate phrase at a time, keeping each edit
//! only when the project still checks and the diagnostic volume has not
//! grown past the pass baseline.
//!
//! The volume comparison is cumulative by design: every attempt is held
//! against the *original* baseline rather than the previous accepted
//! state, granting the whole pass one bounded drift budget.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use burnish_oracle::VerificationOracle;
use burnish_rewrite::EditTransaction;

use crate::error::PassError;

/// Suppression phrases attempted per file, in order.
///
/// The trailing-comma forms target members of multi-lint `allow` lists;
/// the bare `unused_mut` catches the phrase when it closes such a list.
pub const CANDIDATE_TRIMS: [&str; 6] = [
    "dead_code,",
    "mutable_transmutes,",
    "unused_assignments,",
    "unused_mut,",
    "unused_mut",
    "#![feature(extern_types)]",
];

/// Summary of one trim run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TrimReport {
    /// Whether the pass was skipped because the baseline check failed.
    pub skipped_baseline: bool,
    /// Edits flushed and put to the oracle.
    pub attempted: usize,
    /// Edits kept.
    pub trimmed: usize,
    /// Edits rolled back.
    pub reverted: usize,
}

/// Trims suppression directives from every Rust source in the project.
///
/// # Errors
///
/// Returns [`PassError`] when a source file cannot be read or written, or
/// when the oracle cannot be invoked. A failing re-verification only
/// reverts the edit under trial.
pub fn trim_suppressions(
    project: &Utf8Path,
    oracle: &dyn VerificationOracle,
) -> Result<TrimReport, PassError> {
    let baseline = oracle.verify(project)?;
    let mut report = TrimReport::default();
    if !baseline.success {
        // No oracle signal to compare against; leave every file alone.
        info!(%project, "skipping suppression trim: baseline check failed");
        report.skipped_baseline = true;
        return Ok(report);
    }

    for path in rust_sources(project)? {
        for phrase in CANDIDATE_TRIMS {
            let mut tx = EditTransaction::open(&path)?;
            let bound = inner_attribute_prelude_len(tx.original());
            tx.stage_via(|current| whiteout_first_within(current, phrase, bound))?;
            if !tx.flush()? {
                // Phrase absent from the prelude; nothing to verify.
                continue;
            }
            report.attempted += 1;

            let verdict = oracle.verify(project)?;
            if verdict.success && verdict.output_volume() <= baseline.output_volume() {
                debug!(file = %path, phrase, "suppression trimmed");
                tx.commit()?;
                report.trimmed += 1;
            } else {
                debug!(file = %path, phrase, "trim rejected; restoring");
                tx.restore()?;
                report.reverted += 1;
            }
        }
    }

    info!(
        %project,
        attempted = report.attempted,
        trimmed = report.trimmed,
        reverted = report.reverted,
        "suppression trim finished"
    );
    Ok(report)
}

/// Collects the project's Rust sources in a stable order, leaving build
/// artefacts under `target/` alone.
fn rust_sources(project: &Utf8Path) -> Result<Vec<Utf8PathBuf>, PassError> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(project)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && entry.file_name() == "target")
        });
    for entry in walker {
        let entry = entry.map_err(|source| {
            PassError::io(project.to_owned(), std::io::Error::other(source))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            continue;
        };
        if path.extension() == Some("rs") {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

/// Length in bytes of the leading inner-attribute prelude.
///
/// The prelude is the contiguous run of lines that open a directive
/// (`#![`), continue one (four-space indentation), or close one (`)]`).
/// Suppression directives can only legitimately appear there, so trimming
/// never searches into ordinary code.
fn inner_attribute_prelude_len(contents: &str) -> usize {
    let mut prelude_len = 0;
    for line in contents.split_inclusive('\n') {
        if line.starts_with("#![") || line.starts_with("    ") || line.starts_with(")]") {
            prelude_len += line.len();
        } else {
            break;
        }
    }
    prelude_len
}

/// Whiteouts the first occurrence of `needle` within the first `bound`
/// bytes, returning the content unchanged when the needle is absent.
fn whiteout_first_within(contents: &str, needle: &str, bound: usize) -> String {
    let window = contents.get(..bound.min(contents.len())).unwrap_or(contents);
    match window.find(needle) {
        Some(start) => {
            let mut next = String::with_capacity(contents.len());
            next.push_str(&contents[..start]);
            next.extend(std::iter::repeat_n(' ', needle.len()));
            next.push_str(&contents[start + needle.len()..]);
            next
        }
        None => contents.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use burnish_oracle::{ScriptedOracle, Verdict, failing_verdict, passing_verdict};
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    const PRELUDE_SOURCE: &str = "#![allow(\n    dead_code,\n    unused_mut\n)]\n\nfn main() {}\n";

    struct Fixture {
        _dir: TempDir,
        project: Utf8PathBuf,
        main: Utf8PathBuf,
    }

    fn fixture(content: &str) -> Fixture {
        let dir = TempDir::new().expect("create temp dir");
        let project =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp path is UTF-8");
        fs::create_dir(project.join("src")).expect("create src");
        let main = project.join("src/main.rs");
        fs::write(&main, content).expect("write fixture");
        Fixture {
            _dir: dir,
            project,
            main,
        }
    }

    fn noisy_verdict(volume: usize) -> Verdict {
        Verdict {
            success: true,
            output: "x".repeat(volume),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn failing_baseline_skips_the_pass_untouched() {
        let fixture = fixture(PRELUDE_SOURCE);
        let oracle = ScriptedOracle::failing();

        let report = trim_suppressions(&fixture.project, &oracle).expect("pass runs");

        assert!(report.skipped_baseline);
        assert_eq!(report.attempted, 0);
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(
            fs::read_to_string(&fixture.main).expect("read"),
            PRELUDE_SOURCE
        );
    }

    #[test]
    fn accepted_trims_are_kept_and_length_preserving() {
        let fixture = fixture(PRELUDE_SOURCE);
        let oracle = ScriptedOracle::passing();

        let report = trim_suppressions(&fixture.project, &oracle).expect("pass runs");

        // `dead_code,` and both `unused_mut` forms sit in the prelude.
        assert_eq!(report.trimmed, report.attempted);
        assert!(report.trimmed >= 2);
        let trimmed = fs::read_to_string(&fixture.main).expect("read");
        assert_eq!(trimmed.len(), PRELUDE_SOURCE.len());
        assert!(!trimmed.contains("dead_code"));
        assert!(!trimmed.contains("unused_mut"));
    }

    #[test]
    fn failing_recheck_reverts_the_edit() {
        let fixture = fixture("#![allow(\n    dead_code,\n)]\nfn main() {}\n");
        // Baseline passes; every re-verification fails.
        let oracle = ScriptedOracle::with_script(vec![passing_verdict(), failing_verdict()]);

        let report = trim_suppressions(&fixture.project, &oracle).expect("pass runs");

        assert_eq!(report.trimmed, 0);
        assert_eq!(report.reverted, report.attempted);
        assert_eq!(
            fs::read_to_string(&fixture.main).expect("read"),
            "#![allow(\n    dead_code,\n)]\nfn main() {}\n"
        );
    }

    #[test]
    fn volume_above_original_baseline_reverts_the_edit() {
        let fixture = fixture("#![allow(\n    dead_code,\n)]\nfn main() {}\n");
        // Successful recheck, but noisier than the baseline.
        let oracle =
            ScriptedOracle::with_script(vec![noisy_verdict(10), noisy_verdict(50)]);

        let report = trim_suppressions(&fixture.project, &oracle).expect("pass runs");

        assert_eq!(report.trimmed, 0);
        assert_eq!(report.reverted, report.attempted);
    }

    #[test]
    fn phrases_outside_the_prelude_are_never_touched() {
        let source = "fn main() {\n    let dead_code, = ();\n}\n";
        let fixture = fixture(source);
        let oracle = ScriptedOracle::passing();

        let report = trim_suppressions(&fixture.project, &oracle).expect("pass runs");

        assert_eq!(report.attempted, 0);
        // Only the baseline check ran.
        assert_eq!(oracle.call_count(), 1);
        assert_eq!(fs::read_to_string(&fixture.main).expect("read"), source);
    }

    #[rstest]
    #[case::directive_only("#![allow(dead_code)]\nfn main() {}\n", 21)]
    #[case::multi_line("#![allow(\n    dead_code,\n)]\nrest\n", 28)]
    #[case::no_prelude("fn main() {}\n", 0)]
    #[case::empty("", 0)]
    fn prelude_bound_matches_directive_block(#[case] content: &str, #[case] expected: usize) {
        assert_eq!(inner_attribute_prelude_len(content), expected);
    }

    #[test]
    fn whiteout_respects_the_bound() {
        let content = "prefix dead_code, suffix";
        assert_eq!(whiteout_first_within(content, "dead_code,", 6), content);
        assert_eq!(
            whiteout_first_within(content, "dead_code,", content.len()),
            "prefix            suffix"
        );
    }
}
