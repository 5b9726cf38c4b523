//! Closed diagnostic model over the consumed subset of cargo's JSON output.
//!
//! Cargo's `--message-format=json` stream is loosely shaped and evolves
//! across toolchains. Burnish consumes only a handful of fields, so parsing
//! deserialises into fully optional raw shapes and keeps just what the
//! pipeline needs. Any line that does not match degrades to an ignored
//! diagnostic rather than a failure.

use camino::Utf8PathBuf;
use serde::Deserialize;

/// Severity of one diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A hard error.
    Error,
    /// A warning.
    Warning,
}

/// A byte-range location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    /// File the diagnostic points at, relative to the checked project.
    pub file: Utf8PathBuf,
    /// Inclusive start byte offset.
    pub byte_start: usize,
    /// Exclusive end byte offset.
    pub byte_end: usize,
}

/// Classification of a diagnostic by the codes the pipeline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticClass {
    /// A safety marker became redundant (`unused_unsafe`); the removal
    /// pass whiteouts the reported range as a secondary cleanup.
    RedundantMarker,
    /// A suppression attribute no longer suppresses anything
    /// (`unused_attributes`); recorded but not otherwise surfaced.
    SuppressedLintUnused,
    /// Any other code, or no code at all.
    Other,
}

/// One diagnostic from the verification oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity reported by the compiler.
    pub severity: Severity,
    /// Machine-readable classification code, when present.
    pub code: Option<String>,
    /// Byte-range locations, primary span first.
    pub locations: Vec<DiagnosticLocation>,
}

impl Diagnostic {
    /// Classifies this diagnostic by the codes the pipeline consumes.
    #[must_use]
    pub fn class(&self) -> DiagnosticClass {
        match self.code.as_deref() {
            Some("unused_unsafe") => DiagnosticClass::RedundantMarker,
            Some("unused_attributes") => DiagnosticClass::SuppressedLintUnused,
            _ => DiagnosticClass::Other,
        }
    }

    /// Returns the primary (first) location, when one was reported.
    #[must_use]
    pub fn primary_location(&self) -> Option<&DiagnosticLocation> {
        self.locations.first()
    }
}

/// Outcome of one oracle invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the oracle accepted the project tree.
    pub success: bool,
    /// Raw diagnostic stream, retained for volume comparison and
    /// post-mortem logs.
    pub output: String,
    /// Parsed diagnostics the pipeline may react to.
    pub diagnostics: Vec<Diagnostic>,
}

impl Verdict {
    /// Size of the raw diagnostic output in bytes.
    ///
    /// The trim pass compares this volume against its baseline to decide
    /// whether an edit introduced new warnings.
    #[must_use]
    pub const fn output_volume(&self) -> usize {
        self.output.len()
    }

    /// Iterates the diagnostics carrying a given classification.
    pub fn diagnostics_of_class(
        &self,
        class: DiagnosticClass,
    ) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.class() == class)
    }
}

/// Raw wire shapes: every field optional so unknown message forms simply
/// fail the filters below instead of failing deserialisation.
#[derive(Debug, Deserialize)]
struct RawMessage {
    reason: Option<String>,
    message: Option<RawDiagnostic>,
}

#[derive(Debug, Deserialize)]
struct RawDiagnostic {
    level: Option<String>,
    code: Option<RawCode>,
    #[serde(default)]
    spans: Vec<RawSpan>,
}

#[derive(Debug, Deserialize)]
struct RawCode {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSpan {
    file_name: Option<Utf8PathBuf>,
    byte_start: Option<usize>,
    byte_end: Option<usize>,
}

/// Parses one line of the cargo JSON stream into a diagnostic.
///
/// Returns `None` for anything other than a well-formed compiler message
/// with an error or warning level: build-script output, artifact notices,
/// notes, and malformed lines are all ignored by design.
#[must_use]
pub(crate) fn parse_line(line: &str) -> Option<Diagnostic> {
    let raw: RawMessage = serde_json::from_str(line).ok()?;
    if raw.reason.as_deref() != Some("compiler-message") {
        return None;
    }
    let message = raw.message?;
    let severity = match message.level.as_deref() {
        Some("error") => Severity::Error,
        Some("warning") => Severity::Warning,
        _ => return None,
    };

    let locations = message
        .spans
        .into_iter()
        .filter_map(|span| {
            Some(DiagnosticLocation {
                file: span.file_name?,
                byte_start: span.byte_start?,
                byte_end: span.byte_end?,
            })
        })
        .collect();

    Some(Diagnostic {
        severity,
        code: message.code.and_then(|code| code.code),
        locations,
    })
}

/// Parses a whole cargo JSON stream, ignoring non-diagnostic lines.
#[must_use]
pub(crate) fn parse_stream(output: &str) -> Vec<Diagnostic> {
    output.lines().filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const UNUSED_UNSAFE_LINE: &str = r#"{"reason":"compiler-message","message":{"level":"warning","code":{"code":"unused_unsafe"},"spans":[{"file_name":"src/lib.rs","byte_start":42,"byte_end":48}]}}"#;

    #[test]
    fn parses_unused_unsafe_warning() {
        let diagnostic = parse_line(UNUSED_UNSAFE_LINE).expect("diagnostic line");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.class(), DiagnosticClass::RedundantMarker);
        let location = diagnostic.primary_location().expect("primary span");
        assert_eq!(location.file, Utf8PathBuf::from("src/lib.rs"));
        assert_eq!((location.byte_start, location.byte_end), (42, 48));
    }

    #[rstest]
    #[case::artifact(r#"{"reason":"compiler-artifact","target":{"name":"x"}}"#)]
    #[case::note(r#"{"reason":"compiler-message","message":{"level":"note","spans":[]}}"#)]
    #[case::no_reason(r#"{"message":{"level":"warning"}}"#)]
    #[case::not_json("error[E0133]: call to unsafe function")]
    #[case::wrong_shape(r#"{"reason":"compiler-message","message":[1,2,3]}"#)]
    fn unknown_shapes_are_ignored(#[case] line: &str) {
        assert_eq!(parse_line(line), None);
    }

    #[test]
    fn span_without_byte_range_is_dropped_from_locations() {
        let line = r#"{"reason":"compiler-message","message":{"level":"error","spans":[{"file_name":"src/lib.rs"}]}}"#;
        let diagnostic = parse_line(line).expect("diagnostic line");
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.locations.is_empty());
        assert_eq!(diagnostic.class(), DiagnosticClass::Other);
    }

    #[test]
    fn stream_parsing_skips_noise_lines() {
        let stream = format!(
            "{}\n{}\n{}\n",
            r#"{"reason":"compiler-artifact"}"#, UNUSED_UNSAFE_LINE, "not json at all"
        );
        let diagnostics = parse_stream(&stream);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn verdict_filters_by_class() {
        let verdict = Verdict {
            success: true,
            output: String::new(),
            diagnostics: parse_stream(UNUSED_UNSAFE_LINE),
        };
        assert_eq!(
            verdict
                .diagnostics_of_class(DiagnosticClass::RedundantMarker)
                .count(),
            1
        );
        assert_eq!(
            verdict
                .diagnostics_of_class(DiagnosticClass::Other)
                .count(),
            0
        );
    }
}
