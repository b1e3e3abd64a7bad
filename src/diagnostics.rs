use std::fmt;

/// A non-fatal problem found while converting a grammar.
///
/// Each one is reported once and the offending fragment is either skipped or
/// emitted as-is, conversion of the rest of the grammar always continues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A capture carries nested patterns or includes instead of a scope name.
    /// The capture is skipped.
    UnsupportedCaptureShape { key: String },
    /// A capture key is not a plain numeric group index. The capture is skipped.
    NamedCaptureUnsupported { key: String },
    /// An end pattern contains `\G`, which cannot work once it is a standalone
    /// pop pattern. The pop entry is still emitted unchanged.
    InvalidEndAnchor { pattern: String },
    /// A begin rule has no end pattern (e.g. a `begin`/`while` rule).
    /// It is converted with an empty pop pattern.
    MissingEndPattern { begin: String },
    /// A local include names a key absent from the repository.
    /// The include entry is still emitted.
    UnresolvedRepositoryReference { name: String },
    /// An include uses a `$` marker other than `$self` and `$base`.
    /// The rule contributes no entry.
    UnknownIncludeKind { include: String },
    /// A rule has none of `begin`, `match` or `include`.
    /// The rule contributes no entry.
    UnrecognizedRuleShape,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedCaptureShape { key } => write!(
                f,
                "capture '{}': patterns and includes are not supported within captures",
                key
            ),
            Diagnostic::NamedCaptureUnsupported { key } => {
                write!(f, "capture '{}': named captures are unsupported", key)
            }
            Diagnostic::InvalidEndAnchor { pattern } => {
                write!(f, "invalid \\G in end pattern: '{}'", pattern)
            }
            Diagnostic::MissingEndPattern { begin } => {
                write!(f, "begin pattern '{}' has no end pattern", begin)
            }
            Diagnostic::UnresolvedRepositoryReference { name } => {
                write!(f, "no entry in repository for '{}'", name)
            }
            Diagnostic::UnknownIncludeKind { include } => {
                write!(f, "unknown include: '{}'", include)
            }
            Diagnostic::UnrecognizedRuleShape => write!(f, "unknown pattern type"),
        }
    }
}

/// Where the converter reports [`Diagnostic`]s.
///
/// The sink is write-only: nothing it does can change the conversion output.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards every diagnostic to `log::warn!`.
#[derive(Debug, Copy, Clone, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
