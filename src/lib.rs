mod diagnostics;
mod error;
mod grammars;

pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use error::Error;
pub use grammars::{
    BASE_CONTEXT, BeginEnd, CaptureScopes, Captures, Context, Conversion, Entry, MAIN_CONTEXT,
    MatchRule, Pattern, RawGrammar, RawRule, Reference, Repository, RepositoryEntry, Syntax,
    convert, convert_with, make_context,
};
