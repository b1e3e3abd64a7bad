mod common;
mod compiler;
mod raw;
mod reverse;
mod sublime;

pub use common::{BASE_CONTEXT, MAIN_CONTEXT, Reference};
pub use compiler::{Conversion, Repository, convert, convert_with, make_context};
pub use raw::{BeginEnd, Captures, MatchRule, Pattern, RawGrammar, RawRule, RepositoryEntry};
pub use sublime::{CaptureScopes, Context, Entry, Syntax};
