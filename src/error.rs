use std::fmt;
use std::io;

pub(crate) type ConvertResult<T> = Result<T, Error>;

/// Errors that can occur while reading a grammar or writing a syntax.
///
/// Problems inside the grammar itself are never errors: they are reported as
/// [`Diagnostic`](crate::Diagnostic)s and the conversion carries on.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred when reading a grammar file
    Io(io::Error),

    /// JSON parsing failed when loading a grammar, or JSON encoding failed
    /// when writing a syntax.
    Json(serde_json::Error),

    /// YAML encoding failed when writing a syntax.
    Yaml(serde_yaml::Error),

    /// The grammar nests begin/end rules deeper than the caller allows.
    #[allow(missing_docs)]
    NestingTooDeep { depth: usize, limit: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Yaml(err) => write!(f, "YAML error: {}", err),
            Error::NestingTooDeep { depth, limit } => write!(
                f,
                "grammar nests begin/end rules {} levels deep, limit is {}",
                depth, limit
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Yaml(err) => Some(err),
            Error::NestingTooDeep { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}
