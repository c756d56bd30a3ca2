use std::fmt;
use strum_macros::{Display, EnumIter};

/// Kind of failure reported by any calculator operation.
/// An outer layer (e.g. an HTTP handler) maps the kind to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ErrorKind {
    /// malformed expression, unbalanced parentheses, unexpected token
    SyntaxError,
    /// identifier outside of the registry that is not bound as a variable
    NameError,
    /// real-domain violation such as sqrt(-1) or log(0), numeric overflow
    DomainError,
    /// division or modulo by zero
    DivisionError,
    /// malformed matrix literal
    FormatError,
    /// matrix of the wrong shape for the requested operation
    ShapeError,
    /// bad grid parameters (zero points, too many points, non-finite bounds)
    InvalidArgument,
}

/// Error returned by every public operation: a kind plus a human readable message.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CalcError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CalcError {
            kind,
            message: message.into(),
        }
    }
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }
    pub fn name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NameError, message)
    }
    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DomainError, message)
    }
    pub fn division(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DivisionError, message)
    }
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FormatError, message)
    }
    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ShapeError, message)
    }
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CalcError {}

pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_carries_kind_and_message() {
        let err = CalcError::division("division by zero");
        assert_eq!(err.to_string(), "DivisionError: division by zero");
        assert_eq!(err.kind(), ErrorKind::DivisionError);
    }

    #[test]
    fn test_all_kinds_have_distinct_names() {
        let names: Vec<String> = ErrorKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names.len(), 7);
        let mut dedup = names.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), names.len());
    }
}
