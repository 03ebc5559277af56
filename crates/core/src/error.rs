use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An edge query was made against a set with no points.
    EmptySet { operation: &'static str },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySet { operation } => {
                write!(f, "{operation}() should never be called with an empty set")
            }
        }
    }
}

impl std::error::Error for CoreError {}
