use std::fmt;

use treetype::SyntaxError;

/// A description or atom definition that failed to compile.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionError {
    /// The atom whose definition is at fault, or `None` for the main description.
    pub atom: Option<String>,
    pub error: SyntaxError,
}

impl DefinitionError {
    pub fn in_atom(name: impl Into<String>, error: SyntaxError) -> Self {
        DefinitionError {
            atom: Some(name.into()),
            error,
        }
    }
}

impl From<SyntaxError> for DefinitionError {
    fn from(error: SyntaxError) -> Self {
        DefinitionError { atom: None, error }
    }
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.atom {
            Some(name) => write!(f, "in definition of '{}': {}", name, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for DefinitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
