use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

/// No lexer rule matched at `position` (a byte offset into the description).
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// The single character no token rule accepted.
    pub found: char,
    pub position: usize,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl LexError {
    pub fn new(found: char, position: usize) -> Self {
        LexError {
            found,
            position,
            file_id: 0,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn span(&self) -> Range<usize> {
        self.position..self.position + self.found.len_utf8()
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unexpected token '{}' at position {}",
            self.found, self.position
        )
    }
}

impl std::error::Error for LexError {}

/// Parse errors with source location information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(message: impl Into<String>, span: Range<usize>) -> Self {
        ParseError {
            message: message.into(),
            span,
            file_id: 0,
            notes: Vec::new(),
        }
    }

    /// `found` was read where one of `expected` should have been.
    /// An empty `expected` list gives the bare form of the message.
    pub fn unexpected_token(
        found: &dyn fmt::Display,
        expected: &[String],
        span: Range<usize>,
    ) -> Self {
        let message = match expected {
            [] => format!("Unexpected token: '{}'", found),
            [only] => format!("Unexpected token: expected '{}' got '{}'", only, found),
            many => format!(
                "Unexpected token: expected one of '{}' got '{}'",
                many.join("', '"),
                found
            ),
        };
        ParseError::error(message, span)
    }

    /// The input ran out where one of `expected` should have been.
    pub fn unexpected_end(expected: &[String], span: Range<usize>) -> Self {
        let message = match expected {
            [] => "Unexpected end of input".to_string(),
            [only] => format!("Unexpected end of input: Expected '{}'", only),
            many => format!(
                "Unexpected end of input: Expected one of '{}'",
                many.join("', '")
            ),
        };
        ParseError::error(message, span)
    }

    /// A complete expression was read but `found` follows it.
    pub fn trailing_token(found: &dyn fmt::Display, span: Range<usize>) -> Self {
        ParseError::error(
            format!("Unexpected token: expected end of input got '{}'", found),
            span,
        )
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn in_file(mut self, file_id: usize) -> Self {
        self.file_id = file_id;
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Anything that stops a description string from compiling.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    Lex(LexError),
    Parse(ParseError),
}

impl SyntaxError {
    pub fn in_file(self, file_id: usize) -> Self {
        match self {
            SyntaxError::Lex(mut e) => {
                e.file_id = file_id;
                SyntaxError::Lex(e)
            }
            SyntaxError::Parse(e) => SyntaxError::Parse(e.in_file(file_id)),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        match self {
            SyntaxError::Lex(e) => e.to_diagnostic(),
            SyntaxError::Parse(e) => e.to_diagnostic(),
        }
    }
}

impl From<LexError> for SyntaxError {
    fn from(error: LexError) -> Self {
        SyntaxError::Lex(error)
    }
}

impl From<ParseError> for SyntaxError {
    fn from(error: ParseError) -> Self {
        SyntaxError::Parse(error)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::Lex(e) => write!(f, "{}", e),
            SyntaxError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyntaxError::Lex(e) => Some(e),
            SyntaxError::Parse(e) => Some(e),
        }
    }
}
