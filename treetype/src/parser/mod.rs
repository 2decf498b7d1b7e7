pub mod error;
pub mod grammar;
pub mod lexer;

pub use error::{LexError, ParseError, SyntaxError};

use crate::schema::ConversionTree;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: impl Into<String>, file_id: usize) -> Self {
        Parser {
            source: source.into(),
            file_id,
        }
    }

    /// Lex and parse the description. Errors are tagged with this parser's
    /// file id so they can be rendered against the right source.
    pub fn parse(&self) -> Result<ConversionTree, SyntaxError> {
        crate::compile(&self.source).map_err(|e| e.in_file(self.file_id))
    }
}
