pub mod parser;
pub mod schema;
pub mod tree;

pub use parser::error::{LexError, ParseError, SyntaxError};
pub use parser::grammar::{MAX_NESTING, parse};
pub use parser::lexer::{Token, TokenKind, lex};
pub use schema::{Alternative, Atom, ConversionTree};
pub use tree::BinaryTree;

/// Lex and parse a description string in one step.
pub fn compile(source: &str) -> Result<ConversionTree, SyntaxError> {
    let tokens = lex(source)?;
    Ok(parse(&tokens)?)
}
