use std::ops::Range;

use crate::parser::error::ParseError;
use crate::parser::lexer::{Token, TokenKind};
use crate::schema::{Alternative, Atom, ConversionTree};

/// Deepest allowed nesting of `(`, `<`, `[`, `[]` suffixes and fixed-list
/// elements.
pub const MAX_NESTING: usize = 256;

// What may start an atom, in the order error messages list them.
const ATOM_START: &[&str] = &["identifier", "integer", "(", "<", "["];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a token slice into a conversion tree.
///
/// An empty slice is the `any` schema. Every token has to be consumed.
pub fn parse(tokens: &[Token]) -> Result<ConversionTree, ParseError> {
    if tokens.is_empty() {
        return Ok(ConversionTree::any());
    }

    let mut parser = TypeParser::new(tokens);
    let schema = parser.parse_choice()?;

    if let Some(token) = parser.peek() {
        return Err(ParseError::unexpected_token(&token.kind, &[], token.span.clone()));
    }

    Ok(schema)
}

// ---------------------------------------------------------------------------
// Recursive descent over the token slice
// ---------------------------------------------------------------------------

struct TypeParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> TypeParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        TypeParser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Zero-width span just past the last token.
    fn end_span(&self) -> Range<usize> {
        let end = self.tokens.last().map_or(0, |t| t.span.end);
        end..end
    }

    /// Consume the next token if it is one of `kinds`.
    fn expect(&mut self, kinds: &[TokenKind]) -> Result<&'a Token, ParseError> {
        let expected = || kinds.iter().map(TokenKind::describe).collect::<Vec<_>>();
        match self.peek() {
            Some(token) if kinds.contains(&token.kind) => {
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::unexpected_token(
                &token.kind,
                &expected(),
                token.span.clone(),
            )),
            None => Err(ParseError::unexpected_end(&expected(), self.end_span())),
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        span: Range<usize>,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(too_deep(span));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // AtomChoice := Atom ( '|' Atom )*
    fn parse_choice(&mut self) -> Result<ConversionTree, ParseError> {
        let mut alternatives = vec![self.parse_atom()?];
        while self.peek_kind() == Some(&TokenKind::Bar) {
            self.advance();
            alternatives.push(self.parse_atom()?);
        }
        Ok(ConversionTree::choice(alternatives))
    }

    // Atom := AtomCore ( '[' ']' )*
    fn parse_atom(&mut self) -> Result<Alternative, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::unexpected_end(&atom_start(), self.end_span()));
        };

        let mut schema = match &token.kind {
            TokenKind::Identifier(name) => {
                ConversionTree::Choice(vec![Alternative::Atom(Atom::Named(name.clone()))])
            }
            TokenKind::Integer(n) => ConversionTree::Choice(vec![Alternative::Atom(Atom::Number(*n))]),
            TokenKind::ParenOpen => self.nested(token.span.clone(), |p| {
                let inner = p.parse_choice()?;
                p.expect(&[TokenKind::ParenClose])?;
                Ok(inner)
            })?,
            TokenKind::TreeOpen => self.nested(token.span.clone(), Self::parse_tree)?,
            TokenKind::ListOpen => self.nested(token.span.clone(), Self::parse_fixed_list)?,
            other => {
                return Err(ParseError::unexpected_token(
                    other,
                    &atom_start(),
                    token.span.clone(),
                ));
            }
        };

        // Suffixes bind tighter than `|`: `int|nil[]` is `int|(nil[])`.
        let mut suffixes = 0;
        while self.peek_kind() == Some(&TokenKind::ListOpen) {
            let open = self.advance().map(|t| t.span.clone()).unwrap_or_default();
            self.expect(&[TokenKind::ListClose])?;
            suffixes += 1;
            if self.depth + suffixes > MAX_NESTING {
                return Err(too_deep(open));
            }
            schema = ConversionTree::list(schema);
        }

        Ok(schema.into_alternative())
    }

    // '<' AtomChoice '.' AtomChoice '>'
    fn parse_tree(&mut self) -> Result<ConversionTree, ParseError> {
        let left = self.parse_choice()?;
        self.expect(&[TokenKind::Dot])?;
        let right = self.parse_choice()?;
        self.expect(&[TokenKind::TreeClose])?;
        Ok(ConversionTree::tree(left, right))
    }

    // ListBody := ']' | '...' ']' | AtomChoice ( ',' AtomChoice )* ']'
    fn parse_fixed_list(&mut self) -> Result<ConversionTree, ParseError> {
        if self.peek_kind() == Some(&TokenKind::ListClose) {
            self.advance();
            return Ok(ConversionTree::atom("nil"));
        }

        let base = self.depth;
        let result = self.parse_list_elements(base);
        self.depth = base;
        result
    }

    // Element `i` ends up `i` tree nodes below the list, so it is parsed
    // (and counted) at that depth.
    fn parse_list_elements(&mut self, base: usize) -> Result<ConversionTree, ParseError> {
        let mut elements = Vec::new();
        let tail = loop {
            if self.peek_kind() == Some(&TokenKind::Dots) {
                self.advance();
                self.expect(&[TokenKind::ListClose])?;
                break ConversionTree::any();
            }

            if base + elements.len() + 1 > MAX_NESTING {
                let span = self.peek().map_or_else(|| self.end_span(), |t| t.span.clone());
                return Err(too_deep(span));
            }
            self.depth = base + elements.len();
            elements.push(self.parse_choice()?);
            let separator = self.expect(&[TokenKind::Comma, TokenKind::ListClose])?;
            if separator.kind == TokenKind::ListClose {
                break ConversionTree::atom("nil");
            }
        };

        Ok(elements
            .into_iter()
            .rev()
            .fold(tail, |rest, element| ConversionTree::tree(element, rest)))
    }
}

fn atom_start() -> Vec<String> {
    ATOM_START.iter().map(|s| s.to_string()).collect()
}

fn too_deep(span: Range<usize>) -> ParseError {
    ParseError::error("Type nesting too deep", span)
        .with_note(format!("at most {} levels of nesting are allowed", MAX_NESTING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    fn parse_str(source: &str) -> Result<ConversionTree, ParseError> {
        parse(&lex(source).unwrap())
    }

    #[test]
    fn end_span_points_past_last_token() {
        let tokens = lex("<int . int").unwrap();
        let parser = TypeParser::new(&tokens);
        assert_eq!(parser.end_span(), 10..10);
    }

    #[test]
    fn nesting_limit_counts_suffixes() {
        let deep = format!("int{}", "[]".repeat(MAX_NESTING + 1));
        let err = parse_str(&deep).unwrap_err();
        assert_eq!(err.message, "Type nesting too deep");

        let fits = format!("int{}", "[]".repeat(MAX_NESTING));
        assert!(parse_str(&fits).is_ok());
    }

    #[test]
    fn nesting_limit_counts_fixed_list_elements() {
        let list = |n: usize| format!("[{}]", vec!["nil"; n].join(","));

        let err = parse_str(&list(MAX_NESTING)).unwrap_err();
        assert_eq!(err.message, "Type nesting too deep");
        // The offending element is the last one.
        let last = list(MAX_NESTING).len() - 4;
        assert_eq!(err.span, last..last + 3);

        assert!(parse_str(&list(MAX_NESTING - 1)).is_ok());

        let err = parse_str(&list(300_000)).unwrap_err();
        assert_eq!(err.message, "Type nesting too deep");
    }

    #[test]
    fn nesting_inside_late_list_elements_counts_the_list() {
        let mut elements = vec!["nil".to_string(); MAX_NESTING - 2];
        elements.push("[nil]".to_string());
        let err = parse_str(&format!("[{}]", elements.join(","))).unwrap_err();
        assert_eq!(err.message, "Type nesting too deep");

        elements.pop();
        elements.pop();
        elements.push("[nil]".to_string());
        assert!(parse_str(&format!("[{}]", elements.join(","))).is_ok());
    }

    #[test]
    fn nesting_limit_counts_brackets() {
        let deep = format!("{}int{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        let err = parse_str(&deep).unwrap_err();
        assert_eq!(err.message, "Type nesting too deep");
        assert_eq!(err.span, MAX_NESTING..MAX_NESTING + 1);
    }
}
