use treetype::{LexError, TokenKind, lex};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .expect("lex failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

#[test]
fn symbols() {
    assert_eq!(
        kinds("<>[]()|.,:..."),
        vec![
            TokenKind::TreeOpen,
            TokenKind::TreeClose,
            TokenKind::ListOpen,
            TokenKind::ListClose,
            TokenKind::ParenOpen,
            TokenKind::ParenClose,
            TokenKind::Bar,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Dots,
        ]
    );
}

#[test]
fn identifiers_and_integers() {
    assert_eq!(
        kinds("int my_type2 42"),
        vec![ident("int"), ident("my_type2"), TokenKind::Integer(42)]
    );
    // Digits are tried before identifiers.
    assert_eq!(kinds("12abc"), vec![TokenKind::Integer(12), ident("abc")]);
}

#[test]
fn whitespace_is_skipped() {
    assert_eq!(kinds(""), vec![]);
    assert_eq!(kinds(" \t\n "), vec![]);
    assert_eq!(
        kinds(" < int\n.\tnil > "),
        vec![
            TokenKind::TreeOpen,
            ident("int"),
            TokenKind::Dot,
            ident("nil"),
            TokenKind::TreeClose,
        ]
    );
}

#[test]
fn spans_are_byte_ranges() {
    let tokens = lex("  42 ...x").unwrap();
    let spans: Vec<_> = tokens.iter().map(|t| t.span.clone()).collect();
    assert_eq!(spans, vec![2..4, 5..8, 8..9]);
}

#[test]
fn unknown_character() {
    let err = lex("abc$").unwrap_err();
    assert_eq!(err, LexError::new('$', 3));
    assert_eq!(err.to_string(), "Unexpected token '$' at position 3");
}

#[test]
fn unknown_character_after_whitespace() {
    let err = lex("int | -").unwrap_err();
    assert_eq!(err.to_string(), "Unexpected token '-' at position 6");
}

#[test]
fn non_ascii_character() {
    let err = lex("é").unwrap_err();
    assert_eq!(err.found, 'é');
    assert_eq!(err.span(), 0..2);
}

#[test]
fn integer_overflow() {
    let err = lex("<99999999999999999999999.nil>").unwrap_err();
    assert_eq!(err.to_string(), "Unexpected token '9' at position 1");
    assert_eq!(err.notes.len(), 1);
}

#[test]
fn describe_names_token_classes() {
    assert_eq!(TokenKind::Integer(7).describe(), "integer");
    assert_eq!(ident("x").describe(), "identifier");
    assert_eq!(TokenKind::Dots.describe(), "...");
}
