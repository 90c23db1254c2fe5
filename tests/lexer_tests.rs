use rpal::lexer::{Token, strip_comments};

#[test]
fn lex_keywords() {
    let tokens = Token::lex("let in where within aug fn").unwrap();
    assert_eq!(tokens.len(), 6);
    assert!(matches!(tokens[0], Token::Let(_)));
    assert!(matches!(tokens[1], Token::In(_)));
    assert!(matches!(tokens[2], Token::Where(_)));
    assert!(matches!(tokens[3], Token::Within(_)));
    assert!(matches!(tokens[4], Token::Aug(_)));
    assert!(matches!(tokens[5], Token::FnKw(_)));
}

#[test]
fn lex_identifiers() {
    let tokens = Token::lex("foo Bar_9 nil dummy rec").unwrap();
    assert_eq!(tokens.len(), 5);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "foo"));
    assert!(matches!(&tokens[1], Token::Ident(i) if i.value == "Bar_9"));
    // nil, dummy and rec are ordinary identifiers
    assert!(matches!(&tokens[2], Token::Ident(i) if i.value == "nil"));
    assert!(matches!(&tokens[3], Token::Ident(i) if i.value == "dummy"));
    assert!(matches!(&tokens[4], Token::Ident(i) if i.value == "rec"));
}

#[test]
fn lex_integers() {
    let tokens = Token::lex("42 0 123").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Integer(i) if i.value == "42"));
    assert!(matches!(&tokens[1], Token::Integer(i) if i.value == "0"));
    assert!(matches!(&tokens[2], Token::Integer(i) if i.value == "123"));
}

#[test]
fn lex_booleans() {
    let tokens = Token::lex("true false").unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(tokens[0], Token::True(_)));
    assert!(matches!(tokens[1], Token::False(_)));
}

#[test]
fn lex_worded_operators() {
    let tokens = Token::lex("and or not gr ge ls le eq ne").unwrap();
    assert_eq!(tokens.len(), 9);
    assert!(matches!(tokens[0], Token::And(_)));
    assert!(matches!(tokens[1], Token::Or(_)));
    assert!(matches!(tokens[2], Token::Not(_)));
    assert!(matches!(tokens[3], Token::Gr(_)));
    assert!(matches!(tokens[4], Token::Ge(_)));
    assert!(matches!(tokens[5], Token::Ls(_)));
    assert!(matches!(tokens[6], Token::Le(_)));
    assert!(matches!(tokens[7], Token::EqKw(_)));
    assert!(matches!(tokens[8], Token::Ne(_)));
}

#[test]
fn lex_symbolic_operator_runs() {
    let tokens = Token::lex("-> ** >= = | . @").unwrap();
    assert_eq!(tokens.len(), 7);
    assert!(matches!(&tokens[0], Token::Operator(op) if op.value == "->"));
    assert!(matches!(&tokens[1], Token::Operator(op) if op.value == "**"));
    assert!(matches!(&tokens[2], Token::Operator(op) if op.value == ">="));
    assert!(matches!(&tokens[3], Token::Operator(op) if op.value == "="));
    assert!(matches!(&tokens[4], Token::Operator(op) if op.value == "|"));
    assert!(matches!(&tokens[5], Token::Operator(op) if op.value == "."));
    assert!(matches!(&tokens[6], Token::Operator(op) if op.value == "@"));
}

#[test]
fn operator_run_stops_at_digits() {
    let tokens = Token::lex("n-1").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "n"));
    assert!(matches!(&tokens[1], Token::Operator(op) if op.value == "-"));
    assert!(matches!(&tokens[2], Token::Integer(i) if i.value == "1"));
}

#[test]
fn lex_delimiters_and_comma() {
    let tokens = Token::lex("( ) ,").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(matches!(tokens[0], Token::LParen(_)));
    assert!(matches!(tokens[1], Token::RParen(_)));
    assert!(matches!(tokens[2], Token::Comma(_)));
}

#[test]
fn lex_string_literals() {
    let tokens = Token::lex(r#"'hello' "world""#).unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::SingleQuoteString(_)));
    assert!(matches!(&tokens[1], Token::DoubleQuoteString(_)));
}

#[test]
fn keywords_do_not_swallow_identifier_prefixes() {
    let tokens = Token::lex("letter inner").unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::Ident(i) if i.value == "letter"));
    assert!(matches!(&tokens[1], Token::Ident(i) if i.value == "inner"));
}

#[test]
fn comments_are_stripped_before_lexing() {
    let source = strip_comments("let x = 1 // the whole binding\nin x");
    let tokens = Token::lex(&source).unwrap();

    let has_comment_word = tokens
        .iter()
        .any(|t| matches!(t, Token::Ident(i) if i.value == "whole" || i.value == "binding"));
    assert!(!has_comment_word, "comment tokens should be stripped");
    assert!(tokens.iter().any(|t| matches!(t, Token::In(_))));
}

#[test]
fn unknown_characters_fail() {
    assert!(Token::lex("let x = 1 ; x").is_err());
}
