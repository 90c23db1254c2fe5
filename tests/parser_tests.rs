use rpal::Error;
use rpal::ast::{Node, NodeKind};
use rpal::lexer::Token;
use rpal::parser::{ParseState, parse};

fn parse_source(source: &str) -> Result<Node, Error> {
    let tokens = Token::lex(source).expect("lexing failed");
    let mut state = ParseState::new(tokens);
    parse(&mut state)
}

fn parsed(source: &str) -> Node {
    parse_source(source).expect("parsing failed")
}

fn ident(name: &str) -> Node {
    Node::identifier(name)
}

fn int(value: &str) -> Node {
    Node::leaf(NodeKind::Integer, value)
}

#[test]
fn parse_state_cursor_can_be_saved_and_restored() {
    let tokens = Token::lex("let x").unwrap();
    let mut state = ParseState::new(tokens);

    let start = state.position();
    assert!(matches!(state.next(), Some(Token::Let(_))));

    state.restore(start);
    assert!(matches!(state.next(), Some(Token::Let(_))));
    assert!(matches!(state.next(), Some(Token::Ident(_))));
    assert!(!state.has_next());
}

#[test]
fn let_builds_binding_and_body() {
    let ast = parsed("let x = 3 in x");
    assert_eq!(
        ast,
        Node::internal(
            NodeKind::Let,
            vec![
                Node::internal(NodeKind::Bind, vec![ident("x"), int("3")]),
                ident("x"),
            ],
        )
    );
}

#[test]
fn fn_builds_lambda_with_all_parameters() {
    let ast = parsed("fn x y . x");
    assert_eq!(
        ast,
        Node::internal(NodeKind::Lambda, vec![ident("x"), ident("y"), ident("x")]),
    );
}

#[test]
fn where_attaches_definition_after_body() {
    let ast = parsed("x where x = 3");
    assert_eq!(
        ast,
        Node::internal(
            NodeKind::Where,
            vec![
                ident("x"),
                Node::internal(NodeKind::Bind, vec![ident("x"), int("3")]),
            ],
        )
    );
}

#[test]
fn comma_list_builds_tau() {
    let ast = parsed("1, 2, 3");
    assert_eq!(
        ast,
        Node::internal(NodeKind::Tau, vec![int("1"), int("2"), int("3")]),
    );
}

#[test]
fn conditional_has_three_children() {
    let ast = parsed("1 -> 2 | 3");
    assert_eq!(
        ast,
        Node::internal(NodeKind::Cond, vec![int("1"), int("2"), int("3")]),
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let ast = parsed("2 + 3 * 4");
    assert_eq!(
        ast,
        Node::internal(
            NodeKind::Plus,
            vec![
                int("2"),
                Node::internal(NodeKind::Star, vec![int("3"), int("4")]),
            ],
        )
    );
}

#[test]
fn subtraction_is_left_associative() {
    let ast = parsed("10 - 2 - 3");
    assert_eq!(
        ast,
        Node::internal(
            NodeKind::Minus,
            vec![
                Node::internal(NodeKind::Minus, vec![int("10"), int("2")]),
                int("3"),
            ],
        )
    );
}

#[test]
fn symbolic_comparators_normalize_to_worded_labels() {
    assert_eq!(parsed("1 > 2").kind, NodeKind::Gr);
    assert_eq!(parsed("1 gr 2").kind, NodeKind::Gr);
    assert_eq!(parsed("1 <= 2").kind, NodeKind::Le);
    assert_eq!(parsed("1 = 2").kind, NodeKind::Eq);
    assert_eq!(parsed("1 != 2").kind, NodeKind::Ne);
}

#[test]
fn leading_minus_builds_neg() {
    let ast = parsed("- 3");
    assert_eq!(ast, Node::internal(NodeKind::Neg, vec![int("3")]));

    // unary plus is dropped
    assert_eq!(parsed("+ 3"), int("3"));
}

#[test]
fn not_wraps_comparison() {
    let ast = parsed("not 1 eq 2");
    assert_eq!(
        ast,
        Node::internal(
            NodeKind::Not,
            vec![Node::internal(NodeKind::Eq, vec![int("1"), int("2")])],
        )
    );
}

#[test]
fn juxtaposition_is_left_associative_application() {
    let ast = parsed("f x y");
    assert_eq!(
        ast,
        Node::internal(
            NodeKind::Gamma,
            vec![
                Node::internal(NodeKind::Gamma, vec![ident("f"), ident("x")]),
                ident("y"),
            ],
        )
    );
}

#[test]
fn at_builds_infix_application() {
    let ast = parsed("1 @f 2");
    assert_eq!(
        ast,
        Node::internal(NodeKind::At, vec![int("1"), ident("f"), int("2")]),
    );
}

#[test]
fn true_and_false_parse_as_integers() {
    assert_eq!(parsed("true"), int("1"));
    assert_eq!(parsed("false"), int("0"));
}

#[test]
fn string_literal_is_unescaped() {
    let ast = parsed(r"'a\tb'");
    assert_eq!(ast, Node::leaf(NodeKind::StringLit, "a\tb"));
}

#[test]
fn function_form_collects_parameters() {
    let ast = parsed("let f x y = x in f");
    assert_eq!(
        ast.children[0],
        Node::internal(
            NodeKind::FcnForm,
            vec![ident("f"), ident("x"), ident("y"), ident("x")],
        )
    );
}

#[test]
fn tuple_binding_builds_comma_group() {
    let ast = parsed("let x, y = p in x");
    assert_eq!(
        ast.children[0],
        Node::internal(
            NodeKind::Bind,
            vec![
                Node::internal(NodeKind::Comma, vec![ident("x"), ident("y")]),
                ident("p"),
            ],
        )
    );
}

#[test]
fn parenthesized_parameter_pair() {
    let ast = parsed("let f (a, b) = a in f");
    assert_eq!(
        ast.children[0],
        Node::internal(
            NodeKind::FcnForm,
            vec![
                ident("f"),
                Node::internal(NodeKind::Comma, vec![ident("a"), ident("b")]),
                ident("a"),
            ],
        )
    );
}

#[test]
fn unit_parameter_parses() {
    let ast = parsed("let f () = 3 in f");
    assert_eq!(
        ast.children[0],
        Node::internal(
            NodeKind::FcnForm,
            vec![ident("f"), Node::leaf(NodeKind::Unit, "()"), int("3")],
        )
    );
}

#[test]
fn and_gathers_simultaneous_definitions() {
    let ast = parsed("let x = 1 and y = 2 in x");
    let defs = &ast.children[0];
    assert_eq!(defs.kind, NodeKind::And);
    assert_eq!(defs.children.len(), 2);
    assert_eq!(defs.children[0].kind, NodeKind::Bind);
    assert_eq!(defs.children[1].kind, NodeKind::Bind);
}

#[test]
fn rec_marks_recursive_definition() {
    let ast = parsed("let rec f n = n in f");
    let def = &ast.children[0];
    assert_eq!(def.kind, NodeKind::Rec);
    assert_eq!(def.children[0].kind, NodeKind::FcnForm);
}

#[test]
fn within_nests_definitions() {
    let ast = parsed("let x = 1 within y = x in y");
    let def = &ast.children[0];
    assert_eq!(def.kind, NodeKind::Within);
    assert_eq!(def.children.len(), 2);
}

#[test]
fn trailing_tokens_are_rejected() {
    assert!(matches!(parse_source("1 )"), Err(Error::Syntax(_))));
}

#[test]
fn missing_in_is_rejected() {
    assert!(matches!(parse_source("let x = 1 x"), Err(Error::Syntax(_))));
}

#[test]
fn missing_else_branch_is_rejected() {
    assert!(matches!(parse_source("1 -> 2"), Err(Error::Syntax(_))));
}

#[test]
fn fn_requires_a_parameter() {
    assert!(matches!(parse_source("fn . 1"), Err(Error::Syntax(_))));
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(parse_source(""), Err(Error::Syntax(_))));
}
