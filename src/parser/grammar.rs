//! Recursive-descent grammar for RPAL.
//!
//! One function per production, each consuming tokens from the shared
//! [`ParseState`] and returning the AST fragment it recognized. Operator
//! precedence follows the production chain E → Ew → T → Ta → Tc → B → Bt →
//! Bs → Bp → A → At → Af → Ap → R → Rn; definitions follow D → Da → Dr → Db.
//! Worded and symbolic comparators (`gr` / `>`, …) are both accepted and
//! normalized to the worded node label.

use crate::ast::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::lexer::{Token, unescape_string_literal};

use super::ParseState;

fn syntax_error(expected: &str, state: &ParseState) -> Error {
    match state.peek() {
        Some(token) => Error::Syntax(format!(
            "expected {expected}, found {}",
            token.describe()
        )),
        None => Error::Syntax(format!("expected {expected}, found end of input")),
    }
}

/// Consume the next token if it satisfies the predicate, fail otherwise.
fn expect_token(state: &mut ParseState, what: &str, pred: fn(&Token) -> bool) -> Result<Token> {
    match state.next() {
        Some(token) if pred(&token) => Ok(token),
        Some(token) => Err(Error::Syntax(format!(
            "expected {what}, found {}",
            token.describe()
        ))),
        None => Err(Error::Syntax(format!(
            "expected {what}, found end of input"
        ))),
    }
}

fn expect_operator(state: &mut ParseState, symbol: &str) -> Result<()> {
    match state.next() {
        Some(Token::Operator(op)) if op.value == symbol => Ok(()),
        Some(token) => Err(Error::Syntax(format!(
            "expected '{symbol}', found {}",
            token.describe()
        ))),
        None => Err(Error::Syntax(format!(
            "expected '{symbol}', found end of input"
        ))),
    }
}

/// True when the next token is the symbolic operator `symbol`.
fn at_operator(state: &ParseState, symbol: &str) -> bool {
    matches!(state.peek(), Some(Token::Operator(op)) if op.value == symbol)
}

fn identifier_leaf(state: &mut ParseState) -> Result<Node> {
    match state.next() {
        Some(Token::Ident(id)) => Ok(Node::identifier(id.value)),
        Some(token) => Err(Error::Syntax(format!(
            "expected an identifier, found {}",
            token.describe()
        ))),
        None => Err(Error::Syntax(
            "expected an identifier, found end of input".into(),
        )),
    }
}

/// E := "let" D "in" E  =>  let[D, E]
///    | "fn" Vb {Vb} "." E  =>  lambda[Vb…, E]
///    | Ew
pub(crate) fn expression(state: &mut ParseState) -> Result<Node> {
    match state.peek() {
        Some(Token::Let(_)) => {
            state.next();
            let defs = definition(state)?;
            expect_token(state, "'in'", |t| matches!(t, Token::In(_)))?;
            let body = expression(state)?;
            Ok(Node::internal(NodeKind::Let, vec![defs, body]))
        }
        Some(Token::FnKw(_)) => {
            state.next();
            let mut children = Vec::new();
            while matches!(state.peek(), Some(Token::Ident(_)) | Some(Token::LParen(_))) {
                children.push(var_binding(state)?);
            }
            if children.is_empty() {
                return Err(syntax_error("at least one parameter", state));
            }
            expect_operator(state, ".")?;
            children.push(expression(state)?);
            Ok(Node::internal(NodeKind::Lambda, children))
        }
        _ => where_expr(state),
    }
}

/// Ew := T ["where" Dr]  =>  where[T, Dr]
fn where_expr(state: &mut ParseState) -> Result<Node> {
    let body = tuple_expr(state)?;

    if matches!(state.peek(), Some(Token::Where(_))) {
        state.next();
        let defs = recursive_def(state)?;
        return Ok(Node::internal(NodeKind::Where, vec![body, defs]));
    }

    Ok(body)
}

/// T := Ta {"," Ta}  =>  tau[Ta…] when two or more
fn tuple_expr(state: &mut ParseState) -> Result<Node> {
    let first = aug_expr(state)?;

    let mut rest = Vec::new();
    while matches!(state.peek(), Some(Token::Comma(_))) {
        state.next();
        rest.push(aug_expr(state)?);
    }

    if rest.is_empty() {
        return Ok(first);
    }
    let mut elements = vec![first];
    elements.append(&mut rest);
    Ok(Node::internal(NodeKind::Tau, elements))
}

/// Ta := Tc {"aug" Tc}  =>  aug[Ta, Tc], left associative
fn aug_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = cond_expr(state)?;

    while matches!(state.peek(), Some(Token::Aug(_))) {
        state.next();
        let rhs = cond_expr(state)?;
        node = Node::internal(NodeKind::Aug, vec![node, rhs]);
    }

    Ok(node)
}

/// Tc := B ["->" Tc "|" Tc]  =>  ->[B, Tc, Tc]
fn cond_expr(state: &mut ParseState) -> Result<Node> {
    let cond = or_expr(state)?;

    if at_operator(state, "->") {
        state.next();
        let then_branch = cond_expr(state)?;
        expect_operator(state, "|")?;
        let else_branch = cond_expr(state)?;
        return Ok(Node::internal(
            NodeKind::Cond,
            vec![cond, then_branch, else_branch],
        ));
    }

    Ok(cond)
}

/// B := Bt {"or" Bt}
fn or_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = and_expr(state)?;

    while matches!(state.peek(), Some(Token::Or(_))) {
        state.next();
        let rhs = and_expr(state)?;
        node = Node::internal(NodeKind::Or, vec![node, rhs]);
    }

    Ok(node)
}

/// Bt := Bs {"&" Bs}
fn and_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = not_expr(state)?;

    while at_operator(state, "&") {
        state.next();
        let rhs = not_expr(state)?;
        node = Node::internal(NodeKind::Amp, vec![node, rhs]);
    }

    Ok(node)
}

/// Bs := "not" Bp  =>  not[Bp]
///     | Bp
fn not_expr(state: &mut ParseState) -> Result<Node> {
    if matches!(state.peek(), Some(Token::Not(_))) {
        state.next();
        let operand = compare_expr(state)?;
        return Ok(Node::internal(NodeKind::Not, vec![operand]));
    }
    compare_expr(state)
}

fn comparison_kind(token: &Token) -> Option<NodeKind> {
    match token {
        Token::Gr(_) => Some(NodeKind::Gr),
        Token::Ge(_) => Some(NodeKind::Ge),
        Token::Ls(_) => Some(NodeKind::Ls),
        Token::Le(_) => Some(NodeKind::Le),
        Token::EqKw(_) => Some(NodeKind::Eq),
        Token::Ne(_) => Some(NodeKind::Ne),
        Token::Operator(op) => match op.value.as_str() {
            ">" => Some(NodeKind::Gr),
            ">=" => Some(NodeKind::Ge),
            "<" => Some(NodeKind::Ls),
            "<=" => Some(NodeKind::Le),
            "=" => Some(NodeKind::Eq),
            "!=" => Some(NodeKind::Ne),
            _ => None,
        },
        _ => None,
    }
}

/// Bp := A [op A] with op one of gr/>, ge/>=, ls/<, le/<=, eq/=, ne/!=
fn compare_expr(state: &mut ParseState) -> Result<Node> {
    let left = additive_expr(state)?;

    if let Some(kind) = state.peek().and_then(comparison_kind) {
        state.next();
        let right = additive_expr(state)?;
        return Ok(Node::internal(kind, vec![left, right]));
    }

    Ok(left)
}

/// A := ["+"|"-"] At {("+"|"-") At}, a leading "-" producing neg[At]
fn additive_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = if at_operator(state, "+") {
        state.next();
        multiplicative_expr(state)?
    } else if at_operator(state, "-") {
        state.next();
        let operand = multiplicative_expr(state)?;
        Node::internal(NodeKind::Neg, vec![operand])
    } else {
        multiplicative_expr(state)?
    };

    loop {
        let kind = if at_operator(state, "+") {
            NodeKind::Plus
        } else if at_operator(state, "-") {
            NodeKind::Minus
        } else {
            break;
        };
        state.next();
        let rhs = multiplicative_expr(state)?;
        node = Node::internal(kind, vec![node, rhs]);
    }

    Ok(node)
}

/// At := Af {("*"|"/") Af}
fn multiplicative_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = power_expr(state)?;

    loop {
        let kind = if at_operator(state, "*") {
            NodeKind::Star
        } else if at_operator(state, "/") {
            NodeKind::Slash
        } else {
            break;
        };
        state.next();
        let rhs = power_expr(state)?;
        node = Node::internal(kind, vec![node, rhs]);
    }

    Ok(node)
}

/// Af := Ap {"**" Ap}
fn power_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = at_expr(state)?;

    while at_operator(state, "**") {
        state.next();
        let rhs = at_expr(state)?;
        node = Node::internal(NodeKind::Power, vec![node, rhs]);
    }

    Ok(node)
}

/// Ap := R {"@" identifier R}  =>  @[Ap, identifier, R]
fn at_expr(state: &mut ParseState) -> Result<Node> {
    let mut node = application(state)?;

    while at_operator(state, "@") {
        state.next();
        let func = identifier_leaf(state)?;
        let rhs = application(state)?;
        node = Node::internal(NodeKind::At, vec![node, func, rhs]);
    }

    Ok(node)
}

fn starts_operand(token: &Token) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Integer(_)
            | Token::True(_)
            | Token::False(_)
            | Token::DoubleQuoteString(_)
            | Token::SingleQuoteString(_)
            | Token::LParen(_)
    )
}

/// R := Rn {Rn}, juxtaposition building gamma[R, Rn] left associatively
fn application(state: &mut ParseState) -> Result<Node> {
    let mut node = operand(state)?;

    while state.peek().is_some_and(starts_operand) {
        let arg = operand(state)?;
        node = Node::internal(NodeKind::Gamma, vec![node, arg]);
    }

    Ok(node)
}

/// Rn := identifier | integer | string | "true" | "false" | "(" E ")"
///
/// `true` and `false` are the integer literals 1 and 0; `nil` and `dummy`
/// arrive here as plain identifiers and are resolved by the machine.
fn operand(state: &mut ParseState) -> Result<Node> {
    match state.next() {
        Some(Token::Ident(id)) => Ok(Node::identifier(id.value)),
        Some(Token::Integer(int)) => Ok(Node::leaf(NodeKind::Integer, int.value)),
        Some(Token::True(_)) => Ok(Node::leaf(NodeKind::Integer, "1")),
        Some(Token::False(_)) => Ok(Node::leaf(NodeKind::Integer, "0")),
        Some(Token::DoubleQuoteString(s)) => Ok(Node::leaf(
            NodeKind::StringLit,
            unescape_string_literal(&s.value),
        )),
        Some(Token::SingleQuoteString(s)) => Ok(Node::leaf(
            NodeKind::StringLit,
            unescape_string_literal(&s.value),
        )),
        Some(Token::LParen(_)) => {
            let inner = expression(state)?;
            expect_token(state, "')'", |t| matches!(t, Token::RParen(_)))?;
            Ok(inner)
        }
        Some(token) => Err(Error::Syntax(format!(
            "expected an operand, found {}",
            token.describe()
        ))),
        None => Err(Error::Syntax(
            "expected an operand, found end of input".into(),
        )),
    }
}

/// D := Da {"within" D}  =>  within[Da, D]
fn definition(state: &mut ParseState) -> Result<Node> {
    let mut node = simultaneous_defs(state)?;

    while matches!(state.peek(), Some(Token::Within(_))) {
        state.next();
        let rhs = definition(state)?;
        node = Node::internal(NodeKind::Within, vec![node, rhs]);
    }

    Ok(node)
}

/// Da := Dr {"and" Dr}  =>  and[Dr…] when two or more
fn simultaneous_defs(state: &mut ParseState) -> Result<Node> {
    let first = recursive_def(state)?;

    let mut rest = Vec::new();
    while matches!(state.peek(), Some(Token::And(_))) {
        state.next();
        rest.push(recursive_def(state)?);
    }

    if rest.is_empty() {
        return Ok(first);
    }
    let mut defs = vec![first];
    defs.append(&mut rest);
    Ok(Node::internal(NodeKind::And, defs))
}

/// Dr := "rec" Db  =>  rec[Db]
///     | Db
///
/// `rec` is an ordinary identifier token, recognized here by its spelling.
fn recursive_def(state: &mut ParseState) -> Result<Node> {
    if matches!(state.peek(), Some(Token::Ident(id)) if id.value == "rec") {
        state.next();
        let body = def_body(state)?;
        return Ok(Node::internal(NodeKind::Rec, vec![body]));
    }
    def_body(state)
}

/// Db := "(" D ")"
///     | identifier "," Vl "=" E  =>  =[ ","[identifier…], E ]
///     | identifier Vb {Vb} "=" E  =>  fcn_form[identifier, Vb…, E]
///     | identifier "=" E  =>  =[identifier, E]
fn def_body(state: &mut ParseState) -> Result<Node> {
    match state.peek() {
        Some(Token::LParen(_)) => {
            state.next();
            let inner = definition(state)?;
            expect_token(state, "')'", |t| matches!(t, Token::RParen(_)))?;
            Ok(inner)
        }
        Some(Token::Ident(_)) => {
            let name = identifier_leaf(state)?;

            if matches!(state.peek(), Some(Token::Comma(_))) {
                state.next();
                let mut names = vec![name];
                names.extend(var_list(state)?);
                let lhs = Node::internal(NodeKind::Comma, names);
                expect_operator(state, "=")?;
                let value = expression(state)?;
                return Ok(Node::internal(NodeKind::Bind, vec![lhs, value]));
            }

            let mut params = Vec::new();
            while matches!(state.peek(), Some(Token::Ident(_)) | Some(Token::LParen(_))) {
                params.push(var_binding(state)?);
            }

            expect_operator(state, "=")?;
            let value = expression(state)?;

            if params.is_empty() {
                Ok(Node::internal(NodeKind::Bind, vec![name, value]))
            } else {
                let mut children = vec![name];
                children.append(&mut params);
                children.push(value);
                Ok(Node::internal(NodeKind::FcnForm, children))
            }
        }
        _ => Err(syntax_error("an identifier or '('", state)),
    }
}

/// Vb := identifier
///     | "(" ")"  =>  () leaf
///     | "(" identifier ["," Vl] ")"  =>  identifier or ","[identifier…]
fn var_binding(state: &mut ParseState) -> Result<Node> {
    match state.peek() {
        Some(Token::Ident(_)) => identifier_leaf(state),
        Some(Token::LParen(_)) => {
            state.next();

            if matches!(state.peek(), Some(Token::RParen(_))) {
                state.next();
                return Ok(Node::leaf(NodeKind::Unit, "()"));
            }

            let first = identifier_leaf(state)?;
            let node = if matches!(state.peek(), Some(Token::Comma(_))) {
                state.next();
                let mut names = vec![first];
                names.extend(var_list(state)?);
                Node::internal(NodeKind::Comma, names)
            } else {
                first
            };
            expect_token(state, "')'", |t| matches!(t, Token::RParen(_)))?;
            Ok(node)
        }
        _ => Err(syntax_error("an identifier or '('", state)),
    }
}

/// Vl := identifier {"," identifier}
fn var_list(state: &mut ParseState) -> Result<Vec<Node>> {
    let mut names = vec![identifier_leaf(state)?];

    while matches!(state.peek(), Some(Token::Comma(_))) {
        state.next();
        names.push(identifier_leaf(state)?);
    }

    Ok(names)
}
