//! Standardization - rewrite the AST into the standardized tree (ST)
//!
//! A single post-order pass removes every sugar form, so the remaining node
//! set is {lambda, gamma, =, tau, ->, operators, leaves}:
//! - `let` / `where` become an application of a lambda
//! - `fcn_form` and multi-parameter `lambda` curry into nested
//!   single-binder lambdas
//! - `within` nests one binding inside the other
//! - `@` becomes two applications
//! - `and` collapses simultaneous bindings into one `,` / `tau` pair
//! - `rec` routes the binding through the `Y*` fixpoint combinator
//!
//! The pass is idempotent on trees that are already standardized.

use crate::ast::{Node, NodeKind};
use crate::error::{Error, Result};

/// Standardize a whole tree. Children are rewritten before their parent, so
/// every rule can assume its subtrees are already in ST form.
pub fn standardize(node: Node) -> Result<Node> {
    let Node {
        kind,
        value,
        children,
    } = node;

    let children = children
        .into_iter()
        .map(standardize)
        .collect::<Result<Vec<_>>>()?;

    match kind {
        NodeKind::Let => rewrite_let(children),
        NodeKind::Where => rewrite_where(children),
        NodeKind::FcnForm => rewrite_fcn_form(children),
        NodeKind::Lambda => rewrite_lambda(children),
        NodeKind::Within => rewrite_within(children),
        NodeKind::At => rewrite_at(children),
        NodeKind::And => rewrite_and(children),
        NodeKind::Rec => rewrite_rec(children),
        _ => Ok(Node {
            kind,
            value,
            children,
        }),
    }
}

fn gamma(rator: Node, rand: Node) -> Node {
    Node::internal(NodeKind::Gamma, vec![rator, rand])
}

fn lambda(param: Node, body: Node) -> Node {
    Node::internal(NodeKind::Lambda, vec![param, body])
}

fn bind(lhs: Node, rhs: Node) -> Node {
    Node::internal(NodeKind::Bind, vec![lhs, rhs])
}

/// lambda(p1, lambda(p2, … lambda(pn, body)))
fn curry(params: Vec<Node>, body: Node) -> Node {
    params
        .into_iter()
        .rev()
        .fold(body, |inner, param| lambda(param, inner))
}

fn take2(children: Vec<Node>, label: &str) -> Result<(Node, Node)> {
    let mut children = children.into_iter();
    match (children.next(), children.next(), children.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(Error::Standardize(format!(
            "'{label}' node must have exactly 2 children"
        ))),
    }
}

/// Split an `=` node into its name part and value part.
fn split_binding(node: Node, context: &str) -> Result<(Node, Node)> {
    if node.kind != NodeKind::Bind {
        return Err(Error::Standardize(format!(
            "'{context}' requires an '=' child, found '{}'",
            node.kind
        )));
    }
    take2(node.children, "=")
}

/// let(=(X, E), P)  =>  gamma(lambda(X, P), E)
fn rewrite_let(children: Vec<Node>) -> Result<Node> {
    let (def, body) = take2(children, "let")?;
    let (name, value) = split_binding(def, "let")?;
    Ok(gamma(lambda(name, body), value))
}

/// where(P, =(X, E))  =>  gamma(lambda(X, P), E)
fn rewrite_where(children: Vec<Node>) -> Result<Node> {
    let (body, def) = take2(children, "where")?;
    let (name, value) = split_binding(def, "where")?;
    Ok(gamma(lambda(name, body), value))
}

/// fcn_form(f, V1, …, Vn, E)  =>  =(f, lambda(V1, … lambda(Vn, E)))
fn rewrite_fcn_form(mut children: Vec<Node>) -> Result<Node> {
    if children.len() < 3 {
        return Err(Error::Standardize(
            "'fcn_form' node must have at least 3 children".into(),
        ));
    }
    let body = children.pop().unwrap();
    let name = children.remove(0);
    Ok(bind(name, curry(children, body)))
}

/// lambda(V1, …, Vn, E)  =>  lambda(V1, … lambda(Vn, E))
///
/// Each binder may be an identifier, a `,` group or `()`; a two-child
/// lambda is already in ST form and passes through unchanged.
fn rewrite_lambda(mut children: Vec<Node>) -> Result<Node> {
    if children.len() < 2 {
        return Err(Error::Standardize(
            "'lambda' node must have at least 2 children".into(),
        ));
    }
    let body = children.pop().unwrap();
    Ok(curry(children, body))
}

/// within(=(X1, E1), =(X2, E2))  =>  =(X2, gamma(lambda(X1, E2), E1))
fn rewrite_within(children: Vec<Node>) -> Result<Node> {
    let (outer, inner) = take2(children, "within")?;
    let (outer_name, outer_value) = split_binding(outer, "within")?;
    let (inner_name, inner_value) = split_binding(inner, "within")?;
    Ok(bind(
        inner_name,
        gamma(lambda(outer_name, inner_value), outer_value),
    ))
}

/// @(E1, N, E2)  =>  gamma(gamma(N, E1), E2)
fn rewrite_at(children: Vec<Node>) -> Result<Node> {
    let mut children = children.into_iter();
    match (
        children.next(),
        children.next(),
        children.next(),
        children.next(),
    ) {
        (Some(left), Some(func), Some(right), None) => Ok(gamma(gamma(func, left), right)),
        _ => Err(Error::Standardize(
            "'@' node must have exactly 3 children".into(),
        )),
    }
}

/// and(=(X1, E1), …, =(Xn, En))  =>  =(,(X1, …, Xn), tau(E1, …, En))
fn rewrite_and(children: Vec<Node>) -> Result<Node> {
    if children.len() < 2 {
        return Err(Error::Standardize(
            "'and' node must have at least 2 children".into(),
        ));
    }

    let mut names = Vec::with_capacity(children.len());
    let mut values = Vec::with_capacity(children.len());
    for child in children {
        let (name, value) = split_binding(child, "and")?;
        names.push(name);
        values.push(value);
    }

    Ok(bind(
        Node::internal(NodeKind::Comma, names),
        Node::internal(NodeKind::Tau, values),
    ))
}

/// rec(=(X, E))  =>  =(X, gamma(Y*, lambda(X, E)))
fn rewrite_rec(children: Vec<Node>) -> Result<Node> {
    let mut children = children.into_iter();
    match (children.next(), children.next()) {
        (Some(def), None) => {
            let (name, value) = split_binding(def, "rec")?;
            let fixpoint = gamma(Node::identifier("Y*"), lambda(name.clone(), value));
            Ok(bind(name, fixpoint))
        }
        _ => Err(Error::Standardize(
            "'rec' node must have exactly 1 child".into(),
        )),
    }
}
