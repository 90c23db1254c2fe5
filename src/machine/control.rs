//! Control structures
//!
//! The flattener walks the standardized tree and emits one control structure
//! per lambda body and per conditional branch, indexed from 0 (the root).
//! Each structure is a sequence of [`ControlItem`]s the machine later pops
//! from the right, so a marker always precedes the items of its operands.

use crate::ast::{Node, NodeKind};
use crate::error::{Error, Result};

/// Operators the machine evaluates. `Pow` is recognized by the grammar and
/// flattens like any other operator but has no evaluation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Not,
    Eq,
    Ne,
    Gr,
    Ge,
    Ls,
    Le,
    Or,
    And,
    Aug,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "**",
            Op::Neg => "neg",
            Op::Not => "not",
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gr => "gr",
            Op::Ge => "ge",
            Op::Ls => "ls",
            Op::Le => "le",
            Op::Or => "or",
            Op::And => "&",
            Op::Aug => "aug",
        }
    }
}

fn operator_of(kind: NodeKind) -> Option<Op> {
    match kind {
        NodeKind::Plus => Some(Op::Add),
        NodeKind::Minus => Some(Op::Sub),
        NodeKind::Star => Some(Op::Mul),
        NodeKind::Slash => Some(Op::Div),
        NodeKind::Power => Some(Op::Pow),
        NodeKind::Neg => Some(Op::Neg),
        NodeKind::Not => Some(Op::Not),
        NodeKind::Eq => Some(Op::Eq),
        NodeKind::Ne => Some(Op::Ne),
        NodeKind::Gr => Some(Op::Gr),
        NodeKind::Ge => Some(Op::Ge),
        NodeKind::Ls => Some(Op::Ls),
        NodeKind::Le => Some(Op::Le),
        NodeKind::Or => Some(Op::Or),
        NodeKind::Amp => Some(Op::And),
        NodeKind::Aug => Some(Op::Aug),
        _ => None,
    }
}

/// One entry of a control structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlItem {
    Int(i64),
    Str(String),
    /// A name to resolve against the environment chain.
    Name(String),
    Op(Op),
    /// Application marker.
    Gamma,
    /// Conditional selector; consumes the two preceding `Delta`s.
    Beta,
    /// Tuple constructor for `n` stack values.
    Tau(usize),
    /// Reference to another control structure, used by `Beta`.
    Delta(usize),
    /// Closure template; the machine fills in the environment when the item
    /// reaches the stack.
    Lambda { body: usize, vars: Vec<String> },
    EnvMarker(usize),
}

/// Translate a standardized tree into its control structures. Index 0 holds
/// the root expression.
pub fn flatten(root: &Node) -> Result<Vec<Vec<ControlItem>>> {
    let mut structures = vec![Vec::new()];
    emit(root, 0, &mut structures)?;
    Ok(structures)
}

fn emit(node: &Node, cs: usize, structures: &mut Vec<Vec<ControlItem>>) -> Result<()> {
    match node.kind {
        NodeKind::Lambda => {
            let [binder, body_expr] = node.children.as_slice() else {
                return Err(Error::Flatten(
                    "'lambda' node must have exactly 2 children".into(),
                ));
            };
            let vars = binder_names(binder)?;
            let body = structures.len();
            structures.push(Vec::new());
            structures[cs].push(ControlItem::Lambda { body, vars });
            emit(body_expr, body, structures)
        }
        NodeKind::Tau => {
            structures[cs].push(ControlItem::Tau(node.children.len()));
            for child in &node.children {
                emit(child, cs, structures)?;
            }
            Ok(())
        }
        NodeKind::Cond => {
            let [cond, then_expr, else_expr] = node.children.as_slice() else {
                return Err(Error::Flatten(
                    "'->' node must have exactly 3 children".into(),
                ));
            };
            let then_cs = structures.len();
            structures.push(Vec::new());
            let else_cs = structures.len();
            structures.push(Vec::new());

            structures[cs].push(ControlItem::Delta(then_cs));
            structures[cs].push(ControlItem::Delta(else_cs));
            structures[cs].push(ControlItem::Beta);

            emit(then_expr, then_cs, structures)?;
            emit(else_expr, else_cs, structures)?;
            emit(cond, cs, structures)
        }
        NodeKind::Gamma => {
            structures[cs].push(ControlItem::Gamma);
            for child in &node.children {
                emit(child, cs, structures)?;
            }
            Ok(())
        }
        NodeKind::Identifier => {
            structures[cs].push(ControlItem::Name(node.text().to_string()));
            Ok(())
        }
        NodeKind::Integer => {
            let value = node.text().parse::<i64>().map_err(|_| {
                Error::Flatten(format!("integer literal '{}' is out of range", node.text()))
            })?;
            structures[cs].push(ControlItem::Int(value));
            Ok(())
        }
        NodeKind::StringLit => {
            structures[cs].push(ControlItem::Str(node.text().to_string()));
            Ok(())
        }
        kind if kind.is_operator() => {
            let Some(op) = operator_of(kind) else {
                return Err(Error::Flatten(format!("unknown operator '{kind}'")));
            };
            structures[cs].push(ControlItem::Op(op));
            for child in &node.children {
                emit(child, cs, structures)?;
            }
            Ok(())
        }
        kind => Err(Error::Flatten(format!(
            "unexpected '{kind}' node in standardized tree"
        ))),
    }
}

/// Bound variables of a lambda binder: a single identifier, a `,` group of
/// identifiers, or the unreferencable `()` binder.
fn binder_names(binder: &Node) -> Result<Vec<String>> {
    match binder.kind {
        NodeKind::Identifier | NodeKind::Unit => Ok(vec![binder.text().to_string()]),
        NodeKind::Comma => binder
            .children
            .iter()
            .map(|child| {
                if child.kind == NodeKind::Identifier {
                    Ok(child.text().to_string())
                } else {
                    Err(Error::Flatten(format!(
                        "'{}' cannot appear in a ',' binder",
                        child.kind
                    )))
                }
            })
            .collect(),
        kind => Err(Error::Flatten(format!("invalid lambda binder '{kind}'"))),
    }
}
