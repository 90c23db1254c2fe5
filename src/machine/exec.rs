//! The CSE machine
//!
//! State is the classic quadruple: the working control sequence, the value
//! stack, the stack of active environment indices, and the environment
//! arena. One iteration of [`Machine::run`] pops the control's last item and
//! dispatches on it; execution ends when the root environment marker comes
//! off the control.

use std::io::Write;

use tracing::trace;

use crate::error::{Error, Result};

use super::control::{ControlItem, Op};
use super::env::Environments;
use super::value::{Closure, CseValue};

pub struct Machine<'a, W> {
    pub(super) structures: Vec<Vec<ControlItem>>,
    pub(super) control: Vec<ControlItem>,
    pub(super) stack: Vec<CseValue>,
    pub(super) env_stack: Vec<usize>,
    pub(super) envs: Environments,
    pub(super) out: &'a mut W,
}

impl<'a, W: Write> Machine<'a, W> {
    pub fn new(structures: Vec<Vec<ControlItem>>, out: &'a mut W) -> Self {
        Self {
            structures,
            control: Vec::new(),
            stack: Vec::new(),
            env_stack: Vec::new(),
            envs: Environments::new(),
            out,
        }
    }

    /// Run control structure 0 to completion.
    pub fn run(&mut self) -> Result<()> {
        self.control.push(ControlItem::EnvMarker(0));
        self.stack.push(CseValue::EnvMarker(0));
        self.env_stack.push(0);
        self.splice(0)?;

        while let Some(item) = self.control.pop() {
            trace!(?item, "step");
            match item {
                ControlItem::Int(n) => self.stack.push(CseValue::Int(n)),
                ControlItem::Str(s) => self.stack.push(CseValue::Str(s)),
                ControlItem::Name(name) => self.resolve(name)?,
                ControlItem::Lambda { body, vars } => {
                    let env = self.current_env()?;
                    self.stack.push(CseValue::Closure(Closure { body, vars, env }));
                }
                ControlItem::Gamma => self.apply()?,
                ControlItem::Op(op) => self.apply_operator(op)?,
                ControlItem::Tau(n) => self.build_tuple(n)?,
                ControlItem::Beta => self.select_branch()?,
                // the root marker closes the program
                ControlItem::EnvMarker(0) => return Ok(()),
                ControlItem::EnvMarker(_) => self.exit_environment()?,
                ControlItem::Delta(_) => {
                    return Err(Error::Machine(
                        "branch reference on control without a selector".into(),
                    ));
                }
            }
        }

        Err(Error::Machine(
            "control exhausted before the root environment marker".into(),
        ))
    }

    fn current_env(&self) -> Result<usize> {
        self.env_stack
            .last()
            .copied()
            .ok_or_else(|| Error::Machine("environment stack is empty".into()))
    }

    pub(super) fn pop_value(&mut self, what: &str) -> Result<CseValue> {
        self.stack
            .pop()
            .ok_or_else(|| Error::Machine(format!("value stack underflow while evaluating {what}")))
    }

    /// Append control structure `cs` to the working control.
    fn splice(&mut self, cs: usize) -> Result<()> {
        let items = self
            .structures
            .get(cs)
            .ok_or_else(|| Error::Machine(format!("missing control structure {cs}")))?;
        self.control.extend(items.iter().cloned());
        Ok(())
    }

    /// Rule 2: resolve a name against the environment chain, falling back to
    /// `nil` and the built-in functions.
    fn resolve(&mut self, name: String) -> Result<()> {
        let env = self.current_env()?;
        if let Some(value) = self.envs.lookup(env, &name) {
            self.stack.push(value);
        } else if name == "nil" {
            self.stack.push(CseValue::Tuple(Vec::new()));
        } else if super::builtins::is_builtin(&name) {
            self.stack.push(CseValue::Name(name));
        } else {
            return Err(Error::UnboundIdentifier(name));
        }
        Ok(())
    }

    /// Rule 4: apply whatever sits on top of the stack.
    fn apply(&mut self) -> Result<()> {
        let rator = self.pop_value("an application")?;
        match rator {
            CseValue::Closure(closure) => self.apply_closure(closure),
            CseValue::Name(name) => self.apply_builtin(&name),
            CseValue::Eta(closure) => {
                // unfold the fixpoint one step: F (Y* F) …
                self.stack.push(CseValue::Eta(closure.clone()));
                self.stack.push(CseValue::Closure(closure));
                self.control.push(ControlItem::Gamma);
                self.control.push(ControlItem::Gamma);
                Ok(())
            }
            CseValue::Tuple(items) => self.index_tuple(items),
            other => Err(Error::Type(format!("cannot apply {}", other.describe()))),
        }
    }

    /// Bind the argument in a fresh child of the closure's environment and
    /// schedule the body.
    fn apply_closure(&mut self, closure: Closure) -> Result<()> {
        let Closure { body, vars, env } = closure;
        let new_env = self.envs.create(env);
        let rand = self.pop_value("an application")?;

        if vars.len() == 1 {
            let name = vars.into_iter().next().unwrap();
            match rand {
                value @ (CseValue::Int(_) | CseValue::Str(_)) => {
                    self.envs.bind_scalar(new_env, name, value);
                }
                closure @ (CseValue::Closure(_) | CseValue::Eta(_)) => {
                    self.envs.bind_callable(new_env, name, closure);
                }
                CseValue::Tuple(items) => self.envs.bind_list(new_env, name, items),
                other => {
                    return Err(Error::Type(format!(
                        "cannot bind {} to '{name}'",
                        other.describe()
                    )));
                }
            }
        } else {
            let CseValue::Tuple(items) = rand else {
                return Err(Error::Type(format!(
                    "a tuple is required to bind ({})",
                    vars.join(", ")
                )));
            };
            self.destructure(new_env, &vars, items)?;
        }

        self.env_stack.push(new_env);
        self.control.push(ControlItem::EnvMarker(new_env));
        self.splice(body)?;
        self.stack.push(CseValue::EnvMarker(new_env));
        Ok(())
    }

    /// Bind one tuple element per name, routing each into the map matching
    /// its kind; nested tuples are cut out of the flat encoding whole.
    fn destructure(&mut self, env: usize, vars: &[String], items: Vec<CseValue>) -> Result<()> {
        let mut elements = Vec::with_capacity(vars.len());
        let mut pos = 0;
        while pos < items.len() {
            match &items[pos] {
                CseValue::TupleHeader(len) => {
                    let end = pos + 1 + len;
                    let sub = items
                        .get(pos + 1..end)
                        .ok_or_else(|| Error::Machine("malformed tuple encoding".into()))?;
                    elements.push(CseValue::Tuple(sub.to_vec()));
                    pos = end;
                }
                value => {
                    elements.push(value.clone());
                    pos += 1;
                }
            }
        }

        if elements.len() != vars.len() {
            return Err(Error::Type(format!(
                "cannot bind {} names to a tuple of order {}",
                vars.len(),
                elements.len()
            )));
        }

        for (name, value) in vars.iter().zip(elements) {
            match value {
                CseValue::Tuple(sub) => self.envs.bind_list(env, name.clone(), sub),
                closure @ (CseValue::Closure(_) | CseValue::Eta(_)) => {
                    self.envs.bind_callable(env, name.clone(), closure);
                }
                value @ (CseValue::Int(_) | CseValue::Str(_) | CseValue::Bool(_)) => {
                    self.envs.bind_scalar(env, name.clone(), value);
                }
                other => {
                    return Err(Error::Type(format!(
                        "cannot bind {} to '{name}'",
                        other.describe()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rule 5: drop the finished environment, keeping the values it left on
    /// the stack.
    fn exit_environment(&mut self) -> Result<()> {
        let mut kept = Vec::new();
        loop {
            match self.stack.pop() {
                Some(CseValue::EnvMarker(_)) => break,
                Some(value) => kept.push(value),
                None => {
                    return Err(Error::Machine(
                        "no environment marker on the value stack".into(),
                    ));
                }
            }
        }
        while let Some(value) = kept.pop() {
            self.stack.push(value);
        }
        self.env_stack.pop();
        Ok(())
    }

    /// Rule 6: operators. `neg` and `not` take one operand, the rest two,
    /// with the left operand on top of the stack.
    fn apply_operator(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Neg => {
                let value = self.pop_int(op)?;
                let negated = value
                    .checked_neg()
                    .ok_or_else(|| overflow(op))?;
                self.stack.push(CseValue::Int(negated));
                Ok(())
            }
            Op::Not => {
                let value = self.pop_bool(op)?;
                self.stack.push(CseValue::Bool(!value));
                Ok(())
            }
            _ => self.apply_binary(op),
        }
    }

    fn apply_binary(&mut self, op: Op) -> Result<()> {
        let first = self.pop_value("an operator")?;
        let second = self.pop_value("an operator")?;

        let result = match op {
            Op::Add => int_arith(op, &first, &second, i64::checked_add)?,
            Op::Sub => int_arith(op, &first, &second, i64::checked_sub)?,
            Op::Mul => int_arith(op, &first, &second, i64::checked_mul)?,
            Op::Div => {
                if int_operand(op, &second)? == 0 {
                    return Err(Error::Type("division by zero".into()));
                }
                int_arith(op, &first, &second, i64::checked_div)?
            }
            Op::Gr => CseValue::Bool(int_operand(op, &first)? > int_operand(op, &second)?),
            Op::Ge => CseValue::Bool(int_operand(op, &first)? >= int_operand(op, &second)?),
            Op::Ls => CseValue::Bool(int_operand(op, &first)? < int_operand(op, &second)?),
            Op::Le => CseValue::Bool(int_operand(op, &first)? <= int_operand(op, &second)?),
            Op::Eq => CseValue::Bool(text_operand(op, &first)? == text_operand(op, &second)?),
            Op::Ne => CseValue::Bool(text_operand(op, &first)? != text_operand(op, &second)?),
            Op::Or => CseValue::Bool(bool_operand(op, &first)? || bool_operand(op, &second)?),
            Op::And => CseValue::Bool(bool_operand(op, &first)? && bool_operand(op, &second)?),
            Op::Aug => augment(first, second)?,
            Op::Pow => return Err(Error::Type("operator '**' is not supported".into())),
            Op::Neg | Op::Not => {
                return Err(Error::Machine("unary operator in binary position".into()));
            }
        };

        self.stack.push(result);
        Ok(())
    }

    fn pop_int(&mut self, op: Op) -> Result<i64> {
        let value = self.pop_value("an operator")?;
        int_operand(op, &value)
    }

    fn pop_bool(&mut self, op: Op) -> Result<bool> {
        let value = self.pop_value("an operator")?;
        bool_operand(op, &value)
    }

    /// Rule 7: gather `n` stack values into a tuple, inlining tuple values
    /// behind a length header.
    fn build_tuple(&mut self, n: usize) -> Result<()> {
        let mut elements = Vec::new();
        for _ in 0..n {
            match self.pop_value("a tuple constructor")? {
                CseValue::Tuple(items) => {
                    elements.push(CseValue::TupleHeader(items.len()));
                    elements.extend(items);
                }
                value => elements.push(value),
            }
        }
        self.stack.push(CseValue::Tuple(elements));
        Ok(())
    }

    /// Rule 8: pick the branch named by the matching `Delta`. The control
    /// holds `…, Delta(then), Delta(else)` at this point.
    fn select_branch(&mut self) -> Result<()> {
        let take_then = match self.pop_value("a conditional")? {
            CseValue::Bool(b) => b,
            CseValue::Int(n) => n != 0,
            other => {
                return Err(Error::Type(format!(
                    "conditional test must be a truth value or integer, found {}",
                    other.describe()
                )));
            }
        };

        let else_target = self.pop_delta()?;
        let then_target = self.pop_delta()?;
        self.splice(if take_then { then_target } else { else_target })
    }

    fn pop_delta(&mut self) -> Result<usize> {
        match self.control.pop() {
            Some(ControlItem::Delta(target)) => Ok(target),
            _ => Err(Error::Machine(
                "conditional selector without branch references".into(),
            )),
        }
    }

    /// Applying a tuple selects the 1-based element given by the argument.
    fn index_tuple(&mut self, items: Vec<CseValue>) -> Result<()> {
        let index = match self.pop_value("a tuple selection")? {
            CseValue::Int(n) if n >= 1 => n as usize,
            CseValue::Int(n) => {
                return Err(Error::Index(format!(
                    "tuple index must be positive, got {n}"
                )));
            }
            other => {
                return Err(Error::Index(format!(
                    "tuple index must be an integer, found {}",
                    other.describe()
                )));
            }
        };

        let mut pos = 0;
        let mut current = 0;
        while pos < items.len() {
            current += 1;
            match &items[pos] {
                CseValue::TupleHeader(len) => {
                    let end = pos + 1 + len;
                    if current == index {
                        let sub = items
                            .get(pos + 1..end)
                            .ok_or_else(|| Error::Machine("malformed tuple encoding".into()))?;
                        self.stack.push(CseValue::Tuple(sub.to_vec()));
                        return Ok(());
                    }
                    pos = end;
                }
                value => {
                    if current == index {
                        self.stack.push(value.clone());
                        return Ok(());
                    }
                    pos += 1;
                }
            }
        }

        Err(Error::Index(format!(
            "index {index} is out of range for a tuple of order {current}"
        )))
    }
}

fn overflow(op: Op) -> Error {
    Error::Type(format!("integer overflow in '{}'", op.symbol()))
}

fn int_operand(op: Op, value: &CseValue) -> Result<i64> {
    match value {
        CseValue::Int(n) => Ok(*n),
        other => Err(Error::Type(format!(
            "'{}' requires integer operands, found {}",
            op.symbol(),
            other.describe()
        ))),
    }
}

fn bool_operand(op: Op, value: &CseValue) -> Result<bool> {
    match value {
        CseValue::Bool(b) => Ok(*b),
        other => Err(Error::Type(format!(
            "'{}' requires truth value operands, found {}",
            op.symbol(),
            other.describe()
        ))),
    }
}

fn text_operand(op: Op, value: &CseValue) -> Result<String> {
    value.text().ok_or_else(|| {
        Error::Type(format!(
            "'{}' cannot compare {}",
            op.symbol(),
            value.describe()
        ))
    })
}

fn int_arith(
    op: Op,
    first: &CseValue,
    second: &CseValue,
    apply: fn(i64, i64) -> Option<i64>,
) -> Result<CseValue> {
    let a = int_operand(op, first)?;
    let b = int_operand(op, second)?;
    apply(a, b).map(CseValue::Int).ok_or_else(|| overflow(op))
}

/// `aug`: extend a tuple with one more element, inlining a tuple argument
/// behind a length header.
fn augment(first: CseValue, second: CseValue) -> Result<CseValue> {
    let mut items = match first {
        CseValue::Tuple(items) => items,
        other => {
            return Err(Error::Type(format!(
                "'aug' requires a tuple on the left, found {}",
                other.describe()
            )));
        }
    };

    match second {
        CseValue::Tuple(sub) => {
            items.push(CseValue::TupleHeader(sub.len()));
            items.extend(sub);
        }
        value @ (CseValue::Int(_) | CseValue::Str(_) | CseValue::Bool(_)) => items.push(value),
        other => {
            return Err(Error::Type(format!(
                "'aug' cannot append {}",
                other.describe()
            )));
        }
    }

    Ok(CseValue::Tuple(items))
}
