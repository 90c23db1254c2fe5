//! Built-in functions
//!
//! These run when an application's rator is an unresolved name. `Print`
//! owns the output formatting rules, including the flat-tuple decoding.

use std::io::Write;

use crate::error::{Error, Result};

use super::control::ControlItem;
use super::exec::Machine;
use super::value::{Closure, CseValue};

/// Names the machine falls back to when no environment binding matches.
pub(crate) const BUILTIN_NAMES: &[&str] = &[
    "Print",
    "print",
    "Order",
    "Y*",
    "Conc",
    "Stem",
    "Stern",
    "Isinteger",
    "Isstring",
    "Istuple",
    "Isempty",
    "dummy",
    "ItoS",
];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

impl<W: Write> Machine<'_, W> {
    pub(super) fn apply_builtin(&mut self, name: &str) -> Result<()> {
        match name {
            "Print" | "print" => self.builtin_print(),
            "Isinteger" => self.builtin_test(|value| matches!(value, CseValue::Int(_))),
            "Isstring" => self.builtin_test(|value| matches!(value, CseValue::Str(_))),
            "Istuple" => self.builtin_test(|value| matches!(value, CseValue::Tuple(_))),
            "Isempty" => self.builtin_isempty(),
            "Order" => self.builtin_order(),
            "Conc" => self.builtin_conc(),
            "Stem" => self.builtin_stem(),
            "Stern" => self.builtin_stern(),
            "ItoS" => self.builtin_itos(),
            "Y*" => self.builtin_fixpoint(),
            _ => Err(Error::Type(format!("'{name}' is not callable"))),
        }
    }

    fn builtin_print(&mut self) -> Result<()> {
        let value = self.pop_value("'Print'")?;
        write_value(&mut *self.out, &value)?;
        // the result must be bindable, so `let _ = Print e in …` sequences
        self.stack.push(CseValue::Str("dummy".into()));
        Ok(())
    }

    fn builtin_test(&mut self, pred: fn(&CseValue) -> bool) -> Result<()> {
        let value = self.pop_value("a built-in")?;
        self.stack.push(CseValue::Bool(pred(&value)));
        Ok(())
    }

    fn builtin_isempty(&mut self) -> Result<()> {
        match self.pop_value("'Isempty'")? {
            CseValue::Tuple(items) => {
                self.stack.push(CseValue::Bool(items.is_empty()));
                Ok(())
            }
            other => Err(Error::Type(format!(
                "'Isempty' requires a tuple, found {}",
                other.describe()
            ))),
        }
    }

    fn builtin_order(&mut self) -> Result<()> {
        match self.pop_value("'Order'")? {
            CseValue::Tuple(items) => {
                self.stack.push(CseValue::Int(tuple_order(&items) as i64));
                Ok(())
            }
            other => Err(Error::Type(format!(
                "'Order' requires a tuple, found {}",
                other.describe()
            ))),
        }
    }

    /// `Conc` is the one curried built-in: its second argument arrives
    /// through a second application, whose `Gamma` is consumed here.
    fn builtin_conc(&mut self) -> Result<()> {
        let first = self.pop_value("'Conc'")?;
        let second = self.pop_value("'Conc'")?;
        match self.control.pop() {
            Some(ControlItem::Gamma) => {}
            _ => {
                return Err(Error::Machine(
                    "'Conc' requires both of its arguments at once".into(),
                ));
            }
        }

        let prefix = match first {
            CseValue::Str(s) => s,
            other => {
                return Err(Error::Type(format!(
                    "'Conc' requires a string, found {}",
                    other.describe()
                )));
            }
        };
        let suffix = match second {
            CseValue::Str(s) => s,
            CseValue::Int(n) => n.to_string(),
            other => {
                return Err(Error::Type(format!(
                    "'Conc' cannot append {}",
                    other.describe()
                )));
            }
        };

        self.stack.push(CseValue::Str(prefix + &suffix));
        Ok(())
    }

    fn builtin_stem(&mut self) -> Result<()> {
        let s = self.pop_string("'Stem'")?;
        let head = s.chars().next().map(String::from).unwrap_or_default();
        self.stack.push(CseValue::Str(head));
        Ok(())
    }

    fn builtin_stern(&mut self) -> Result<()> {
        let s = self.pop_string("'Stern'")?;
        let mut chars = s.chars();
        chars.next();
        self.stack.push(CseValue::Str(chars.as_str().to_string()));
        Ok(())
    }

    fn builtin_itos(&mut self) -> Result<()> {
        match self.pop_value("'ItoS'")? {
            CseValue::Int(n) => {
                self.stack.push(CseValue::Str(n.to_string()));
                Ok(())
            }
            other => Err(Error::Type(format!(
                "'ItoS' requires an integer, found {}",
                other.describe()
            ))),
        }
    }

    fn builtin_fixpoint(&mut self) -> Result<()> {
        match self.pop_value("'Y*'")? {
            CseValue::Closure(closure) => {
                self.stack.push(CseValue::Eta(closure));
                Ok(())
            }
            other => Err(Error::Type(format!(
                "'Y*' requires a function, found {}",
                other.describe()
            ))),
        }
    }

    fn pop_string(&mut self, what: &str) -> Result<String> {
        match self.pop_value(what)? {
            CseValue::Str(s) => Ok(s),
            other => Err(Error::Type(format!(
                "{what} requires a string, found {}",
                other.describe()
            ))),
        }
    }
}

/// Outer arity of a flat-encoded tuple: one per scalar, one per inlined
/// sub-tuple (whose payload is skipped).
fn tuple_order(items: &[CseValue]) -> usize {
    let mut pos = 0;
    let mut count = 0;
    while pos < items.len() {
        count += 1;
        match &items[pos] {
            CseValue::TupleHeader(len) => pos += len + 1,
            _ => pos += 1,
        }
    }
    count
}

/// Format a value the way `Print` emits it.
fn write_value<W: Write>(out: &mut W, value: &CseValue) -> Result<()> {
    match value {
        CseValue::Tuple(items) => write_tuple(out, items, false),
        _ => write_element(out, value),
    }
}

fn write_element<W: Write>(out: &mut W, value: &CseValue) -> Result<()> {
    match value {
        CseValue::Int(n) => write!(out, "{n}")?,
        CseValue::Str(s) => write!(out, "{s}")?,
        CseValue::Bool(b) => write!(out, "{b}")?,
        CseValue::Name(name) => write!(out, "{name}")?,
        CseValue::Closure(closure) | CseValue::Eta(closure) => write_closure(out, closure)?,
        CseValue::Tuple(_) | CseValue::TupleHeader(_) | CseValue::EnvMarker(_) => {
            return Err(Error::Machine("unprintable machine item".into()));
        }
    }
    Ok(())
}

fn write_closure<W: Write>(out: &mut W, closure: &Closure) -> Result<()> {
    let var = closure.vars.first().map(String::as_str).unwrap_or("");
    write!(out, "[lambda closure: {var}: {}]", closure.body)?;
    Ok(())
}

/// Tuples print as `(e1, e2, …)` recursively. An empty tuple prints `nil`
/// when nested and `()` at the top level.
fn write_tuple<W: Write>(out: &mut W, items: &[CseValue], nested: bool) -> Result<()> {
    if nested && items.is_empty() {
        write!(out, "nil")?;
        return Ok(());
    }

    write!(out, "(")?;
    let mut pos = 0;
    let mut first = true;
    while pos < items.len() {
        if !first {
            write!(out, ", ")?;
        }
        first = false;

        match &items[pos] {
            CseValue::TupleHeader(len) => {
                let end = pos + 1 + len;
                let sub = items
                    .get(pos + 1..end)
                    .ok_or_else(|| Error::Machine("malformed tuple encoding".into()))?;
                write_tuple(out, sub, true)?;
                pos = end;
            }
            value => {
                write_element(out, value)?;
                pos += 1;
            }
        }
    }
    write!(out, ")")?;
    Ok(())
}
