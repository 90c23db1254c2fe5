//! Environment tree of the CSE machine
//!
//! Environments are stored in one flat, index-keyed arena; parents and the
//! environments captured by closures are plain indices. Recursive
//! definitions therefore form cyclic reference structure without cyclic
//! ownership.

use std::collections::HashMap;

use super::value::CseValue;

/// One scope frame. Bindings live in three disjoint maps keyed by the kind
/// of the bound value: scalars, functions, tuples.
#[derive(Debug, Default)]
struct Environment {
    parent: Option<usize>,
    variables: HashMap<String, CseValue>,
    lambdas: HashMap<String, CseValue>,
    lists: HashMap<String, Vec<CseValue>>,
}

#[derive(Debug)]
pub struct Environments {
    envs: Vec<Environment>,
}

impl Environments {
    /// A store holding only the empty root environment, index 0.
    pub fn new() -> Self {
        Self {
            envs: vec![Environment::default()],
        }
    }

    /// Allocate a child of `parent` and return its index. Indices increase
    /// monotonically and are never reused.
    pub fn create(&mut self, parent: usize) -> usize {
        let id = self.envs.len();
        self.envs.push(Environment {
            parent: Some(parent),
            ..Environment::default()
        });
        id
    }

    /// Resolve `name` starting from `env`. Resolution is map-major: the
    /// `variables` of the whole parent chain are consulted first, then
    /// `lambdas`, then `lists`. Within one map the innermost environment
    /// wins, and a bound tuple is returned as a `Tuple` value.
    pub fn lookup(&self, env: usize, name: &str) -> Option<CseValue> {
        self.walk(env, |frame| frame.variables.get(name).cloned())
            .or_else(|| self.walk(env, |frame| frame.lambdas.get(name).cloned()))
            .or_else(|| {
                self.walk(env, |frame| {
                    frame.lists.get(name).map(|items| CseValue::Tuple(items.clone()))
                })
            })
    }

    /// Apply `get` to every frame from `env` outward, returning its first
    /// hit.
    fn walk<F>(&self, env: usize, get: F) -> Option<CseValue>
    where
        F: Fn(&Environment) -> Option<CseValue>,
    {
        let mut current = self.envs.get(env);
        while let Some(frame) = current {
            if let Some(value) = get(frame) {
                return Some(value);
            }
            current = frame.parent.and_then(|parent| self.envs.get(parent));
        }
        None
    }

    pub fn bind_scalar(&mut self, env: usize, name: String, value: CseValue) {
        self.envs[env].variables.insert(name, value);
    }

    pub fn bind_callable(&mut self, env: usize, name: String, closure: CseValue) {
        self.envs[env].lambdas.insert(name, closure);
    }

    pub fn bind_list(&mut self, env: usize, name: String, items: Vec<CseValue>) {
        self.envs[env].lists.insert(name, items);
    }
}

impl Default for Environments {
    fn default() -> Self {
        Self::new()
    }
}
