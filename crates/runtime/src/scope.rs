use crate::{Function, Value};
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};
use tama_parser::AstIndex;

/// A shared, mutable cell holding a [Value]
///
/// Variables own their values through cells, so that bindings which alias the
/// same cell (e.g. a parameter name and its `__arg<i>` twin) observe each
/// other's mutations.
pub type ValueCell = Rc<RefCell<Value>>;

/// The kinds of scope that can be entered during evaluation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScopeKind {
    /// Block expressions, loop bodies, and if branches
    #[default]
    Normal,
    /// Function bodies; return propagation stops here
    Returnable,
    /// Loop iteration scopes, reserved for future `break`/`continue` support
    Loopable,
}

/// A named variable bound to a value cell
#[derive(Clone, Debug)]
pub struct Variable {
    /// The variable's name
    pub name: Rc<str>,
    /// The declaring AST node, if any
    pub node: Option<AstIndex>,
    cell: ValueCell,
}

impl Variable {
    /// Makes a variable with a fresh value cell
    pub fn new(name: Rc<str>, value: Value) -> Self {
        Self {
            name,
            node: None,
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Makes a variable bound to an existing cell
    pub fn with_cell(name: Rc<str>, cell: ValueCell) -> Self {
        Self {
            name,
            node: None,
            cell,
        }
    }

    /// Returns a copy of the variable's current value
    pub fn value(&self) -> Value {
        self.cell.borrow().clone()
    }

    /// Replaces the variable's value
    pub fn set_value(&self, value: Value) {
        *self.cell.borrow_mut() = value;
    }

    /// Returns the variable's underlying cell
    pub fn cell(&self) -> ValueCell {
        self.cell.clone()
    }
}

/// A lexical scope holding name-to-function and name-to-variable bindings
///
/// Scopes live on the interpreter's scope stack; a scope's parent is simply
/// the entry below it, so parents always outlive their children.
#[derive(Debug)]
pub struct Scope {
    name: Rc<str>,
    kind: ScopeKind,
    functions: FxHashMap<Rc<str>, Rc<Function>>,
    variables: FxHashMap<Rc<str>, Variable>,
    returning: bool,
}

impl Scope {
    /// Makes a new empty scope
    pub fn new(name: Rc<str>, kind: ScopeKind) -> Self {
        Self {
            name,
            kind,
            functions: FxHashMap::default(),
            variables: FxHashMap::default(),
            returning: false,
        }
    }

    /// The scope's name
    pub fn name(&self) -> &Rc<str> {
        &self.name
    }

    /// The scope's kind
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// True if a return has been evaluated in or below this scope
    pub fn returning(&self) -> bool {
        self.returning
    }

    /// Sets or clears the returning flag
    pub fn set_returning(&mut self, returning: bool) {
        self.returning = returning;
    }

    /// Declares a function in this scope, replacing any previous binding
    pub fn declare_function(&mut self, function: Rc<Function>) {
        self.functions.insert(function.name.clone(), function);
    }

    /// Declares a variable in this scope, replacing any previous binding
    pub fn declare_variable(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Looks up a function declared directly in this scope
    pub fn function(&self, name: &str) -> Option<&Rc<Function>> {
        self.functions.get(name)
    }

    /// Looks up a variable declared directly in this scope
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }
}
