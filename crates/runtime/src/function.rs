use crate::{Interpreter, Result, Value};
use std::{fmt, rc::Rc};
use tama_parser::{Ast, AstIndex};

/// A trait for functions implemented by the host
///
/// Host functions receive the calling interpreter and the evaluated
/// arguments, and produce a single value.
pub trait HostFunction: Fn(&mut Interpreter, &[Value]) -> Result<Value> + 'static {}

impl<T> HostFunction for T where T: Fn(&mut Interpreter, &[Value]) -> Result<Value> + 'static {}

/// A runtime function parameter
#[derive(Clone, Debug)]
pub struct FunctionParameter {
    /// The parameter's name
    pub name: Rc<str>,
    /// The parameter's declared type name, informational only
    pub type_name: Option<Rc<str>>,
    /// The declaring AST node, absent for host functions
    pub node: Option<AstIndex>,
}

impl FunctionParameter {
    /// Makes a named parameter
    pub fn new(name: Rc<str>, type_name: Option<Rc<str>>, node: Option<AstIndex>) -> Self {
        Self {
            name,
            type_name,
            node,
        }
    }
}

/// The invocable body of a [Function]
pub enum FunctionBody {
    /// A body defined in a script
    ///
    /// The tree is shared so that the body node outlives the function,
    /// including across evaluations in a persistent environment.
    Ast {
        /// The tree that owns the body node
        ast: Rc<Ast>,
        /// The index of the body node
        body: AstIndex,
    },
    /// A body supplied by the host
    Host(Rc<dyn HostFunction>),
}

impl fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ast { body, .. } => write!(f, "ast function (body: {body})"),
            Self::Host(function) => write!(f, "host function ({:p})", Rc::as_ptr(function)),
        }
    }
}

/// A runtime function
///
/// Shared by reference, a Function value may be held by multiple Values and
/// scopes at once.
#[derive(Debug)]
pub struct Function {
    /// The function's name
    ///
    /// Anonymous functions get a name synthesized from their source location.
    pub name: Rc<str>,
    /// The function's parameters in declaration order
    pub parameters: Vec<FunctionParameter>,
    /// The function's body
    pub body: FunctionBody,
}

impl Function {
    /// Makes a function from a script-defined body
    pub fn from_ast(
        name: Rc<str>,
        parameters: Vec<FunctionParameter>,
        ast: Rc<Ast>,
        body: AstIndex,
    ) -> Self {
        Self {
            name,
            parameters,
            body: FunctionBody::Ast { ast, body },
        }
    }

    /// Makes a function implemented by the host
    pub fn from_host(name: &str, function: impl HostFunction) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            body: FunctionBody::Host(Rc::new(function)),
        }
    }
}
