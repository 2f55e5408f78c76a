use crate::ast::AstIndex;
use smallvec::SmallVec;
use std::rc::Rc;

/// The Vec type used in the AST
//
//  Four inline elements cover the common statement and argument list sizes
//  without increasing the overall size of [Node].
pub type AstVec<T> = SmallVec<[T; 4]>;

/// A convenience macro for initializing an [`AstVec`]
pub use smallvec::smallvec as astvec;

/// A parsed node that can be included in the [AST](crate::Ast).
///
/// Nodes refer to each other via [`AstIndex`], see [`AstNode`](crate::AstNode).
#[derive(Clone, Debug, PartialEq, derive_name::VariantName)]
pub enum Node {
    /// The root node, containing the program's top-level expressions in order
    Program(AstVec<AstIndex>),

    /// A braced block of statements, evaluated in its own scope
    Scope(AstVec<AstIndex>),

    /// A `var` declaration, with an optional initializer
    VarDeclaration {
        /// The name of the declared variable
        name: Rc<str>,
        /// The initializer expression, Undefined when absent
        expression: Option<AstIndex>,
    },

    /// A named function declaration
    FunctionDeclaration {
        /// The function's name
        name: Rc<str>,
        /// The function's parameters, as [Node::FunctionParameter] nodes
        parameters: AstVec<AstIndex>,
        /// The function's body expression
        body: AstIndex,
    },

    /// An anonymous function expression
    FunctionExpression {
        /// The function's parameters, as [Node::FunctionParameter] nodes
        parameters: AstVec<AstIndex>,
        /// The function's body expression
        body: AstIndex,
    },

    /// A single named parameter in a function's parameter list
    FunctionParameter {
        /// The parameter's name
        name: Rc<str>,
        /// The optional type name following a `:`
        type_name: Option<Rc<str>>,
        /// Reserved for variadic parameters
        variadic: bool,
    },

    /// A call to the named function with the given arguments
    FunctionCall {
        /// The name of the function being called
        function: Rc<str>,
        /// The call's argument expressions, in order
        arguments: AstVec<AstIndex>,
    },

    /// A `ret` expression
    Return(AstIndex),

    /// A binary operation
    BinOp {
        /// The operator to use
        op: AstBinOp,
        /// The left hand side of the operation
        lhs: AstIndex,
        /// The right hand side of the operation
        rhs: AstIndex,
    },

    /// An integer literal
    Int(i64),

    /// A float literal
    Float(f32),

    /// A string literal, with escapes already resolved
    Str(Rc<str>),

    /// An identifier
    Id(Rc<str>),

    /// An array literal
    Array(AstVec<AstIndex>),

    /// An object literal, containing [Node::KeyValue] entries
    Object(AstVec<AstIndex>),

    /// A key/value pair representing an object entry
    KeyValue {
        /// The entry's key expression
        key: AstIndex,
        /// The entry's value expression
        value: AstIndex,
    },

    /// A member access, e.g. `object.field`
    Access {
        /// The name of the variable holding the object
        object: Rc<str>,
        /// The name of the accessed field
        field: Rc<str>,
    },

    /// An inclusive integer range, e.g. `1..10`
    NumericRange {
        /// The range's first value
        min: i64,
        /// The range's last value, included in the range
        max: i64,
    },

    /// A `for` loop over the values produced by a range expression
    RangedLoop {
        /// The declaration that introduces the loop variable
        declaration: AstIndex,
        /// The expression producing the values to iterate over
        range: AstIndex,
        /// The loop body
        body: AstIndex,
    },

    /// An assignment to a named target
    Assignment {
        /// The name of the assignment's target
        target: Rc<str>,
        /// The expression to be assigned
        expression: AstIndex,
    },

    /// An `if` expression
    If(AstIf),

    /// An `else if` arm belonging to a [Node::If] expression
    ElseIf {
        /// An optional declaration evaluated before the condition
        declaration: Option<AstIndex>,
        /// The arm's condition
        condition: AstIndex,
        /// The arm's body
        body: AstIndex,
    },
}

/// An `if` expression
///
/// See [Node::If]
#[derive(Clone, Debug, PartialEq)]
pub struct AstIf {
    /// An optional declaration evaluated before the condition
    pub declaration: Option<AstIndex>,
    /// The `if` condition
    pub condition: AstIndex,
    /// The body evaluated when the condition is truthy
    pub then_body: AstIndex,
    /// The `else if` arms, as [Node::ElseIf] nodes
    pub else_ifs: AstVec<AstIndex>,
    /// The optional `else` body
    pub else_body: Option<AstIndex>,
}

/// The binary operators produced by the parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AstBinOp {
    Add,
    Subtract,
    Divide,
    Multiply,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}
