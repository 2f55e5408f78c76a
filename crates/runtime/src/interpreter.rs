use crate::{
    function::{Function, FunctionBody, FunctionParameter},
    io::{DefaultStdout, OutputHandle},
    scope::{Scope, ScopeKind, Variable},
    Result, Value, ValueKey, ValueMap,
};
use std::{cell::RefCell, rc::Rc};
use tama_parser::{Ast, AstBinOp, AstIf, AstIndex, Node};

/// Settings used to control the behaviour of the [Interpreter]
pub struct InterpreterSettings {
    /// The stream that script output is written to
    pub stdout: OutputHandle,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            stdout: Rc::new(DefaultStdout),
        }
    }
}

/// The tree-walking interpreter used by the Tama runtime
///
/// Maintains a stack of lexical scopes; the global scope is created at
/// construction and persists across evaluations, so declarations survive
/// between [execute](Interpreter::execute) calls.
pub struct Interpreter {
    scopes: Vec<Scope>,
    stdout: OutputHandle,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with default settings
    pub fn new() -> Self {
        Self::with_settings(InterpreterSettings::default())
    }

    /// Creates an interpreter with the given settings
    pub fn with_settings(settings: InterpreterSettings) -> Self {
        Self {
            scopes: vec![Scope::new("global".into(), ScopeKind::Normal)],
            stdout: settings.stdout,
        }
    }

    /// The stream that script output is written to
    pub fn stdout(&self) -> &OutputHandle {
        &self.stdout
    }

    /// Evaluates a parsed program, returning the last evaluated result
    pub fn execute(&mut self, ast: &Rc<Ast>) -> Result<Value> {
        // A top-level `ret` marks the global scope as returning; clear the
        // flag so that a persistent environment stays usable.
        if let Some(global) = self.scopes.first_mut() {
            global.set_returning(false);
        }

        match ast.entry_point() {
            Some(entry) => self.visit(ast, entry),
            None => Ok(Value::Undefined),
        }
    }

    /// Installs a function into the global scope
    pub fn add_function(&mut self, function: Function) {
        if let Some(global) = self.scopes.first_mut() {
            global.declare_function(Rc::new(function));
        }
    }

    /// Installs a variable into the global scope
    pub fn add_variable(&mut self, name: &str, value: Value) {
        if let Some(global) = self.scopes.first_mut() {
            global.declare_variable(Variable::new(name.into(), value));
        }
    }

    fn enter_scope(&mut self, name: Rc<str>, kind: ScopeKind) {
        self.scopes.push(Scope::new(name, kind));
    }

    fn exit_scope(&mut self) {
        // The global scope stays in place
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn current_returning(&self) -> bool {
        self.scopes.last().is_some_and(Scope::returning)
    }

    // Walks from the current scope toward the root, marking each scope as
    // returning, stopping at the first Returnable scope (inclusive)
    fn mark_return(&mut self) {
        for scope in self.scopes.iter_mut().rev() {
            scope.set_returning(true);
            if scope.kind() == ScopeKind::Returnable {
                break;
            }
        }
    }

    fn find_variable(&self, name: &str) -> Option<Variable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variable(name).cloned())
    }

    // Looks up a function through the scope chain
    //
    // A variable holding a Function value stops the walk, so that calls
    // resolve through the variable instead of an outer declaration.
    fn find_function(&self, name: &str) -> Option<Rc<Function>> {
        for scope in self.scopes.iter().rev() {
            if let Some(function) = scope.function(name) {
                return Some(function.clone());
            }
            if let Some(variable) = scope.variable(name) {
                if variable.value().is_function() {
                    return None;
                }
            }
        }
        None
    }

    // Binds positional arguments in the current scope
    //
    // Each argument is bound both to its parameter name (when in range) and to
    // `__arg<i>`, sharing a single cell; `__argc` holds the argument count.
    fn unpack_arguments(&mut self, arguments: &[Value], parameters: &[FunctionParameter]) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        for (index, argument) in arguments.iter().enumerate() {
            let cell = Rc::new(RefCell::new(argument.clone()));
            if let Some(parameter) = parameters.get(index) {
                scope.declare_variable(Variable::with_cell(parameter.name.clone(), cell.clone()));
            }
            scope.declare_variable(Variable::with_cell(
                format!("__arg{index}").as_str().into(),
                cell,
            ));
        }

        scope.declare_variable(Variable::new(
            "__argc".into(),
            Value::Int(arguments.len() as i64),
        ));
    }

    /// Calls a function with already evaluated arguments
    pub fn call_function(&mut self, function: &Rc<Function>, arguments: &[Value]) -> Result<Value> {
        self.enter_scope(function.name.clone(), ScopeKind::Returnable);

        let result = match &function.body {
            FunctionBody::Ast { ast, body } => {
                self.unpack_arguments(arguments, &function.parameters);
                let ast = ast.clone();
                let body = *body;
                self.visit(&ast, body)
            }
            FunctionBody::Host(host) => {
                let host = host.clone();
                host(self, arguments)
            }
        };

        self.exit_scope();
        result
    }

    fn visit(&mut self, ast: &Rc<Ast>, index: AstIndex) -> Result<Value> {
        match &ast.node(index).node {
            Node::Program(children) => self.visit_block(ast, children),
            Node::Scope(statements) => {
                self.enter_scope("anon".into(), ScopeKind::Normal);
                let result = self.visit_block(ast, statements);
                self.exit_scope();
                result
            }
            Node::VarDeclaration { name, expression } => {
                let value = match expression {
                    Some(expression) => self.visit(ast, *expression)?,
                    None => Value::Undefined,
                };
                if let Some(scope) = self.scopes.last_mut() {
                    let mut variable = Variable::new(name.clone(), value.clone());
                    variable.node = Some(index);
                    scope.declare_variable(variable);
                }
                Ok(value)
            }
            Node::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                let function = self.make_function(ast, name.clone(), parameters, *body);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.declare_function(Rc::new(function));
                }
                Ok(Value::Undefined)
            }
            Node::FunctionExpression { parameters, body } => {
                let name = format!("lambda({})", ast.node_span(index)).as_str().into();
                let function = self.make_function(ast, name, parameters, *body);
                Ok(Value::Function(Rc::new(function)))
            }
            Node::FunctionCall {
                function,
                arguments,
            } => self.visit_call(ast, function, arguments),
            Node::Return(expression) => {
                self.mark_return();
                self.visit(ast, *expression)
            }
            Node::BinOp { op, lhs, rhs } => {
                let lhs = self.visit(ast, *lhs)?;
                let rhs = self.visit(ast, *rhs)?;
                match op {
                    AstBinOp::Add => lhs.add(&rhs),
                    AstBinOp::Subtract => lhs.subtract(&rhs),
                    AstBinOp::Divide => lhs.divide(&rhs),
                    AstBinOp::Multiply => lhs.multiply(&rhs),
                    AstBinOp::Greater => Ok(Value::Bool(rhs.less_than(&lhs))),
                    AstBinOp::GreaterEqual => {
                        Ok(Value::Bool(rhs.less_than(&lhs) || lhs == rhs))
                    }
                    AstBinOp::Less => Ok(Value::Bool(lhs.less_than(&rhs))),
                    AstBinOp::LessEqual => Ok(Value::Bool(lhs.less_than(&rhs) || lhs == rhs)),
                }
            }
            Node::Int(i) => Ok(Value::Int(*i)),
            Node::Float(f) => Ok(Value::Float(*f)),
            Node::Str(s) => Ok(Value::Str(s.clone())),
            Node::Id(name) => {
                if let Some(variable) = self.find_variable(name) {
                    return Ok(variable.value());
                }
                match self.find_function(name) {
                    Some(function) => Ok(Value::Function(function)),
                    None => Ok(Value::Undefined),
                }
            }
            Node::Array(elements) => {
                let mut array = Vec::with_capacity(elements.len());
                for element in elements {
                    array.push(self.visit(ast, *element)?);
                }
                Ok(array.into())
            }
            Node::Object(entries) => {
                let mut object = ValueMap::default();
                for entry in entries {
                    if let Node::KeyValue { key, value } = &ast.node(*entry).node {
                        let key = self.visit(ast, *key)?;
                        let value = self.visit(ast, *value)?;
                        object.insert(ValueKey::from(key), value);
                    }
                }
                Ok(object.into())
            }
            Node::KeyValue { value, .. } => self.visit(ast, *value),
            Node::Access { object, field } => {
                let Some(variable) = self.find_variable(object) else {
                    return Ok(Value::Undefined);
                };
                match variable.value() {
                    Value::Object(map) => Ok(map
                        .get(&ValueKey::from(field.as_ref()))
                        .cloned()
                        .unwrap_or_default()),
                    _ => Ok(Value::Undefined),
                }
            }
            Node::NumericRange { min, max } => {
                Ok((*min..=*max).map(Value::Int).collect::<Vec<_>>().into())
            }
            Node::RangedLoop {
                declaration,
                range,
                body,
            } => self.visit_ranged_loop(ast, *declaration, *range, *body),
            Node::Assignment { target, expression } => {
                let variable = match self.find_variable(target) {
                    Some(variable) => variable,
                    None => {
                        let variable = Variable::new(target.clone(), Value::Undefined);
                        if let Some(scope) = self.scopes.last_mut() {
                            scope.declare_variable(variable.clone());
                        }
                        variable
                    }
                };
                let value = self.visit(ast, *expression)?;
                variable.set_value(value.clone());
                Ok(value)
            }
            Node::If(ast_if) => self.visit_if(ast, ast_if),
            Node::ElseIf { body, .. } => self.visit(ast, *body),
            Node::FunctionParameter { .. } => Ok(Value::Undefined),
        }
    }

    // Evaluates a series of statements, short-circuiting when the current
    // scope has been marked as returning
    fn visit_block(&mut self, ast: &Rc<Ast>, statements: &[AstIndex]) -> Result<Value> {
        let mut result = Value::Undefined;
        for statement in statements {
            result = self.visit(ast, *statement)?;
            if self.current_returning() {
                break;
            }
        }
        Ok(result)
    }

    fn make_function(
        &self,
        ast: &Rc<Ast>,
        name: Rc<str>,
        parameters: &[AstIndex],
        body: AstIndex,
    ) -> Function {
        let parameters = parameters
            .iter()
            .filter_map(|index| match &ast.node(*index).node {
                Node::FunctionParameter {
                    name, type_name, ..
                } => Some(FunctionParameter::new(
                    name.clone(),
                    type_name.clone(),
                    Some(*index),
                )),
                _ => None,
            })
            .collect();

        Function::from_ast(name, parameters, ast.clone(), body)
    }

    fn visit_call(&mut self, ast: &Rc<Ast>, name: &str, arguments: &[AstIndex]) -> Result<Value> {
        let function = match self.find_function(name) {
            Some(function) => Some(function),
            None => match self.find_variable(name) {
                None => return Ok(Value::Undefined),
                Some(variable) => match variable.value() {
                    Value::Function(function) => Some(function),
                    // A string-valued variable acts as an indirect function name
                    Value::Str(indirect) => self.find_function(&indirect),
                    _ => None,
                },
            },
        };
        let Some(function) = function else {
            return Ok(Value::Undefined);
        };

        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.visit(ast, *argument)?);
        }

        self.call_function(&function, &values)
    }

    fn visit_ranged_loop(
        &mut self,
        ast: &Rc<Ast>,
        declaration: AstIndex,
        range: AstIndex,
        body: AstIndex,
    ) -> Result<Value> {
        let range_value = self.visit(ast, range)?;

        let elements: Vec<Value> = match range_value {
            Value::Array(array) => array.iter().cloned().collect(),
            Value::Object(object) => object.values().cloned().collect(),
            // Strings iterate their characters as single-character strings
            Value::Str(s) => s
                .chars()
                .map(|c| Value::Str(c.to_string().as_str().into()))
                .collect(),
            _ => return Ok(Value::Undefined),
        };

        let loop_variable = match &ast.node(declaration).node {
            Node::VarDeclaration { name, .. } => Some(name.clone()),
            _ => None,
        };

        let mut result = Value::Undefined;
        for element in elements {
            self.enter_scope("ranged_loop".into(), ScopeKind::Loopable);
            let iteration =
                self.visit_loop_iteration(ast, declaration, &loop_variable, element, body);
            self.exit_scope();
            result = iteration?;

            // A return evaluated in the body stops the loop
            if self.current_returning() {
                break;
            }
        }

        Ok(result)
    }

    fn visit_loop_iteration(
        &mut self,
        ast: &Rc<Ast>,
        declaration: AstIndex,
        loop_variable: &Option<Rc<str>>,
        element: Value,
        body: AstIndex,
    ) -> Result<Value> {
        self.visit(ast, declaration)?;

        if let Some(name) = loop_variable {
            if let Some(variable) = self.scopes.last().and_then(|scope| scope.variable(name)) {
                variable.set_value(element);
            }
        }

        self.visit(ast, body)
    }

    fn visit_if(&mut self, ast: &Rc<Ast>, ast_if: &AstIf) -> Result<Value> {
        self.enter_scope("if".into(), ScopeKind::Normal);
        let arm = self.visit_conditional_arm(
            ast,
            ast_if.declaration,
            ast_if.condition,
            ast_if.then_body,
        );
        self.exit_scope();
        if let Some(result) = arm? {
            return Ok(result);
        }

        for else_if in &ast_if.else_ifs {
            if let Node::ElseIf {
                declaration,
                condition,
                body,
            } = &ast.node(*else_if).node
            {
                self.enter_scope("else_if".into(), ScopeKind::Normal);
                let arm = self.visit_conditional_arm(ast, *declaration, *condition, *body);
                self.exit_scope();
                if let Some(result) = arm? {
                    return Ok(result);
                }
            }
        }

        match ast_if.else_body {
            Some(body) => self.visit(ast, body),
            None => Ok(Value::Undefined),
        }
    }

    // Evaluates one conditional arm in the current scope, returning the body's
    // result when the condition is truthy
    fn visit_conditional_arm(
        &mut self,
        ast: &Rc<Ast>,
        declaration: Option<AstIndex>,
        condition: AstIndex,
        body: AstIndex,
    ) -> Result<Option<Value>> {
        if let Some(declaration) = declaration {
            self.visit(ast, declaration)?;
        }

        let condition = self.visit(ast, condition)?;
        if condition.is_trueish() {
            Ok(Some(self.visit(ast, body)?))
        } else {
            Ok(None)
        }
    }
}
