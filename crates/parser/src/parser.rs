use crate::{
    ast::{Ast, AstIndex},
    error::{Error, Result, SyntaxError},
    node::*,
};
use tama_lexer::{Lexer, Span, Token, TokenKind};

/// Tama's parser
///
/// A recursive-descent parser over the non-trivia token stream, producing an
/// [Ast] with a Program node as its entry point.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    ast: Ast,
}

impl Parser {
    /// Takes in a source script, and produces an Ast
    pub fn parse(source: &str) -> Result<Ast> {
        Self::parse_tokens(Lexer::lex(source))
    }

    /// Produces an Ast from an already lexed token sequence
    ///
    /// The token sequence is expected to be free of whitespace and comment
    /// tokens, i.e. lexed with the `Ignore` policies.
    pub fn parse_tokens(tokens: Vec<Token>) -> Result<Ast> {
        let capacity_guess = tokens.len() / 2;
        let program_span = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => first.span.extended_to(last.span),
            _ => Span::default(),
        };

        let mut parser = Self {
            tokens,
            position: 0,
            ast: Ast::with_capacity(capacity_guess),
        };

        let mut children = AstVec::new();
        while parser.peek().is_some() {
            if let Some(child) = parser.parse_statement_or_expression()? {
                children.push(child);
            }
        }

        parser.push_node(Node::Program(children), program_span)?;
        Ok(parser.ast)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(token)
    }

    fn unwind(&mut self) {
        if self.position != 0 {
            self.position -= 1;
        }
    }

    fn next_is(&self, kind: TokenKind) -> bool {
        matches!(self.peek(), Some(token) if token.kind == kind)
    }

    fn next_is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(token) if token.is_keyword(keyword))
    }

    // The token blamed in errors raised at the current position
    fn error_token(&self) -> Token {
        self.peek()
            .or_else(|| self.tokens.last())
            .cloned()
            .unwrap_or_default()
    }

    fn syntax_error<T>(&self, error: SyntaxError) -> Result<T> {
        Err(Error::new(error.into(), self.error_token()))
    }

    fn expect(&mut self, kind: TokenKind, error: SyntaxError) -> Result<Token> {
        if self.next_is(kind) {
            match self.consume() {
                Some(token) => Ok(token),
                None => self.syntax_error(error),
            }
        } else {
            self.syntax_error(error)
        }
    }

    fn push_node(&mut self, node: Node, span: Span) -> Result<AstIndex> {
        let error_token = self.error_token();
        self.ast
            .push(node, span)
            .map_err(|error| Error::new(error.into(), error_token))
    }

    fn node_span(&self, index: AstIndex) -> Span {
        *self.ast.node_span(index)
    }

    fn parse_statement_or_expression(&mut self) -> Result<Option<AstIndex>> {
        if self.next_is(TokenKind::SemiColon) {
            self.consume();
            return Ok(None);
        }
        if self.next_is_keyword("var") {
            return self.parse_var_declaration().map(Some);
        }
        if self.next_is_keyword("fun")
            && matches!(self.peek_n(1), Some(token) if token.kind == TokenKind::Identifier)
        {
            return self.parse_function().map(Some);
        }
        if self.next_is_keyword("for") {
            return self.parse_for_loop().map(Some);
        }
        if self.next_is_keyword("if") {
            return self.parse_if().map(Some);
        }
        if self.next_is(TokenKind::Identifier)
            && matches!(self.peek_n(1), Some(token) if token.kind == TokenKind::Equals)
        {
            return self.parse_assignment().map(Some);
        }

        self.parse_expression().map(Some)
    }

    fn parse_var_declaration(&mut self) -> Result<AstIndex> {
        let Some(var_token) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedVarName);
        };

        let name_token = self.expect(TokenKind::Identifier, SyntaxError::ExpectedVarName)?;
        let name: std::rc::Rc<str> = name_token.content.as_str().into();

        // A `;` or `:` terminator ends the declaration without an initializer.
        // The `:` case keeps for loop headers simple, see parse_for_loop.
        if self.next_is(TokenKind::SemiColon) || self.next_is(TokenKind::Colon) {
            let terminator = match self.consume() {
                Some(token) => token,
                None => return self.syntax_error(SyntaxError::ExpectedVarAssignment),
            };
            return self.push_node(
                Node::VarDeclaration {
                    name,
                    expression: None,
                },
                var_token.span.extended_to(terminator.span),
            );
        }

        self.expect(TokenKind::Equals, SyntaxError::ExpectedVarAssignment)?;
        let expression = self.parse_expression()?;
        let span = var_token.span.extended_to(self.node_span(expression));
        self.push_node(
            Node::VarDeclaration {
                name,
                expression: Some(expression),
            },
            span,
        )
    }

    // Parses a function declaration or an anonymous function expression,
    // starting at the `fun` keyword
    fn parse_function(&mut self) -> Result<AstIndex> {
        let Some(fun_token) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedExpression);
        };

        let name: Option<std::rc::Rc<str>> = if self.next_is(TokenKind::Identifier) {
            self.consume().map(|token| token.content.as_str().into())
        } else {
            None
        };

        self.expect(TokenKind::ParenOpen, SyntaxError::ExpectedFunctionParenOpen)?;

        let mut parameters = AstVec::new();
        while matches!(self.peek(), Some(token) if token.kind != TokenKind::ParenClose) {
            let name_token =
                self.expect(TokenKind::Identifier, SyntaxError::ExpectedParameterName)?;
            let mut param_span = name_token.span;
            let mut type_name = None;

            if self.next_is(TokenKind::Colon)
                && matches!(
                    self.peek_n(1),
                    Some(token)
                        if matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword)
                )
            {
                self.consume();
                if let Some(type_token) = self.consume() {
                    param_span = param_span.extended_to(type_token.span);
                    type_name = Some(type_token.content.as_str().into());
                }
            }

            parameters.push(self.push_node(
                Node::FunctionParameter {
                    name: name_token.content.as_str().into(),
                    type_name,
                    variadic: false,
                },
                param_span,
            )?);

            if self.next_is(TokenKind::Comma) {
                self.consume();
            }
        }

        self.expect(TokenKind::ParenClose, SyntaxError::ExpectedParameterListEnd)?;

        let body = match self.parse_statement_or_expression()? {
            Some(body) => body,
            None => return self.syntax_error(SyntaxError::ExpectedFunctionBody),
        };
        let span = fun_token.span.extended_to(self.node_span(body));

        match name {
            Some(name) => self.push_node(
                Node::FunctionDeclaration {
                    name,
                    parameters,
                    body,
                },
                span,
            ),
            None => self.push_node(Node::FunctionExpression { parameters, body }, span),
        }
    }

    fn parse_for_loop(&mut self) -> Result<AstIndex> {
        let Some(for_token) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedExpression);
        };

        self.expect(TokenKind::ParenOpen, SyntaxError::ExpectedForParenOpen)?;

        if !self.next_is_keyword("var") {
            return self.syntax_error(SyntaxError::ExpectedForDeclaration);
        }
        // The declaration's `:` terminator separates it from the range expression
        let declaration = self.parse_var_declaration()?;
        let range = self.parse_expression()?;

        let paren_close =
            self.expect(TokenKind::ParenClose, SyntaxError::ExpectedForParenClose)?;

        let body = match self.parse_statement_or_expression()? {
            Some(body) => body,
            None => return self.syntax_error(SyntaxError::ExpectedLoopBody),
        };

        self.push_node(
            Node::RangedLoop {
                declaration,
                range,
                body,
            },
            for_token.span.extended_to(paren_close.span),
        )
    }

    // Parses the `( [declaration ;] condition )` header shared by if and else if arms
    fn parse_condition_header(&mut self) -> Result<(Option<AstIndex>, AstIndex)> {
        self.expect(TokenKind::ParenOpen, SyntaxError::ExpectedIfParenOpen)?;

        let declaration = if self.next_is_keyword("var") {
            let declaration = self.parse_var_declaration()?;
            if self.next_is(TokenKind::SemiColon) {
                self.consume();
            }
            Some(declaration)
        } else {
            None
        };

        let condition = self.parse_expression()?;
        self.expect(TokenKind::ParenClose, SyntaxError::ExpectedIfParenClose)?;

        Ok((declaration, condition))
    }

    fn parse_if(&mut self) -> Result<AstIndex> {
        let Some(if_token) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedExpression);
        };

        let (declaration, condition) = self.parse_condition_header()?;
        let then_body = match self.parse_statement_or_expression()? {
            Some(body) => body,
            None => return self.syntax_error(SyntaxError::ExpectedIfBody),
        };

        let mut else_ifs = AstVec::new();
        let mut else_body = None;
        let mut end_span = self.node_span(then_body);

        while self.next_is_keyword("else") {
            if matches!(self.peek_n(1), Some(token) if token.is_keyword("if")) {
                self.consume(); // else
                let Some(else_if_token) = self.consume() else {
                    return self.syntax_error(SyntaxError::ExpectedExpression);
                };

                let (arm_declaration, arm_condition) = self.parse_condition_header()?;
                let arm_body = match self.parse_statement_or_expression()? {
                    Some(body) => body,
                    None => return self.syntax_error(SyntaxError::ExpectedIfBody),
                };

                let arm_span = else_if_token.span.extended_to(self.node_span(arm_body));
                end_span = arm_span;
                else_ifs.push(self.push_node(
                    Node::ElseIf {
                        declaration: arm_declaration,
                        condition: arm_condition,
                        body: arm_body,
                    },
                    arm_span,
                )?);
            } else {
                self.consume(); // else
                let body = match self.parse_statement_or_expression()? {
                    Some(body) => body,
                    None => return self.syntax_error(SyntaxError::ExpectedIfBody),
                };
                end_span = self.node_span(body);
                else_body = Some(body);
                break;
            }
        }

        self.push_node(
            Node::If(AstIf {
                declaration,
                condition,
                then_body,
                else_ifs,
                else_body,
            }),
            if_token.span.extended_to(end_span),
        )
    }

    fn parse_assignment(&mut self) -> Result<AstIndex> {
        let Some(name_token) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedExpression);
        };
        self.consume(); // =

        let expression = self.parse_expression()?;
        let span = name_token.span.extended_to(self.node_span(expression));
        self.push_node(
            Node::Assignment {
                target: name_token.content.as_str().into(),
                expression,
            },
            span,
        )
    }

    // All binary operators apart from `*` and `/` parse at a single precedence
    // level in a left-associative loop, comparisons included.
    fn parse_expression(&mut self) -> Result<AstIndex> {
        let mut node = self.parse_term()?;

        while self.next_is(TokenKind::BinOp) {
            let Some(op_token) = self.consume() else {
                break;
            };

            let op = match op_token.content.as_str() {
                "+" => AstBinOp::Add,
                "-" => AstBinOp::Subtract,
                ">" => AstBinOp::Greater,
                ">=" => AstBinOp::GreaterEqual,
                "<" => AstBinOp::Less,
                "<=" => AstBinOp::LessEqual,
                _ => {
                    return Err(Error::new(
                        SyntaxError::UnsupportedBinaryOperator.into(),
                        op_token,
                    ));
                }
            };

            let rhs = self.parse_term()?;
            let span = self.node_span(node).extended_to(self.node_span(rhs));
            node = self.push_node(
                Node::BinOp {
                    op,
                    lhs: node,
                    rhs,
                },
                span,
            )?;
        }

        Ok(node)
    }

    fn parse_term(&mut self) -> Result<AstIndex> {
        let mut node = self.parse_factor()?;

        while matches!(self.peek(), Some(token) if token.is_bin_op("*") || token.is_bin_op("/")) {
            let Some(op_token) = self.consume() else {
                break;
            };
            let op = if op_token.content == "*" {
                AstBinOp::Multiply
            } else {
                AstBinOp::Divide
            };

            let rhs = self.parse_factor()?;
            let span = self.node_span(node).extended_to(self.node_span(rhs));
            node = self.push_node(
                Node::BinOp {
                    op,
                    lhs: node,
                    rhs,
                },
                span,
            )?;
        }

        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<AstIndex> {
        let Some(token) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedExpression);
        };

        match token.kind {
            TokenKind::Integer => {
                let min = self.parse_integer(&token)?;

                // An integer followed by `..` and another integer is a numeric range
                if self.next_is(TokenKind::Dot)
                    && matches!(self.peek_n(1), Some(t) if t.kind == TokenKind::Dot)
                    && matches!(self.peek_n(2), Some(t) if t.kind == TokenKind::Integer)
                {
                    self.consume();
                    self.consume();
                    let Some(max_token) = self.consume() else {
                        return self.syntax_error(SyntaxError::ExpectedExpression);
                    };
                    let max = self.parse_integer(&max_token)?;
                    return self.push_node(
                        Node::NumericRange { min, max },
                        token.span.extended_to(max_token.span),
                    );
                }

                self.push_node(Node::Int(min), token.span)
            }
            TokenKind::FloatingPointNumber => {
                let number: f32 = token
                    .content
                    .parse()
                    .map_err(|_| Error::new(SyntaxError::InvalidNumber.into(), token.clone()))?;
                self.push_node(Node::Float(number), token.span)
            }
            TokenKind::String => {
                self.push_node(Node::Str(token.content.as_str().into()), token.span)
            }
            TokenKind::ParenOpen => {
                let node = self.parse_expression()?;
                self.expect(TokenKind::ParenClose, SyntaxError::ExpectedCloseParen)?;
                Ok(node)
            }
            TokenKind::Identifier => {
                if self.next_is(TokenKind::ParenOpen) {
                    return self.parse_function_call(token);
                }

                if self.next_is(TokenKind::Dot)
                    && matches!(self.peek_n(1), Some(t) if t.kind == TokenKind::Identifier)
                {
                    self.consume(); // .
                    let Some(field_token) = self.consume() else {
                        return self.syntax_error(SyntaxError::ExpectedExpression);
                    };
                    return self.push_node(
                        Node::Access {
                            object: token.content.as_str().into(),
                            field: field_token.content.as_str().into(),
                        },
                        token.span.extended_to(field_token.span),
                    );
                }

                self.push_node(Node::Id(token.content.as_str().into()), token.span)
            }
            TokenKind::SquigglyOpen => {
                let mut statements = AstVec::new();

                while matches!(self.peek(), Some(t) if t.kind != TokenKind::SquigglyClose) {
                    if let Some(statement) = self.parse_statement_or_expression()? {
                        statements.push(statement);
                    }
                }

                let close =
                    self.expect(TokenKind::SquigglyClose, SyntaxError::ExpectedScopeEnd)?;
                self.push_node(Node::Scope(statements), token.span.extended_to(close.span))
            }
            TokenKind::Keyword if token.content == "ret" => {
                let expression = self.parse_expression()?;
                let span = token.span.extended_to(self.node_span(expression));
                self.push_node(Node::Return(expression), span)
            }
            TokenKind::Keyword if token.content == "fun" => {
                self.unwind();
                self.parse_function()
            }
            TokenKind::BracketOpen => {
                self.unwind();
                self.parse_array_or_object()
            }
            _ => Err(Error::new(SyntaxError::UnexpectedToken.into(), token)),
        }
    }

    fn parse_integer(&self, token: &Token) -> Result<i64> {
        token
            .content
            .parse()
            .map_err(|_| Error::new(SyntaxError::InvalidNumber.into(), token.clone()))
    }

    fn parse_function_call(&mut self, name_token: Token) -> Result<AstIndex> {
        self.consume(); // (

        let mut arguments = AstVec::new();
        loop {
            match self.peek() {
                None => return self.syntax_error(SyntaxError::ExpectedCallArgsEnd),
                Some(token) if token.kind == TokenKind::ParenClose => break,
                _ => {}
            }

            arguments.push(self.parse_expression()?);

            if self.next_is(TokenKind::ParenClose) {
                break;
            }
            if self.next_is(TokenKind::Comma) {
                self.consume();
                continue;
            }

            return self.syntax_error(SyntaxError::UnexpectedToken);
        }

        let close = self.expect(TokenKind::ParenClose, SyntaxError::ExpectedCallArgsEnd)?;
        self.push_node(
            Node::FunctionCall {
                function: name_token.content.as_str().into(),
                arguments,
            },
            name_token.span.extended_to(close.span),
        )
    }

    // `[...]` literals start out as arrays, and become objects at the first
    // `key : value` entry
    fn parse_array_or_object(&mut self) -> Result<AstIndex> {
        let Some(open) = self.consume() else {
            return self.syntax_error(SyntaxError::ExpectedExpression);
        };

        let mut expressions = AstVec::new();
        let mut entries = AstVec::new();
        let mut is_object = false;

        loop {
            match self.peek() {
                None => return self.syntax_error(SyntaxError::ExpectedBracketClose),
                Some(token) if token.kind == TokenKind::BracketClose => break,
                _ => {}
            }

            let expression = self.parse_expression()?;

            if is_object || self.next_is(TokenKind::Colon) {
                if !self.next_is(TokenKind::Colon) {
                    return self.syntax_error(SyntaxError::MixedArrayAndObject);
                }
                is_object = true;
                self.consume(); // :
                let value = self.parse_expression()?;
                let span = self
                    .node_span(expression)
                    .extended_to(self.node_span(value));
                entries.push(self.push_node(
                    Node::KeyValue {
                        key: expression,
                        value,
                    },
                    span,
                )?);
            } else {
                expressions.push(expression);
            }

            match self.peek() {
                Some(token) if token.kind == TokenKind::Comma => {
                    self.consume();
                }
                Some(token) if token.kind == TokenKind::BracketClose => {}
                Some(_) => return self.syntax_error(SyntaxError::UnexpectedToken),
                None => return self.syntax_error(SyntaxError::ExpectedBracketClose),
            }
        }

        let close = self.expect(TokenKind::BracketClose, SyntaxError::ExpectedBracketClose)?;
        let span = open.span.extended_to(close.span);

        if is_object {
            self.push_node(Node::Object(entries), span)
        } else {
            self.push_node(Node::Array(expressions), span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(source: &str) -> Ast {
        match Parser::parse(source) {
            Ok(ast) => ast,
            Err(error) => panic!("{error}"),
        }
    }

    fn program_children(ast: &Ast) -> Vec<AstIndex> {
        let entry = ast.entry_point().expect("Empty AST");
        match &ast.node(entry).node {
            Node::Program(children) => children.to_vec(),
            other => panic!("Expected Program at the entry point, found {other:?}"),
        }
    }

    fn expect_syntax_error(source: &str, expected: SyntaxError) {
        match Parser::parse(source) {
            Ok(_) => panic!("Expected error from '{source}'"),
            Err(error) => match error.error {
                ErrorKind::SyntaxError(found) => assert_eq!(
                    std::mem::discriminant(&found),
                    std::mem::discriminant(&expected),
                    "Expected {expected:?}, found {found:?}"
                ),
                other => panic!("Expected syntax error, found {other:?}"),
            },
        }
    }

    #[test]
    fn var_declaration_with_initializer() {
        let ast = parse("var a = 5;");
        let children = program_children(&ast);
        assert_eq!(children.len(), 1);
        match &ast.node(children[0]).node {
            Node::VarDeclaration {
                name,
                expression: Some(expression),
            } => {
                assert_eq!(name.as_ref(), "a");
                assert_eq!(ast.node(*expression).node, Node::Int(5));
            }
            other => panic!("Expected VarDeclaration, found {other:?}"),
        }
    }

    #[test]
    fn var_declaration_without_initializer() {
        let ast = parse("var a;");
        let children = program_children(&ast);
        assert!(matches!(
            &ast.node(children[0]).node,
            Node::VarDeclaration {
                expression: None,
                ..
            }
        ));
    }

    #[test]
    fn term_precedence_binds_tighter() {
        let ast = parse("1 + 2 * 3");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::BinOp {
                op: AstBinOp::Add,
                lhs,
                rhs,
            } => {
                assert_eq!(ast.node(*lhs).node, Node::Int(1));
                assert!(matches!(
                    ast.node(*rhs).node,
                    Node::BinOp {
                        op: AstBinOp::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("Expected Add at the root, found {other:?}"),
        }
    }

    #[test]
    fn comparisons_share_additive_precedence() {
        // All non-term operators are grouped left-associatively,
        // so this parses as (a >= b) + c
        let ast = parse("a >= b + c");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::BinOp {
                op: AstBinOp::Add,
                lhs,
                ..
            } => {
                assert!(matches!(
                    ast.node(*lhs).node,
                    Node::BinOp {
                        op: AstBinOp::GreaterEqual,
                        ..
                    }
                ));
            }
            other => panic!("Expected Add at the root, found {other:?}"),
        }
    }

    #[test]
    fn numeric_range() {
        let ast = parse("1..10");
        let children = program_children(&ast);
        assert_eq!(
            ast.node(children[0]).node,
            Node::NumericRange { min: 1, max: 10 }
        );
    }

    #[test]
    fn function_declaration() {
        let ast = parse("fun add(a, b: int) { ret a + b; }");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                assert_eq!(name.as_ref(), "add");
                assert_eq!(parameters.len(), 2);
                match &ast.node(parameters[1]).node {
                    Node::FunctionParameter {
                        name, type_name, ..
                    } => {
                        assert_eq!(name.as_ref(), "b");
                        assert_eq!(type_name.as_deref(), Some("int"));
                    }
                    other => panic!("Expected FunctionParameter, found {other:?}"),
                }
                assert!(matches!(ast.node(*body).node, Node::Scope(_)));
            }
            other => panic!("Expected FunctionDeclaration, found {other:?}"),
        }
    }

    #[test]
    fn function_expression_initializer() {
        let ast = parse("var f = fun(x) { ret x; };");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::VarDeclaration {
                expression: Some(expression),
                ..
            } => {
                assert!(matches!(
                    ast.node(*expression).node,
                    Node::FunctionExpression { .. }
                ));
            }
            other => panic!("Expected VarDeclaration, found {other:?}"),
        }
    }

    #[test]
    fn function_call_with_arguments() {
        let ast = parse("add(1, 2 + 3)");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::FunctionCall {
                function,
                arguments,
            } => {
                assert_eq!(function.as_ref(), "add");
                assert_eq!(arguments.len(), 2);
            }
            other => panic!("Expected FunctionCall, found {other:?}"),
        }
    }

    #[test]
    fn array_literal() {
        let ast = parse("[1, 2, 3]");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::Array(elements) => assert_eq!(elements.len(), 3),
            other => panic!("Expected Array, found {other:?}"),
        }
    }

    #[test]
    fn object_literal() {
        let ast = parse("[ 'k' : 1, 'v' : 2 ]");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::Object(entries) => {
                assert_eq!(entries.len(), 2);
                match &ast.node(entries[0]).node {
                    Node::KeyValue { key, value } => {
                        assert_eq!(ast.node(*key).node, Node::Str("k".into()));
                        assert_eq!(ast.node(*value).node, Node::Int(1));
                    }
                    other => panic!("Expected KeyValue, found {other:?}"),
                }
            }
            other => panic!("Expected Object, found {other:?}"),
        }
    }

    #[test]
    fn member_access() {
        let ast = parse("o.k + o.v");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::BinOp { lhs, .. } => {
                assert_eq!(
                    ast.node(*lhs).node,
                    Node::Access {
                        object: "o".into(),
                        field: "k".into(),
                    }
                );
            }
            other => panic!("Expected BinOp, found {other:?}"),
        }
    }

    #[test]
    fn for_loop() {
        let ast = parse("for (var x : 1..3) { x }");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::RangedLoop {
                declaration,
                range,
                body,
            } => {
                assert!(matches!(
                    ast.node(*declaration).node,
                    Node::VarDeclaration {
                        expression: None,
                        ..
                    }
                ));
                assert_eq!(
                    ast.node(*range).node,
                    Node::NumericRange { min: 1, max: 3 }
                );
                assert!(matches!(ast.node(*body).node, Node::Scope(_)));
            }
            other => panic!("Expected RangedLoop, found {other:?}"),
        }
    }

    #[test]
    fn if_else_if_else() {
        let ast = parse("if (a) { 1 } else if (b) { 2 } else { 3 }");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::If(AstIf {
                declaration,
                else_ifs,
                else_body,
                ..
            }) => {
                assert!(declaration.is_none());
                assert_eq!(else_ifs.len(), 1);
                assert!(else_body.is_some());
                assert!(matches!(
                    ast.node(else_ifs[0]).node,
                    Node::ElseIf {
                        declaration: None,
                        ..
                    }
                ));
            }
            other => panic!("Expected If, found {other:?}"),
        }
    }

    #[test]
    fn if_with_declaration() {
        let ast = parse("if (var x = f(); x > 2) { x }");
        let children = program_children(&ast);
        assert!(matches!(
            &ast.node(children[0]).node,
            Node::If(AstIf {
                declaration: Some(_),
                ..
            })
        ));
    }

    #[test]
    fn assignment() {
        let ast = parse("a = 20");
        let children = program_children(&ast);
        match &ast.node(children[0]).node {
            Node::Assignment { target, expression } => {
                assert_eq!(target.as_ref(), "a");
                assert_eq!(ast.node(*expression).node, Node::Int(20));
            }
            other => panic!("Expected Assignment, found {other:?}"),
        }
    }

    #[test]
    fn semicolons_are_skipped() {
        let ast = parse(";;1;;2;;");
        let children = program_children(&ast);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn parsing_is_deterministic() {
        let source = "fun f(a) { ret a * 2; } ret f(21);";
        let a = parse(source);
        let b = parse(source);
        assert_eq!(a.nodes().len(), b.nodes().len());
        for (node_a, node_b) in a.nodes().iter().zip(b.nodes().iter()) {
            assert_eq!(node_a.node, node_b.node);
        }
    }

    #[test]
    fn error_var_without_name() {
        expect_syntax_error("var 5;", SyntaxError::ExpectedVarName);
    }

    #[test]
    fn error_mixed_array_and_object() {
        expect_syntax_error("['k': 1, 2]", SyntaxError::MixedArrayAndObject);
    }

    #[test]
    fn error_unsupported_operator() {
        expect_syntax_error("1 % 2", SyntaxError::UnsupportedBinaryOperator);
    }

    #[test]
    fn error_unterminated_scope() {
        expect_syntax_error("{ 1; 2", SyntaxError::ExpectedScopeEnd);
    }

    #[test]
    fn error_carries_offending_token() {
        match Parser::parse("var 5;") {
            Err(error) => {
                assert_eq!(error.token.content, "5");
                assert_eq!(error.token.span.start.column, 4);
            }
            Ok(_) => panic!("Expected error"),
        }
    }
}
