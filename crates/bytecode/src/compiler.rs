use crate::{
    instruction::{Instruction, Register},
    program::{Block, BlockKind, ExecutableProgram},
};
use derive_name::VariantName;
use std::rc::Rc;
use tama_parser::{Ast, AstBinOp, AstIf, AstIndex, Node, Span};
use tama_runtime::Value;
use thiserror::Error;

/// The errors that can arise while compiling an AST to bytecode
#[derive(Error, Clone, Debug)]
#[allow(missing_docs)]
pub enum ErrorKind {
    #[error("{} expressions aren't supported by the bytecode compiler", unexpected.variant_name())]
    UnsupportedNode {
        /// The node that has no lowering
        unexpected: Node,
    },
    #[error("comparison operators aren't supported by the bytecode compiler")]
    UnsupportedComparison,
    #[error("instruction emitted outside of a block")]
    MissingBlock,
}

/// An error produced while compiling an AST to bytecode
#[derive(Error, Clone, Debug)]
#[error("{error} - {}:{}", span.start.line + 1, span.start.column + 1)]
pub struct CompilerError {
    /// The error itself
    pub error: ErrorKind,
    /// The span in the source where the error occurred
    pub span: Span,
}

/// The result type used by the [Compiler]
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Compiles an [Ast] into an [ExecutableProgram]
///
/// The whole program lowers into a block named `main`, with each function
/// declaration lowered into its own Returnable block. Only a subset of the
/// language is currently lowered; unsupported constructs produce a
/// [CompilerError] naming the node.
pub struct Compiler {
    finished: Vec<Block>,
    working: Vec<Block>,
    next_register: Register,
}

impl Compiler {
    /// Compiles an AST into an executable program
    pub fn compile(ast: &Ast) -> Result<ExecutableProgram> {
        let mut compiler = Self {
            finished: Vec::new(),
            working: Vec::new(),
            next_register: 0,
        };

        if let Some(entry) = ast.entry_point() {
            compiler.compile_node(ast, entry)?;
        }

        Ok(ExecutableProgram::new(compiler.finished))
    }

    fn allocate_register(&mut self) -> Register {
        let register = self.next_register;
        self.next_register += 1;
        register
    }

    fn begin_block(&mut self, name: Rc<str>, kind: BlockKind) {
        self.working.push(Block::new(name, kind));
    }

    fn end_block(&mut self) {
        if let Some(block) = self.working.pop() {
            self.finished.push(block);
        }
    }

    fn emit(&mut self, instruction: Instruction, span: Span) -> Result<usize> {
        match self.working.last_mut() {
            Some(block) => Ok(block.push(instruction)),
            None => Err(CompilerError {
                error: ErrorKind::MissingBlock,
                span,
            }),
        }
    }

    // The index the next emitted instruction will have in the current block
    fn next_instruction_index(&self) -> usize {
        self.working
            .last()
            .map_or(0, |block| block.instructions().len())
    }

    fn patch_jump(&mut self, index: usize, target: usize) {
        if let Some(block) = self.working.last_mut() {
            block.patch_jump(index, target);
        }
    }

    fn unsupported<T>(&self, node: &Node, span: Span) -> Result<T> {
        Err(CompilerError {
            error: ErrorKind::UnsupportedNode {
                unexpected: node.clone(),
            },
            span,
        })
    }

    fn compile_node(&mut self, ast: &Ast, index: AstIndex) -> Result<()> {
        let span = *ast.node_span(index);

        match &ast.node(index).node {
            Node::Program(children) => {
                self.begin_block("main".into(), BlockKind::Other);
                for child in children {
                    self.compile_node(ast, *child)?;
                }
                self.end_block();
                Ok(())
            }
            Node::Scope(statements) => {
                for statement in statements {
                    self.compile_node(ast, *statement)?;
                }
                Ok(())
            }
            Node::Int(i) => {
                self.emit(Instruction::LoadImmediate(Value::Int(*i)), span)?;
                Ok(())
            }
            Node::Float(f) => {
                self.emit(Instruction::LoadImmediate(Value::Float(*f)), span)?;
                Ok(())
            }
            Node::Str(s) => {
                self.emit(Instruction::LoadImmediate(Value::Str(s.clone())), span)?;
                Ok(())
            }
            Node::Id(name) => {
                self.emit(Instruction::LoadVariable(name.clone()), span)?;
                Ok(())
            }
            Node::VarDeclaration { name, expression } => {
                match expression {
                    Some(expression) => self.compile_node(ast, *expression)?,
                    None => {
                        self.emit(Instruction::LoadImmediate(Value::Undefined), span)?;
                    }
                }
                self.emit(Instruction::StoreVariable(name.clone()), span)?;
                Ok(())
            }
            Node::Assignment { target, expression } => {
                self.compile_node(ast, *expression)?;
                self.emit(Instruction::StoreVariable(target.clone()), span)?;
                Ok(())
            }
            Node::BinOp { op, lhs, rhs } => {
                let arithmetic: fn(Register) -> Instruction = match op {
                    AstBinOp::Add => Instruction::Add,
                    AstBinOp::Subtract => Instruction::Sub,
                    AstBinOp::Multiply => Instruction::Mul,
                    AstBinOp::Divide => Instruction::Div,
                    _ => {
                        return Err(CompilerError {
                            error: ErrorKind::UnsupportedComparison,
                            span,
                        });
                    }
                };

                self.compile_node(ast, *lhs)?;
                let register = self.allocate_register();
                self.emit(Instruction::Store(register), span)?;
                self.compile_node(ast, *rhs)?;
                self.emit(arithmetic(register), span)?;
                Ok(())
            }
            Node::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                self.begin_block(name.clone(), BlockKind::Returnable);

                // Arguments are pushed by the caller in declaration order, so
                // popping binds the last-pushed argument first.
                for parameter in parameters {
                    if let Node::FunctionParameter { name, .. } = &ast.node(*parameter).node {
                        self.emit(Instruction::Pop, span)?;
                        self.emit(Instruction::StoreVariable(name.clone()), span)?;
                    }
                }

                self.compile_node(ast, *body)?;
                self.end_block();
                Ok(())
            }
            Node::FunctionCall {
                function,
                arguments,
            } => {
                for argument in arguments {
                    self.compile_node(ast, *argument)?;
                    self.emit(Instruction::Push, span)?;
                }
                self.emit(Instruction::Call(function.clone()), span)?;
                Ok(())
            }
            Node::Return(expression) => {
                self.compile_node(ast, *expression)?;
                self.emit(Instruction::Ret, span)?;
                Ok(())
            }
            Node::If(ast_if) => self.compile_if(ast, ast_if, span),
            node => self.unsupported(node, span),
        }
    }

    // Each arm's condition lowers into the accumulator, a `jump_if_false`
    // skips over the arm's body, and each body ends with a `jump` to the end
    // of the whole expression. Targets are patched once their indices are
    // known.
    fn compile_if(&mut self, ast: &Ast, ast_if: &AstIf, span: Span) -> Result<()> {
        let mut end_jumps = Vec::new();

        let mut arms = vec![(ast_if.declaration, ast_if.condition, ast_if.then_body)];
        for else_if in &ast_if.else_ifs {
            if let Node::ElseIf {
                declaration,
                condition,
                body,
            } = &ast.node(*else_if).node
            {
                arms.push((*declaration, *condition, *body));
            }
        }

        for (declaration, condition, body) in arms {
            if let Some(declaration) = declaration {
                self.compile_node(ast, declaration)?;
            }
            self.compile_node(ast, condition)?;

            let skip_arm = self.emit(Instruction::JumpIfFalse(0), span)?;
            self.compile_node(ast, body)?;
            end_jumps.push(self.emit(Instruction::Jump(0), span)?);

            let next_arm = self.next_instruction_index();
            self.patch_jump(skip_arm, next_arm);
        }

        if let Some(else_body) = ast_if.else_body {
            self.compile_node(ast, else_body)?;
        }

        let end = self.next_instruction_index();
        for jump in end_jumps {
            self.patch_jump(jump, end);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tama_parser::Parser;

    fn compile(source: &str) -> ExecutableProgram {
        let ast = match Parser::parse(source) {
            Ok(ast) => ast,
            Err(error) => panic!("{error}"),
        };
        match Compiler::compile(&ast) {
            Ok(program) => program,
            Err(error) => panic!("{error}"),
        }
    }

    fn disassemble(block: &Block) -> Vec<String> {
        block
            .instructions()
            .iter()
            .map(|instruction| instruction.to_string())
            .collect()
    }

    #[test]
    fn addition_uses_a_fresh_register() {
        let program = compile("var a = 5 + 5;");
        let main = program.block_by_name("main").expect("Missing main block");
        assert_eq!(
            disassemble(main),
            &["loadi 5", "store $0", "loadi 5", "add $0", "storev 'a'"]
        );
    }

    #[test]
    fn registers_allocate_monotonically() {
        let program = compile("var a = 1 + 2; var b = 3 - 4;");
        let main = program.block_by_name("main").expect("Missing main block");
        assert_eq!(
            disassemble(main),
            &[
                "loadi 1", "store $0", "loadi 2", "add $0", "storev 'a'", "loadi 3", "store $1",
                "loadi 4", "sub $1", "storev 'b'",
            ]
        );
    }

    #[test]
    fn function_declarations_become_returnable_blocks() {
        let program = compile("fun testing(a, b) { ret a + b; }");
        let block = program
            .block_by_name("testing")
            .expect("Missing function block");
        assert_eq!(block.kind(), BlockKind::Returnable);
        assert_eq!(
            disassemble(block),
            &[
                "pop",
                "storev 'a'",
                "pop",
                "storev 'b'",
                "loadv 'a'",
                "store $0",
                "loadv 'b'",
                "add $0",
                "ret",
            ]
        );
    }

    #[test]
    fn calls_push_arguments_in_order() {
        let program = compile("f(1, 2)");
        let main = program.block_by_name("main").expect("Missing main block");
        assert_eq!(
            disassemble(main),
            &["loadi 1", "push", "loadi 2", "push", "call 'f'"]
        );
    }

    #[test]
    fn var_declaration_without_initializer_loads_undefined() {
        let program = compile("var a;");
        let main = program.block_by_name("main").expect("Missing main block");
        assert_eq!(disassemble(main), &["loadi undefined", "storev 'a'"]);
    }

    #[test]
    fn if_lowers_with_patched_jumps() {
        let program = compile("if (a) { var x = 1; } else { var x = 2; }");
        let main = program.block_by_name("main").expect("Missing main block");
        assert_eq!(
            disassemble(main),
            &[
                "loadv 'a'",
                "jump_if_false 5",
                "loadi 1",
                "storev 'x'",
                "jump 7",
                "loadi 2",
                "storev 'x'",
            ]
        );
    }

    #[test]
    fn else_if_chains_lower_sequentially() {
        let program = compile("if (a) { 1 } else if (b) { 2 } else { 3 }");
        let main = program.block_by_name("main").expect("Missing main block");
        assert_eq!(
            disassemble(main),
            &[
                "loadv 'a'",
                "jump_if_false 4",
                "loadi 1",
                "jump 9",
                "loadv 'b'",
                "jump_if_false 8",
                "loadi 2",
                "jump 9",
                "loadi 3",
            ]
        );
    }

    #[test]
    fn main_block_lowers_program_nodes_in_order() {
        let program = compile("var a = 1; fun f() { ret 2; } a");
        // Function blocks finish before the main block does
        assert_eq!(program.blocks().len(), 2);
        assert_eq!(program.blocks()[0].name().as_ref(), "f");
        assert_eq!(program.blocks()[1].name().as_ref(), "main");
    }

    #[test]
    fn unsupported_nodes_are_reported() {
        let ast = Parser::parse("for (var x : 1..3) { x }").expect("Parse failure");
        let error = Compiler::compile(&ast).expect_err("Expected a compile error");
        assert!(matches!(
            error.error,
            ErrorKind::UnsupportedNode { .. }
        ));
        assert!(error.to_string().contains("RangedLoop"));
    }

    #[test]
    fn comparisons_are_reported_as_unsupported() {
        let ast = Parser::parse("1 < 2").expect("Parse failure");
        let error = Compiler::compile(&ast).expect_err("Expected a compile error");
        assert!(matches!(error.error, ErrorKind::UnsupportedComparison));
    }
}
