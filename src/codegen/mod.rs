//! Lowers the checked tree to three-address code. Temporaries and labels
//! are numbered per run; `generate` resets both counters.

use std::mem;

use crate::parser::ast::{DataType, Expr, FunctionDecl, Program, Stmt};
use crate::scope::ScopeTable;
use crate::tac::{InstrKind, Instruction, Operand};

pub struct CodeGenerator {
    code: Vec<Instruction>,
    scopes: ScopeTable,
    temp_counter: usize,
    label_counter: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            scopes: ScopeTable::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    pub fn generate(&mut self, program: &Program) -> Vec<Instruction> {
        self.code.clear();
        self.scopes = ScopeTable::new();
        self.temp_counter = 0;
        self.label_counter = 0;

        for function in &program.functions {
            self.generate_function(function);
        }

        mem::take(&mut self.code)
    }

    fn generate_function(&mut self, function: &FunctionDecl) {
        self.emit(
            InstrKind::Label(function.name.lexeme.clone()),
            function.name.line,
        );

        self.scopes.enter_scope();
        for param in &function.params {
            self.scopes
                .declare(&param.name.lexeme, param.data_type, true, false);
            // Callers hand arguments over in `param_<name>` slots.
            self.emit(
                InstrKind::Assign {
                    dest: Operand::Var(param.name.lexeme.clone()),
                    src: Operand::Var(format!("param_{}", param.name.lexeme)),
                },
                param.name.line,
            );
        }

        for stmt in &function.body {
            self.generate_statement(stmt);
        }
        self.scopes.exit_scope();

        if function.return_type == DataType::Void {
            self.emit(InstrKind::Return(None), function.name.line);
        }
    }

    fn generate_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration {
                name,
                data_type,
                initializer,
            } => {
                self.scopes
                    .declare(&name.lexeme, *data_type, initializer.is_some(), false);
                if let Some(init) = initializer {
                    let src = self.generate_expression(init);
                    self.emit(
                        InstrKind::Assign {
                            dest: Operand::Var(name.lexeme.clone()),
                            src,
                        },
                        name.line,
                    );
                }
            }
            Stmt::Assignment { name, value } => {
                let src = self.generate_expression(value);
                self.emit(
                    InstrKind::Assign {
                        dest: Operand::Var(name.lexeme.clone()),
                        src,
                    },
                    name.line,
                );
                self.scopes.mark_initialized(&name.lexeme);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                line,
            } => {
                let condition = self.generate_expression(condition);
                let else_label = self.new_label();
                let end_label = self.new_label();

                self.emit(
                    InstrKind::IfFalse {
                        condition,
                        target: else_label.clone(),
                    },
                    *line,
                );

                self.scopes.enter_scope();
                for stmt in then_branch {
                    self.generate_statement(stmt);
                }
                self.scopes.exit_scope();

                self.emit(InstrKind::Goto(end_label.clone()), *line);
                self.emit(InstrKind::Label(else_label), *line);

                self.scopes.enter_scope();
                for stmt in else_branch {
                    self.generate_statement(stmt);
                }
                self.scopes.exit_scope();

                self.emit(InstrKind::Label(end_label), *line);
            }
            Stmt::While {
                condition,
                body,
                line,
            } => {
                let start_label = self.new_label();
                let condition_label = self.new_label();
                let end_label = self.new_label();

                self.emit(InstrKind::Goto(condition_label.clone()), *line);
                self.emit(InstrKind::Label(start_label.clone()), *line);

                self.scopes.enter_scope();
                for stmt in body {
                    self.generate_statement(stmt);
                }
                self.scopes.exit_scope();

                self.emit(InstrKind::Label(condition_label), *line);
                let condition = self.generate_expression(condition);
                self.emit(
                    InstrKind::If {
                        condition,
                        target: start_label,
                    },
                    *line,
                );
                self.emit(InstrKind::Label(end_label), *line);
            }
            Stmt::Return { value, line } => {
                let value = value.as_ref().map(|value| self.generate_expression(value));
                self.emit(InstrKind::Return(value), *line);
            }
            Stmt::Expression(expr) => {
                self.generate_expression(expr);
            }
            Stmt::Block(statements) => {
                self.scopes.enter_scope();
                for stmt in statements {
                    self.generate_statement(stmt);
                }
                self.scopes.exit_scope();
            }
        }
    }

    fn generate_expression(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Literal { value } => Operand::Literal(value.lexeme.clone()),
            Expr::Variable { name } => Operand::Var(name.lexeme.clone()),
            Expr::Unary { op, operand, line } => {
                let operand = self.generate_expression(operand);
                let dest = self.new_temp();
                self.emit(
                    InstrKind::Unary {
                        dest: dest.clone(),
                        op: op.symbol().to_string(),
                        operand,
                    },
                    *line,
                );
                dest
            }
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => {
                let left = self.generate_expression(left);
                let right = self.generate_expression(right);
                let dest = self.new_temp();
                self.emit(
                    InstrKind::Binary {
                        dest: dest.clone(),
                        op: op.symbol().to_string(),
                        left,
                        right,
                    },
                    *line,
                );
                dest
            }
            Expr::Call { callee, args } => {
                // The result temp is numbered before the argument
                // temporaries.
                let dest = self.new_temp();
                let mut arg_operands = Vec::with_capacity(args.len());
                for arg in args {
                    let operand = self.generate_expression(arg);
                    self.emit(InstrKind::Param(operand.clone()), arg.line());
                    arg_operands.push(operand);
                }
                self.emit(
                    InstrKind::Call {
                        dest: dest.clone(),
                        function: callee.lexeme.clone(),
                        args: arg_operands,
                    },
                    callee.line,
                );
                dest
            }
            Expr::Sequence { elements, line } => {
                let dest = self.new_temp();
                self.emit(
                    InstrKind::Assign {
                        dest: dest.clone(),
                        src: Operand::Literal("[]".to_string()),
                    },
                    *line,
                );
                for (index, element) in elements.iter().enumerate() {
                    let value = self.generate_expression(element);
                    self.emit(
                        InstrKind::Store {
                            dest: dest.clone(),
                            value,
                            index: Operand::Literal(index.to_string()),
                        },
                        *line,
                    );
                }
                dest
            }
        }
    }

    fn emit(&mut self, kind: InstrKind, line: usize) {
        self.code.push(Instruction::new(kind, line));
    }

    fn new_temp(&mut self) -> Operand {
        let temp = Operand::Temp(self.temp_counter);
        self.temp_counter += 1;
        temp
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
