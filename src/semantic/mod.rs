//! Type checking and symbol resolution. Diagnostics accumulate instead
//! of aborting; `analyze` reports overall success while keeping every
//! error and warning it found.

use crate::lexer::token::TokenKind;
use crate::parser::ast::{
    BinaryOp, DataType, Expr, FunctionDecl, Program, Stmt, UnaryOp,
};
use crate::scope::ScopeTable;

pub struct SemanticAnalyzer {
    scopes: ScopeTable,
    errors: Vec<String>,
    warnings: Vec<String>,
    current_return_type: DataType,
    in_function: bool,
    has_return: bool,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            scopes: ScopeTable::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            current_return_type: DataType::Void,
            in_function: false,
            has_return: false,
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Checks the whole program. Returns true when no errors were found;
    /// warnings alone do not fail the analysis.
    pub fn analyze(&mut self, program: &Program) -> bool {
        self.scopes = ScopeTable::new();
        self.errors.clear();
        self.warnings.clear();
        self.current_return_type = DataType::Void;
        self.in_function = false;
        self.has_return = false;

        self.declare_builtins();

        for function in &program.functions {
            if !self.scopes.declare(
                &function.name.lexeme,
                function.return_type,
                true,
                false,
            ) {
                self.error(
                    Some(function.name.line),
                    format!("Function '{}' already declared", function.name.lexeme),
                );
            }
        }

        let has_main = program.functions.iter().any(|function| {
            function.name.lexeme == "main"
                && function.params.is_empty()
                && function.return_type == DataType::Int
        });
        if !has_main {
            self.warning(
                None,
                "Program should have a 'main' function with signature: func main() -> int"
                    .to_string(),
            );
        }

        for function in &program.functions {
            self.analyze_function(function);
        }

        self.errors.is_empty()
    }

    fn declare_builtins(&mut self) {
        let builtins = [
            ("print", DataType::Void),
            ("generate", DataType::Sequence),
            ("map", DataType::Sequence),
            ("filter", DataType::Sequence),
            ("length", DataType::Int),
            ("get", DataType::Int),
            ("input", DataType::Int),
        ];
        for (name, data_type) in builtins {
            self.scopes.declare(name, data_type, true, false);
        }
    }

    fn analyze_function(&mut self, function: &FunctionDecl) {
        self.in_function = true;
        self.current_return_type = function.return_type;
        self.has_return = false;

        self.scopes.enter_scope();
        for param in &function.params {
            if !self
                .scopes
                .declare(&param.name.lexeme, param.data_type, true, false)
            {
                self.error(
                    Some(param.name.line),
                    format!("Parameter '{}' already declared", param.name.lexeme),
                );
            }
        }

        for stmt in &function.body {
            self.analyze_statement(stmt);
        }
        self.scopes.exit_scope();

        if function.return_type != DataType::Void && !self.has_return {
            self.warning(
                Some(function.name.line),
                format!("Function '{}' may not return a value", function.name.lexeme),
            );
        }

        self.in_function = false;
    }

    fn analyze_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration {
                name,
                data_type,
                initializer,
            } => {
                let value_type = initializer.as_ref().map(|init| self.expression_type(init));

                if !self.scopes.declare(
                    &name.lexeme,
                    *data_type,
                    initializer.is_some(),
                    false,
                ) {
                    self.error(
                        Some(name.line),
                        format!("Variable '{}' already declared in this scope", name.lexeme),
                    );
                }

                if let Some(value_type) = value_type {
                    if !assignable(*data_type, value_type) {
                        self.error(
                            Some(name.line),
                            format!(
                                "Type mismatch in initialization of '{}', expected {} but got {}",
                                name.lexeme, data_type, value_type
                            ),
                        );
                    }
                }
            }
            Stmt::Assignment { name, value } => {
                let Some(symbol) = self.scopes.lookup(&name.lexeme) else {
                    self.error(
                        Some(name.line),
                        format!("Undefined variable '{}'", name.lexeme),
                    );
                    return;
                };
                let (data_type, constant) = (symbol.data_type, symbol.constant);

                let value_type = self.expression_type(value);

                if constant {
                    self.error(
                        Some(name.line),
                        format!("Cannot assign to constant '{}'", name.lexeme),
                    );
                }
                if !assignable(data_type, value_type) {
                    self.error(
                        Some(name.line),
                        format!(
                            "Type mismatch in assignment to '{}', expected {} but got {}",
                            name.lexeme, data_type, value_type
                        ),
                    );
                }
                self.scopes.mark_initialized(&name.lexeme);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                line,
            } => {
                let condition_type = self.expression_type(condition);
                if condition_type != DataType::Bool && condition_type != DataType::Unknown {
                    self.error(Some(*line), "Condition expression must be boolean".to_string());
                }

                self.scopes.enter_scope();
                for stmt in then_branch {
                    self.analyze_statement(stmt);
                }
                self.scopes.exit_scope();

                if !else_branch.is_empty() {
                    self.scopes.enter_scope();
                    for stmt in else_branch {
                        self.analyze_statement(stmt);
                    }
                    self.scopes.exit_scope();
                }
            }
            Stmt::While {
                condition,
                body,
                line,
            } => {
                let condition_type = self.expression_type(condition);
                if condition_type != DataType::Bool && condition_type != DataType::Unknown {
                    self.error(Some(*line), "Condition expression must be boolean".to_string());
                }

                self.scopes.enter_scope();
                for stmt in body {
                    self.analyze_statement(stmt);
                }
                self.scopes.exit_scope();
            }
            Stmt::Return { value, line } => {
                if !self.in_function {
                    self.error(Some(*line), "Return statement outside function".to_string());
                    return;
                }
                self.has_return = true;

                match value {
                    Some(value) => {
                        let value_type = self.expression_type(value);
                        if !assignable(self.current_return_type, value_type) {
                            self.error(
                                Some(*line),
                                format!(
                                    "Return type mismatch, expected {} but got {}",
                                    self.current_return_type, value_type
                                ),
                            );
                        }
                    }
                    None => {
                        if self.current_return_type != DataType::Void {
                            self.error(
                                Some(*line),
                                format!(
                                    "Function must return a value of type {}",
                                    self.current_return_type
                                ),
                            );
                        }
                    }
                }
            }
            Stmt::Expression(expr) => {
                self.expression_type(expr);
            }
            Stmt::Block(statements) => {
                self.scopes.enter_scope();
                for stmt in statements {
                    self.analyze_statement(stmt);
                }
                self.scopes.exit_scope();
            }
        }
    }

    fn expression_type(&mut self, expr: &Expr) -> DataType {
        match expr {
            Expr::Literal { value } => match value.kind {
                TokenKind::Number => DataType::Int,
                TokenKind::Float => DataType::Float,
                TokenKind::True | TokenKind::False => DataType::Bool,
                // String literals live in the sequence corner of the
                // lattice; there is no standalone string type.
                TokenKind::Str => DataType::Sequence,
                _ => DataType::Unknown,
            },
            Expr::Variable { name } => {
                let Some(symbol) = self.scopes.lookup(&name.lexeme) else {
                    self.error(
                        Some(name.line),
                        format!("Undefined variable '{}'", name.lexeme),
                    );
                    return DataType::Unknown;
                };
                let (data_type, initialized) = (symbol.data_type, symbol.initialized);
                if !initialized {
                    self.warning(
                        Some(name.line),
                        format!("Variable '{}' may be uninitialized", name.lexeme),
                    );
                }
                data_type
            }
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => self.binary_type(*op, left, right, *line),
            Expr::Unary { op, operand, line } => {
                let operand_type = self.expression_type(operand);
                match op {
                    UnaryOp::Negate => {
                        if !is_numeric(operand_type) {
                            self.error(
                                Some(*line),
                                format!(
                                    "Invalid unary operation '{}' for type {}",
                                    op.symbol(),
                                    operand_type
                                ),
                            );
                            return DataType::Unknown;
                        }
                        operand_type
                    }
                    UnaryOp::Not => {
                        if operand_type != DataType::Bool {
                            self.error(
                                Some(*line),
                                format!(
                                    "Invalid unary operation '{}' for type {}",
                                    op.symbol(),
                                    operand_type
                                ),
                            );
                            return DataType::Unknown;
                        }
                        DataType::Bool
                    }
                }
            }
            Expr::Call { callee, args } => self.call_type(callee, args),
            Expr::Sequence { elements, line } => {
                let mut element_type = None;
                let mut consistent = true;
                for element in elements {
                    let t = self.expression_type(element);
                    match element_type {
                        None => element_type = Some(t),
                        Some(first) if first != t => consistent = false,
                        Some(_) => {}
                    }
                }
                if !consistent {
                    self.warning(Some(*line), "Inconsistent types in sequence".to_string());
                }
                DataType::Sequence
            }
        }
    }

    fn binary_type(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: usize) -> DataType {
        let left_type = self.expression_type(left);
        let right_type = self.expression_type(right);

        match op {
            BinaryOp::Add
                if left_type == DataType::Sequence && right_type == DataType::Sequence =>
            {
                DataType::Sequence
            }
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
                if !numeric_compatible(left_type, right_type) {
                    self.mismatch(op, left_type, right_type, line);
                    return DataType::Unknown;
                }
                if left_type == DataType::Float || right_type == DataType::Float {
                    DataType::Float
                } else {
                    DataType::Int
                }
            }
            BinaryOp::Modulo => {
                let integral = |t| t == DataType::Int || t == DataType::Unknown;
                if !integral(left_type) || !integral(right_type) {
                    self.mismatch(op, left_type, right_type, line);
                    return DataType::Unknown;
                }
                DataType::Int
            }
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                if !numeric_compatible(left_type, right_type) {
                    self.mismatch(op, left_type, right_type, line);
                    return DataType::Unknown;
                }
                DataType::Bool
            }
            BinaryOp::Equal | BinaryOp::NotEqual => {
                let compatible = left_type == right_type
                    || (is_numeric(left_type) && is_numeric(right_type))
                    || left_type == DataType::Unknown
                    || right_type == DataType::Unknown;
                if !compatible {
                    self.mismatch(op, left_type, right_type, line);
                    return DataType::Unknown;
                }
                DataType::Bool
            }
            BinaryOp::And | BinaryOp::Or => {
                let compatible = (left_type == DataType::Bool
                    || left_type == DataType::Unknown)
                    && (right_type == DataType::Bool || right_type == DataType::Unknown);
                if !compatible {
                    self.mismatch(op, left_type, right_type, line);
                    return DataType::Unknown;
                }
                DataType::Bool
            }
        }
    }

    fn call_type(&mut self, callee: &crate::lexer::token::Token, args: &[Expr]) -> DataType {
        let line = callee.line;
        match callee.lexeme.as_str() {
            "print" => {
                for arg in args {
                    self.expression_type(arg);
                }
                DataType::Void
            }
            "length" => {
                if args.len() != 1 {
                    self.error(Some(line), "Function 'length' expects 1 argument".to_string());
                    return DataType::Int;
                }
                let arg_type = self.expression_type(&args[0]);
                if arg_type != DataType::Sequence && arg_type != DataType::Unknown {
                    self.error(
                        Some(line),
                        "Function 'length' expects a sequence argument".to_string(),
                    );
                }
                DataType::Int
            }
            "get" => {
                if args.len() != 2 {
                    self.error(
                        Some(line),
                        "Array indexing requires array and index".to_string(),
                    );
                    return DataType::Unknown;
                }
                let sequence_type = self.expression_type(&args[0]);
                let index_type = self.expression_type(&args[1]);
                if sequence_type != DataType::Sequence && sequence_type != DataType::Unknown {
                    self.error(Some(line), "Cannot index non-sequence type".to_string());
                }
                if index_type != DataType::Int && index_type != DataType::Unknown {
                    self.error(Some(line), "Array index must be an integer".to_string());
                }
                // Elements are assumed integral; the checker has no
                // per-element type to hand back.
                DataType::Int
            }
            "map" => {
                if args.len() != 2 {
                    self.error(Some(line), "Function 'map' expects 2 arguments".to_string());
                    return DataType::Sequence;
                }
                for arg in args {
                    self.expression_type(arg);
                }
                DataType::Sequence
            }
            "filter" => {
                if args.len() != 2 {
                    self.error(
                        Some(line),
                        "Function 'filter' expects 2 arguments".to_string(),
                    );
                    return DataType::Sequence;
                }
                for arg in args {
                    self.expression_type(arg);
                }
                DataType::Sequence
            }
            "generate" => {
                for arg in args {
                    self.expression_type(arg);
                }
                DataType::Sequence
            }
            "input" => {
                if args.len() > 1 {
                    self.error(
                        Some(line),
                        "Function 'input' expects 0 or 1 argument".to_string(),
                    );
                    return DataType::Int;
                }
                if let Some(prompt) = args.first() {
                    let prompt_type = self.expression_type(prompt);
                    if prompt_type != DataType::Sequence && prompt_type != DataType::Unknown {
                        self.error(
                            Some(line),
                            "Function 'input' expects a string literal prompt".to_string(),
                        );
                    }
                }
                DataType::Int
            }
            name => {
                let Some(symbol) = self.scopes.lookup(name) else {
                    self.error(Some(line), format!("Undefined function '{}'", name));
                    for arg in args {
                        self.expression_type(arg);
                    }
                    return DataType::Unknown;
                };
                let return_type = symbol.data_type;
                for arg in args {
                    self.expression_type(arg);
                }
                return_type
            }
        }
    }

    fn mismatch(&mut self, op: BinaryOp, left: DataType, right: DataType, line: usize) {
        self.error(
            Some(line),
            format!(
                "Type mismatch in binary operation '{}', left: {}, right: {}",
                op.symbol(),
                left,
                right
            ),
        );
    }

    fn error(&mut self, line: Option<usize>, message: String) {
        self.errors.push(diagnostic("Semantic Error", line, &message));
    }

    fn warning(&mut self, line: Option<usize>, message: String) {
        self.warnings
            .push(diagnostic("Semantic Warning", line, &message));
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn diagnostic(severity: &str, line: Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("{} at line {}: {}", severity, line, message),
        None => format!("{}: {}", severity, message),
    }
}

fn is_numeric(data_type: DataType) -> bool {
    matches!(data_type, DataType::Int | DataType::Float)
}

fn numeric_compatible(left: DataType, right: DataType) -> bool {
    (is_numeric(left) || left == DataType::Unknown)
        && (is_numeric(right) || right == DataType::Unknown)
}

/// Whether a value of `actual` type may land in a slot of `expected`
/// type. Int widens to float; `Unknown` matches anything.
fn assignable(expected: DataType, actual: DataType) -> bool {
    expected == actual
        || expected == DataType::Unknown
        || actual == DataType::Unknown
        || (expected == DataType::Float && actual == DataType::Int)
}
