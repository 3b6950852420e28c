//! Tree-walking evaluator. Runs the checked program directly from the
//! syntax tree; the three-address listing is a reporting artifact, not
//! the execution vehicle.

pub mod value;

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};

use crate::lexer::token::TokenKind;
use crate::parser::ast::{BinaryOp, Expr, FunctionDecl, Program, Stmt, UnaryOp};
use value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl Error for RuntimeError {}

/// How a statement finished: fell through, or unwound with a value.
enum Flow {
    Normal,
    Return(Value),
}

/// Everything a run produced. `output` keeps whatever `print` emitted
/// before a failure, so diagnostics can show partial output.
pub struct Execution {
    pub output: Vec<String>,
    pub result: Result<i32, RuntimeError>,
}

pub struct Interpreter {
    functions: HashMap<String, FunctionDecl>,
    scopes: Vec<HashMap<String, Value>>,
    output: Vec<String>,
    input: Box<dyn BufRead>,
}

impl Interpreter {
    pub fn new(program: &Program) -> Self {
        let functions = program
            .functions
            .iter()
            .map(|function| (function.name.lexeme.clone(), function.clone()))
            .collect();

        Self {
            functions,
            scopes: Vec::new(),
            output: Vec::new(),
            input: Box::new(io::stdin().lock()),
        }
    }

    /// Replaces the source `input` reads from. Tests feed a cursor here.
    pub fn with_input(mut self, input: Box<dyn BufRead>) -> Self {
        self.input = input;
        self
    }

    /// Runs `main` to completion. The process exit code is `main`'s
    /// return value, or 0 when it returns nothing.
    pub fn run(mut self) -> Execution {
        if !self.functions.contains_key("main") {
            return Execution {
                output: self.output,
                result: Err(RuntimeError::new("No 'main' function found")),
            };
        }

        let result = self.call_function("main", Vec::new()).and_then(|value| {
            match value {
                Value::Void => Ok(0),
                other => other.as_int().map(|code| code as i32),
            }
        });

        Execution {
            output: self.output,
            result,
        }
    }

    fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let Some(function) = self.functions.get(name).cloned() else {
            return Err(RuntimeError::new(format!("Undefined function '{}'", name)));
        };

        self.scopes.push(HashMap::new());
        for (i, param) in function.params.iter().enumerate() {
            // Missing trailing arguments bind as Void.
            let value = args.get(i).cloned().unwrap_or(Value::Void);
            self.define(&param.name.lexeme, value);
        }

        let mut result = Value::Void;
        for stmt in &function.body {
            match self.execute_statement(stmt)? {
                Flow::Normal => {}
                Flow::Return(value) => {
                    result = value;
                    break;
                }
            }
        }

        self.scopes.pop();
        Ok(result)
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Declaration {
                name, initializer, ..
            } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Void,
                };
                self.define(&name.lexeme, value);
                Ok(Flow::Normal)
            }
            Stmt::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                if !self.assign(&name.lexeme, value) {
                    return Err(RuntimeError::new(format!(
                        "Undefined variable '{}'",
                        name.lexeme
                    )));
                }
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let condition = self.evaluate(condition)?;
                if condition.as_bool() {
                    self.execute_block(then_branch)
                } else {
                    self.execute_block(else_branch)
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                loop {
                    if !self.evaluate(condition)?.as_bool() {
                        break;
                    }
                    if let Flow::Return(value) = self.execute_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Void,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Block(statements) => self.execute_block(statements),
        }
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        self.scopes.push(HashMap::new());
        for stmt in statements {
            match self.execute_statement(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    self.scopes.pop();
                    return other;
                }
            }
        }
        self.scopes.pop();
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => match value.kind {
                TokenKind::Number => value
                    .lexeme
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| {
                        RuntimeError::new(format!("invalid integer literal '{}'", value.lexeme))
                    }),
                TokenKind::Float => value
                    .lexeme
                    .parse()
                    .map(Value::Float)
                    .map_err(|_| {
                        RuntimeError::new(format!("invalid float literal '{}'", value.lexeme))
                    }),
                TokenKind::True => Ok(Value::Bool(true)),
                TokenKind::False => Ok(Value::Bool(false)),
                TokenKind::Str => Ok(Value::Str(value.lexeme.clone())),
                _ => Ok(Value::Void),
            },
            Expr::Variable { name } => match self.lookup(&name.lexeme) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::new(format!(
                    "Undefined variable '{}'",
                    name.lexeme
                ))),
            },
            Expr::Unary { op, operand, .. } => {
                let operand = self.evaluate(operand)?;
                match op {
                    UnaryOp::Negate => match operand {
                        Value::Int(value) => Ok(Value::Int(-value)),
                        Value::Float(value) => Ok(Value::Float(-value)),
                        _ => Err(RuntimeError::new("operator '-' requires numeric operands")),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!operand.as_bool())),
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(*op, left, right)
            }
            Expr::Call { callee, args } => self.call(callee.lexeme.as_str(), args),
            Expr::Sequence { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(Value::Sequence(items))
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
        match op {
            // Equality compares printed forms; every value prints.
            BinaryOp::Equal => Ok(Value::Bool(left.to_string() == right.to_string())),
            BinaryOp::NotEqual => Ok(Value::Bool(left.to_string() != right.to_string())),
            BinaryOp::And => Ok(Value::Bool(left.as_bool() && right.as_bool())),
            BinaryOp::Or => Ok(Value::Bool(left.as_bool() || right.as_bool())),
            BinaryOp::Less => Ok(Value::Bool(left.as_float()? < right.as_float()?)),
            BinaryOp::LessEqual => Ok(Value::Bool(left.as_float()? <= right.as_float()?)),
            BinaryOp::Greater => Ok(Value::Bool(left.as_float()? > right.as_float()?)),
            BinaryOp::GreaterEqual => Ok(Value::Bool(left.as_float()? >= right.as_float()?)),
            BinaryOp::Modulo => {
                let divisor = right.as_int()?;
                if divisor == 0 {
                    return Err(RuntimeError::new("division by zero"));
                }
                Ok(Value::Int(left.as_int()? % divisor))
            }
            BinaryOp::Add => match (left, right) {
                (Value::Sequence(mut first), Value::Sequence(second)) => {
                    first.extend(second);
                    Ok(Value::Sequence(first))
                }
                (left, right) => self.arithmetic(left, right, |l, r| l + r),
            },
            BinaryOp::Subtract => self.arithmetic(left, right, |l, r| l - r),
            BinaryOp::Multiply => self.arithmetic(left, right, |l, r| l * r),
            BinaryOp::Divide => {
                if right.as_float()? == 0.0 {
                    return Err(RuntimeError::new("division by zero"));
                }
                self.arithmetic(left, right, |l, r| l / r)
            }
        }
    }

    /// Numeric arithmetic runs in f64; the result narrows back to Int
    /// unless either side was a float.
    fn arithmetic(
        &self,
        left: Value,
        right: Value,
        apply: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        let result = apply(left.as_float()?, right.as_float()?);
        if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
            Ok(Value::Float(result))
        } else {
            Ok(Value::Int(result as i64))
        }
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Value, RuntimeError> {
        match name {
            "print" => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.evaluate(arg)?.to_string());
                }
                self.output.push(parts.join(" "));
                Ok(Value::Void)
            }
            "length" => {
                if args.len() != 1 {
                    return Err(RuntimeError::new("length expects 1 argument"));
                }
                match self.evaluate(&args[0])? {
                    Value::Sequence(items) => Ok(Value::Int(items.len() as i64)),
                    _ => Err(RuntimeError::new("length expects a sequence")),
                }
            }
            "get" => {
                if args.len() != 2 {
                    return Err(RuntimeError::new("get expects 2 arguments"));
                }
                let Value::Sequence(items) = self.evaluate(&args[0])? else {
                    return Err(RuntimeError::new(
                        "get expects a sequence as the first argument",
                    ));
                };
                let index = self.evaluate(&args[1])?.as_int()?;
                if index < 0 || index as usize >= items.len() {
                    return Err(RuntimeError::new("sequence index out of range"));
                }
                Ok(items[index as usize].clone())
            }
            "map" => {
                if args.len() != 2 {
                    return Err(RuntimeError::new("map expects 2 arguments"));
                }
                let Value::Sequence(items) = self.evaluate(&args[0])? else {
                    return Err(RuntimeError::new(
                        "map expects a sequence as the first argument",
                    ));
                };
                let function = function_identifier(&args[1])?;
                let mut mapped = Vec::with_capacity(items.len());
                for item in items {
                    mapped.push(self.call_function(&function, vec![item])?);
                }
                Ok(Value::Sequence(mapped))
            }
            "filter" => {
                if args.len() != 2 {
                    return Err(RuntimeError::new("filter expects 2 arguments"));
                }
                let Value::Sequence(items) = self.evaluate(&args[0])? else {
                    return Err(RuntimeError::new(
                        "filter expects a sequence as the first argument",
                    ));
                };
                let function = function_identifier(&args[1])?;
                let mut kept = Vec::new();
                for item in items {
                    if self.call_function(&function, vec![item.clone()])?.as_bool() {
                        kept.push(item);
                    }
                }
                Ok(Value::Sequence(kept))
            }
            "generate" => {
                // Pattern synthesis is not wired up; arguments still
                // evaluate for their effects.
                for arg in args {
                    self.evaluate(arg)?;
                }
                Ok(Value::Sequence(Vec::new()))
            }
            "input" => {
                if args.len() > 1 {
                    return Err(RuntimeError::new("input expects at most 1 argument"));
                }
                if let Some(prompt) = args.first() {
                    let prompt = self.evaluate(prompt)?;
                    let mut stdout = io::stdout();
                    let _ = write!(stdout, "{} ", prompt);
                    let _ = stdout.flush();
                }
                let mut stdout = io::stdout();
                let _ = write!(stdout, "> ");
                let _ = stdout.flush();

                let mut line = String::new();
                let _ = self.input.read_line(&mut line);
                let trimmed = line.trim();
                let value = if let Ok(int) = trimmed.parse::<i64>() {
                    int
                } else if let Ok(float) = trimmed.parse::<f64>() {
                    float as i64
                } else {
                    0
                };
                Ok(Value::Int(value))
            }
            _ => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                self.call_function(name, values)
            }
        }
    }

    fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    fn assign(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

/// `map` and `filter` take the callee by name, not by value.
fn function_identifier(expr: &Expr) -> Result<String, RuntimeError> {
    match expr {
        Expr::Variable { name } => Ok(name.lexeme.clone()),
        _ => Err(RuntimeError::new("expected function identifier")),
    }
}
