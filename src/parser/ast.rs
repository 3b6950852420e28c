use std::fmt;

use crate::lexer::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Bool,
    Sequence,
    Pattern,
    Void,
    Unknown,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::Sequence => "sequence",
            DataType::Pattern => "pattern",
            DataType::Void => "void",
            DataType::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    /// The operator's textual form in the three-address listing.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        line: usize,
    },
    Literal {
        value: Token,
    },
    Variable {
        name: Token,
    },
    Call {
        callee: Token,
        args: Vec<Expr>,
    },
    Sequence {
        elements: Vec<Expr>,
        line: usize,
    },
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::Binary { line, .. } => *line,
            Expr::Unary { line, .. } => *line,
            Expr::Literal { value } => value.line,
            Expr::Variable { name } => name.line,
            Expr::Call { callee, .. } => callee.line,
            Expr::Sequence { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declaration {
        name: Token,
        data_type: DataType,
        initializer: Option<Expr>,
    },
    Assignment {
        name: Token,
        value: Expr,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        line: usize,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        line: usize,
    },
    Return {
        value: Option<Expr>,
        line: usize,
    },
    Expression(Expr),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Token,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Param>,
    pub return_type: DataType,
    pub body: Vec<Stmt>,
}

/// Root owner of the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: Vec<FunctionDecl>,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { op, left, right, .. } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Unary { op, operand, .. } => write!(f, "({}{})", op.symbol(), operand),
            Expr::Literal { value } => write!(f, "{}", value.lexeme),
            Expr::Variable { name } => write!(f, "{}", name.lexeme),
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee.lexeme)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Sequence { elements, .. } => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {}(", self.name.lexeme)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name.lexeme, param.data_type)?;
        }
        writeln!(f, ") -> {}", self.return_type)?;
        for stmt in &self.body {
            fmt_stmt(f, stmt, 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

fn fmt_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match stmt {
        Stmt::Declaration {
            name,
            data_type,
            initializer,
        } => {
            write!(f, "{}let {}: {}", indent, name.lexeme, data_type)?;
            if let Some(init) = initializer {
                write!(f, " = {}", init)?;
            }
            writeln!(f)
        }
        Stmt::Assignment { name, value } => writeln!(f, "{}{} = {}", indent, name.lexeme, value),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            writeln!(f, "{}if {}", indent, condition)?;
            for stmt in then_branch {
                fmt_stmt(f, stmt, depth + 1)?;
            }
            if !else_branch.is_empty() {
                writeln!(f, "{}else", indent)?;
                for stmt in else_branch {
                    fmt_stmt(f, stmt, depth + 1)?;
                }
            }
            Ok(())
        }
        Stmt::While {
            condition, body, ..
        } => {
            writeln!(f, "{}while {}", indent, condition)?;
            for stmt in body {
                fmt_stmt(f, stmt, depth + 1)?;
            }
            Ok(())
        }
        Stmt::Return { value, .. } => match value {
            Some(value) => writeln!(f, "{}return {}", indent, value),
            None => writeln!(f, "{}return", indent),
        },
        Stmt::Expression(expr) => writeln!(f, "{}{}", indent, expr),
        Stmt::Block(statements) => {
            writeln!(f, "{}block", indent)?;
            for stmt in statements {
                fmt_stmt(f, stmt, depth + 1)?;
            }
            Ok(())
        }
    }
}
