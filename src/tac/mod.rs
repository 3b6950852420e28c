//! Three-address code. Instructions are a flat list; control flow is
//! labels and jumps only.

use std::fmt;

/// A value position in an instruction. `Temp` carries the bare counter
/// value; its printed form is `t<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Literal(String),
    Var(String),
    Temp(usize),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(text) => write!(f, "{}", text),
            Operand::Var(name) => write!(f, "{}", name),
            Operand::Temp(id) => write!(f, "t{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstrKind {
    Label(String),
    Goto(String),
    IfFalse {
        condition: Operand,
        target: String,
    },
    If {
        condition: Operand,
        target: String,
    },
    Param(Operand),
    Call {
        dest: Operand,
        function: String,
        args: Vec<Operand>,
    },
    Return(Option<Operand>),
    Assign {
        dest: Operand,
        src: Operand,
    },
    Binary {
        dest: Operand,
        op: String,
        left: Operand,
        right: Operand,
    },
    Unary {
        dest: Operand,
        op: String,
        operand: Operand,
    },
    Store {
        dest: Operand,
        value: Operand,
        index: Operand,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstrKind,
    pub line: usize,
}

impl Instruction {
    pub fn new(kind: InstrKind, line: usize) -> Self {
        Self { kind, line }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstrKind::Label(name) => write!(f, "{}:", name),
            InstrKind::Goto(target) => write!(f, "goto {}", target),
            InstrKind::IfFalse { condition, target } => {
                write!(f, "ifFalse {} goto {}", condition, target)
            }
            InstrKind::If { condition, target } => {
                write!(f, "if {} goto {}", condition, target)
            }
            InstrKind::Param(value) => write!(f, "param {}", value),
            InstrKind::Call {
                dest,
                function,
                args,
            } => {
                write!(f, "{} = call {}", dest, function)?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                Ok(())
            }
            InstrKind::Return(None) => write!(f, "return"),
            InstrKind::Return(Some(value)) => write!(f, "return {}", value),
            InstrKind::Assign { dest, src } => write!(f, "{} = {}", dest, src),
            InstrKind::Binary {
                dest,
                op,
                left,
                right,
            } => write!(f, "{} = {} {} {}", dest, left, op, right),
            InstrKind::Unary { dest, op, operand } => {
                write!(f, "{} = {} {}", dest, operand, op)
            }
            InstrKind::Store { dest, value, index } => {
                write!(f, "{} = {} STORE {}", dest, value, index)
            }
        }
    }
}
