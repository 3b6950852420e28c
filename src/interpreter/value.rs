use std::fmt;

use super::RuntimeError;

/// A runtime value. Every variable slot holds one of these; `Void` is
/// both the unit result and the filler for unbound parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Void => false,
            Value::Int(value) => *value != 0,
            Value::Float(value) => value.abs() > 1e-9,
            Value::Bool(value) => *value,
            Value::Str(text) => !text.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
        }
    }

    /// Total boolean view. Numbers compare against zero; everything else
    /// falls back to truthiness.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            _ => self.is_truthy(),
        }
    }

    pub fn as_float(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Int(value) => Ok(*value as f64),
            Value::Float(value) => Ok(*value),
            Value::Bool(value) => Ok(if *value { 1.0 } else { 0.0 }),
            _ => Err(RuntimeError::new("value is not numeric")),
        }
    }

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Int(value) => Ok(*value),
            Value::Float(value) => Ok(*value as i64),
            Value::Bool(value) => Ok(i64::from(*value)),
            _ => Err(RuntimeError::new("value is not an integer")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Str(text) => write!(f, "{}", text),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
