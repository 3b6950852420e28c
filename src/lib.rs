//! MathSeq: a small statically typed scripting language for integer
//! sequence experiments, with a complete front-to-back pipeline. Source
//! text is lexed and parsed, type checked, lowered to three-address
//! code and run through a peephole optimizer for inspection, then
//! executed by a tree-walking interpreter.

pub mod codegen;
pub mod interpreter;
pub mod lexer;
pub mod optimize;
pub mod parser;
pub mod scope;
pub mod semantic;
pub mod tac;
