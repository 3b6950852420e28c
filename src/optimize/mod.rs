//! Peephole passes over the three-address listing. Each pass makes a
//! single sweep; the standard pipeline runs them once, in a fixed order.

use std::collections::{HashMap, HashSet};

use crate::tac::{InstrKind, Instruction, Operand};

pub trait Pass {
    fn run(&self, code: &mut Vec<Instruction>);
    fn name(&self) -> &'static str;
}

pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn run(&self, code: &mut Vec<Instruction>) {
        for pass in &self.passes {
            pass.run(code);
        }
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the standard pass pipeline over `code`.
pub fn optimize(mut code: Vec<Instruction>) -> Vec<Instruction> {
    let mut manager = PassManager::new();
    manager.add_pass(Box::new(ConstantFolding));
    manager.add_pass(Box::new(ConstantPropagation));
    manager.add_pass(Box::new(AlgebraicSimplification));
    manager.add_pass(Box::new(RedundantAssignmentRemoval));
    manager.add_pass(Box::new(DeadCodeElimination));
    manager.run(&mut code);
    code
}

/// Integer value of a syntactically integral literal operand. Float
/// literals and names never qualify.
fn int_literal(operand: &Operand) -> Option<i64> {
    let Operand::Literal(text) = operand else {
        return None;
    };
    let digits = text.strip_prefix('-').or_else(|| text.strip_prefix('+')).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn is_literal(operand: &Operand, text: &str) -> bool {
    matches!(operand, Operand::Literal(value) if value == text)
}

/// Replaces binary operations on two integer literals with the computed
/// value. Division by zero folds to 0 rather than aborting the pipeline.
pub struct ConstantFolding;

impl Pass for ConstantFolding {
    fn run(&self, code: &mut Vec<Instruction>) {
        for instruction in code.iter_mut() {
            let InstrKind::Binary {
                dest,
                op,
                left,
                right,
            } = &instruction.kind
            else {
                continue;
            };

            let (Some(left), Some(right)) = (int_literal(left), int_literal(right)) else {
                continue;
            };

            let value = match op.as_str() {
                "+" => left.wrapping_add(right),
                "-" => left.wrapping_sub(right),
                "*" => left.wrapping_mul(right),
                "/" => {
                    if right == 0 {
                        0
                    } else {
                        left.wrapping_div(right)
                    }
                }
                _ => continue,
            };

            instruction.kind = InstrKind::Assign {
                dest: dest.clone(),
                src: Operand::Literal(value.to_string()),
            };
        }
    }

    fn name(&self) -> &'static str {
        "constant-folding"
    }
}

/// Forwards known integer constants into later reads. The constant map
/// is only invalidated by instructions that compute into a destination;
/// a plain reassignment from a non-constant leaves the old entry in
/// place.
pub struct ConstantPropagation;

impl ConstantPropagation {
    fn substitute(map: &HashMap<Operand, Operand>, operand: &mut Operand) {
        if let Some(value) = map.get(operand) {
            *operand = value.clone();
        }
    }
}

impl Pass for ConstantPropagation {
    fn run(&self, code: &mut Vec<Instruction>) {
        let mut constants: HashMap<Operand, Operand> = HashMap::new();

        for instruction in code.iter_mut() {
            match &mut instruction.kind {
                InstrKind::Assign { src, .. } => Self::substitute(&constants, src),
                InstrKind::Binary { left, right, .. } => {
                    Self::substitute(&constants, left);
                    Self::substitute(&constants, right);
                }
                InstrKind::Unary { operand, .. } => Self::substitute(&constants, operand),
                InstrKind::If { condition, .. } | InstrKind::IfFalse { condition, .. } => {
                    Self::substitute(&constants, condition)
                }
                InstrKind::Param(value) => Self::substitute(&constants, value),
                InstrKind::Return(Some(value)) => Self::substitute(&constants, value),
                InstrKind::Call { args, .. } => {
                    for arg in args.iter_mut() {
                        Self::substitute(&constants, arg);
                    }
                }
                InstrKind::Store { value, .. } => Self::substitute(&constants, value),
                _ => {}
            }

            match &instruction.kind {
                InstrKind::Assign { dest, src } if int_literal(src).is_some() => {
                    constants.insert(dest.clone(), src.clone());
                }
                InstrKind::Call { dest, .. }
                | InstrKind::Binary { dest, .. }
                | InstrKind::Unary { dest, .. }
                | InstrKind::Store { dest, .. } => {
                    constants.remove(dest);
                }
                _ => {}
            }
        }
    }

    fn name(&self) -> &'static str {
        "constant-propagation"
    }
}

/// Rewrites identity operations: x+0, x-0, x*1 keep the other operand,
/// x*0 collapses to 0.
pub struct AlgebraicSimplification;

impl Pass for AlgebraicSimplification {
    fn run(&self, code: &mut Vec<Instruction>) {
        for instruction in code.iter_mut() {
            let InstrKind::Binary {
                dest,
                op,
                left,
                right,
            } = &instruction.kind
            else {
                continue;
            };

            let src = if op == "+" && is_literal(right, "0") {
                left.clone()
            } else if op == "-" && is_literal(right, "0") {
                left.clone()
            } else if op == "*" && is_literal(right, "1") {
                left.clone()
            } else if op == "*" && (is_literal(left, "0") || is_literal(right, "0")) {
                Operand::Literal("0".to_string())
            } else if op == "+" && is_literal(left, "0") {
                right.clone()
            } else if op == "*" && is_literal(left, "1") {
                right.clone()
            } else {
                continue;
            };

            instruction.kind = InstrKind::Assign {
                dest: dest.clone(),
                src,
            };
        }
    }

    fn name(&self) -> &'static str {
        "algebraic-simplification"
    }
}

/// Drops self-assignments such as `x = x`.
pub struct RedundantAssignmentRemoval;

impl Pass for RedundantAssignmentRemoval {
    fn run(&self, code: &mut Vec<Instruction>) {
        code.retain(|instruction| {
            !matches!(&instruction.kind, InstrKind::Assign { dest, src } if dest == src)
        });
    }

    fn name(&self) -> &'static str {
        "redundant-assignment-removal"
    }
}

/// Removes assignments to temporaries that are never read. Named
/// variables are always kept; they may be observed across jumps.
pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn run(&self, code: &mut Vec<Instruction>) {
        let mut used: HashSet<usize> = HashSet::new();
        let mut mark = |operand: &Operand| {
            if let Operand::Temp(id) = operand {
                used.insert(*id);
            }
        };

        for instruction in code.iter() {
            match &instruction.kind {
                InstrKind::Assign { src, .. } => mark(src),
                InstrKind::Binary { left, right, .. } => {
                    mark(left);
                    mark(right);
                }
                InstrKind::Unary { operand, .. } => mark(operand),
                InstrKind::If { condition, .. } | InstrKind::IfFalse { condition, .. } => {
                    mark(condition)
                }
                InstrKind::Param(value) => mark(value),
                InstrKind::Return(Some(value)) => mark(value),
                InstrKind::Call { args, .. } => {
                    for arg in args {
                        mark(arg);
                    }
                }
                InstrKind::Store { value, index, .. } => {
                    mark(value);
                    mark(index);
                }
                _ => {}
            }
        }

        code.retain(|instruction| match &instruction.kind {
            InstrKind::Assign {
                dest: Operand::Temp(id),
                ..
            } => used.contains(id),
            _ => true,
        });
    }

    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }
}
