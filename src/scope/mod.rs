//! Lexically nested symbol storage shared by the semantic analyzer and
//! the code generator.

use std::collections::HashMap;

use crate::parser::ast::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub data_type: DataType,
    pub initialized: bool,
    pub constant: bool,
    pub depth: usize,
}

/// A stack of scope frames. The bottom frame is the global scope and is
/// never popped.
#[derive(Debug)]
pub struct ScopeTable {
    frames: Vec<HashMap<String, Symbol>>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pops the innermost frame. Popping the global frame is a no-op.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declares `name` in the innermost frame. Returns false if the frame
    /// already holds a symbol with that name.
    pub fn declare(
        &mut self,
        name: &str,
        data_type: DataType,
        initialized: bool,
        constant: bool,
    ) -> bool {
        let depth = self.frames.len() - 1;
        let frame = &mut self.frames[depth];
        if frame.contains_key(name) {
            return false;
        }
        frame.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                data_type,
                initialized,
                constant,
                depth,
            },
        );
        true
    }

    /// Looks `name` up from the innermost frame outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
    }

    /// Flags the nearest symbol named `name` as initialized. Returns false
    /// if no such symbol exists.
    pub fn mark_initialized(&mut self, name: &str) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(symbol) = frame.get_mut(name) {
                symbol.initialized = true;
                return true;
            }
        }
        false
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_resolves_to_innermost() {
        let mut table = ScopeTable::new();
        assert!(table.declare("x", DataType::Int, true, false));
        table.enter_scope();
        assert!(table.declare("x", DataType::Float, false, false));

        let symbol = table.lookup("x").unwrap();
        assert_eq!(symbol.data_type, DataType::Float);
        assert_eq!(symbol.depth, 1);

        table.exit_scope();
        let symbol = table.lookup("x").unwrap();
        assert_eq!(symbol.data_type, DataType::Int);
    }

    #[test]
    fn redeclaration_in_same_frame_rejected() {
        let mut table = ScopeTable::new();
        assert!(table.declare("x", DataType::Int, false, false));
        assert!(!table.declare("x", DataType::Int, false, false));
    }

    #[test]
    fn global_frame_survives_extra_exits() {
        let mut table = ScopeTable::new();
        table.declare("g", DataType::Bool, true, false);
        table.exit_scope();
        table.exit_scope();
        assert!(table.lookup("g").is_some());
    }

    #[test]
    fn mark_initialized_hits_outer_frames() {
        let mut table = ScopeTable::new();
        table.declare("x", DataType::Int, false, false);
        table.enter_scope();
        assert!(table.mark_initialized("x"));
        table.exit_scope();
        assert!(table.lookup("x").unwrap().initialized);
        assert!(!table.mark_initialized("missing"));
    }
}
