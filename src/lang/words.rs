use std::collections::HashMap;

use super::program::WordDef;
use crate::bytecode::compile_error::CompileError;
use crate::frontend::lexer::Span;

/// Global registry of user-defined words.
///
/// Built from every definition before code generation starts, so a word may
/// call words defined later in the source. Iteration follows definition order.
#[derive(Debug, Clone, Default)]
pub struct WordTable {
    index: HashMap<String, usize>,
    definitions: Vec<WordDef>,
}

impl WordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = WordDef>,
    ) -> Result<Self, CompileError> {
        let mut table = WordTable::new();
        for def in definitions {
            table.define(def)?;
        }
        Ok(table)
    }

    /// Register a definition. Redefining a name is an error, never a shadow.
    pub fn define(&mut self, def: WordDef) -> Result<(), CompileError> {
        if let Some(&existing) = self.index.get(&def.name) {
            return Err(CompileError::DuplicateWord {
                name: def.name,
                span: def.span,
                first: self.definitions[existing].span,
            });
        }
        self.index.insert(def.name.clone(), self.definitions.len());
        self.definitions.push(def);
        Ok(())
    }

    pub fn resolve(&self, name: &str, span: Span) -> Result<&WordDef, CompileError> {
        self.index
            .get(name)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| CompileError::UnknownWord {
                name: name.to_string(),
                span,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordDef> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
