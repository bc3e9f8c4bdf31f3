use super::term::Body;
use crate::frontend::lexer::Span;

/// `: name body ;`
#[derive(Debug, Clone, PartialEq)]
pub struct WordDef {
    pub name: String,
    pub body: Body,
    /// Position of the defining `:`.
    pub span: Span,
}

/// Parsed forthchan program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level word definitions, in source order.
    pub definitions: Vec<WordDef>,
    /// Main executable terms.
    pub main: Body,
}
