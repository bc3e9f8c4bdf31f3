use crate::frontend::lexer::Span;

/// Errors raised while resolving words and laying out machine code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// A second definition of an existing word.
    #[error(
        "{span}: compile error: word '{name}' is already defined at {first}\n  hint: rename one of the definitions; words cannot be redefined"
    )]
    DuplicateWord { name: String, span: Span, first: Span },

    /// A call site names a word that is never defined.
    #[error("{span}: compile error: unknown word '{name}'")]
    UnknownWord { name: String, span: Span },

    /// `leave` with no enclosing loop in the same body.
    #[error(
        "{span}: compile error: 'leave' outside of a loop\n  hint: 'leave' exits the innermost do/loop or begin/until of the body it appears in"
    )]
    MismatchedLeave { span: Span },
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::DuplicateWord { span, .. }
            | CompileError::UnknownWord { span, .. }
            | CompileError::MismatchedLeave { span } => *span,
        }
    }
}
