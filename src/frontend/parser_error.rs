use crate::frontend::lexer::Span;

/// A syntax error with source location.
///
/// `line` and `col` are 1-based positions coming from the lexer spans.
/// For EOF-ish errors (a missing `then`, `loop`, `until` or `;`), the parser
/// uses the last consumed token's span as a fallback so locations are never `0:0`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{line}:{col}: {message}")]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl ParserError {
    pub fn at(span: Span, message: impl Into<String>) -> Self {
        ParserError {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }
}
