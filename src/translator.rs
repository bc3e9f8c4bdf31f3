use log::debug;

use crate::bytecode::{CompileError, MachineCode, compile_program};
use crate::frontend::{Lexer, LexerError, Parser, ParserError, Span};
use crate::lang::Program;

/// Any error that stops source text from becoming machine code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Lex(#[from] LexerError),
    #[error(transparent)]
    Syntax(#[from] ParserError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl TranslateError {
    /// Stage label for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            TranslateError::Lex(_) => "Lexer error",
            TranslateError::Syntax(_) => "Parse error",
            TranslateError::Compile(_) => "Compile error",
        }
    }

    /// Where in the source the error was detected.
    pub fn span(&self) -> Span {
        match self {
            TranslateError::Lex(e) => e.span(),
            TranslateError::Syntax(e) => e.span(),
            TranslateError::Compile(e) => e.span(),
        }
    }
}

pub fn parse(source: &str) -> Result<Program, TranslateError> {
    let tokens = Lexer::new(source).tokenize_clean()?;
    let program = Parser::new(tokens).parse()?;
    Ok(program)
}

/// Translate forthchan source into machine code.
pub fn translate(source: &str) -> Result<MachineCode, TranslateError> {
    let program = parse(source)?;
    let code = compile_program(&program)?;

    debug!(
        "translated: {} words, {} instructions",
        code.words.len(),
        code.len()
    );
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_ok() {
        let code = translate(": sq dup * ; 3 sq").unwrap();
        assert_eq!(code.words.len(), 1);
        assert_eq!(code.entry, 0);
    }

    #[test]
    fn test_each_stage_reports_its_error() {
        assert!(matches!(translate("\"open"), Err(TranslateError::Lex(_))));
        assert!(matches!(translate("1 if 2"), Err(TranslateError::Syntax(_))));
        assert!(matches!(translate("nope"), Err(TranslateError::Compile(_))));
    }

    #[test]
    fn test_error_display_is_positioned() {
        let err = translate("1 2\n  zap").unwrap_err();
        assert_eq!(err.stage(), "Compile error");
        assert_eq!(
            err,
            TranslateError::Compile(CompileError::UnknownWord {
                name: "zap".to_string(),
                span: Span { line: 2, col: 3 },
            })
        );
        assert!(err.to_string().starts_with("2:3: "));
    }

    #[test]
    fn test_every_stage_reports_a_span() {
        let span = |source: &str| translate(source).unwrap_err().span();
        assert_eq!(span("1\n .\"open"), Span { line: 2, col: 2 });
        assert_eq!(span("1 2 then"), Span { line: 1, col: 5 });
        assert_eq!(span(": a 1 ;\n  : a 2 ;"), Span { line: 2, col: 3 });
    }

    #[test]
    fn test_comments_are_ignored() {
        let with = translate("1 \\ one\n 2 + \\ two").unwrap();
        let without = translate("1\n 2 +").unwrap();
        let ops = |c: &MachineCode| c.instructions.iter().map(|i| i.opcode).collect::<Vec<_>>();
        assert_eq!(ops(&with), ops(&without));
    }
}
