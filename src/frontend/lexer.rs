use serde::{Deserialize, Serialize};

use crate::frontend::token::{Keyword, SignOp, Token};

/// 1-based source position of the first character of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A value together with the position it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{line}:{col}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl LexerError {
    pub fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }
}

fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\u{201C}' | '\u{201D}')
}

/// Whitespace-delimited tokenizer.
///
/// `Lexer` is an iterator: tokens are produced on demand and the first error
/// ends the stream. `reset` rewinds to the start of the source.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    failed: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            failed: false,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
        self.col = 1;
        self.failed = false;
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> LexerError {
        LexerError {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_comment(&mut self) -> Token {
        self.advance();
        let mut comment = String::new();
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            comment.push(ch);
            self.advance();
        }
        Token::Comment(comment.trim().to_string())
    }

    fn read_print_literal(&mut self, start: Span) -> Result<Token, LexerError> {
        if self.current() == Some('.') {
            self.advance();
        }
        self.advance(); // opening quote

        let mut text = String::new();
        loop {
            match self.current() {
                Some(ch) if is_quote(ch) => {
                    self.advance();
                    return Ok(Token::PrintLiteral(text));
                }
                Some('\\') => {
                    let escape_at = self.span();
                    self.advance();
                    match self.current() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('\\') => text.push('\\'),
                        Some(ch) if is_quote(ch) => text.push('"'),
                        Some('\n') | None => {
                            return Err(self.error_at(start, "unterminated print literal"));
                        }
                        Some(ch) => {
                            return Err(
                                self.error_at(escape_at, format!("unknown escape sequence: \\{}", ch))
                            );
                        }
                    }
                    self.advance();
                }
                Some('\n') | None => {
                    return Err(self.error_at(start, "unterminated print literal"));
                }
                Some(ch) if !ch.is_ascii() => {
                    return Err(self.error_at(
                        self.span(),
                        format!("non-ASCII character '{}' in print literal", ch),
                    ));
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_lexeme(&mut self) -> String {
        let mut lexeme = String::new();
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                break;
            }
            lexeme.push(ch);
            self.advance();
        }
        lexeme
    }

    fn classify(lexeme: String) -> Token {
        if let Some(op) = SignOp::from_lexeme(&lexeme) {
            return Token::SignOp(op);
        }
        if let Some(kw) = Keyword::from_lexeme(&lexeme) {
            return Token::Keyword(kw);
        }

        let mut chars = lexeme.chars();
        let first = chars.next();
        let second = chars.next();
        match (first, second) {
            (Some(':'), None) => Token::Colon,
            (Some(';'), None) => Token::Semicolon,
            (Some(d), _) if d.is_ascii_digit() => Token::Number(lexeme),
            (Some('-'), Some(d)) if d.is_ascii_digit() => Token::Number(lexeme),
            _ => Token::Word(lexeme),
        }
    }

    fn next_token(&mut self) -> Option<Result<Spanned<Token>, LexerError>> {
        self.skip_whitespace();
        let span = self.span();

        let ch = self.current()?;
        let token = match ch {
            '\\' => Ok(self.read_comment()),
            '.' if self.peek().is_some_and(is_quote) => self.read_print_literal(span),
            ch if is_quote(ch) => self.read_print_literal(span),
            _ => {
                let lexeme = self.read_lexeme();
                Ok(Self::classify(lexeme))
            }
        };

        Some(token.map(|node| Spanned { node, span }))
    }

    /// Lex the whole source, keeping comments.
    pub fn tokenize(&mut self) -> Result<Vec<Spanned<Token>>, LexerError> {
        self.collect()
    }

    /// Lex the whole source, dropping comments.
    pub fn tokenize_clean(&mut self) -> Result<Vec<Spanned<Token>>, LexerError> {
        let tokens = self.tokenize()?;
        Ok(tokens
            .into_iter()
            .filter(|t| !matches!(t.node, Token::Comment(_)))
            .collect())
    }
}

impl Iterator for Lexer {
    type Item = Result<Spanned<Token>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_token();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        lexer
            .tokenize_clean()
            .unwrap()
            .into_iter()
            .map(|s| s.node)
            .collect()
    }

    fn lex_err(source: &str) -> LexerError {
        let mut lexer = Lexer::new(source);
        lexer.tokenize().unwrap_err()
    }

    fn word(w: &str) -> Token {
        Token::Word(w.to_string())
    }

    fn num(n: &str) -> Token {
        Token::Number(n.to_string())
    }

    #[test]
    fn test_arithmetic() {
        let t = tokens("3 4 + 10 -3 - * /");
        assert_eq!(
            t,
            vec![
                num("3"),
                num("4"),
                Token::SignOp(SignOp::Plus),
                num("10"),
                num("-3"),
                Token::SignOp(SignOp::Minus),
                Token::SignOp(SignOp::Star),
                Token::SignOp(SignOp::Slash),
            ]
        );
    }

    #[test]
    fn test_definition() {
        let t = tokens(": square dup * ;");
        assert_eq!(
            t,
            vec![
                Token::Colon,
                word("square"),
                word("dup"),
                Token::SignOp(SignOp::Star),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_all_keywords() {
        let t = tokens("if else then do i loop begin until leave");
        assert_eq!(
            t,
            vec![
                Token::Keyword(Keyword::If),
                Token::Keyword(Keyword::Else),
                Token::Keyword(Keyword::Then),
                Token::Keyword(Keyword::Do),
                Token::Keyword(Keyword::I),
                Token::Keyword(Keyword::Loop),
                Token::Keyword(Keyword::Begin),
                Token::Keyword(Keyword::Until),
                Token::Keyword(Keyword::Leave),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(tokens("IF Loop"), vec![word("IF"), word("Loop")]);
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let mut lexer = Lexer::new("1 \\ push one + 2\n3");
        let raw: Vec<Token> = lexer.tokenize().unwrap().into_iter().map(|s| s.node).collect();
        assert_eq!(
            raw,
            vec![num("1"), Token::Comment("push one + 2".to_string()), num("3")]
        );
        assert_eq!(tokens("1 \\ push one + 2\n3"), vec![num("1"), num("3")]);
    }

    #[test]
    fn test_print_literal() {
        assert_eq!(
            tokens(r#"."hello world" cr"#),
            vec![Token::PrintLiteral("hello world".to_string()), word("cr")]
        );
    }

    #[test]
    fn test_bare_quoted_literal() {
        assert_eq!(tokens(r#""hi""#), vec![Token::PrintLiteral("hi".to_string())]);
    }

    #[test]
    fn test_typographic_quotes() {
        assert_eq!(
            tokens(".\u{201D}hi\u{201D} "),
            vec![Token::PrintLiteral("hi".to_string())]
        );
    }

    #[test]
    fn test_print_literal_escapes() {
        assert_eq!(
            tokens(r#"."a\"b\\c\n""#),
            vec![Token::PrintLiteral("a\"b\\c\n".to_string())]
        );
    }

    #[test]
    fn test_backslash_inside_literal_is_not_a_comment() {
        assert_eq!(
            tokens(r#"."x\\" 1"#),
            vec![Token::PrintLiteral("x\\".to_string()), num("1")]
        );
    }

    #[test]
    fn test_numbers_are_left_raw() {
        assert_eq!(tokens("007 -0 12ab"), vec![num("007"), num("-0"), num("12ab")]);
    }

    #[test]
    fn test_comparison_words() {
        assert_eq!(
            tokens("= <> < > <= >="),
            vec![word("="), word("<>"), word("<"), word(">"), word("<="), word(">=")]
        );
    }

    #[test]
    fn test_spans() {
        let mut lexer = Lexer::new("1 2\n  dup");
        let spans: Vec<Span> = lexer.tokenize().unwrap().into_iter().map(|s| s.span).collect();
        assert_eq!(
            spans,
            vec![
                Span { line: 1, col: 1 },
                Span { line: 1, col: 3 },
                Span { line: 2, col: 3 },
            ]
        );
    }

    #[test]
    fn test_unterminated_literal_error() {
        let err = lex_err("1 .\"abc");
        assert!(err.message.contains("unterminated"));
        assert_eq!((err.line, err.col), (1, 3));
    }

    #[test]
    fn test_unterminated_literal_newline_error() {
        let err = lex_err(".\"abc\n\"");
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_unknown_escape_error() {
        let err = lex_err(r#"."\q""#);
        assert!(err.message.contains("unknown escape"));
    }

    #[test]
    fn test_non_ascii_literal_error() {
        let err = lex_err(".\"\u{00E9}\"");
        assert!(err.message.contains("non-ASCII"));
    }

    #[test]
    fn test_lexer_is_lazy_and_stops_after_error() {
        let mut lexer = Lexer::new("1 .\"open");
        assert!(matches!(lexer.next(), Some(Ok(Spanned { node: Token::Number(_), .. }))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_reset_restarts_stream() {
        let mut lexer = Lexer::new("1 2");
        let first: Vec<_> = lexer.by_ref().collect();
        assert!(lexer.next().is_none());
        lexer.reset();
        let second: Vec<_> = lexer.collect();
        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
    }
}
