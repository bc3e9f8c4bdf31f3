use crate::frontend::lexer::{Span, Spanned};
use crate::frontend::parser_error::ParserError;
use crate::frontend::token::{Keyword, Token};
use crate::lang::{Body, Builtin, LoopDirection, Program, Term, WordDef};

/// Recursive-descent parser for forthchan.
///
/// The parser consumes lexed `Spanned<Token>`s and produces a `Program`:
/// - `definitions`: top-level `: name ... ;` forms
/// - `main`: the remaining terms (top-level executable code)
///
/// Notes:
/// - Comments are filtered out in `Parser::new`.
/// - Numbers and word names arrive raw from the lexer and are validated here.
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    /// Span of the most recently consumed token.
    ///
    /// Used to provide stable source locations for errors that occur at
    /// end-of-input.
    last_span: Option<Span>,
}

impl Parser {
    /// Creates a new parser from lexer output, dropping comment tokens.
    pub fn new(tokens: Vec<Spanned<Token>>) -> Self {
        let tokens: Vec<Spanned<Token>> = tokens
            .into_iter()
            .filter(|t| !matches!(t.node, Token::Comment(_)))
            .collect();
        Parser {
            tokens,
            pos: 0,
            last_span: None,
        }
    }

    fn current(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.node)
    }

    /// Advances the token stream by one and returns the consumed token.
    fn advance(&mut self) -> Option<Spanned<Token>> {
        let token = self.tokens.get(self.pos).cloned();
        if let Some(s) = &token {
            self.last_span = Some(s.span);
        }
        self.pos += 1;
        token
    }

    /// Constructs a `ParserError` at the most relevant location.
    ///
    /// Priority:
    /// 1. If `current()` exists, use its span.
    /// 2. Else, use `last_span` (we fell off the end).
    /// 3. Else, default to (1,1) for truly empty input.
    fn error(&self, message: impl Into<String>) -> ParserError {
        let span = match (self.current(), self.last_span) {
            (Some(spanned), _) => spanned.span,
            (None, Some(span)) => span,
            (None, None) => Span { line: 1, col: 1 },
        };
        ParserError::at(span, message)
    }

    /// Parses a complete program.
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut definitions = Vec::new();
        let mut main = Vec::new();

        while let Some(token) = self.peek() {
            if matches!(token, Token::Colon) {
                definitions.push(self.parse_definition()?);
            } else {
                main.push(self.parse_term()?);
            }
        }

        Ok(Program { definitions, main })
    }

    /// Parses a word definition:
    ///
    /// ```text
    /// : <name> <body...> ;
    /// ```
    fn parse_definition(&mut self) -> Result<WordDef, ParserError> {
        let colon = self.advance().map(|s| s.span).unwrap_or(Span { line: 1, col: 1 });

        let name = match self.current() {
            Some(Spanned {
                node: Token::Word(name),
                span,
            }) => {
                let (name, span) = (name.clone(), *span);
                if Builtin::from_name(&name).is_some() {
                    return Err(ParserError::at(
                        span,
                        format!("'{}' is a built-in word and cannot be redefined", name),
                    ));
                }
                validate_word_name(&name, span)?;
                self.advance();
                name
            }
            Some(_) => return Err(self.error("expected word name after ':'")),
            None => return Err(self.error("unexpected EOF, expected word name after ':'")),
        };

        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Semicolon) => {
                    self.advance();
                    break;
                }
                None => {
                    return Err(self.error(format!(
                        "unexpected EOF, expected ';' to close definition of '{}' at {}",
                        name, colon
                    )));
                }
                Some(_) => body.push(self.parse_term()?),
            }
        }

        Ok(WordDef {
            name,
            body,
            span: colon,
        })
    }

    /// Parses terms up to one of `terminators`, consuming the terminator.
    fn parse_body(
        &mut self,
        terminators: &[Keyword],
        opener: Keyword,
        opener_span: Span,
    ) -> Result<(Body, Keyword), ParserError> {
        let expected = terminators
            .iter()
            .map(|k| format!("'{}'", k.as_str()))
            .collect::<Vec<_>>()
            .join(" or ");

        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Keyword(kw)) if terminators.contains(kw) => {
                    let kw = *kw;
                    self.advance();
                    return Ok((body, kw));
                }
                None => {
                    return Err(self.error(format!(
                        "unexpected EOF, expected {} to close '{}' at {}",
                        expected,
                        opener.as_str(),
                        opener_span
                    )));
                }
                Some(Token::Semicolon) => {
                    return Err(self.error(format!(
                        "unexpected ';', expected {} to close '{}' at {}",
                        expected,
                        opener.as_str(),
                        opener_span
                    )));
                }
                Some(_) => body.push(self.parse_term()?),
            }
        }
    }

    /// Parses a single executable term.
    fn parse_term(&mut self) -> Result<Spanned<Term>, ParserError> {
        let spanned = self.advance().ok_or_else(|| self.error("unexpected EOF"))?;
        let span = spanned.span;

        let term = match spanned.node {
            Token::Number(raw) => Term::Number(parse_number(&raw, span)?),
            Token::SignOp(op) => Term::SignOp(op),
            Token::PrintLiteral(text) => Term::PrintLiteral(text.into_bytes()),
            Token::Word(name) => match Builtin::from_name(&name) {
                Some(builtin) => Term::Builtin(builtin),
                None => {
                    validate_word_name(&name, span)?;
                    Term::WordRef(name)
                }
            },

            Token::Keyword(Keyword::If) => self.parse_if(span)?,
            Token::Keyword(Keyword::Do) => self.parse_do(span)?,
            Token::Keyword(Keyword::Begin) => self.parse_begin(span)?,
            Token::Keyword(Keyword::Leave) => Term::Leave,

            Token::Keyword(Keyword::I) => {
                return Err(ParserError::at(
                    span,
                    "unexpected 'i': the loop index may only follow 'do'",
                ));
            }
            Token::Keyword(closer) => {
                return Err(ParserError::at(
                    span,
                    format!("unexpected token '{}' without an opening block", closer.as_str()),
                ));
            }
            Token::Colon => {
                return Err(ParserError::at(
                    span,
                    "word definitions must be at the top level",
                ));
            }
            Token::Semicolon => {
                return Err(ParserError::at(
                    span,
                    "unexpected token ';' outside a word definition",
                ));
            }
            Token::Comment(_) => {
                return Err(ParserError::at(span, "unexpected comment token"));
            }
        };

        Ok(Spanned { node: term, span })
    }

    /// ```text
    /// if <then...> [else <else...>] then
    /// ```
    fn parse_if(&mut self, span: Span) -> Result<Term, ParserError> {
        let (then_body, closer) =
            self.parse_body(&[Keyword::Else, Keyword::Then], Keyword::If, span)?;

        let else_body = if closer == Keyword::Else {
            let (else_body, _) = self.parse_body(&[Keyword::Then], Keyword::If, span)?;
            Some(else_body)
        } else {
            None
        };

        Ok(Term::IfThen {
            then_body,
            else_body,
        })
    }

    /// ```text
    /// do [i] <body...> loop
    /// do [i] <body...> mloop
    /// ```
    fn parse_do(&mut self, span: Span) -> Result<Term, ParserError> {
        let has_index = matches!(self.peek(), Some(Token::Keyword(Keyword::I)));
        if has_index {
            self.advance();
        }
        let (body, closer) =
            self.parse_body(&[Keyword::Loop, Keyword::MLoop], Keyword::Do, span)?;
        let direction = if closer == Keyword::MLoop {
            LoopDirection::Down
        } else {
            LoopDirection::Up
        };
        Ok(Term::ForLoop {
            has_index,
            direction,
            body,
        })
    }

    /// ```text
    /// begin <body...> until
    /// ```
    fn parse_begin(&mut self, span: Span) -> Result<Term, ParserError> {
        let (body, _) = self.parse_body(&[Keyword::Until], Keyword::Begin, span)?;
        Ok(Term::DoWhileLoop { body })
    }
}

/// `-?(0|[1-9][0-9]*)`, within the signed 64-bit range.
fn parse_number(raw: &str, span: Span) -> Result<i64, ParserError> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let well_formed = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));

    if !well_formed {
        return Err(ParserError::at(span, format!("malformed number '{}'", raw)));
    }

    raw.parse::<i64>()
        .map_err(|_| ParserError::at(span, format!("number '{}' does not fit in 64 bits", raw)))
}

/// Letters and hyphens, starting with a letter.
fn validate_word_name(name: &str, span: Span) -> Result<(), ParserError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphabetic() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ParserError::at(span, format!("malformed word name '{}'", name)))
    }
}
