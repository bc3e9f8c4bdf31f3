#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOp {
    Plus,
    Minus,
    Star,
    Slash,
}

impl SignOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(SignOp::Plus),
            "-" => Some(SignOp::Minus),
            "*" => Some(SignOp::Star),
            "/" => Some(SignOp::Slash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
    Then,
    Do,
    I,
    Loop,
    MLoop,
    Begin,
    Until,
    Leave,
}

impl Keyword {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "then" => Some(Keyword::Then),
            "do" => Some(Keyword::Do),
            "i" => Some(Keyword::I),
            "loop" => Some(Keyword::Loop),
            "mloop" => Some(Keyword::MLoop),
            "begin" => Some(Keyword::Begin),
            "until" => Some(Keyword::Until),
            "leave" => Some(Keyword::Leave),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Then => "then",
            Keyword::Do => "do",
            Keyword::I => "i",
            Keyword::Loop => "loop",
            Keyword::MLoop => "mloop",
            Keyword::Begin => "begin",
            Keyword::Until => "until",
            Keyword::Leave => "leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Raw digits (with optional leading `-`); the parser validates the grammar.
    Number(String),
    /// Bytes of a `."..."` print literal, escapes already resolved.
    PrintLiteral(String),

    // Operators
    SignOp(SignOp),

    // Control flow
    Keyword(Keyword),

    // Definition
    Colon,
    Semicolon,

    // Identifier (built-in or user-defined word)
    Word(String),

    // Special
    Comment(String),
}

impl std::fmt::Display for SignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignOp::Plus => write!(f, "+"),
            SignOp::Minus => write!(f, "-"),
            SignOp::Star => write!(f, "*"),
            SignOp::Slash => write!(f, "/"),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(raw) => write!(f, "{}", raw),
            Token::PrintLiteral(s) => write!(f, ".\"{}\"", s),
            Token::SignOp(op) => write!(f, "{}", op),
            Token::Keyword(kw) => write!(f, "{}", kw.as_str()),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Word(w) => write!(f, "{}", w),
            Token::Comment(s) => write!(f, "\\ {}", s),
        }
    }
}
