use crate::frontend::lexer::Spanned;
use crate::frontend::token::{Keyword, Token};
use crate::lang::Builtin;

/// How a token is labelled and coloured in a `--tokens` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Comment,
    Number,
    Literal,
    /// `+ - * /`
    Arith,
    /// Built-in comparisons: `= <> < > <= >=`
    Compare,
    /// Any other reserved word: `dup`, `emit`, `pick`, ...
    Builtin,
    /// A user-defined word name.
    Word,
    /// `:` and `;`
    Define,
    /// `if else then`
    Branch,
    /// `do i loop mloop begin until leave`
    Loop,
}

impl TokenClass {
    fn of(token: &Token) -> Self {
        match token {
            Token::Comment(_) => TokenClass::Comment,
            Token::Number(_) => TokenClass::Number,
            Token::PrintLiteral(_) => TokenClass::Literal,
            Token::SignOp(_) => TokenClass::Arith,
            Token::Colon | Token::Semicolon => TokenClass::Define,
            Token::Keyword(Keyword::If | Keyword::Else | Keyword::Then) => TokenClass::Branch,
            Token::Keyword(_) => TokenClass::Loop,
            Token::Word(name) => match Builtin::from_name(name) {
                Some(
                    Builtin::Eq
                    | Builtin::Ne
                    | Builtin::Lt
                    | Builtin::Gt
                    | Builtin::Le
                    | Builtin::Ge,
                ) => TokenClass::Compare,
                Some(_) => TokenClass::Builtin,
                None => TokenClass::Word,
            },
        }
    }

    fn label(self) -> &'static str {
        match self {
            TokenClass::Comment => "COMMENT",
            TokenClass::Number => "NUMBER",
            TokenClass::Literal => "PRINT",
            TokenClass::Arith => "ARITH",
            TokenClass::Compare => "CMP",
            TokenClass::Builtin => "BUILTIN",
            TokenClass::Word => "WORD",
            TokenClass::Define => "DEFINE",
            TokenClass::Branch => "BRANCH",
            TokenClass::Loop => "LOOP",
        }
    }

    fn color(self) -> &'static str {
        match self {
            TokenClass::Comment => TokenDumper::DIM,
            TokenClass::Literal => TokenDumper::GRN,
            TokenClass::Number => TokenDumper::CYN,
            TokenClass::Word => TokenDumper::YEL,
            TokenClass::Arith | TokenClass::Compare => TokenDumper::MAG,
            TokenClass::Builtin => TokenDumper::BLU,
            TokenClass::Branch | TokenClass::Loop => TokenDumper::BOLD,
            TokenClass::Define => TokenDumper::RESET,
        }
    }
}

pub struct TokenDumper {
    pub color: bool,
    /// If false, prints the source form of each token.
    pub show_debug_repr: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    const RESET: &'static str = "\x1b[0m";
    const BOLD: &'static str = "\x1b[1m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const BLU: &'static str = "\x1b[34m";
    const MAG: &'static str = "\x1b[35m";
    const CYN: &'static str = "\x1b[36m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Spanned<Token>]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Spanned<Token>]) -> String {
        let mut output = String::new();
        for s in tokens {
            output.push_str(&self.render_one(s));
            output.push('\n');
        }
        output
    }

    fn render_one(&self, s: &Spanned<Token>) -> String {
        let class = TokenClass::of(&s.node);
        let (colr, reset) = if self.color {
            (class.color(), Self::RESET)
        } else {
            ("", "")
        };

        let text = match &s.node {
            token if self.show_debug_repr => format!("{:?}", token),
            Token::Comment(c) => c.clone(),
            Token::PrintLiteral(text) => format!("{:?}", text),
            other => other.to_string(),
        };

        format!(
            "[{:02}:{:02}] {}{:<8} {}{}",
            s.span.line,
            s.span.col,
            colr,
            class.label(),
            text,
            reset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn render(source: &str, dumper: TokenDumper) -> String {
        let tokens = Lexer::new(source).tokenize().unwrap();
        dumper.render(&tokens)
    }

    #[test]
    fn test_pretty_without_color() {
        let out = render(
            ": sq dup * ; \\ square",
            TokenDumper::new().no_color().pretty(),
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "[01:01] DEFINE   :");
        assert_eq!(lines[1], "[01:03] WORD     sq");
        assert_eq!(lines[2], "[01:06] BUILTIN  dup");
        assert_eq!(lines[3], "[01:10] ARITH    *");
        assert_eq!(lines[5], "[01:14] COMMENT  square");
    }

    #[test]
    fn test_classes_split_keywords_and_builtins() {
        let out = render(
            "0 5 do i 2 < if .\"x\" then mloop",
            TokenDumper::new().no_color().pretty(),
        );
        let labels: Vec<&str> = out
            .lines()
            .filter_map(|l| l.split_whitespace().nth(1))
            .collect();
        assert_eq!(
            labels,
            vec![
                "NUMBER", "NUMBER", "LOOP", "LOOP", "NUMBER", "CMP", "BRANCH", "PRINT", "BRANCH",
                "LOOP"
            ]
        );
        assert!(out.contains("PRINT    \"x\""));
    }

    #[test]
    fn test_debug_repr() {
        let out = render("12", TokenDumper::new().no_color());
        assert_eq!(out, "[01:01] NUMBER   Number(\"12\")\n");
    }

    #[test]
    fn test_color_codes() {
        let out = render("12 emit", TokenDumper::new());
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("[01:01] \x1b[36mNUMBER"));
        assert!(lines[1].starts_with("[01:04] \x1b[34mBUILTIN"));
        assert!(lines[1].ends_with("\x1b[0m"));
    }
}
