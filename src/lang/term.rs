use crate::frontend::lexer::Spanned;
use crate::frontend::token::SignOp;

/// A sequence of terms, each tagged with the position it was parsed from.
pub type Body = Vec<Spanned<Term>>;

/// Built-in words. These names are reserved and cannot be redefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    // ─────────────────────────── Stack operations ───────────────────────
    /// Stack effect: `( x -- x x )`
    Dup,
    /// Stack effect: `( x -- )`
    Drop,
    /// Stack effect: `( a b -- b a )`
    Swap,
    /// Stack effect: `( a b -- a b a )`
    Over,
    /// Copy the `u`-th item below the index; `0 pick` is `dup`.
    ///
    /// Stack effect: `( xu ... x0 u -- xu ... x0 xu )`
    Pick,
    /// Stack effect: `( a b -- a b a b )`
    Dudup,

    // ───────────────────────────── Arithmetic ───────────────────────────
    /// Floored remainder: the result takes the sign of the divisor.
    ///
    /// Stack effect: `( a b -- a%b )`
    Mod,

    // ───────────────────────────── Comparison ───────────────────────────
    // All comparisons push 0 for true and -1 for false.
    /// Stack effect: `( a b -- flag )`
    Eq,
    /// Stack effect: `( a b -- flag )`
    Ne,
    /// Stack effect: `( a b -- flag )`
    Lt,
    /// Stack effect: `( a b -- flag )`
    Gt,
    /// Stack effect: `( a b -- flag )`
    Le,
    /// Stack effect: `( a b -- flag )`
    Ge,

    // ──────────────────────────────── I/O ───────────────────────────────
    /// Write the top of stack to the output port.
    ///
    /// Stack effect: `( byte -- )`
    Emit,
    /// Read the next character from the input port.
    ///
    /// Stack effect: `( -- byte )`
    Key,
    /// Write a carriage return (byte 13) to the output port.
    ///
    /// Stack effect: `( -- )`
    Cr,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "dup" => Builtin::Dup,
            "drop" => Builtin::Drop,
            "swap" => Builtin::Swap,
            "over" => Builtin::Over,
            "pick" => Builtin::Pick,
            "dudup" => Builtin::Dudup,
            "mod" => Builtin::Mod,
            "=" => Builtin::Eq,
            "<>" => Builtin::Ne,
            "<" => Builtin::Lt,
            ">" => Builtin::Gt,
            "<=" => Builtin::Le,
            ">=" => Builtin::Ge,
            "emit" => Builtin::Emit,
            "key" => Builtin::Key,
            "cr" => Builtin::Cr,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Dup => "dup",
            Builtin::Drop => "drop",
            Builtin::Swap => "swap",
            Builtin::Over => "over",
            Builtin::Pick => "pick",
            Builtin::Dudup => "dudup",
            Builtin::Mod => "mod",
            Builtin::Eq => "=",
            Builtin::Ne => "<>",
            Builtin::Lt => "<",
            Builtin::Gt => ">",
            Builtin::Le => "<=",
            Builtin::Ge => ">=",
            Builtin::Emit => "emit",
            Builtin::Key => "key",
            Builtin::Cr => "cr",
        }
    }
}

/// Which way a `do` loop counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopDirection {
    /// `do ... loop`: counts up from start while below the limit.
    Up,
    /// `do ... mloop`: counts down from start while above the limit.
    Down,
}

/// One parsed syntactic unit of a forthchan program.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Push a literal.
    ///
    /// Stack effect: `( -- n )`
    Number(i64),

    /// `+ - * /`. The deeper operand is the left-hand side.
    ///
    /// Stack effect: `( a b -- a op b )`
    SignOp(SignOp),

    Builtin(Builtin),

    /// Call a globally defined word.
    WordRef(String),

    /// `do [i] ... loop` or `do [i] ... mloop`
    ///
    /// Stack effect on entry: `( start limit -- )`. With `has_index` each
    /// iteration begins by pushing the current index.
    ForLoop {
        has_index: bool,
        direction: LoopDirection,
        body: Body,
    },

    /// `begin ... until`. The body must leave a flag; 0 repeats the loop.
    DoWhileLoop { body: Body },

    /// `if ... [else ...] then`. A popped 0 selects `then_body`.
    ///
    /// Stack effect on entry: `( flag -- )`
    IfThen {
        then_body: Body,
        else_body: Option<Body>,
    },

    /// `."text"`: write the bytes to the output port, no stack effect.
    PrintLiteral(Vec<u8>),

    /// Exit the innermost enclosing loop.
    Leave,
}
