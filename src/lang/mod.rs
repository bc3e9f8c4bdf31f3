//! # forthchan syntax tree
//!
//! This module defines the term tree produced by the parser and the global
//! word table consumed by the linearizer.
//!
//! ## Documentation conventions
//!
//! - Stack effects are written as `( before -- after )`.
//! - Flags follow the "0 is true" convention: 0 means true, anything else false.

pub mod program;
pub mod term;
pub mod words;

pub use program::{Program, WordDef};
pub use term::{Body, Builtin, LoopDirection, Term};
pub use words::WordTable;
