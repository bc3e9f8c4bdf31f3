use serde::{Deserialize, Serialize};

use crate::bytecode::op::Instruction;
use crate::bytecode::verify::{VerifyError, verify};

/// Address of a word body in machine memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSymbol {
    pub name: String,
    pub address: usize,
}

/// A translated program: the full contents of machine memory.
///
/// Convention: `entry` is always 0, the main program runs up to its `HALT`,
/// and word bodies follow in definition order, each ending in `RET`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineCode {
    pub instructions: Vec<Instruction>,
    pub words: Vec<WordSymbol>,
    pub entry: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image error: cannot encode machine code: {0}")]
    Encode(#[source] postcard::Error),
    #[error("image error: cannot decode machine code: {0}")]
    Decode(#[source] postcard::Error),
    #[error("image error: {0}")]
    Invalid(#[from] VerifyError),
}

impl MachineCode {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, address: usize) -> Option<&Instruction> {
        self.instructions.get(address)
    }

    /// Name of the word whose body starts exactly at `address`.
    pub fn word_at(&self, address: usize) -> Option<&str> {
        self.words
            .iter()
            .find(|w| w.address == address)
            .map(|w| w.name.as_str())
    }

    pub fn word_address(&self, name: &str) -> Option<usize> {
        self.words.iter().find(|w| w.name == name).map(|w| w.address)
    }

    /// Encode as a postcard byte image.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ImageError> {
        postcard::to_allocvec(self).map_err(ImageError::Encode)
    }

    /// Decode and verify a postcard byte image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let code: MachineCode = postcard::from_bytes(bytes).map_err(ImageError::Decode)?;
        verify(&code)?;
        Ok(code)
    }
}
