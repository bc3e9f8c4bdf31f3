/// Memory-mapped ports of the machine.
///
/// Port 0 delivers the input schedule one character per read and never
/// blocks. Port 1 accumulates output bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Input = 0,
    Output = 1,
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Port::Input => write!(f, "port 0 (input)"),
            Port::Output => write!(f, "port 1 (output)"),
        }
    }
}

/// Finite, precomputed input: each read consumes one character.
#[derive(Debug, Clone, Default)]
pub struct InputSchedule {
    chars: Vec<char>,
    cursor: usize,
}

impl InputSchedule {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
        }
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(c)
    }

    pub fn remaining(&self) -> usize {
        self.chars.len() - self.cursor
    }
}

/// Both ports, owned by one machine.
#[derive(Debug, Clone, Default)]
pub struct IoBus {
    input: InputSchedule,
    output: Vec<u8>,
}

impl IoBus {
    pub fn new(input: &str) -> Self {
        Self {
            input: InputSchedule::new(input),
            output: Vec::new(),
        }
    }

    /// Read the code of the next input character; `None` once exhausted.
    pub fn read(&mut self) -> Option<i64> {
        self.input.next_char().map(|c| i64::from(u32::from(c)))
    }

    pub fn write(&mut self, byte: u8) {
        self.output.push(byte);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    pub fn remaining_input(&self) -> usize {
        self.input.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_consumed_in_order() {
        let mut bus = IoBus::new("ab");
        assert_eq!(bus.read(), Some(97));
        assert_eq!(bus.remaining_input(), 1);
        assert_eq!(bus.read(), Some(98));
        assert_eq!(bus.read(), None);
        assert_eq!(bus.read(), None);
    }

    #[test]
    fn test_non_ascii_input_yields_code_point() {
        let mut bus = IoBus::new("é");
        assert_eq!(bus.read(), Some(0xE9));
    }

    #[test]
    fn test_output_accumulates() {
        let mut bus = IoBus::new("");
        bus.write(b'o');
        bus.write(b'k');
        assert_eq!(bus.output(), b"ok");
        assert_eq!(bus.into_output(), b"ok".to_vec());
    }

    #[test]
    fn test_port_numbers() {
        assert_eq!(Port::Input as u8, 0);
        assert_eq!(Port::Output as u8, 1);
    }
}
