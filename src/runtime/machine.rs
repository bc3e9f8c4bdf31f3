use log::trace;

use crate::bytecode::ir::MachineCode;
use crate::bytecode::op::{Instruction, Opcode};
use crate::runtime::io::{IoBus, Port};
use crate::runtime::runtime_error::MachineError;
use crate::runtime::stack::BoundedStack;

#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub data_stack_capacity: usize,
    pub loop_stack_capacity: usize,
    pub return_stack_capacity: usize,
    /// Stop with `LimitExceeded` after this many executed instructions.
    pub max_instructions: Option<u64>,
    /// Stop with `LimitExceeded` once the tick counter reaches this value.
    pub max_ticks: Option<u64>,
    pub trace: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            data_stack_capacity: 256,
            loop_stack_capacity: 32,
            return_stack_capacity: 256,
            max_instructions: Some(1_000_000),
            max_ticks: None,
            trace: false,
        }
    }
}

impl MachineConfig {
    pub fn with_data_stack(mut self, capacity: usize) -> Self {
        self.data_stack_capacity = capacity;
        self
    }

    pub fn with_loop_stack(mut self, capacity: usize) -> Self {
        self.loop_stack_capacity = capacity;
        self
    }

    pub fn with_return_stack(mut self, capacity: usize) -> Self {
        self.return_stack_capacity = capacity;
        self
    }

    pub fn with_max_instructions(mut self, limit: Option<u64>) -> Self {
        self.max_instructions = limit;
        self
    }

    pub fn with_max_ticks(mut self, limit: Option<u64>) -> Self {
        self.max_ticks = limit;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// One active `do ... loop`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopFrame {
    pub current: i64,
    pub limit: i64,
    /// The body starts with `LOOP-PUSH-INDEX`.
    pub has_index: bool,
}

/// The simulated stack machine.
///
/// Owns every mutable resource (three stacks, the ports, the counters) and
/// borrows the machine code, so one translated program can back many runs.
pub struct Machine<'a> {
    code: &'a MachineCode,
    data: BoundedStack<i64>,
    loops: BoundedStack<LoopFrame>,
    returns: BoundedStack<usize>,
    io: IoBus,
    pc: usize,
    ticks: u64,
    executed: u64,
    halted: bool,
    last_error: Option<MachineError>,
}

fn flag(condition: bool) -> i64 {
    if condition { 0 } else { -1 }
}

/// Remainder with the sign of the divisor.
fn floored_rem(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}

impl<'a> Machine<'a> {
    pub fn new(code: &'a MachineCode, config: &MachineConfig, input: &str) -> Self {
        Self {
            code,
            data: BoundedStack::new(config.data_stack_capacity),
            loops: BoundedStack::new(config.loop_stack_capacity),
            returns: BoundedStack::new(config.return_stack_capacity),
            io: IoBus::new(input),
            pc: code.entry,
            ticks: 0,
            executed: 0,
            halted: false,
            last_error: None,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn instructions_executed(&self) -> u64 {
        self.executed
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The fault that stopped the machine, if any.
    pub fn last_error(&self) -> Option<&MachineError> {
        self.last_error.as_ref()
    }

    /// Active loop frames, outermost first.
    pub fn loop_frames(&self) -> &[LoopFrame] {
        self.loops.as_slice()
    }

    /// Data stack, bottom first.
    pub fn stack(&self) -> &[i64] {
        self.data.as_slice()
    }

    pub fn output(&self) -> &[u8] {
        self.io.output()
    }

    pub fn into_output(self) -> Vec<u8> {
        self.io.into_output()
    }

    /// Characters of the input schedule not read yet.
    pub fn remaining_input(&self) -> usize {
        self.io.remaining_input()
    }

    /// Instruction at the program counter, if the counter is inside memory.
    pub fn current_instruction(&self) -> Option<&'a Instruction> {
        let code: &'a MachineCode = self.code;
        code.get(self.pc)
    }

    // =========================================================================
    // Data stack helpers
    // =========================================================================

    fn require(&self, needed: usize) -> Result<(), MachineError> {
        let available = self.data.len();
        if available < needed {
            return Err(MachineError::StackUnderflow { needed, available });
        }
        Ok(())
    }

    fn push(&mut self, value: i64) -> Result<(), MachineError> {
        self.data.push(value).map_err(|_| MachineError::StackOverflow {
            capacity: self.data.capacity(),
        })
    }

    fn pop(&mut self) -> Result<i64, MachineError> {
        self.require(1)?;
        self.data.pop().map_err(|_| MachineError::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    /// `( a b -- f(a, b) )`. The stack is untouched if `f` fails.
    fn binary(
        &mut self,
        f: impl Fn(i64, i64) -> Result<i64, MachineError>,
    ) -> Result<(), MachineError> {
        self.require(2)?;
        let s = self.data.as_slice();
        let (a, b) = (s[s.len() - 2], s[s.len() - 1]);
        let result = f(a, b)?;
        self.pop()?;
        self.pop()?;
        self.push(result)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    fn operand(instr: &Instruction) -> Result<i64, MachineError> {
        instr.operand.ok_or(MachineError::MissingOperand {
            address: instr.address,
        })
    }

    fn target(instr: &Instruction) -> Result<usize, MachineError> {
        let target = Self::operand(instr)?;
        usize::try_from(target).map_err(|_| MachineError::InvalidAddress(target))
    }

    /// Execute the instruction at the program counter.
    ///
    /// On success the tick counter advances by the opcode's cost. On a fault
    /// the counters and the program counter keep their values from before the
    /// instruction, so they locate the faulting instruction.
    pub fn step(&mut self) -> Result<(), MachineError> {
        if self.halted {
            return Ok(());
        }
        let result = self.execute();
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }

    fn execute(&mut self) -> Result<(), MachineError> {
        let code = self.code;
        let instr = code
            .get(self.pc)
            .ok_or(MachineError::InvalidAddress(self.pc as i64))?;
        let mut next = self.pc + 1;

        match instr.opcode {
            Opcode::Push => {
                let value = Self::operand(instr)?;
                self.push(value)?;
            }

            Opcode::Add => self.binary(|a, b| Ok(a.wrapping_add(b)))?,
            Opcode::Sub => self.binary(|a, b| Ok(a.wrapping_sub(b)))?,
            Opcode::Mul => self.binary(|a, b| Ok(a.wrapping_mul(b)))?,
            Opcode::Div => self.binary(|a, b| {
                if b == 0 {
                    return Err(MachineError::DivisionByZero);
                }
                Ok(a.wrapping_div(b))
            })?,
            Opcode::Mod => self.binary(|a, b| {
                if b == 0 {
                    return Err(MachineError::DivisionByZero);
                }
                Ok(floored_rem(a, b))
            })?,

            Opcode::Dup => {
                self.require(1)?;
                let a = self.data.as_slice()[self.data.len() - 1];
                self.push(a)?;
            }
            Opcode::Drop => {
                self.pop()?;
            }
            Opcode::Swap => {
                self.require(2)?;
                let s = self.data.as_mut_slice();
                let n = s.len();
                s.swap(n - 2, n - 1);
            }
            Opcode::Over => {
                self.require(2)?;
                let a = self.data.as_slice()[self.data.len() - 2];
                self.push(a)?;
            }
            Opcode::Pick => {
                self.require(1)?;
                let s = self.data.as_slice();
                let index = s[s.len() - 1];
                let depth =
                    usize::try_from(index).map_err(|_| MachineError::NegativePickIndex(index))?;
                let below = s.len() - 1;
                if depth >= below {
                    return Err(MachineError::StackUnderflow {
                        needed: depth.saturating_add(2),
                        available: s.len(),
                    });
                }
                let value = s[below - 1 - depth];
                if let Some(top) = self.data.peek_mut() {
                    *top = value;
                }
            }

            Opcode::Eq => self.binary(|a, b| Ok(flag(a == b)))?,
            Opcode::Ne => self.binary(|a, b| Ok(flag(a != b)))?,
            Opcode::Lt => self.binary(|a, b| Ok(flag(a < b)))?,
            Opcode::Gt => self.binary(|a, b| Ok(flag(a > b)))?,
            Opcode::Le => self.binary(|a, b| Ok(flag(a <= b)))?,
            Opcode::Ge => self.binary(|a, b| Ok(flag(a >= b)))?,

            Opcode::Jmp => next = Self::target(instr)?,
            Opcode::Jz => {
                let target = Self::target(instr)?;
                if self.pop()? == 0 {
                    next = target;
                }
            }
            Opcode::Call => {
                let target = Self::target(instr)?;
                self.returns
                    .push(next)
                    .map_err(|_| MachineError::ReturnStackOverflow {
                        capacity: self.returns.capacity(),
                    })?;
                next = target;
            }
            Opcode::Ret => {
                next = self
                    .returns
                    .pop()
                    .map_err(|_| MachineError::ReturnStackUnderflow)?;
            }

            Opcode::LoopInit | Opcode::LoopInitDown => {
                let exit = Self::target(instr)?;
                self.require(2)?;
                let s = self.data.as_slice();
                let (start, limit) = (s[s.len() - 2], s[s.len() - 1]);
                let empty = match instr.opcode {
                    Opcode::LoopInitDown => start <= limit,
                    _ => start >= limit,
                };
                if empty {
                    next = exit;
                } else {
                    let has_index = code
                        .get(next)
                        .is_some_and(|i| i.opcode == Opcode::LoopPushIndex);
                    self.loops
                        .push(LoopFrame {
                            current: start,
                            limit,
                            has_index,
                        })
                        .map_err(|_| MachineError::LoopStackOverflow {
                            capacity: self.loops.capacity(),
                        })?;
                }
                self.pop()?;
                self.pop()?;
            }
            Opcode::LoopStep | Opcode::LoopStepDown => {
                let body_start = Self::target(instr)?;
                let frame = self
                    .loops
                    .peek_mut()
                    .ok_or(MachineError::LoopStackUnderflow)?;
                let again = if instr.opcode == Opcode::LoopStepDown {
                    frame.current -= 1;
                    frame.current > frame.limit
                } else {
                    frame.current += 1;
                    frame.current < frame.limit
                };
                if again {
                    next = body_start;
                } else {
                    self.loops
                        .pop()
                        .map_err(|_| MachineError::LoopStackUnderflow)?;
                }
            }
            Opcode::LoopPushIndex => {
                let frame = self.loops.peek().ok_or(MachineError::LoopStackUnderflow)?;
                self.push(frame.current)?;
            }
            Opcode::LoopDrop => {
                self.loops
                    .pop()
                    .map_err(|_| MachineError::LoopStackUnderflow)?;
            }

            Opcode::TrapIn => {
                if self.data.is_full() {
                    return Err(MachineError::StackOverflow {
                        capacity: self.data.capacity(),
                    });
                }
                let value = self.io.read().ok_or(MachineError::InputExhausted)?;
                trace!("{} -> {}", Port::Input, value);
                self.push(value)?;
            }
            Opcode::TrapOut => {
                let value = match instr.operand {
                    Some(b) => b,
                    None => {
                        self.require(1)?;
                        self.data.as_slice()[self.data.len() - 1]
                    }
                };
                let byte = u8::try_from(value).map_err(|_| MachineError::InvalidOutputByte(value))?;
                if instr.operand.is_none() {
                    self.pop()?;
                }
                trace!("{} <- {}", Port::Output, byte);
                self.io.write(byte);
            }

            Opcode::Halt => {
                self.halted = true;
                next = self.pc;
            }
        }

        self.ticks += instr.opcode.ticks();
        self.executed += 1;
        self.pc = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::translate;

    // ============================================================
    // Test Helpers
    // ============================================================

    fn code_from_ops(ops: &[(Opcode, Option<i64>)]) -> MachineCode {
        MachineCode {
            instructions: ops
                .iter()
                .enumerate()
                .map(|(a, &(op, operand))| Instruction::new(a, op, operand))
                .collect(),
            words: Vec::new(),
            entry: 0,
        }
    }

    /// Step until halt or fault, returning the machine state as (stack, output).
    fn exec(
        code: &MachineCode,
        config: &MachineConfig,
        input: &str,
    ) -> Result<(Vec<i64>, Vec<u8>), MachineError> {
        let mut machine = Machine::new(code, config, input);
        for _ in 0..100_000 {
            if machine.is_halted() {
                return Ok((machine.stack().to_vec(), machine.output().to_vec()));
            }
            machine.step()?;
        }
        panic!("program did not halt");
    }

    fn run(source: &str) -> Result<Vec<i64>, MachineError> {
        let code = translate(source).unwrap();
        exec(&code, &MachineConfig::default(), "").map(|(stack, _)| stack)
    }

    fn run_with_input(source: &str, input: &str) -> Result<(Vec<i64>, String), MachineError> {
        let code = translate(source).unwrap();
        exec(&code, &MachineConfig::default(), input)
            .map(|(stack, out)| (stack, String::from_utf8(out).unwrap()))
    }

    fn assert_stack(source: &str, expected: &[i64]) {
        let stack = run(source).expect("execution should succeed");
        assert_eq!(stack, expected, "stack mismatch for {source:?}");
    }

    fn assert_error(source: &str, expected: MachineError) {
        match run(source) {
            Ok(stack) => panic!("expected {expected:?}, got stack: {stack:?}"),
            Err(e) => assert_eq!(e, expected),
        }
    }

    // ============================================================
    // Arithmetic and stack ops
    // ============================================================

    #[test]
    fn test_arithmetic() {
        assert_stack("3 4 +", &[7]);
        assert_stack("10 3 -", &[7]);
        assert_stack("6 7 *", &[42]);
        assert_stack("7 2 /", &[3]);
        assert_stack("7 2 mod", &[1]);
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_stack("-7 2 /", &[-3]);
        assert_stack("7 -2 /", &[-3]);
    }

    #[test]
    fn test_mod_takes_sign_of_divisor() {
        assert_stack("-7 2 mod", &[1]);
        assert_stack("7 -2 mod", &[-1]);
        assert_stack("-7 -2 mod", &[-1]);
        assert_stack("6 -3 mod", &[0]);
        assert_stack("-9223372036854775808 -1 mod", &[0]);
    }

    #[test]
    fn test_arithmetic_wraps() {
        assert_stack("9223372036854775807 1 +", &[i64::MIN]);
        assert_stack("-9223372036854775807 1 - -1 /", &[i64::MIN]);
    }

    #[test]
    fn test_stack_ops() {
        assert_stack("1 dup", &[1, 1]);
        assert_stack("1 2 drop", &[1]);
        assert_stack("1 2 swap", &[2, 1]);
        assert_stack("1 2 over", &[1, 2, 1]);
        assert_stack("1 2 dudup", &[1, 2, 1, 2]);
    }

    #[test]
    fn test_pick() {
        assert_stack("10 20 30 0 pick", &[10, 20, 30, 30]);
        assert_stack("10 20 30 2 pick", &[10, 20, 30, 10]);
    }

    #[test]
    fn test_pick_out_of_range_keeps_stack() {
        assert_error(
            "10 20 2 pick",
            MachineError::StackUnderflow {
                needed: 4,
                available: 3,
            },
        );
        assert_error("pick", MachineError::StackUnderflow { needed: 1, available: 0 });
        assert_error("5 -1 pick", MachineError::NegativePickIndex(-1));

        let code = translate("7 1 pick").unwrap();
        let mut machine = Machine::new(&code, &MachineConfig::default(), "");
        machine.step().unwrap();
        machine.step().unwrap();
        assert!(machine.step().is_err());
        assert_eq!(machine.stack(), &[7, 1]);
        assert_eq!(machine.pc(), 2);
    }

    #[test]
    fn test_comparisons_zero_is_true() {
        assert_stack("2 2 =", &[0]);
        assert_stack("2 3 =", &[-1]);
        assert_stack("2 3 <>", &[0]);
        assert_stack("2 3 <", &[0]);
        assert_stack("3 2 <", &[-1]);
        assert_stack("3 2 >", &[0]);
        assert_stack("2 2 <=", &[0]);
        assert_stack("1 2 >=", &[-1]);
    }

    // ============================================================
    // Control flow
    // ============================================================

    #[test]
    fn test_if_else() {
        assert_stack("0 if 1 else 2 then", &[1]);
        assert_stack("5 if 1 else 2 then", &[2]);
        assert_stack("5 if 1 then", &[]);
        assert_stack("0 if 1 then", &[1]);
    }

    #[test]
    fn test_do_loop_indices() {
        assert_stack("2 5 do i loop", &[2, 3, 4]);
        assert_stack("0 3 do 9 loop", &[9, 9, 9]);
    }

    #[test]
    fn test_do_loop_skipped_when_start_not_below_limit() {
        assert_stack("5 5 do i loop", &[]);
        assert_stack("7 2 do i loop", &[]);
    }

    #[test]
    fn test_mloop_counts_down_to_above_limit() {
        assert_stack("5 2 do i mloop", &[5, 4, 3]);
        assert_stack("1 -2 do i mloop", &[1, 0, -1]);
        assert_stack("3 0 do 9 mloop", &[9, 9, 9]);
    }

    #[test]
    fn test_mloop_skipped_when_start_not_above_limit() {
        assert_stack("2 2 do i mloop", &[]);
        assert_stack("0 4 do i mloop", &[]);
    }

    #[test]
    fn test_leave_in_mloop() {
        assert_stack("10 0 do i dup 8 = if leave then mloop", &[10, 9, 8]);
    }

    #[test]
    fn test_nested_do_loops_use_innermost_index() {
        assert_stack("0 2 do 10 12 do i loop loop", &[10, 11, 10, 11]);
    }

    #[test]
    fn test_begin_until() {
        // Repeats while the flag is 0, i.e. while the copy is nonzero.
        assert_stack("3 begin dup 1 - dup 0 <> until", &[3, 2, 1, 0]);
        assert_stack("begin 7 -1 until drop", &[]);
    }

    #[test]
    fn test_leave() {
        assert_stack("0 10 do i dup 3 = if leave then loop", &[0, 1, 2, 3]);
        assert_stack("0 begin 1 + dup 4 = if leave then 0 until", &[4]);
    }

    #[test]
    fn test_leave_drops_loop_frame() {
        let code = translate("0 100 do 0 3 do leave loop loop 42").unwrap();
        let config = MachineConfig::default().with_loop_stack(2);
        let (stack, _) = exec(&code, &config, "").unwrap();
        assert_eq!(stack, vec![42]);
    }

    #[test]
    fn test_words() {
        assert_stack(": double 2 * ; 5 double", &[10]);
        assert_stack(": square dup * ; 4 square", &[16]);
        assert_stack(": a b 1 + ; : b 10 ; a", &[11]);
    }

    #[test]
    fn test_recursion() {
        assert_stack(
            ": fact dup 1 <= if drop 1 else dup 1 - fact * then ; 5 fact",
            &[120],
        );
    }

    // ============================================================
    // I/O
    // ============================================================

    #[test]
    fn test_print_literal() {
        let (stack, out) = run_with_input(".\"hi\"", "").unwrap();
        assert!(stack.is_empty());
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_emit_and_cr() {
        let (_, out) = run_with_input("72 emit 105 emit cr", "").unwrap();
        assert_eq!(out, "Hi\r");
    }

    #[test]
    fn test_key_echo() {
        let (stack, out) = run_with_input("key key emit emit", "ab").unwrap();
        assert!(stack.is_empty());
        assert_eq!(out, "ba");
    }

    // ============================================================
    // Faults
    // ============================================================

    #[test]
    fn test_division_by_zero() {
        assert_error("1 0 /", MachineError::DivisionByZero);
        assert_error("1 0 mod", MachineError::DivisionByZero);
    }

    #[test]
    fn test_division_by_zero_keeps_operands() {
        let code = translate("1 0 /").unwrap();
        let mut machine = Machine::new(&code, &MachineConfig::default(), "");
        machine.step().unwrap();
        machine.step().unwrap();
        assert_eq!(machine.step(), Err(MachineError::DivisionByZero));
        assert_eq!(machine.stack(), &[1, 0]);
        assert_eq!(machine.pc(), 2);
        assert_eq!(machine.ticks(), 2);
    }

    #[test]
    fn test_underflow() {
        assert_error(
            "1 +",
            MachineError::StackUnderflow {
                needed: 2,
                available: 1,
            },
        );
        assert_error(
            "drop",
            MachineError::StackUnderflow {
                needed: 1,
                available: 0,
            },
        );
        assert_error(
            "if then",
            MachineError::StackUnderflow {
                needed: 1,
                available: 0,
            },
        );
    }

    #[test]
    fn test_data_stack_overflow() {
        let code = translate("1 2 3").unwrap();
        let config = MachineConfig::default().with_data_stack(2);
        assert_eq!(
            exec(&code, &config, ""),
            Err(MachineError::StackOverflow { capacity: 2 })
        );
    }

    #[test]
    fn test_key_on_full_stack_leaves_input_unread() {
        let code = translate("1 key").unwrap();
        let config = MachineConfig::default().with_data_stack(1);
        let mut machine = Machine::new(&code, &config, "z");
        machine.step().unwrap();
        assert_eq!(
            machine.step(),
            Err(MachineError::StackOverflow { capacity: 1 })
        );
        assert_eq!(machine.remaining_input(), 1);
        assert_eq!(machine.pc(), 1);
        assert_eq!(machine.stack(), &[1]);
    }

    #[test]
    fn test_loop_stack_overflow() {
        let code = translate("0 1 do 0 1 do 0 1 do loop loop loop").unwrap();
        let config = MachineConfig::default().with_loop_stack(2);
        assert_eq!(
            exec(&code, &config, ""),
            Err(MachineError::LoopStackOverflow { capacity: 2 })
        );
    }

    #[test]
    fn test_unbounded_recursion_overflows_return_stack() {
        let code = translate(": forever forever ; forever").unwrap();
        let config = MachineConfig::default().with_return_stack(16);
        assert_eq!(
            exec(&code, &config, ""),
            Err(MachineError::ReturnStackOverflow { capacity: 16 })
        );
    }

    #[test]
    fn test_input_exhausted() {
        assert_eq!(
            run_with_input("key key", "x").unwrap_err(),
            MachineError::InputExhausted
        );
    }

    #[test]
    fn test_invalid_output_byte() {
        assert_error("256 emit", MachineError::InvalidOutputByte(256));
        assert_error("-1 emit", MachineError::InvalidOutputByte(-1));
    }

    // ============================================================
    // Internal faults
    // ============================================================

    #[test]
    fn test_internal_faults() {
        let config = MachineConfig::default();
        assert_eq!(
            exec(&code_from_ops(&[(Opcode::Ret, None)]), &config, ""),
            Err(MachineError::ReturnStackUnderflow)
        );
        assert_eq!(
            exec(&code_from_ops(&[(Opcode::LoopPushIndex, None)]), &config, ""),
            Err(MachineError::LoopStackUnderflow)
        );
        assert_eq!(
            exec(&code_from_ops(&[(Opcode::Push, None)]), &config, ""),
            Err(MachineError::MissingOperand { address: 0 })
        );
        assert_eq!(
            exec(&code_from_ops(&[(Opcode::Jmp, Some(9))]), &config, ""),
            Err(MachineError::InvalidAddress(9))
        );
        assert_eq!(
            exec(&code_from_ops(&[(Opcode::Push, Some(1))]), &config, ""),
            Err(MachineError::InvalidAddress(1))
        );
    }

    // ============================================================
    // Timing
    // ============================================================

    #[test]
    fn test_tick_accounting() {
        // PUSH 1, PUSH 2, SWAP (3), OVER (2), HALT
        let code = translate("1 2 swap over").unwrap();
        let mut machine = Machine::new(&code, &MachineConfig::default(), "");
        while !machine.is_halted() {
            machine.step().unwrap();
        }
        assert_eq!(machine.instructions_executed(), 5);
        assert_eq!(machine.ticks(), 1 + 1 + 3 + 2 + 1);
    }

    #[test]
    fn test_loop_frames_and_last_error() {
        let code = translate("0 3 do i 0 0 / loop").unwrap();
        let mut machine = Machine::new(&code, &MachineConfig::default(), "");
        let err = loop {
            if let Err(e) = machine.step() {
                break e;
            }
        };
        assert_eq!(err, MachineError::DivisionByZero);
        assert_eq!(machine.last_error(), Some(&MachineError::DivisionByZero));
        assert_eq!(
            machine.loop_frames(),
            &[LoopFrame {
                current: 0,
                limit: 3,
                has_index: true
            }]
        );
    }

    #[test]
    fn test_step_after_halt_is_noop() {
        let code = translate("").unwrap();
        let mut machine = Machine::new(&code, &MachineConfig::default(), "");
        machine.step().unwrap();
        assert!(machine.is_halted());
        machine.step().unwrap();
        assert_eq!(machine.instructions_executed(), 1);
        assert_eq!(machine.pc(), 0);
    }
}
