/// Why a bounded stack refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackFault {
    Overflow,
    Underflow,
}

/// Fixed-capacity stack: preallocated cells and a top index.
///
/// The capacity never grows; pushing onto a full stack is a fault, not a
/// reallocation.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    cells: Box<[T]>,
    top: usize,
}

impl<T: Copy + Default> BoundedStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![T::default(); capacity].into_boxed_slice(),
            top: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn len(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn is_full(&self) -> bool {
        self.top == self.cells.len()
    }

    pub fn push(&mut self, value: T) -> Result<(), StackFault> {
        let cell = self.cells.get_mut(self.top).ok_or(StackFault::Overflow)?;
        *cell = value;
        self.top += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T, StackFault> {
        if self.top == 0 {
            return Err(StackFault::Underflow);
        }
        self.top -= 1;
        Ok(self.cells[self.top])
    }

    pub fn peek(&self) -> Option<T> {
        self.as_slice().last().copied()
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Live cells, bottom first.
    pub fn as_slice(&self) -> &[T] {
        &self.cells[..self.top]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells[..self.top]
    }
}
