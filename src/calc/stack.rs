use crate::types::Operand;

use super::{CalcError, Operation};

/// Last-in first-out operand stack.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperandStack {
    items: Vec<Operand>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes `args` in order, so the last one ends on top. Returns the new size.
    pub fn push_all(&mut self, args: &[Operand]) -> usize {
        self.items.extend_from_slice(args);
        self.items.len()
    }

    /// Drops `count` operands from the top. Returns the new size.
    pub fn remove(&mut self, count: usize) -> Result<usize, CalcError> {
        if count > self.items.len() {
            return Err(CalcError::RemoveTooMany {
                count,
                available: self.items.len(),
            });
        }
        self.items.truncate(self.items.len() - count);
        Ok(self.items.len())
    }

    /// Pops the operands `op` needs and evaluates it.
    ///
    /// Returns the result and the operands in evaluation order (top first).
    /// On a domain error the operands are put back unchanged.
    pub fn operate(&mut self, op: Operation) -> Result<(Operand, Vec<Operand>), CalcError> {
        let required = op.arity();
        if self.items.len() < required {
            return Err(CalcError::StackUnderflow {
                operation: op.name(),
                required,
                available: self.items.len(),
            });
        }

        let split = self.items.len() - required;
        let mut args = self.items.split_off(split);
        args.reverse();

        match op.evaluate(&args) {
            Ok(result) => Ok((result, args)),
            Err(err) => {
                self.items.extend(args.iter().rev());
                Err(err)
            }
        }
    }

    pub fn as_slice(&self) -> &[Operand] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_pops_top_as_first_operand() {
        let mut stack = OperandStack::new();
        assert_eq!(stack.push_all(&[3, 5]), 2);
        assert_eq!(stack.operate(Operation::Minus), Ok((2, vec![5, 3])));
        assert!(stack.is_empty());
    }

    #[test]
    fn failed_divide_restores_operands() {
        let mut stack = OperandStack::new();
        stack.push_all(&[1, 0, 8]);
        assert_eq!(stack.operate(Operation::Divide), Err(CalcError::DivisionByZero));
        assert_eq!(stack.as_slice(), &[1, 0, 8]);
    }

    #[test]
    fn underflow_reports_sizes() {
        let mut stack = OperandStack::new();
        stack.push_all(&[4]);
        let err = stack.operate(Operation::Times).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: cannot implement operation times. It requires 2 arguments and the stack has only 1 arguments"
        );
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn remove_checks_bounds() {
        let mut stack = OperandStack::new();
        stack.push_all(&[1, 2, 3]);
        assert_eq!(stack.remove(2), Ok(1));
        assert_eq!(stack.as_slice(), &[1]);
        assert_eq!(
            stack.remove(5).unwrap_err().to_string(),
            "Error: cannot remove 5 from the stack. It has only 1 arguments"
        );
    }
}
