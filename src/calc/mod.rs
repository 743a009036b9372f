//! Integer arithmetic operations and their validation errors.

/// Operand stack shared by stack-flavored evaluations.
pub mod stack;

use crate::types::Operand;

/// Validation and domain errors. Display text is the caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("Error: unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Error: Not enough arguments to perform the operation {0}")]
    NotEnoughArguments(&'static str),
    #[error("Error: Too many arguments to perform the operation {0}")]
    TooManyArguments(&'static str),
    #[error(
        "Error: cannot implement operation {operation}. It requires {required} arguments and the stack has only {available} arguments"
    )]
    StackUnderflow {
        operation: &'static str,
        required: usize,
        available: usize,
    },
    #[error("Error: cannot remove {count} from the stack. It has only {available} arguments")]
    RemoveTooMany { count: usize, available: usize },
    #[error("Error while performing operation Divide: division by 0")]
    DivisionByZero,
    #[error("Error while performing operation Factorial: not supported for the negative number")]
    NegativeFactorial,
    #[error("Error while performing operation Pow: not supported for a negative exponent")]
    NegativeExponent,
    #[error("Error while performing operation {0}: result out of range")]
    Overflow(&'static str),
}

/// Supported arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Plus,
    Minus,
    Times,
    Divide,
    Pow,
    Abs,
    Fact,
}

impl Operation {
    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Result<Self, CalcError> {
        match name.to_lowercase().as_str() {
            "plus" => Ok(Self::Plus),
            "minus" => Ok(Self::Minus),
            "times" => Ok(Self::Times),
            "divide" => Ok(Self::Divide),
            "pow" => Ok(Self::Pow),
            "abs" => Ok(Self::Abs),
            "fact" => Ok(Self::Fact),
            other => Err(CalcError::UnknownOperation(other.to_string())),
        }
    }

    /// Lower-case name as recorded in history.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Times => "times",
            Self::Divide => "divide",
            Self::Pow => "pow",
            Self::Abs => "abs",
            Self::Fact => "fact",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Abs | Self::Fact => 1,
            _ => 2,
        }
    }

    /// Checks the argument count, then evaluates.
    pub fn evaluate(self, args: &[Operand]) -> Result<Operand, CalcError> {
        if args.len() < self.arity() {
            return Err(CalcError::NotEnoughArguments(self.name()));
        }
        if args.len() > self.arity() {
            return Err(CalcError::TooManyArguments(self.name()));
        }
        match *args {
            [x] => self.apply_unary(x),
            [x, y] => self.apply_binary(x, y),
            _ => Err(CalcError::TooManyArguments(self.name())),
        }
    }

    fn apply_unary(self, x: Operand) -> Result<Operand, CalcError> {
        match self {
            Self::Abs => x.checked_abs().ok_or(CalcError::Overflow("Abs")),
            Self::Fact => factorial(x),
            _ => Err(CalcError::NotEnoughArguments(self.name())),
        }
    }

    fn apply_binary(self, x: Operand, y: Operand) -> Result<Operand, CalcError> {
        match self {
            Self::Plus => x.checked_add(y).ok_or(CalcError::Overflow("Plus")),
            Self::Minus => x.checked_sub(y).ok_or(CalcError::Overflow("Minus")),
            Self::Times => x.checked_mul(y).ok_or(CalcError::Overflow("Times")),
            Self::Divide => floor_div(x, y),
            Self::Pow => pow(x, y),
            Self::Abs | Self::Fact => Err(CalcError::TooManyArguments(self.name())),
        }
    }
}

/// Division rounding toward negative infinity.
fn floor_div(x: Operand, y: Operand) -> Result<Operand, CalcError> {
    if y == 0 {
        return Err(CalcError::DivisionByZero);
    }
    let q = x.checked_div(y).ok_or(CalcError::Overflow("Divide"))?;
    if x % y != 0 && ((x < 0) != (y < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn pow(base: Operand, exp: Operand) -> Result<Operand, CalcError> {
    if exp < 0 {
        return Err(CalcError::NegativeExponent);
    }
    match (base, u32::try_from(exp)) {
        (_, Ok(exp)) => base.checked_pow(exp).ok_or(CalcError::Overflow("Pow")),
        // exp > u32::MAX here, so only these bases stay in range.
        (0 | 1, Err(_)) => Ok(base),
        (-1, Err(_)) => Ok(if exp % 2 == 0 { 1 } else { -1 }),
        (_, Err(_)) => Err(CalcError::Overflow("Pow")),
    }
}

fn factorial(x: Operand) -> Result<Operand, CalcError> {
    if x < 0 {
        return Err(CalcError::NegativeFactorial);
    }
    (2..=x).try_fold(1 as Operand, |acc, n| {
        acc.checked_mul(n).ok_or(CalcError::Overflow("Factorial"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Operation::parse("PLUS"), Ok(Operation::Plus));
        assert_eq!(Operation::parse("Fact"), Ok(Operation::Fact));
        assert_eq!(
            Operation::parse("Modulo").unwrap_err().to_string(),
            "Error: unknown operation: modulo"
        );
    }

    #[test]
    fn divide_floors_like_integer_division() {
        assert_eq!(Operation::Divide.evaluate(&[7, 2]), Ok(3));
        assert_eq!(Operation::Divide.evaluate(&[-7, 2]), Ok(-4));
        assert_eq!(Operation::Divide.evaluate(&[7, -2]), Ok(-4));
        assert_eq!(Operation::Divide.evaluate(&[6, -3]), Ok(-2));
        assert_eq!(
            Operation::Divide.evaluate(&[1, 0]),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn arity_errors_name_the_operation() {
        assert_eq!(
            Operation::Plus.evaluate(&[1]).unwrap_err().to_string(),
            "Error: Not enough arguments to perform the operation plus"
        );
        assert_eq!(
            Operation::Minus.evaluate(&[1, 2, 3]).unwrap_err().to_string(),
            "Error: Too many arguments to perform the operation minus"
        );
        assert_eq!(
            Operation::Abs.evaluate(&[]),
            Err(CalcError::NotEnoughArguments("abs"))
        );
    }

    #[test]
    fn unary_and_power_results() {
        assert_eq!(Operation::Abs.evaluate(&[-5]), Ok(5));
        assert_eq!(Operation::Fact.evaluate(&[0]), Ok(1));
        assert_eq!(Operation::Fact.evaluate(&[5]), Ok(120));
        assert_eq!(
            Operation::Fact.evaluate(&[-1]),
            Err(CalcError::NegativeFactorial)
        );
        assert_eq!(Operation::Pow.evaluate(&[2, 10]), Ok(1024));
        assert_eq!(Operation::Pow.evaluate(&[2, -1]), Err(CalcError::NegativeExponent));
        assert_eq!(Operation::Pow.evaluate(&[2, 64]), Err(CalcError::Overflow("Pow")));
        assert_eq!(Operation::Fact.evaluate(&[21]), Err(CalcError::Overflow("Factorial")));
    }

    #[test]
    fn huge_exponents_on_unit_bases_stay_in_range() {
        let huge = 5_000_000_000;
        assert_eq!(Operation::Pow.evaluate(&[1, huge]), Ok(1));
        assert_eq!(Operation::Pow.evaluate(&[0, huge]), Ok(0));
        assert_eq!(Operation::Pow.evaluate(&[-1, huge]), Ok(1));
        assert_eq!(Operation::Pow.evaluate(&[-1, huge + 1]), Ok(-1));
        assert_eq!(Operation::Pow.evaluate(&[0, 0]), Ok(1));
        assert_eq!(Operation::Pow.evaluate(&[2, huge]), Err(CalcError::Overflow("Pow")));
        assert_eq!(Operation::Pow.evaluate(&[1, -huge]), Err(CalcError::NegativeExponent));
    }
}
