use super::{Val, EPSILON};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// Operator semantics over values. `+` concatenates when either side is
/// text; the other arithmetic operators are numeric. Comparisons are
/// ordinal when either side is text, numeric otherwise, with an epsilon
/// for `=` and `<>`. The logical operators are bitwise over rounded
/// 32-bit integers, true being the all-ones pattern -1.
pub struct Operation;

impl Operation {
    fn truth(value: bool) -> Val {
        Val::Number(if value { -1.0 } else { 0.0 })
    }

    pub fn negate(value: Val) -> Val {
        Val::Number(-value.as_number())
    }

    pub fn sum(lhs: Val, rhs: Val) -> Val {
        if lhs.is_text() || rhs.is_text() {
            let mut s = lhs.as_string();
            s.push_str(&rhs.as_string());
            Val::Text(s)
        } else {
            Val::Number(lhs.as_number() + rhs.as_number())
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Val {
        Val::Number(lhs.as_number() - rhs.as_number())
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Val {
        Val::Number(lhs.as_number() * rhs.as_number())
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        let divisor = rhs.as_number();
        if divisor == 0.0 {
            return Err(error!(Runtime; "Division by zero"));
        }
        Ok(Val::Number(lhs.as_number() / divisor))
    }

    pub fn power(lhs: Val, rhs: Val) -> Val {
        Val::Number(lhs.as_number().powf(rhs.as_number()))
    }

    pub fn equal(lhs: Val, rhs: Val) -> Val {
        if lhs.is_text() || rhs.is_text() {
            Operation::truth(lhs.as_string() == rhs.as_string())
        } else {
            Operation::truth((lhs.as_number() - rhs.as_number()).abs() < EPSILON)
        }
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Val {
        if lhs.is_text() || rhs.is_text() {
            Operation::truth(lhs.as_string() != rhs.as_string())
        } else {
            Operation::truth((lhs.as_number() - rhs.as_number()).abs() >= EPSILON)
        }
    }

    pub fn less(lhs: Val, rhs: Val) -> Val {
        if lhs.is_text() || rhs.is_text() {
            Operation::truth(lhs.as_string() < rhs.as_string())
        } else {
            Operation::truth(lhs.as_number() < rhs.as_number())
        }
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Val {
        if lhs.is_text() || rhs.is_text() {
            Operation::truth(lhs.as_string() <= rhs.as_string())
        } else {
            Operation::truth(lhs.as_number() <= rhs.as_number())
        }
    }

    pub fn greater(lhs: Val, rhs: Val) -> Val {
        Operation::less(rhs, lhs)
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Val {
        Operation::less_equal(rhs, lhs)
    }

    pub fn and(lhs: Val, rhs: Val) -> Val {
        Val::Number((lhs.as_int() & rhs.as_int()) as f64)
    }

    pub fn or(lhs: Val, rhs: Val) -> Val {
        Val::Number((lhs.as_int() | rhs.as_int()) as f64)
    }

    pub fn not(value: Val) -> Val {
        Val::Number(!value.as_int() as f64)
    }
}
