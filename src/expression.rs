use std::fmt;

use crate::function::Function;

/// The five binary combinators a chain step may apply.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Operator {
    And,
    Or,
    Xor,
    /// `a & !b`
    AndNot,
    /// `!a & b`
    NotAnd,
}

impl Operator {
    /// All operators in enumeration order.
    ///
    /// Candidate lists, and therefore resume vectors, depend on this order.
    pub const ALL: [Operator; 5] = [
        Operator::And,
        Operator::Or,
        Operator::Xor,
        Operator::AndNot,
        Operator::NotAnd,
    ];

    pub fn apply(self, a: Function, b: Function) -> Function {
        match self {
            Operator::And => a & b,
            Operator::Or => a | b,
            Operator::Xor => a ^ b,
            Operator::AndNot => a & !b,
            Operator::NotAnd => !a & b,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Operator::And => '&',
            Operator::Or => '|',
            Operator::Xor => '^',
            Operator::AndNot => '>',
            Operator::NotAnd => '<',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// How a chain entry is obtained: given up front, or combined from two earlier entries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Expression {
    Constant(Function),
    Binary(Operator, Function, Function),
}

impl Expression {
    pub fn binary(op: Operator, left: Function, right: Function) -> Self {
        Expression::Binary(op, left, right)
    }

    pub fn evaluate(&self) -> Function {
        match *self {
            Expression::Constant(f) => f,
            Expression::Binary(op, g, h) => op.apply(g, h),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match *self {
            Expression::Constant(_) => None,
            Expression::Binary(op, _, _) => Some(op),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(g) => write!(f, "{}", g),
            Expression::Binary(op, g, h) => write!(f, "{} {} {}", g, op, h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_evaluate_matches_bitwise() {
        for a in 0..16 {
            for b in 0..16 {
                let g = Function::new(2, a);
                let h = Function::new(2, b);
                let raw = [a & b, a | b, a ^ b, a & !b & 0xF, !a & b & 0xF];
                for (op, expected) in Operator::ALL.into_iter().zip(raw) {
                    let expr = Expression::binary(op, g, h);
                    assert_eq!(expr.evaluate().bits(), expected, "{} {} {}", a, op, b);
                }
            }
        }
    }

    #[test]
    fn test_constant() {
        let f = Function::new(3, 0x5A);
        let expr = Expression::Constant(f);
        assert_eq!(expr.evaluate(), f);
        assert!(expr.is_constant());
        assert_eq!(expr.operator(), None);
    }

    #[test]
    fn test_display() {
        let g = Function::new(2, 0b1100);
        let h = Function::new(2, 0b1010);
        assert_eq!(Expression::binary(Operator::AndNot, g, h).to_string(), "1100 > 1010");
        assert_eq!(Expression::Constant(g).to_string(), "1100");
    }
}
