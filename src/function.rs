//! Truth tables of Boolean functions.
//!
//! A function of `n` inputs is stored as its truth table, a `2^n`-bit vector in the low bits
//! of a `u32`. The arity travels with the value so that complementation can mask the result
//! back to the canonical width.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::error::{ChainError, Result};

/// Largest supported number of inputs.
///
/// The search and the cost engine tabulate the whole value space, `2^(2^n)` functions.
pub const MAX_INPUTS: u32 = 4;

/// An immutable truth table over `inputs` variables.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Function {
    bits: u32,
    inputs: u8,
}

impl Function {
    /// Creates a function of `inputs` variables, masking `bits` to `2^inputs` bits.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is zero or larger than [`MAX_INPUTS`].
    pub fn new(inputs: u32, bits: u32) -> Self {
        assert!(
            (1..=MAX_INPUTS).contains(&inputs),
            "number of inputs must be in 1..={MAX_INPUTS}, got {inputs}"
        );
        Self {
            bits: bits & Self::mask(inputs),
            inputs: inputs as u8,
        }
    }

    /// Mask of the `2^inputs` truth table bits.
    pub const fn mask(inputs: u32) -> u32 {
        let width = 1u32 << inputs;
        if width >= 32 {
            u32::MAX
        } else {
            (1u32 << width) - 1
        }
    }

    /// The constant false function.
    pub fn zero(inputs: u32) -> Self {
        Self::new(inputs, 0)
    }

    /// The constant true function.
    pub fn tautology(inputs: u32) -> Self {
        Self::new(inputs, u32::MAX)
    }

    /// The canonical projection onto variable `var` (1-indexed).
    ///
    /// Variable 1 is the most significant one: for 4 inputs the projections are
    /// `0x00FF`, `0x0F0F`, `0x3333` and `0x5555`.
    pub fn projection(inputs: u32, var: u32) -> Self {
        assert!(
            var >= 1 && var <= inputs,
            "variable index {var} out of range 1..={inputs}"
        );
        let tautology = u64::from(Self::mask(inputs));
        let slice = (1u64 << (1u64 << (inputs - var))) + 1;
        Self::new(inputs, (tautology / slice) as u32)
    }

    /// All canonical projections, variable 1 first.
    pub fn projections(inputs: u32) -> Vec<Self> {
        (1..=inputs).map(|var| Self::projection(inputs, var)).collect()
    }

    /// Parses a truth table written as `0x…`, `0b…` or a decimal number.
    ///
    /// Underscores are ignored. Values wider than `2^inputs` bits are rejected rather than
    /// silently truncated.
    pub fn parse(inputs: u32, text: &str) -> Result<Self> {
        let invalid = || ChainError::InvalidFunction {
            text: text.to_string(),
            inputs,
        };
        if !(1..=MAX_INPUTS).contains(&inputs) {
            return Err(ChainError::InvalidInputs { inputs });
        }
        let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
        let parsed = if let Some(hex) = cleaned.strip_prefix("0x").or(cleaned.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else if let Some(bin) = cleaned.strip_prefix("0b").or(cleaned.strip_prefix("0B")) {
            u32::from_str_radix(bin, 2)
        } else {
            cleaned.parse::<u32>()
        };
        let bits = parsed.map_err(|_| invalid())?;
        if bits & !Self::mask(inputs) != 0 {
            return Err(invalid());
        }
        Ok(Self::new(inputs, bits))
    }

    /// Raw truth table bits.
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Number of input variables.
    pub const fn inputs(self) -> u32 {
        self.inputs as u32
    }

    /// Width of the truth table in bits.
    pub const fn width(self) -> u32 {
        1 << self.inputs
    }

    /// Position of this function in a table over the whole value space.
    pub const fn index(self) -> usize {
        self.bits as usize
    }

    /// Number of distinct functions of `inputs` variables.
    pub const fn space_size(inputs: u32) -> usize {
        1usize << (1usize << inputs)
    }

    pub fn is_zero(self) -> bool {
        self.bits == 0
    }
}

impl From<Function> for usize {
    fn from(f: Function) -> Self {
        f.index()
    }
}

impl Not for Function {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self {
            bits: !self.bits & Self::mask(self.inputs()),
            inputs: self.inputs,
        }
    }
}

impl BitAnd for Function {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.inputs, rhs.inputs, "arity mismatch");
        Self {
            bits: self.bits & rhs.bits,
            inputs: self.inputs,
        }
    }
}

impl BitOr for Function {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.inputs, rhs.inputs, "arity mismatch");
        Self {
            bits: self.bits | rhs.bits,
            inputs: self.inputs,
        }
    }
}

impl BitXor for Function {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.inputs, rhs.inputs, "arity mismatch");
        Self {
            bits: self.bits ^ rhs.bits,
            inputs: self.inputs,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.width() as usize)
    }
}
