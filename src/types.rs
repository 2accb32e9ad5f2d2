//! Type-safe wrappers for variables, literals and decision levels.
//!
//! Variables are 1-indexed positive integers and literals are signed integers
//! in the usual DIMACS convention: `-v` means "v is false".
//! The newtypes keep the three apart at compile time.

use std::fmt;
use std::ops::Neg;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is reserved)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Returns the positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit(self.0 as i32)
    }

    /// Returns the negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit(-(self.0 as i32))
    }

    /// Returns the literal of this variable with the given truth value.
    pub fn lit(self, value: bool) -> Lit {
        if value {
            self.pos()
        } else {
            self.neg()
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A literal: a variable together with a polarity.
///
/// Stored as a signed non-zero integer, so negation is integer negation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    /// Creates a literal from its signed (DIMACS) representation.
    ///
    /// # Panics
    ///
    /// Panics if `value == 0`.
    pub fn from_dimacs(value: i32) -> Self {
        assert_ne!(value, 0, "Literal must be non-zero");
        Lit(value)
    }

    /// Returns the signed (DIMACS) representation.
    pub fn to_dimacs(self) -> i32 {
        self.0
    }

    pub fn var(self) -> Var {
        Var(self.0.unsigned_abs())
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the truth value this literal asserts for its variable.
    pub fn polarity(self) -> bool {
        self.is_positive()
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "~{}", self.var())
        } else {
            write!(f, "{}", self.var())
        }
    }
}

impl From<Lit> for i32 {
    fn from(lit: Lit) -> Self {
        lit.0
    }
}

/// A decision level of the CDCL search (0-indexed).
///
/// Level 0 holds everything implied without any decision.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Level(usize);

impl Level {
    pub const ROOT: Level = Level(0);

    pub fn new(index: usize) -> Self {
        Level(index)
    }

    /// Number of decisions made up to this level.
    pub fn index(self) -> usize {
        self.0
    }

    /// The level opened by one more decision.
    pub fn next(self) -> Self {
        Level(self.0 + 1)
    }

    /// The level below, or `None` for the root.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Level)
    }

    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl From<Level> for usize {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl From<usize> for Level {
    fn from(index: usize) -> Self {
        Level(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v1 = Var::new(1);
        let v2 = Var::new(2);
        assert_eq!(v1.id(), 1);
        assert_eq!(v2.id(), 2);
        assert!(v1 < v2);
    }

    #[test]
    #[should_panic(expected = "Variable IDs must be >= 1")]
    fn test_var_zero_panics() {
        Var::new(0);
    }

    #[test]
    fn test_lit_polarity() {
        let x = Var::new(3);
        assert_eq!(x.pos().to_dimacs(), 3);
        assert_eq!(x.neg().to_dimacs(), -3);
        assert_eq!(-x.pos(), x.neg());
        assert_eq!(x.neg().var(), x);
        assert!(x.lit(true).is_positive());
        assert!(x.lit(false).is_negative());
        assert_eq!(x.neg().to_string(), "~x3");
    }

    #[test]
    #[should_panic(expected = "Literal must be non-zero")]
    fn test_lit_zero_panics() {
        Lit::from_dimacs(0);
    }

    #[test]
    fn test_decision_levels() {
        let root = Level::ROOT;
        let second = root.next().next();

        assert_eq!(second, Level::new(2));
        assert_eq!(second.prev().and_then(Level::prev), Some(root));
        assert_eq!(root.prev(), None);
        assert!(root.is_root());
        assert!(!second.is_root());
        assert_eq!(second.to_string(), "L2");
    }
}
