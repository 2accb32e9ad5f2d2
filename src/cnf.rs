//! Clauses and formulas in Conjunctive Normal Form.
//!
//! A [`Clause`] is a disjunction of literals and a [`Cnf`] is a conjunction of clauses.
//! Both are ordered sequences with set semantics: duplicates are tolerated and the
//! order only matters for which literal or clause an algorithm happens to look at first.
//!
//! ```
//! use logic_rs::cnf::{is_model, Cnf};
//! use logic_rs::types::Lit;
//!
//! let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]).unwrap();
//! let model: Vec<Lit> = [1, -2].into_iter().map(Lit::from_dimacs).collect();
//! assert!(is_model(&model, &cnf));
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Lit, Var};

/// A (possibly partial) satisfying assignment, one literal per assigned variable.
pub type Model = Vec<Lit>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new(lits: impl IntoIterator<Item = Lit>) -> Self {
        Self {
            lits: lits.into_iter().collect(),
        }
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Lit> + '_ {
        self.lits.iter().copied()
    }

    pub fn contains(&self, lit: Lit) -> bool {
        self.lits.contains(&lit)
    }

    /// Returns `true` if the clause contains some literal together with its negation.
    pub fn is_tautology(&self) -> bool {
        self.lits.iter().any(|&lit| self.contains(-lit))
    }

    pub fn to_dimacs(&self) -> Vec<i32> {
        self.lits.iter().map(|lit| lit.to_dimacs()).collect()
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Self {
        Clause::new(iter)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.lits.iter().enumerate() {
            if i > 0 {
                write!(f, " ∨ ")?;
            }
            write!(f, "{}", lit)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf {
    clauses: Vec<Clause>,
}

impl Cnf {
    /// Creates the empty (trivially true) formula.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
        }
    }

    /// Builds a formula from signed integers, rejecting the reserved literal `0`.
    pub fn from_dimacs_clauses<C>(clauses: impl IntoIterator<Item = C>) -> Result<Self>
    where
        C: AsRef<[i32]>,
    {
        let mut cnf = Cnf::new();
        for (index, clause) in clauses.into_iter().enumerate() {
            let clause = clause.as_ref();
            if clause.contains(&0) {
                return Err(Error::ZeroLiteral { clause: index });
            }
            cnf.push(clause.iter().map(|&value| Lit::from_dimacs(value)).collect());
        }
        Ok(cnf)
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.clauses.iter()
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Returns the variables of the formula in the order they first occur.
    pub fn variables(&self) -> Vec<Var> {
        let mut seen = HashSet::new();
        let mut variables = Vec::new();
        for lit in self.clauses.iter().flat_map(|clause| clause.iter()) {
            if seen.insert(lit.var()) {
                variables.push(lit.var());
            }
        }
        variables
    }

    /// Returns the variables of the formula in ascending order.
    pub fn sorted_variables(&self) -> Vec<Var> {
        let mut variables = self.variables();
        variables.sort();
        variables
    }

    /// Returns the largest variable of the formula, if any.
    pub fn max_variable(&self) -> Option<Var> {
        self.clauses.iter().flat_map(|clause| clause.iter()).map(Lit::var).max()
    }

    /// Assumes `lit` to be true: drops the clauses it satisfies and removes `-lit` from the others.
    pub fn simplify(&self, lit: Lit) -> Cnf {
        let clauses = self
            .clauses
            .iter()
            .filter(|clause| !clause.contains(lit))
            .map(|clause| clause.iter().filter(|&other| other != -lit).collect())
            .collect::<Vec<Clause>>();
        Cnf { clauses }
    }

    pub fn to_dimacs(&self) -> Vec<Vec<i32>> {
        self.clauses.iter().map(Clause::to_dimacs).collect()
    }
}

impl TryFrom<Vec<Vec<i32>>> for Cnf {
    type Error = Error;

    fn try_from(clauses: Vec<Vec<i32>>) -> Result<Self> {
        Cnf::from_dimacs_clauses(clauses)
    }
}

impl FromIterator<Clause> for Cnf {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        Cnf::from_clauses(iter)
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "⊤");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " ∧ ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

/// Checks that `model` satisfies `cnf`.
///
/// Every literal of the model is applied as a simplification in turn;
/// the model is valid iff no clause survives.
pub fn is_model(model: &[Lit], cnf: &Cnf) -> bool {
    let mut cnf = cnf.clone();
    for &lit in model {
        cnf = cnf.simplify(lit);
    }
    cnf.is_empty()
}
