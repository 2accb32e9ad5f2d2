//! Connectives over formulas already in Conjunctive Normal Form.
//!
//! Each combinator returns a [`Cnf`] logically equivalent to the connective applied to its
//! operands, without introducing new variables. Disjunction distributes over conjunction,
//! so `or` and everything built on it can grow exponentially.
//!
//! ```
//! use logic_rs::normal::{or, Formula};
//! use logic_rs::types::Lit;
//!
//! let x1 = Formula::Literal(Lit::from_dimacs(1));
//! let x2 = Formula::Literal(Lit::from_dimacs(2));
//! assert_eq!(or([x1, x2]).to_dimacs(), vec![vec![1, 2]]);
//! ```

use crate::cnf::{Clause, Cnf};
use crate::types::Lit;

/// An operand of the combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Literal(Lit),
    Clause(Clause),
    Cnf(Cnf),
}

impl Formula {
    pub fn to_cnf(self) -> Cnf {
        match self {
            Formula::Literal(lit) => Cnf::from_clauses([Clause::new([lit])]),
            Formula::Clause(clause) => Cnf::from_clauses([clause]),
            Formula::Cnf(cnf) => cnf,
        }
    }
}

impl From<Lit> for Formula {
    fn from(lit: Lit) -> Self {
        Formula::Literal(lit)
    }
}

impl From<Clause> for Formula {
    fn from(clause: Clause) -> Self {
        Formula::Clause(clause)
    }
}

impl From<Cnf> for Formula {
    fn from(cnf: Cnf) -> Self {
        Formula::Cnf(cnf)
    }
}

/// Conjunction: all clauses of all operands. No operands give the empty (true) formula.
pub fn and(operands: impl IntoIterator<Item = Formula>) -> Cnf {
    operands
        .into_iter()
        .flat_map(|f| f.to_cnf().clauses().to_vec())
        .collect()
}

/// Disjunction by distribution: one clause per choice of a clause in every operand.
///
/// Literals repeated across the merged clauses are kept once. No operands give a single empty
/// (false) clause.
pub fn or(operands: impl IntoIterator<Item = Formula>) -> Cnf {
    let mut product: Vec<Vec<Lit>> = vec![Vec::new()];
    for operand in operands {
        let cnf = operand.to_cnf();
        let mut next = Vec::with_capacity(product.len() * cnf.len());
        for prefix in &product {
            for clause in cnf.iter() {
                let mut lits = prefix.clone();
                for lit in clause.iter() {
                    if !lits.contains(&lit) {
                        lits.push(lit);
                    }
                }
                next.push(lits);
            }
        }
        product = next;
    }
    product.into_iter().map(Clause::new).collect()
}

/// Negation by De Morgan: the disjunction, over clauses, of the negated literals.
pub fn not(f: impl Into<Formula>) -> Cnf {
    let cnf = f.into().to_cnf();
    let negated = cnf.iter().map(|clause| {
        let units: Cnf = clause.iter().map(|lit| Clause::new([-lit])).collect();
        Formula::Cnf(units)
    });
    or(negated.collect::<Vec<_>>())
}

pub fn implies(a: impl Into<Formula>, b: impl Into<Formula>) -> Cnf {
    or([Formula::Cnf(not(a)), b.into()])
}

pub fn eq(a: impl Into<Formula>, b: impl Into<Formula>) -> Cnf {
    let a = a.into();
    let b = b.into();
    and([
        Formula::Cnf(implies(a.clone(), b.clone())),
        Formula::Cnf(implies(b, a)),
    ])
}

pub fn xor(a: impl Into<Formula>, b: impl Into<Formula>) -> Cnf {
    not(eq(a, b))
}
