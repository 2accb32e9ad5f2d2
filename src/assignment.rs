//! Partial assignments and clause status under them.
//!
//! Under a partial assignment `b`, a clause `c` is
//!
//! - *satisfied* if some literal of `c` is true,
//! - *conflicting* if every literal of `c` is assigned and false,
//! - *unit* with literal `l` if `l` is unassigned and every other literal is false,
//! - *unresolved* otherwise.
//!
//! A clause with an unassigned literal is never conflicting: it is unit or unresolved.

use std::collections::HashMap;

use crate::cnf::Clause;
use crate::types::{Lit, Var};

/// Partial mapping from variables to truth values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: HashMap<Var, bool>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an assignment from the set of literals it makes true.
    ///
    /// Later literals win if a variable occurs twice.
    pub fn from_literals(lits: impl IntoIterator<Item = Lit>) -> Self {
        let mut assignment = Assignment::new();
        for lit in lits {
            assignment.assign(lit);
        }
        assignment
    }

    /// Builds an assignment from `(variable, 0/1)` pairs.
    pub fn from_bits(bits: impl IntoIterator<Item = (Var, u8)>) -> Self {
        Self {
            values: bits.into_iter().map(|(var, bit)| (var, bit != 0)).collect(),
        }
    }

    /// Returns the literals made true by this assignment, ordered by variable.
    pub fn to_literals(&self) -> Vec<Lit> {
        let mut lits: Vec<Lit> = self
            .values
            .iter()
            .map(|(&var, &value)| var.lit(value))
            .collect();
        lits.sort_by_key(|lit| lit.var());
        lits
    }

    /// Returns the `(variable, 0/1)` view, ordered by variable.
    pub fn to_bits(&self) -> Vec<(Var, u8)> {
        let mut bits: Vec<(Var, u8)> = self
            .values
            .iter()
            .map(|(&var, &value)| (var, value as u8))
            .collect();
        bits.sort();
        bits
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, var: Var) -> Option<bool> {
        self.values.get(&var).copied()
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.values.contains_key(&var)
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Lit) {
        self.values.insert(lit.var(), lit.polarity());
    }

    pub fn unassign(&mut self, var: Var) {
        self.values.remove(&var);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Value of a literal: `Some(true)` if true, `Some(false)` if false, `None` if unassigned.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        self.get(lit.var()).map(|value| value == lit.polarity())
    }

    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit) == Some(true)
    }

    pub fn is_false(&self, lit: Lit) -> bool {
        self.value(lit) == Some(false)
    }
}

/// Status of a clause under a partial assignment.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClauseStatus {
    Satisfied,
    Conflicting,
    Unit(Lit),
    Unresolved,
}

/// Classifies `clause` under `assignment` in a single pass.
pub fn status(clause: &Clause, assignment: &Assignment) -> ClauseStatus {
    let mut unassigned = None;
    let mut unassigned_count = 0;
    for lit in clause.iter() {
        match assignment.value(lit) {
            Some(true) => return ClauseStatus::Satisfied,
            Some(false) => {}
            None => {
                // Duplicates of one unassigned literal count once.
                if unassigned != Some(lit) {
                    unassigned_count += 1;
                    unassigned = Some(lit);
                }
            }
        }
    }
    match (unassigned_count, unassigned) {
        (0, _) => ClauseStatus::Conflicting,
        (1, Some(lit)) => ClauseStatus::Unit(lit),
        _ => ClauseStatus::Unresolved,
    }
}

pub fn is_satisfied(clause: &Clause, assignment: &Assignment) -> bool {
    clause.iter().any(|lit| assignment.is_true(lit))
}

/// Every literal is assigned and false.
pub fn is_conflicting(clause: &Clause, assignment: &Assignment) -> bool {
    clause.iter().all(|lit| assignment.is_false(lit))
}

pub fn unit_literal(clause: &Clause, assignment: &Assignment) -> Option<Lit> {
    match status(clause, assignment) {
        ClauseStatus::Unit(lit) => Some(lit),
        _ => None,
    }
}

pub fn is_unresolved(clause: &Clause, assignment: &Assignment) -> bool {
    status(clause, assignment) == ClauseStatus::Unresolved
}
