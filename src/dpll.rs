//! Davis–Putnam–Logemann–Loveland search.
//!
//! Two variants live here. [`solve`] and [`satisfiable`] work by variable elimination: the
//! formula itself is simplified by every chosen literal. [`Dpll`] keeps the formula intact
//! and tracks a partial assignment instead, with unit propagation, conflict detection and
//! chronological backtracking.

use log::{debug, info};

use crate::assignment::{status, Assignment, ClauseStatus};
use crate::cnf::{Clause, Cnf, Model};
use crate::types::{Lit, Var};

enum Step {
    Conflict,
    Propagate(Lit),
    Branch(Lit),
    Done,
}

/// Empty formula first, then the first empty clause or unit clause, else the first literal of
/// the first clause.
fn next_step(cnf: &Cnf) -> Step {
    if cnf.is_empty() {
        return Step::Done;
    }
    for clause in cnf.iter() {
        match clause.lits() {
            [] => return Step::Conflict,
            [lit] => return Step::Propagate(*lit),
            _ => {}
        }
    }
    match cnf.clauses()[0].lits().first() {
        Some(&lit) => Step::Branch(lit),
        None => Step::Conflict,
    }
}

/// Searches for a model by variable elimination.
///
/// The model lists the chosen literals only: variables that vanished from the formula are
/// left out.
pub fn solve(cnf: &Cnf) -> Option<Model> {
    let mut stack = vec![(cnf.clone(), Vec::new())];
    while let Some((cnf, model)) = stack.pop() {
        match next_step(&cnf) {
            Step::Done => {
                debug!("dpll: model {:?}", model);
                return Some(model);
            }
            Step::Conflict => {}
            Step::Propagate(lit) => {
                let mut model = model;
                model.push(lit);
                stack.push((cnf.simplify(lit), model));
            }
            Step::Branch(lit) => {
                // Pushed last, explored first.
                let mut negative = model.clone();
                negative.push(-lit);
                stack.push((cnf.simplify(-lit), negative));
                let mut positive = model;
                positive.push(lit);
                stack.push((cnf.simplify(lit), positive));
            }
        }
    }
    None
}

pub fn satisfiable(cnf: &Cnf) -> bool {
    solve(cnf).is_some()
}

/// Counters of the last [`Dpll::solve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpllStats {
    pub decisions: usize,
    pub propagations: usize,
    pub backtracks: usize,
}

#[derive(Debug, Clone, Copy)]
enum Reason {
    /// A decision, and whether its other value was already tried.
    Decision { flipped: bool },
    Propagation,
}

/// Assignment-tracking DPLL.
///
/// Decisions try `false` first; a conflict undoes everything back to the latest decision
/// whose `true` branch is still open and takes that branch.
#[derive(Debug, Clone)]
pub struct Dpll {
    clauses: Vec<Clause>,
    variables: Vec<Var>,
    assignment: Assignment,
    trail: Vec<(Lit, Reason)>,
    stats: DpllStats,
}

impl Dpll {
    pub fn new(cnf: &Cnf) -> Self {
        Self {
            clauses: cnf.clauses().to_vec(),
            variables: cnf.sorted_variables(),
            assignment: Assignment::new(),
            trail: Vec::new(),
            stats: DpllStats::default(),
        }
    }

    pub fn stats(&self) -> DpllStats {
        self.stats
    }

    /// Returns a model over every variable of the formula, or `None` if it is unsatisfiable.
    pub fn solve(&mut self) -> Option<Model> {
        self.assignment.clear();
        self.trail.clear();
        self.stats = DpllStats::default();

        loop {
            if self.propagate() {
                let next = self
                    .variables
                    .iter()
                    .copied()
                    .find(|&var| !self.assignment.is_assigned(var));
                match next {
                    Some(var) => {
                        self.stats.decisions += 1;
                        self.assign(var.neg(), Reason::Decision { flipped: false });
                    }
                    None => {
                        info!("dpll: SAT after {} decisions", self.stats.decisions);
                        return Some(self.assignment.to_literals());
                    }
                }
            } else if !self.backtrack() {
                info!("dpll: UNSAT after {} decisions", self.stats.decisions);
                return None;
            }
        }
    }

    fn assign(&mut self, lit: Lit, reason: Reason) {
        debug!("dpll: {} ({:?})", lit, reason);
        self.assignment.assign(lit);
        self.trail.push((lit, reason));
    }

    /// Propagates unit clauses; returns `false` on a conflict.
    fn propagate(&mut self) -> bool {
        loop {
            let mut changed = false;
            for i in 0..self.clauses.len() {
                match status(&self.clauses[i], &self.assignment) {
                    ClauseStatus::Conflicting => {
                        debug!("dpll: conflict in {}", self.clauses[i]);
                        return false;
                    }
                    ClauseStatus::Unit(lit) => {
                        self.stats.propagations += 1;
                        self.assign(lit, Reason::Propagation);
                        changed = true;
                    }
                    ClauseStatus::Satisfied | ClauseStatus::Unresolved => {}
                }
            }
            if !changed {
                return true;
            }
        }
    }

    /// Flips the latest open decision; returns `false` if there is none.
    fn backtrack(&mut self) -> bool {
        while let Some((lit, reason)) = self.trail.pop() {
            self.assignment.unassign(lit.var());
            if let Reason::Decision { flipped: false } = reason {
                self.stats.backtracks += 1;
                self.assign(-lit, Reason::Decision { flipped: true });
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::cnf::is_model;

    fn cnf(clauses: Vec<Vec<i32>>) -> Cnf {
        Cnf::from_dimacs_clauses(clauses).unwrap()
    }

    fn lits(values: &[i32]) -> Vec<Lit> {
        values.iter().map(|&v| Lit::from_dimacs(v)).collect()
    }

    #[test]
    fn test_elimination_simple() {
        let f = cnf(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]);
        // Branch on x1 first: every clause mentioning x1 disappears.
        assert_eq!(solve(&f), Some(lits(&[1, -2])));
        assert!(satisfiable(&f));
    }

    #[test]
    fn test_elimination_unsat() {
        assert_eq!(solve(&cnf(vec![vec![1], vec![-1]])), None);
        assert_eq!(solve(&cnf(vec![vec![1, 2], vec![]])), None);
        assert!(!satisfiable(&cnf(vec![
            vec![1, 2],
            vec![-1, 2],
            vec![1, -2],
            vec![-1, -2]
        ])));
    }

    #[test]
    fn test_elimination_edge_cases() {
        assert_eq!(solve(&Cnf::new()), Some(vec![]));
        assert_eq!(solve(&cnf(vec![vec![1, -1]])), Some(lits(&[1])));
    }

    #[test]
    fn test_elimination_backtracks() {
        // x1 = true fails, so x1 = false must be found.
        let f = cnf(vec![vec![1, 2], vec![-1, 3], vec![-1, -3]]);
        let model = solve(&f).unwrap();
        assert!(is_model(&model, &f));
        assert_eq!(model, lits(&[-1, 2]));
    }

    #[test]
    fn test_tracking_simple() {
        let f = cnf(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]);
        let mut solver = Dpll::new(&f);
        let model = solver.solve().unwrap();
        assert_eq!(model.len(), 3);
        assert!(is_model(&model, &f));
    }

    #[test]
    fn test_tracking_unsat() {
        let f = cnf(vec![vec![1, 2], vec![-1, 2], vec![1, -2], vec![-1, -2]]);
        let mut solver = Dpll::new(&f);
        assert_eq!(solver.solve(), None);
        assert!(solver.stats().backtracks > 0);

        assert_eq!(Dpll::new(&cnf(vec![vec![]])).solve(), None);
        assert_eq!(Dpll::new(&cnf(vec![vec![1], vec![-1]])).solve(), None);
    }

    #[test]
    fn test_tracking_decides_false_first() {
        let f = cnf(vec![vec![1, 2], vec![3, -3]]);
        let mut solver = Dpll::new(&f);
        // x1 = false forces x2, x3 stays false.
        assert_eq!(solver.solve(), Some(lits(&[-1, 2, -3])));
        assert_eq!(solver.stats().decisions, 2);
        assert_eq!(solver.stats().propagations, 1);
    }

    #[test]
    fn test_tracking_ten_variables() {
        let f = cnf(vec![
            vec![-1, 2],
            vec![-2, 3, 4],
            vec![-2, -5],
            vec![-4, 5, 6],
            vec![-7, 8],
            vec![-8, -9],
            vec![9, -10],
            vec![3, -8, 10],
        ]);
        let model = Dpll::new(&f).solve().unwrap();
        assert_eq!(model.len(), 10);
        assert!(is_model(&model, &f));
        assert!(is_model(&solve(&f).unwrap(), &f));
    }
}
