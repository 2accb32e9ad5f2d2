//! Conflict-Driven Clause Learning.
//!
//! The solver alternates decisions and unit propagation. When propagation falsifies a
//! clause, the implication graph is consulted for the cause of the conflict: the literals
//! that forced the conflicting variable one way, together with those that would have forced
//! it the other way. That cut is refined until a single literal of its highest level
//! remains (the first unique implication point), its negation is learned as a new clause,
//! and everything assigned at or above that level is undone. The learned clause is then
//! unit and propagation resumes one level below.
//!
//! A conflict whose cut lies entirely on level 0 proves the formula unsatisfiable.
//!
//! # Examples
//!
//! ```
//! use logic_rs::cdcl;
//! use logic_rs::cnf::{is_model, Cnf};
//!
//! let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]).unwrap();
//! let model = cdcl::solve(&cnf).unwrap().unwrap();
//! assert!(is_model(&model, &cnf));
//!
//! let contradiction = Cnf::from_dimacs_clauses(vec![vec![1], vec![-1]]).unwrap();
//! assert_eq!(cdcl::solve(&contradiction).unwrap(), None);
//! ```

use log::{debug, info};

use crate::assignment::{is_satisfied, status, Assignment, ClauseStatus};
use crate::cnf::{Clause, Cnf, Model};
use crate::error::{Error, Result};
use crate::implication::ImplicationGraph;
use crate::types::{Level, Lit, Var};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdclConfig {
    /// Truth value given to decided variables.
    pub polarity: bool,
}

impl Default for CdclConfig {
    fn default() -> Self {
        Self { polarity: true }
    }
}

/// Counters of the last solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CdclStats {
    pub decisions: usize,
    pub propagations: usize,
    pub conflicts: usize,
    pub learned: usize,
    pub max_level: usize,
}

#[derive(Debug, Clone)]
pub struct Cdcl {
    config: CdclConfig,
    /// Input clauses followed by learned ones.
    clauses: Vec<Clause>,
    original: usize,
    /// Decision order: first occurrence in the input.
    variables: Vec<Var>,
    assignment: Assignment,
    graph: ImplicationGraph,
    level: Level,
    stats: CdclStats,
}

impl Cdcl {
    pub fn new(cnf: &Cnf) -> Self {
        Self::with_config(cnf, CdclConfig::default())
    }

    pub fn with_config(cnf: &Cnf, config: CdclConfig) -> Self {
        Self {
            config,
            clauses: cnf.clauses().to_vec(),
            original: cnf.len(),
            variables: cnf.variables(),
            assignment: Assignment::new(),
            graph: ImplicationGraph::new(),
            level: Level::ROOT,
            stats: CdclStats::default(),
        }
    }

    pub fn stats(&self) -> CdclStats {
        self.stats
    }

    /// Clauses learned so far. They are kept across solves since they are implied by the input.
    pub fn learned(&self) -> &[Clause] {
        &self.clauses[self.original..]
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn graph(&self) -> &ImplicationGraph {
        &self.graph
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Searches for a model.
    ///
    /// Returns `Ok(None)` if the formula is unsatisfiable. The model assigns every variable
    /// of the formula, in order of first occurrence.
    pub fn solve(&mut self) -> Result<Option<Model>> {
        self.reset();

        if self.clauses[..self.original].iter().any(Clause::is_empty) {
            info!("cdcl: empty clause in the input, UNSAT");
            return Ok(None);
        }

        loop {
            while let Some(conflict) = self.propagate()? {
                self.stats.conflicts += 1;
                let Some((learned, level)) = self.analyze(conflict)? else {
                    info!(
                        "cdcl: UNSAT after {} decisions and {} conflicts",
                        self.stats.decisions, self.stats.conflicts
                    );
                    return Ok(None);
                };
                self.backjump(level)?;
                self.learn(learned);
            }

            match self.pick_branch_variable() {
                Some(var) => self.decide(var)?,
                None => {
                    let model = self.model()?;
                    info!(
                        "cdcl: SAT after {} decisions and {} conflicts",
                        self.stats.decisions, self.stats.conflicts
                    );
                    return Ok(Some(model));
                }
            }
        }
    }

    fn reset(&mut self) {
        self.assignment.clear();
        self.graph.clear();
        self.level = Level::ROOT;
        self.stats = CdclStats::default();
    }

    fn pick_branch_variable(&self) -> Option<Var> {
        self.variables
            .iter()
            .copied()
            .find(|&var| !self.assignment.is_assigned(var))
    }

    fn decide(&mut self, var: Var) -> Result<()> {
        self.level = self.level.next();
        let lit = var.lit(self.config.polarity);
        debug!("cdcl: decide {} at {}", lit, self.level);
        self.graph.decide(lit, self.level)?;
        self.assignment.assign(lit);
        self.stats.decisions += 1;
        self.stats.max_level = self.stats.max_level.max(self.level.index());
        Ok(())
    }

    /// Unit propagation to a fixpoint at the current level.
    ///
    /// Returns the index of a conflicting clause, if one shows up.
    fn propagate(&mut self) -> Result<Option<usize>> {
        loop {
            let mut changed = false;
            for index in 0..self.clauses.len() {
                match status(&self.clauses[index], &self.assignment) {
                    ClauseStatus::Conflicting => {
                        debug!(
                            "cdcl: clause #{} {} conflicts at {}",
                            index, self.clauses[index], self.level
                        );
                        return Ok(Some(index));
                    }
                    ClauseStatus::Unit(lit) => {
                        self.graph.propagate(lit, self.level, &self.clauses[index])?;
                        self.assignment.assign(lit);
                        self.stats.propagations += 1;
                        changed = true;
                    }
                    ClauseStatus::Satisfied | ClauseStatus::Unresolved => {}
                }
            }
            if !changed {
                return Ok(None);
            }
        }
    }

    /// Derives the clause to learn from a conflict and the level to undo.
    ///
    /// Returns `None` when the conflict does not depend on any decision.
    fn analyze(&self, conflict: usize) -> Result<Option<(Clause, Level)>> {
        let clause = &self.clauses[conflict];

        // The true literal whose assignment falsified the clause last.
        let mut latest = None;
        for lit in clause.iter().map(|lit| -lit) {
            let position = self.trail_position(lit)?;
            if latest.map_or(true, |(_, best)| position > best) {
                latest = Some((lit, position));
            }
        }
        let Some((latest, _)) = latest else {
            return Ok(None);
        };

        let mut cut = self.graph.cut(latest, clause);
        let mut level = self.graph.max_level(&cut);

        // Resolve away the most recent literal of the top level until it is the only one left.
        while !level.is_root() {
            let mut top = Vec::new();
            for &lit in &cut {
                if self.graph.level(lit) == Some(level) {
                    top.push((lit, self.trail_position(lit)?));
                }
            }
            if top.len() <= 1 {
                break;
            }
            let Some(&(recent, _)) = top.iter().max_by_key(|&&(_, position)| position) else {
                break;
            };
            if self.graph.is_decision(recent) {
                return Err(Error::Internal(format!(
                    "decision {} is not the first literal of {}",
                    recent, level
                )));
            }
            cut.retain(|&lit| lit != recent);
            for &pred in self.graph.predecessors(recent) {
                if !cut.contains(&pred) {
                    cut.push(pred);
                }
            }
            level = self.graph.max_level(&cut);
        }

        if level.is_root() {
            debug!("cdcl: conflict on {} does not depend on any decision", latest.var());
            return Ok(None);
        }

        let mut positions = Vec::with_capacity(cut.len());
        for &lit in &cut {
            positions.push((self.trail_position(lit)?, lit));
        }
        positions.sort();
        let learned: Clause = positions.into_iter().map(|(_, lit)| -lit).collect();
        debug!(
            "cdcl: conflict on {} at {}, learned {} with backjump level {}",
            latest.var(),
            self.level,
            learned,
            level
        );
        Ok(Some((learned, level)))
    }

    fn trail_position(&self, lit: Lit) -> Result<usize> {
        self.graph.position(lit).ok_or_else(|| {
            Error::Internal(format!("{} is true but missing from the implication graph", lit))
        })
    }

    /// Undoes every assignment made at `level` or above.
    fn backjump(&mut self, level: Level) -> Result<()> {
        let Some(target) = level.prev() else {
            return Err(Error::Internal("backjump below the root level".to_string()));
        };
        for lit in self.graph.backjump(level) {
            self.assignment.unassign(lit.var());
        }
        if self.graph.top_level() >= level {
            return Err(Error::Internal(format!(
                "implication graph still holds literals at {} after a backjump",
                self.graph.top_level()
            )));
        }
        debug!("cdcl: backjump from {} to {}", self.level, target);
        self.level = target;
        Ok(())
    }

    fn learn(&mut self, clause: Clause) {
        self.stats.learned += 1;
        self.clauses.push(clause);
    }

    fn model(&self) -> Result<Model> {
        if let Some(clause) = self
            .clauses
            .iter()
            .find(|clause| !is_satisfied(clause, &self.assignment))
        {
            return Err(Error::Internal(format!(
                "complete assignment falsifies {}",
                clause
            )));
        }
        Ok(self
            .variables
            .iter()
            .filter_map(|&var| self.assignment.get(var).map(|value| var.lit(value)))
            .collect())
    }
}

/// Solves `cnf` with a fresh [`Cdcl`] instance.
pub fn solve(cnf: &Cnf) -> Result<Option<Model>> {
    Cdcl::new(cnf).solve()
}

pub fn satisfiable(cnf: &Cnf) -> Result<bool> {
    Ok(solve(cnf)?.is_some())
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
    fn test_simple_sat() {
        let f = cnf(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]);
        assert!(satisfiable(&f).unwrap());
        let model = solve(&f).unwrap().unwrap();
        assert!(is_model(&model, &f));
    }

    #[test]
    fn test_contradiction() {
        let f = cnf(vec![vec![1], vec![-1]]);
        assert!(!satisfiable(&f).unwrap());
        assert_eq!(solve(&f).unwrap(), None);
    }

    #[test]
    fn test_tautological_clause() {
        let f = cnf(vec![vec![1, -1]]);
        assert_eq!(solve(&f).unwrap(), Some(lits(&[1])));
    }

    #[test]
    fn test_empty_formula_has_empty_model() {
        assert_eq!(solve(&Cnf::new()).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_empty_clause() {
        let f = cnf(vec![vec![1, 2], vec![]]);
        assert_eq!(solve(&f).unwrap(), None);
    }

    #[test]
    fn test_ten_variables() {
        // (¬x1 ∨ x2)∧(¬x2 ∨ x3 ∨ x4)∧(¬x2 ∨ ¬x5)∧(¬x4 ∨ x5 ∨ x6)∧(¬x7 ∨ x8)∧(¬x8 ∨ ¬x9)∧(x9 ∨ ¬x10)∧(x3 ∨ ¬x8 ∨ x10)
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
        let model = solve(&f).unwrap().unwrap();
        assert_eq!(model.len(), 10);
        assert!(is_model(&model, &f));
    }

    #[test]
    fn test_learning_trace() {
        // x1 forces x2 and x3, which force both x4 and ~x4.
        let f = cnf(vec![
            vec![-1, 2],
            vec![-1, 3],
            vec![-2, -3, 4],
            vec![-2, -3, -4],
        ]);
        let mut solver = Cdcl::new(&f);
        let model = solver.solve().unwrap().unwrap();

        assert_eq!(model, lits(&[-1, 2, -3, 4]));
        let learned: Vec<Vec<i32>> = solver.learned().iter().map(Clause::to_dimacs).collect();
        assert_eq!(learned, vec![vec![-1], vec![-2, -3]]);

        let stats = solver.stats();
        assert_eq!(stats.decisions, 4);
        assert_eq!(stats.conflicts, 2);
        assert_eq!(stats.learned, 2);
    }

    #[test]
    fn test_backjump_purges_graph() {
        let f = cnf(vec![
            vec![-1, 2],
            vec![-1, 3],
            vec![-2, -3, 4],
            vec![-2, -3, -4],
        ]);
        let mut solver = Cdcl::new(&f);
        assert_eq!(solver.propagate().unwrap(), None);

        solver.decide(Var::new(1)).unwrap();
        let conflict = solver.propagate().unwrap().expect("x1 leads to a conflict");
        assert_eq!(conflict, 3);
        assert_eq!(solver.graph().len(), 4);

        let (learned, level) = solver.analyze(conflict).unwrap().unwrap();
        assert_eq!(learned.to_dimacs(), vec![-1]);
        assert_eq!(level, Level::new(1));

        solver.backjump(level).unwrap();
        assert!(solver.graph().is_empty());
        assert!(solver.assignment().is_empty());
        assert!(solver
            .graph()
            .nodes()
            .iter()
            .all(|node| node.level < level));
        assert_eq!(solver.level(), Level::ROOT);

        solver.learn(learned);
        assert_eq!(solver.propagate().unwrap(), None);
        assert_eq!(solver.graph().level(Lit::from_dimacs(-1)), Some(Level::ROOT));
    }

    #[test]
    fn test_backjump_lands_one_level_below_the_cut() {
        // Decisions x1, x2, x3; only x3 takes part in the conflict.
        let f = cnf(vec![vec![1, 2, 3, 4], vec![-3, 4], vec![-3, -4]]);
        let mut solver = Cdcl::new(&f);
        assert_eq!(solver.propagate().unwrap(), None);
        for id in 1..=2 {
            solver.decide(Var::new(id)).unwrap();
            assert_eq!(solver.propagate().unwrap(), None);
        }
        solver.decide(Var::new(3)).unwrap();
        let conflict = solver.propagate().unwrap().expect("x3 leads to a conflict");

        let (learned, level) = solver.analyze(conflict).unwrap().unwrap();
        assert_eq!(learned.to_dimacs(), vec![-3]);
        assert_eq!(level, Level::new(3));

        // The learned clause is unit, yet x1 and x2 are kept.
        solver.backjump(level).unwrap();
        assert_eq!(solver.level(), Level::new(2));
        assert_eq!(solver.assignment().get(Var::new(1)), Some(true));
        assert_eq!(solver.assignment().get(Var::new(2)), Some(true));
        assert_eq!(solver.assignment().get(Var::new(3)), None);

        solver.learn(learned);
        assert_eq!(solver.propagate().unwrap(), None);
        assert_eq!(solver.graph().level(Lit::from_dimacs(-3)), Some(Level::new(2)));
    }

    #[test]
    fn test_negative_polarity() {
        let f = cnf(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]);
        let mut solver = Cdcl::with_config(&f, CdclConfig { polarity: false });
        let model = solver.solve().unwrap().unwrap();
        assert!(is_model(&model, &f));
        assert_eq!(solver.stats().conflicts, 1);
        assert_eq!(model, lits(&[1, -2, -3]));
    }

    #[test]
    fn test_pigeonhole_unsat() {
        // Three pigeons, two holes: p(i, j) = 2 * i + j + 1.
        let p = |i: i32, j: i32| 2 * i + j + 1;
        let mut clauses = Vec::new();
        for i in 0..3 {
            clauses.push(vec![p(i, 0), p(i, 1)]);
        }
        for j in 0..2 {
            for i in 0..3 {
                for k in (i + 1)..3 {
                    clauses.push(vec![-p(i, j), -p(k, j)]);
                }
            }
        }
        let f = cnf(clauses);
        let mut solver = Cdcl::new(&f);
        assert_eq!(solver.solve().unwrap(), None);
        assert!(solver.stats().conflicts > 0);
    }

    #[test]
    fn test_solve_twice() {
        let f = cnf(vec![
            vec![-1, 2],
            vec![-1, 3],
            vec![-2, -3, 4],
            vec![-2, -3, -4],
        ]);
        let mut solver = Cdcl::new(&f);
        let first = solver.solve().unwrap().unwrap();
        let second = solver.solve().unwrap().unwrap();
        assert!(is_model(&first, &f));
        assert!(is_model(&second, &f));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let f = cnf(vec![vec![-1, 2], vec![-1, 3], vec![-2, -3, 4], vec![-2, -3, -4]]);
        let before = f.clone();
        let _ = solve(&f).unwrap();
        assert_eq!(f, before);
    }
}
