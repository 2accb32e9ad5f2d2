//! Implication graph of the CDCL search.
//!
//! Every assigned literal is a node tagged with the decision level it was set at.
//! Decisions have no incoming edges. A literal forced by a unit clause gets an edge from
//! each literal that made the rest of that clause false, i.e. from the negation of every
//! other literal of the clause.
//!
//! Nodes are kept in assignment order (the trail). Levels never decrease along the
//! trail, so removing everything at or above a level is a truncation of the trail.

use std::collections::HashMap;

use log::debug;

use crate::cnf::Clause;
use crate::error::{Error, Result};
use crate::types::{Level, Lit, Var};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub lit: Lit,
    pub level: Level,
    /// Literals that forced this one. Empty for decisions and for unit clauses.
    pub predecessors: Vec<Lit>,
    pub decision: bool,
}

impl Node {
    pub fn is_decision(&self) -> bool {
        self.decision
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImplicationGraph {
    nodes: Vec<Node>,
    positions: HashMap<Var, usize>,
}

impl ImplicationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.positions.clear();
    }

    /// Nodes in the order they were added.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Records a decision.
    pub fn decide(&mut self, lit: Lit, level: Level) -> Result<()> {
        self.add(lit, level, Vec::new(), true)
    }

    /// Records `lit` as forced by `reason`, which must be unit on `lit`.
    pub fn propagate(&mut self, lit: Lit, level: Level, reason: &Clause) -> Result<()> {
        let mut predecessors = Vec::with_capacity(reason.len().saturating_sub(1));
        for other in reason.iter() {
            if other != lit && !predecessors.contains(&-other) {
                predecessors.push(-other);
            }
        }
        self.add(lit, level, predecessors, false)
    }

    fn add(&mut self, lit: Lit, level: Level, predecessors: Vec<Lit>, decision: bool) -> Result<()> {
        if let Some(existing) = self.node(lit.var()) {
            return Err(Error::Internal(format!(
                "{} added to the implication graph while {} is present",
                lit, existing.lit
            )));
        }
        for &pred in &predecessors {
            match self.node(pred.var()) {
                Some(node) if node.lit == pred => {
                    if node.level > level {
                        return Err(Error::Internal(format!(
                            "{} at {} justified by {} at {}",
                            lit, level, pred, node.level
                        )));
                    }
                }
                // Edges only ever point from existing nodes, which keeps the graph acyclic.
                _ => {
                    return Err(Error::Internal(format!(
                        "{} justified by {} which is not in the implication graph",
                        lit, pred
                    )))
                }
            }
        }
        if let Some(last) = self.nodes.last() {
            if last.level > level {
                return Err(Error::Internal(format!(
                    "{} added at {} after a node at {}",
                    lit, level, last.level
                )));
            }
        }

        debug!("graph: {} at {} <- {:?}", lit, level, predecessors);
        self.positions.insert(lit.var(), self.nodes.len());
        self.nodes.push(Node {
            lit,
            level,
            predecessors,
            decision,
        });
        Ok(())
    }

    /// The node of the given variable, whatever its polarity.
    pub fn node(&self, var: Var) -> Option<&Node> {
        self.positions.get(&var).map(|&i| &self.nodes[i])
    }

    /// Returns `true` if exactly this literal (not its negation) is in the graph.
    pub fn contains(&self, lit: Lit) -> bool {
        self.node(lit.var()).is_some_and(|node| node.lit == lit)
    }

    pub fn level(&self, lit: Lit) -> Option<Level> {
        self.node(lit.var())
            .filter(|node| node.lit == lit)
            .map(|node| node.level)
    }

    /// Position of the literal on the trail.
    pub fn position(&self, lit: Lit) -> Option<usize> {
        self.positions
            .get(&lit.var())
            .copied()
            .filter(|&i| self.nodes[i].lit == lit)
    }

    /// Direct predecessors of `lit`. Empty for decisions and absent literals.
    pub fn predecessors(&self, lit: Lit) -> &[Lit] {
        match self.node(lit.var()) {
            Some(node) if node.lit == lit => node.predecessors.as_slice(),
            _ => &[],
        }
    }

    pub fn is_decision(&self, lit: Lit) -> bool {
        self.node(lit.var())
            .is_some_and(|node| node.lit == lit && node.is_decision())
    }

    /// The decision literal of the given level, if any.
    pub fn decision(&self, level: Level) -> Option<Lit> {
        self.nodes
            .iter()
            .find(|node| node.level == level && node.is_decision())
            .map(|node| node.lit)
    }

    /// Cause of a conflict on the variable of `lit`.
    ///
    /// `lit` is in the graph and `conflicting` is a clause all of whose literals are false,
    /// one of them being `-lit`. The cut is the union of the predecessors of `lit` and of the
    /// predecessors `-lit` would have through `conflicting`. A decision stands for itself.
    pub fn cut(&self, lit: Lit, conflicting: &Clause) -> Vec<Lit> {
        let mut cut: Vec<Lit> = if self.is_decision(lit) {
            vec![lit]
        } else {
            self.predecessors(lit).to_vec()
        };
        for other in conflicting.iter() {
            if other.var() != lit.var() && !cut.contains(&-other) {
                cut.push(-other);
            }
        }
        cut
    }

    /// Highest level among `lits`, [`Level::ROOT`] for none.
    pub fn max_level(&self, lits: &[Lit]) -> Level {
        lits.iter()
            .filter_map(|&lit| self.level(lit))
            .max()
            .unwrap_or(Level::ROOT)
    }

    /// Highest level in the graph.
    pub fn top_level(&self) -> Level {
        self.nodes.last().map_or(Level::ROOT, |node| node.level)
    }

    /// Removes every node whose level is at least `level`, returning the removed literals.
    pub fn backjump(&mut self, level: Level) -> Vec<Lit> {
        let keep = self.nodes.partition_point(|node| node.level < level);
        let removed: Vec<Lit> = self.nodes.drain(keep..).map(|node| node.lit).collect();
        for lit in &removed {
            self.positions.remove(&lit.var());
        }
        debug!("graph: backjump to below {}, removed {:?}", level, removed);
        removed
    }
}
