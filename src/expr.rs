//! Propositional syntax trees.
//!
//! An [`Expr`] is an owned tree. Algorithms that need a bottom-up pass flatten it into an
//! [`ExprArena`] first, where every node only refers to nodes with larger indices, and fold it
//! from the back with [`ExprArena::collapse`].
//!
//! ```
//! use logic_rs::expr::{tseitin, Expr};
//! use logic_rs::truth_table;
//!
//! let f = Expr::implies(Expr::var(1) & Expr::var(2), !Expr::var(3));
//! let cnf = tseitin(&f).unwrap();
//! assert!(truth_table::satisfiable(&cnf));
//! ```

use std::collections::{BTreeSet, VecDeque};
use std::ops::{BitAnd, BitOr, Not};

use log::debug;

use crate::assignment::Assignment;
use crate::cnf::{Clause, Cnf};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::robdd::{BinOp, Robdd};
use crate::types::{Lit, Var};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(Var),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Variable with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is zero.
    pub fn var(id: u32) -> Self {
        Expr::Var(Var::new(id))
    }

    /// `lit` as a variable or a negated variable.
    pub fn lit(lit: Lit) -> Self {
        let var = Expr::Var(lit.var());
        if lit.is_positive() {
            var
        } else {
            Expr::not(var)
        }
    }

    pub fn not(e: Expr) -> Self {
        Expr::Not(Box::new(e))
    }

    /// Conjunction; empty is true.
    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And(operands.into_iter().collect())
    }

    /// Disjunction; empty is false.
    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(operands.into_iter().collect())
    }

    pub fn implies(lhs: Expr, rhs: Expr) -> Self {
        Expr::Implies(Box::new(lhs), Box::new(rhs))
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Expr::Eq(Box::new(lhs), Box::new(rhs))
    }

    /// Value under `assignment`, or `None` if it depends on an unassigned variable.
    pub fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        match self {
            Expr::Var(var) => assignment.get(*var),
            Expr::Not(e) => e.evaluate(assignment).map(|v| !v),
            Expr::And(es) => {
                let mut value = true;
                for e in es {
                    value &= e.evaluate(assignment)?;
                }
                Some(value)
            }
            Expr::Or(es) => {
                let mut value = false;
                for e in es {
                    value |= e.evaluate(assignment)?;
                }
                Some(value)
            }
            Expr::Implies(a, b) => Some(!a.evaluate(assignment)? || b.evaluate(assignment)?),
            Expr::Eq(a, b) => Some(a.evaluate(assignment)? == b.evaluate(assignment)?),
        }
    }

    /// Sorted variables of the expression.
    pub fn variables(&self) -> Vec<Var> {
        let mut vars = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            match e {
                Expr::Var(var) => {
                    vars.insert(*var);
                }
                Expr::Not(a) => stack.push(a),
                Expr::And(es) | Expr::Or(es) => stack.extend(es),
                Expr::Implies(a, b) | Expr::Eq(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
            }
        }
        vars.into_iter().collect()
    }

    pub fn max_variable(&self) -> Option<Var> {
        self.variables().last().copied()
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        match self {
            Expr::And(mut es) => {
                es.push(rhs);
                Expr::And(es)
            }
            lhs => Expr::and([lhs, rhs]),
        }
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        match self {
            Expr::Or(mut es) => {
                es.push(rhs);
                Expr::Or(es)
            }
            lhs => Expr::or([lhs, rhs]),
        }
    }
}

/// Position of a node in an [`ExprArena`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Idx(usize);

/// One level of an expression, with children of type `I`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode<I = Idx> {
    Var(Var),
    Not(I),
    And(Vec<I>),
    Or(Vec<I>),
    Implies(I, I),
    Eq(I, I),
}

impl<A> ExprNode<A> {
    pub fn fmap<B, F>(self, mut f: F) -> ExprNode<B>
    where
        F: FnMut(A) -> B,
    {
        match self {
            ExprNode::Var(var) => ExprNode::Var(var),
            ExprNode::Not(a) => ExprNode::Not(f(a)),
            ExprNode::And(es) => ExprNode::And(es.into_iter().map(f).collect()),
            ExprNode::Or(es) => ExprNode::Or(es.into_iter().map(f).collect()),
            ExprNode::Implies(a, b) => ExprNode::Implies(f(a), f(b)),
            ExprNode::Eq(a, b) => ExprNode::Eq(f(a), f(b)),
        }
    }
}

impl<A> ExprNode<Option<A>> {
    /// `Some` if every child is.
    pub fn transpose(self) -> Option<ExprNode<A>> {
        Some(match self {
            ExprNode::Var(var) => ExprNode::Var(var),
            ExprNode::Not(a) => ExprNode::Not(a?),
            ExprNode::And(es) => ExprNode::And(es.into_iter().collect::<Option<_>>()?),
            ExprNode::Or(es) => ExprNode::Or(es.into_iter().collect::<Option<_>>()?),
            ExprNode::Implies(a, b) => ExprNode::Implies(a?, b?),
            ExprNode::Eq(a, b) => ExprNode::Eq(a?, b?),
        })
    }
}

/// Flattened expression; the root is at index 0 and children come after their parents.
#[derive(Debug)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    /// Breadth-first flattening of `expr`.
    pub fn new(expr: &Expr) -> Self {
        let mut frontier: VecDeque<&Expr> = VecDeque::from([expr]);
        let mut nodes: Vec<ExprNode> = Vec::new();

        while let Some(e) = frontier.pop_front() {
            let node: ExprNode<&Expr> = match e {
                Expr::Var(var) => ExprNode::Var(*var),
                Expr::Not(a) => ExprNode::Not(a),
                Expr::And(es) => ExprNode::And(es.iter().collect()),
                Expr::Or(es) => ExprNode::Or(es.iter().collect()),
                Expr::Implies(a, b) => ExprNode::Implies(a, b),
                Expr::Eq(a, b) => ExprNode::Eq(a, b),
            };
            let node = node.fmap(|child| {
                frontier.push_back(child);
                Idx(nodes.len() + frontier.len())
            });
            nodes.push(node);
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, idx: Idx) -> &ExprNode {
        &self.nodes[idx.0]
    }

    /// Folds the arena bottom-up: `f` sees each node with its children already folded.
    ///
    /// Nodes are visited from the last index to the first, so the root is folded last.
    pub fn collapse<R, F>(&self, mut f: F) -> Result<R>
    where
        F: FnMut(ExprNode<R>) -> Result<R>,
    {
        let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None)
            .take(self.nodes.len())
            .collect();

        for (i, node) in self.nodes.iter().enumerate().rev() {
            let node = node
                .clone()
                .fmap(|idx| results.get_mut(idx.0).and_then(Option::take))
                .transpose()
                .ok_or_else(|| Error::Internal(format!("child of node #{} folded twice", i)))?;
            results[i] = Some(f(node)?);
        }

        results
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| Error::Internal("empty expression arena".to_string()))
    }
}

/// Tseitin transformation: an equisatisfiable CNF of linear size.
///
/// Every connective other than negation gets a fresh variable, numbered upwards from the
/// largest variable of `expr` in the order the arena folds them. Its defining clauses make it
/// equivalent to the connective of its children, and the root literal is asserted by a unit
/// clause. Restricted to the variables of `expr`, the models of the result are exactly the
/// models of `expr`.
pub fn tseitin(expr: &Expr) -> Result<Cnf> {
    let arena = ExprArena::new(expr);
    let mut next = expr.max_variable().map_or(0, Var::id);
    let mut clauses: Vec<Clause> = Vec::new();
    let mut clause = |lits: Vec<Lit>| clauses.push(Clause::new(lits));

    let root = arena.collapse(|node: ExprNode<Lit>| {
        let mut fresh = || {
            next += 1;
            Var::new(next).pos()
        };
        let lit = match node {
            ExprNode::Var(var) => var.pos(),
            ExprNode::Not(a) => -a,
            ExprNode::And(es) => {
                let n = fresh();
                for &e in &es {
                    clause(vec![-n, e]);
                }
                clause(std::iter::once(n).chain(es.iter().map(|&e| -e)).collect());
                n
            }
            ExprNode::Or(es) => {
                let n = fresh();
                for &e in &es {
                    clause(vec![n, -e]);
                }
                clause(std::iter::once(-n).chain(es.iter().copied()).collect());
                n
            }
            ExprNode::Implies(a, b) => {
                let n = fresh();
                clause(vec![-n, -a, b]);
                clause(vec![n, a]);
                clause(vec![n, -b]);
                n
            }
            ExprNode::Eq(a, b) => {
                let n = fresh();
                clause(vec![-n, -a, b]);
                clause(vec![-n, a, -b]);
                clause(vec![n, a, b]);
                clause(vec![n, -a, -b]);
                n
            }
        };
        Ok(lit)
    })?;
    clause(vec![root]);

    debug!("tseitin: {} nodes -> {} clauses", arena.len(), clauses.len());
    Ok(Cnf::from_clauses(clauses))
}

impl Robdd {
    /// Builds the diagram of `expr` directly, without going through a CNF.
    pub fn build(&self, expr: &Expr) -> Result<Handle> {
        ExprArena::new(expr).collapse(|node: ExprNode<Handle>| {
            Ok(match node {
                ExprNode::Var(var) => self.var(var)?,
                ExprNode::Not(a) => self.not(a),
                ExprNode::And(es) => self.apply_many(BinOp::And, es),
                ExprNode::Or(es) => self.apply_many(BinOp::Or, es),
                ExprNode::Implies(a, b) => self.implies(a, b),
                ExprNode::Eq(a, b) => self.eq(a, b),
            })
        })
    }
}
