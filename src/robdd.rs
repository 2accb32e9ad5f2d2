//! Reduced Ordered Binary Decision Diagrams.
//!
//! A [`Robdd`] owns every node it creates. Nodes are addressed by [`Handle`]s; `0` and `1`
//! are the terminals and every other handle is a decision node `(var, low, high)` meaning
//! "if `var` then `high` else `low`". The diagram is kept
//!
//! - *reduced*: no node has `low == high`, and no two handles share a triple;
//! - *ordered*: along every path, variables follow the order fixed at construction.
//!
//! Under these two rules every boolean function over the order has exactly one handle, so
//! two formulas built on the same instance are equivalent iff their handles are equal.
//!
//! Besides the unique table, the instance records for every node the set of nodes pointing
//! to it. This predecessor table is what [`Robdd::solve`] walks to read a model off the
//! diagram.
//!
//! # Examples
//!
//! ```
//! use logic_rs::handle::Handle;
//! use logic_rs::robdd::Robdd;
//! use logic_rs::types::Var;
//!
//! let bdd = Robdd::new((1..=2).map(Var::new)).unwrap();
//! let x1 = bdd.var(Var::new(1)).unwrap();
//! let x2 = bdd.var(Var::new(2)).unwrap();
//!
//! let f = bdd.and(x1, bdd.not(x2));
//! assert_ne!(f, Handle::ZERO);
//! assert_eq!(bdd.or(f, bdd.not(f)), Handle::ONE);
//! assert_eq!(bdd.xor(x1, x1), Handle::ZERO);
//! ```

use std::cell::{Ref as CellRef, RefCell};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug};

use log::debug;

use crate::cache::Cache;
use crate::cnf::{Cnf, Model};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::table::{Table, RESERVED};
use crate::types::{Lit, Var};
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub var: Var,
    pub low: Handle,
    pub high: Handle,
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(
            self.var.id() as u64,
            self.low.get() as u64,
            self.high.get() as u64,
        )
    }
}

/// Binary connectives understood by [`Robdd::apply`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    And,
    Or,
    Xor,
    Implies,
    Eq,
}

impl BinOp {
    pub const ALL: [BinOp; 5] = [BinOp::And, BinOp::Or, BinOp::Xor, BinOp::Implies, BinOp::Eq];

    pub fn eval(self, a: bool, b: bool) -> bool {
        match self {
            BinOp::And => a && b,
            BinOp::Or => a || b,
            BinOp::Xor => a != b,
            BinOp::Implies => !a || b,
            BinOp::Eq => a == b,
        }
    }

    /// Result of folding an empty operand list.
    pub fn identity(self) -> Handle {
        match self {
            BinOp::And | BinOp::Eq | BinOp::Implies => Handle::ONE,
            BinOp::Or | BinOp::Xor => Handle::ZERO,
        }
    }

    fn tag(self) -> u64 {
        match self {
            BinOp::And => 1,
            BinOp::Or => 2,
            BinOp::Xor => 3,
            BinOp::Implies => 4,
            BinOp::Eq => 5,
        }
    }
}

/// Key of the computed table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpKey {
    Apply(BinOp, Handle, Handle),
    Not(Handle),
}

impl MyHash for OpKey {
    fn hash(&self) -> u64 {
        match *self {
            OpKey::Apply(op, a, b) => pairing3(op.tag(), a.get() as u64, b.get() as u64),
            OpKey::Not(a) => pairing3(0, a.get() as u64, 0),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RobddConfig {
    /// The computed table holds `2^cache_bits` entries.
    pub cache_bits: usize,
    /// Initial number of buckets of the unique table, as a power of two. The table grows.
    pub table_bits: usize,
}

impl Default for RobddConfig {
    fn default() -> Self {
        Self {
            cache_bits: 16,
            table_bits: 10,
        }
    }
}

pub struct Robdd {
    order: Vec<Var>,
    positions: HashMap<Var, usize>,
    table: RefCell<Table<Node>>,
    /// Indexed by handle, terminals included.
    predecessors: RefCell<Vec<BTreeSet<Handle>>>,
    cache: RefCell<Cache<OpKey, Handle>>,
}

impl Robdd {
    /// Creates an empty diagram over the given variable order.
    pub fn new(order: impl IntoIterator<Item = Var>) -> Result<Self> {
        Self::with_config(order, RobddConfig::default())
    }

    pub fn with_config(order: impl IntoIterator<Item = Var>, config: RobddConfig) -> Result<Self> {
        let order: Vec<Var> = order.into_iter().collect();
        let mut positions = HashMap::with_capacity(order.len());
        for (position, &var) in order.iter().enumerate() {
            if positions.insert(var, position).is_some() {
                return Err(Error::DuplicateVariable(var));
            }
        }
        debug!(
            "robdd: order {:?}, cache 2^{}",
            order.iter().map(|v| v.id()).collect::<Vec<_>>(),
            config.cache_bits
        );

        Ok(Self {
            order,
            positions,
            table: RefCell::new(Table::new(config.table_bits)),
            predecessors: RefCell::new(vec![BTreeSet::new(); RESERVED]),
            cache: RefCell::new(Cache::new(config.cache_bits)),
        })
    }

    /// Creates an empty diagram ordered by the ascending variables of `cnf`.
    pub fn for_cnf(cnf: &Cnf) -> Self {
        match Self::with_config(cnf.sorted_variables(), RobddConfig::default()) {
            Ok(bdd) => bdd,
            Err(e) => unreachable!("sorted variables are distinct: {}", e),
        }
    }
}

impl Debug for Robdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("Robdd")
            .field("variables", &self.order.len())
            .field("size", &self.size())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Robdd {
    pub fn order(&self) -> &[Var] {
        &self.order
    }

    /// Position of `var` in the order.
    pub fn position(&self, var: Var) -> Result<usize> {
        self.positions
            .get(&var)
            .copied()
            .ok_or(Error::UnknownVariable(var))
    }

    /// Position of a variable that is known to be in the order.
    fn level(&self, var: Var) -> usize {
        match self.positions.get(&var) {
            Some(&position) => position,
            None => panic!("Variable {} is not in the order", var),
        }
    }

    /// Position of the variable labelling `h`; terminals sit below every variable.
    pub(crate) fn handle_level(&self, h: Handle) -> usize {
        match self.node(h) {
            Some(node) => self.level(node.var),
            None => self.order.len(),
        }
    }

    /// Compares two variables by their position in the order.
    pub fn compare(&self, v1: Var, v2: Var) -> Result<Ordering> {
        Ok(self.position(v1)?.cmp(&self.position(v2)?))
    }

    /// Number of decision nodes created so far.
    pub fn size(&self) -> usize {
        self.table.borrow().len()
    }

    /// The decision node behind `h`, `None` for terminals.
    ///
    /// # Panics
    ///
    /// Panics if `h` was not produced by this instance.
    pub fn node(&self, h: Handle) -> Option<Node> {
        if h.is_terminal() {
            return None;
        }
        Some(*self.table.borrow().value(h.index()))
    }

    pub fn variable(&self, h: Handle) -> Option<Var> {
        self.node(h).map(|node| node.var)
    }

    /// Nodes having `h` as a child, in ascending handle order.
    pub fn predecessors(&self, h: Handle) -> Vec<Handle> {
        match self.predecessors.borrow().get(h.index()) {
            Some(preds) => preds.iter().copied().collect(),
            None => panic!("Handle {} does not belong to this diagram", h),
        }
    }

    pub fn cache(&self) -> CellRef<'_, Cache<OpKey, Handle>> {
        self.cache.borrow()
    }

    /// `(hits, misses)` of the computed table.
    pub fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.borrow();
        (cache.hits(), cache.misses())
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Creates (or finds) the node `(|lit|, low, high)`.
    ///
    /// A negative `lit` swaps the children, so `make_node(-x, ZERO, ONE)` is the negation of `x`.
    /// Returns `low` when both children agree.
    pub fn make_node(&self, lit: Lit, low: Handle, high: Handle) -> Result<Handle> {
        let var = lit.var();
        let (low, high) = if lit.is_negative() {
            (high, low)
        } else {
            (low, high)
        };
        let position = self.position(var)?;
        if low == high {
            return Ok(low);
        }
        for child in [low, high] {
            if let Some(child_var) = self.variable(child) {
                if self.level(child_var) <= position {
                    return Err(Error::OrderViolation {
                        var,
                        child: child_var,
                    });
                }
            }
        }
        Ok(self.mk(var, low, high))
    }

    /// Find-or-insert without validation; callers uphold the order.
    fn mk(&self, var: Var, low: Handle, high: Handle) -> Handle {
        if low == high {
            return low;
        }
        debug_assert!(low.is_terminal() || self.handle_level(low) > self.level(var));
        debug_assert!(high.is_terminal() || self.handle_level(high) > self.level(var));

        let (index, inserted) = self.table.borrow_mut().put(Node { var, low, high });
        let handle = Handle::new(index as u32);
        if inserted {
            debug!("mk: {} = ({}, {}, {})", handle, var, low, high);
            let mut preds = self.predecessors.borrow_mut();
            debug_assert_eq!(preds.len(), index);
            preds.push(BTreeSet::new());
            preds[low.index()].insert(handle);
            preds[high.index()].insert(handle);
        }
        handle
    }

    /// The function `var`.
    pub fn var(&self, var: Var) -> Result<Handle> {
        self.make_node(var.pos(), Handle::ZERO, Handle::ONE)
    }

    /// The function `lit`: the variable node, or its negation for a negative literal.
    pub fn literal(&self, lit: Lit) -> Result<Handle> {
        self.make_node(lit, Handle::ZERO, Handle::ONE)
    }

    /// Combines two diagrams by Shannon expansion.
    ///
    /// The operand whose top variable comes first in the order is split on that variable;
    /// both operands are split when they share it. Runs on an explicit stack, so the depth of
    /// the operands is not bounded by the call stack.
    pub fn apply(&self, op: BinOp, a: Handle, b: Handle) -> Handle {
        let mut stack = vec![Frame::Visit((a, b))];
        let mut results = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit((a, b)) => {
                    if let Some(res) = shortcut(op, a, b) {
                        results.push(res);
                        continue;
                    }
                    if let Some(res) = self.cache.borrow().get(&OpKey::Apply(op, a, b)) {
                        debug!("cache: apply({:?}, {}, {}) -> {}", op, a, b, res);
                        results.push(res);
                        continue;
                    }
                    let (var, low, high) = self.split(a, b);
                    stack.push(Frame::Build((a, b), var));
                    stack.push(Frame::Visit(high));
                    stack.push(Frame::Visit(low));
                }
                Frame::Build((a, b), var) => {
                    let (low, high) = pop_pair(&mut results);
                    let res = self.mk(var, low, high);
                    debug!("computed: apply({:?}, {}, {}) -> {}", op, a, b, res);
                    self.cache.borrow_mut().insert(OpKey::Apply(op, a, b), res);
                    results.push(res);
                }
            }
        }

        pop_result(&mut results)
    }

    /// Top variable of the pair, with the pairs of low and high cofactors.
    fn split(&self, a: Handle, b: Handle) -> (Var, (Handle, Handle), (Handle, Handle)) {
        match (self.node(a), self.node(b)) {
            (Some(n), Some(m)) => match self.level(n.var).cmp(&self.level(m.var)) {
                Ordering::Equal => (n.var, (n.low, m.low), (n.high, m.high)),
                Ordering::Less => (n.var, (n.low, b), (n.high, b)),
                Ordering::Greater => (m.var, (a, m.low), (a, m.high)),
            },
            (Some(n), None) => (n.var, (n.low, b), (n.high, b)),
            (None, Some(m)) => (m.var, (a, m.low), (a, m.high)),
            (None, None) => unreachable!("terminal pairs are evaluated directly"),
        }
    }

    /// Left fold of `apply`; an empty operand list gives the identity of `op`.
    pub fn apply_many(&self, op: BinOp, operands: impl IntoIterator<Item = Handle>) -> Handle {
        let mut operands = operands.into_iter();
        match operands.next() {
            Some(first) => operands.fold(first, |acc, h| self.apply(op, acc, h)),
            None => op.identity(),
        }
    }

    pub fn and(&self, a: Handle, b: Handle) -> Handle {
        self.apply(BinOp::And, a, b)
    }

    pub fn or(&self, a: Handle, b: Handle) -> Handle {
        self.apply(BinOp::Or, a, b)
    }

    pub fn xor(&self, a: Handle, b: Handle) -> Handle {
        self.apply(BinOp::Xor, a, b)
    }

    /// `a → b`, built as `¬a ∨ b`.
    pub fn implies(&self, a: Handle, b: Handle) -> Handle {
        let not_a = self.not(a);
        self.or(not_a, b)
    }

    /// `a ↔ b`, built as `(a ∧ b) ∨ (¬a ∧ ¬b)`.
    pub fn eq(&self, a: Handle, b: Handle) -> Handle {
        let both = self.and(a, b);
        let not_a = self.not(a);
        let not_b = self.not(b);
        let neither = self.and(not_a, not_b);
        self.or(both, neither)
    }

    pub fn not(&self, a: Handle) -> Handle {
        let mut stack = vec![Frame::Visit(a)];
        let mut results = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(a) => {
                    if let Some(value) = a.as_bool() {
                        results.push(Handle::from_bool(!value));
                        continue;
                    }
                    if let Some(res) = self.cache.borrow().get(&OpKey::Not(a)) {
                        debug!("cache: not({}) -> {}", a, res);
                        results.push(res);
                        continue;
                    }
                    let Some(n) = self.node(a) else {
                        unreachable!("terminals are negated directly")
                    };
                    stack.push(Frame::Build(a, n.var));
                    stack.push(Frame::Visit(n.high));
                    stack.push(Frame::Visit(n.low));
                }
                Frame::Build(a, var) => {
                    let (low, high) = pop_pair(&mut results);
                    let res = self.mk(var, low, high);
                    self.cache.borrow_mut().insert(OpKey::Not(a), res);
                    results.push(res);
                }
            }
        }

        pop_result(&mut results)
    }

    /// Cofactor of `f` with `var` fixed to `value`.
    pub fn restrict(&self, f: Handle, var: Var, value: bool) -> Result<Handle> {
        let position = self.position(var)?;
        let mut memo: HashMap<Handle, Handle> = HashMap::new();
        let mut stack = vec![Frame::Visit(f)];
        let mut results = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(f) => {
                    let Some(n) = self.node(f) else {
                        results.push(f);
                        continue;
                    };
                    let i = self.level(n.var);
                    if position < i {
                        // 'f' does not depend on the variable
                        results.push(f);
                    } else if position == i {
                        results.push(if value { n.high } else { n.low });
                    } else if let Some(&res) = memo.get(&f) {
                        results.push(res);
                    } else {
                        stack.push(Frame::Build(f, n.var));
                        stack.push(Frame::Visit(n.high));
                        stack.push(Frame::Visit(n.low));
                    }
                }
                Frame::Build(f, var) => {
                    let (low, high) = pop_pair(&mut results);
                    let res = self.mk(var, low, high);
                    memo.insert(f, res);
                    results.push(res);
                }
            }
        }

        Ok(pop_result(&mut results))
    }

    /// `∃ var: f`.
    pub fn exists(&self, var: Var, f: Handle) -> Result<Handle> {
        let low = self.restrict(f, var, false)?;
        let high = self.restrict(f, var, true)?;
        Ok(self.or(low, high))
    }

    /// `∀ var: f`.
    pub fn for_all(&self, var: Var, f: Handle) -> Result<Handle> {
        let low = self.restrict(f, var, false)?;
        let high = self.restrict(f, var, true)?;
        Ok(self.and(low, high))
    }

    /// Handles reachable from `roots`, the roots and reached terminals included.
    pub fn descendants(&self, roots: impl IntoIterator<Item = Handle>) -> HashSet<Handle> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from_iter(roots);

        while let Some(h) = queue.pop_front() {
            if visited.insert(h) {
                if let Some(n) = self.node(h) {
                    queue.push_back(n.low);
                    queue.push_back(n.high);
                }
            }
        }

        visited
    }

    /// Verifies reducedness, canonicity, orderedness and the predecessor table.
    pub fn check_invariants(&self) -> Result<()> {
        let table = self.table.borrow();
        let preds = self.predecessors.borrow();
        let mut seen = HashSet::with_capacity(table.len());

        for (index, node) in table.iter() {
            let handle = Handle::new(index as u32);
            if node.low == node.high {
                return Err(Error::Internal(format!(
                    "{} has equal children {}",
                    handle, node.low
                )));
            }
            if !seen.insert(*node) || table.find(node) != Some(index) {
                return Err(Error::Internal(format!(
                    "{} = ({}, {}, {}) is stored twice",
                    handle, node.var, node.low, node.high
                )));
            }
            let position = self.position(node.var)?;
            for child in [node.low, node.high] {
                if child.index() >= index {
                    return Err(Error::Internal(format!(
                        "{} points to the younger node {}",
                        handle, child
                    )));
                }
                if let Some(child_node) = table.get(child.index()) {
                    if self.position(child_node.var)? <= position {
                        return Err(Error::OrderViolation {
                            var: node.var,
                            child: child_node.var,
                        });
                    }
                }
                if !preds[child.index()].contains(&handle) {
                    return Err(Error::Internal(format!(
                        "{} is missing from the predecessors of {}",
                        handle, child
                    )));
                }
            }
        }
        Ok(())
    }

    /// Nested textual form: `@h:(x, high, low)` down to `(0)` and `(1)`.
    pub fn to_bracket_string(&self, h: Handle) -> String {
        let mut stack = vec![Frame::Visit(h)];
        let mut results: Vec<String> = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(h) => match self.node(h) {
                    None if h.is_zero() => results.push("(0)".to_string()),
                    None => results.push("(1)".to_string()),
                    Some(n) => {
                        stack.push(Frame::Build(h, n.var));
                        stack.push(Frame::Visit(n.high));
                        stack.push(Frame::Visit(n.low));
                    }
                },
                Frame::Build(h, var) => {
                    let (low, high) = pop_pair(&mut results);
                    results.push(format!("{}:({}, {}, {})", h, var, high, low));
                }
            }
        }

        pop_result(&mut results)
    }
}

/// Step of a depth-first traversal on an explicit stack: expand an item, or combine the two
/// results its children left on the result stack.
pub(crate) enum Frame<T> {
    Visit(T),
    Build(T, Var),
}

/// Pops the results of the high and then the low child, returned as `(low, high)`.
pub(crate) fn pop_pair<R>(results: &mut Vec<R>) -> (R, R) {
    match (results.pop(), results.pop()) {
        (Some(high), Some(low)) => (low, high),
        _ => unreachable!("a node is built after both of its children"),
    }
}

pub(crate) fn pop_result<R>(results: &mut Vec<R>) -> R {
    match results.pop() {
        Some(res) => res,
        None => unreachable!("the root leaves exactly one result"),
    }
}

/// Result of `op` that needs no expansion: both operands terminal, or an absorbing, neutral or
/// repeated operand of a conjunction or disjunction.
fn shortcut(op: BinOp, a: Handle, b: Handle) -> Option<Handle> {
    if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
        return Some(Handle::from_bool(op.eval(x, y)));
    }
    match op {
        BinOp::And if a.is_zero() || b.is_zero() => Some(Handle::ZERO),
        BinOp::Or if a.is_one() || b.is_one() => Some(Handle::ONE),
        BinOp::And if a.is_one() => Some(b),
        BinOp::Or if a.is_zero() => Some(b),
        BinOp::And | BinOp::Or if b == op.identity() || a == b => Some(a),
        _ => None,
    }
}

/// Decides `cnf` with a diagram ordered by ascending variables.
pub fn satisfiable(cnf: &Cnf) -> Result<bool> {
    Robdd::for_cnf(cnf).satisfiable(cnf)
}

/// Solves `cnf` with a diagram ordered by ascending variables.
pub fn solve(cnf: &Cnf) -> Result<Option<Model>> {
    Robdd::for_cnf(cnf).solve(cnf)
}
