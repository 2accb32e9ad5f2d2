//! Iterator over the paths of a diagram that end in the true terminal.
//!
//! Every such path is a conjunction of literals implying the function, and the paths are
//! pairwise disjoint: together they cover the satisfying assignments exactly once. Variables
//! skipped by a path are free.
//!
//! ```
//! use logic_rs::robdd::Robdd;
//! use logic_rs::types::Var;
//!
//! let bdd = Robdd::new((1..=2).map(Var::new)).unwrap();
//! let x = bdd.var(Var::new(1)).unwrap();
//! let y = bdd.var(Var::new(2)).unwrap();
//!
//! let f = bdd.xor(x, y);
//! assert_eq!(bdd.paths(f).count(), 2);
//! ```
//!
//! The number of paths can be exponential in the number of variables.

use crate::handle::Handle;
use crate::robdd::Robdd;
use crate::types::Lit;

impl Robdd {
    /// Returns an iterator over all paths from `f` to the true terminal.
    ///
    /// Literals of a path follow the variable order. High branches are explored first.
    pub fn paths(&self, f: Handle) -> RobddPaths<'_> {
        RobddPaths::new(self, f)
    }

    /// Every satisfying path of `f`, each completed with both values of the variables it skips.
    ///
    /// The result lists all models of `f` over the whole order.
    pub fn models(&self, f: Handle) -> Vec<Vec<Lit>> {
        let mut models = Vec::new();
        for path in self.paths(f) {
            let mut partial: Vec<Vec<Lit>> = vec![Vec::new()];
            for &var in self.order() {
                match path.iter().find(|lit| lit.var() == var) {
                    Some(&lit) => partial.iter_mut().for_each(|m| m.push(lit)),
                    None => {
                        let mut negative = partial.clone();
                        partial.iter_mut().for_each(|m| m.push(var.pos()));
                        negative.iter_mut().for_each(|m| m.push(var.neg()));
                        partial.extend(negative);
                    }
                }
            }
            models.extend(partial);
        }
        models
    }
}

#[derive(Debug, Clone, Copy)]
enum Branch {
    High,
    Low,
}

#[derive(Debug)]
struct StackFrame {
    node: Handle,
    /// Which branch to explore next, `None` once both are done.
    next_branch: Option<Branch>,
}

/// Depth-first walk with backtracking; created by [`Robdd::paths`].
///
/// The current path lives in one vector that grows and shrinks with the stack.
pub struct RobddPaths<'a> {
    bdd: &'a Robdd,
    stack: Vec<StackFrame>,
    current_path: Vec<Lit>,
}

impl<'a> RobddPaths<'a> {
    pub fn new(bdd: &'a Robdd, f: Handle) -> Self {
        RobddPaths {
            bdd,
            stack: vec![StackFrame {
                node: f,
                next_branch: Some(Branch::High),
            }],
            current_path: Vec::new(),
        }
    }

    fn backtrack(&mut self) {
        self.stack.pop();
        // Drop the literal that led here, unless this was the root.
        if !self.stack.is_empty() {
            self.current_path.pop();
        }
    }
}

impl Iterator for RobddPaths<'_> {
    type Item = Vec<Lit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;

            if node.is_one() {
                let result = self.current_path.clone();
                self.backtrack();
                return Some(result);
            }
            let Some(n) = self.bdd.node(node) else {
                // Dead end.
                self.backtrack();
                continue;
            };

            match frame.next_branch {
                Some(Branch::High) => {
                    frame.next_branch = Some(Branch::Low);
                    self.current_path.push(n.var.pos());
                    self.stack.push(StackFrame {
                        node: n.high,
                        next_branch: Some(Branch::High),
                    });
                }
                Some(Branch::Low) => {
                    frame.next_branch = None;
                    self.current_path.push(n.var.neg());
                    self.stack.push(StackFrame {
                        node: n.low,
                        next_branch: Some(Branch::High),
                    });
                }
                None => self.backtrack(),
            }
        }
    }
}
