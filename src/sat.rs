use std::collections::HashMap;

use log::{debug, info};
use num_bigint::BigUint;

use crate::cnf::{Cnf, Model};
use crate::error::Result;
use crate::handle::Handle;
use crate::robdd::{pop_pair, pop_result, BinOp, Frame, Robdd};
use crate::types::Lit;

impl Robdd {
    /// Builds the conjunction of the disjunctions of the clause literals.
    ///
    /// Fails if `cnf` mentions a variable outside the order.
    pub fn cnf(&self, cnf: &Cnf) -> Result<Handle> {
        let mut clauses = Vec::with_capacity(cnf.len());
        for clause in cnf.iter() {
            let lits = clause
                .iter()
                .map(|lit| self.literal(lit))
                .collect::<Result<Vec<_>>>()?;
            clauses.push(self.apply_many(BinOp::Or, lits));
        }
        let res = self.apply_many(BinOp::And, clauses);
        debug!("cnf: {} clauses -> {} ({} nodes)", cnf.len(), res, self.size());
        Ok(res)
    }

    pub fn satisfiable(&self, cnf: &Cnf) -> Result<bool> {
        Ok(self.cnf(cnf)? != Handle::ZERO)
    }

    /// Builds `cnf` and reads a model off the diagram.
    pub fn solve(&self, cnf: &Cnf) -> Result<Option<Model>> {
        let root = self.cnf(cnf)?;
        let model = self.model(root);
        info!(
            "robdd: {} with {} nodes",
            if model.is_some() { "SAT" } else { "UNSAT" },
            self.size()
        );
        Ok(model)
    }

    /// A satisfying assignment of `root` over the whole order.
    ///
    /// Starting from the true terminal, predecessor edges are followed upwards (always the
    /// smallest predecessor that belongs to the diagram of `root`) until `root` is reached.
    /// Each step records the variable of the parent, positive if the edge was the high one.
    /// Variables the path skips are set to false.
    pub fn model(&self, root: Handle) -> Option<Model> {
        if root.is_zero() {
            return None;
        }
        let inside = self.descendants([root]);
        if !inside.contains(&Handle::ONE) {
            return None;
        }

        let mut path: HashMap<_, Lit> = HashMap::new();
        let mut current = Handle::ONE;
        while current != root {
            let parent = self
                .predecessors(current)
                .into_iter()
                .find(|p| inside.contains(p))?;
            let node = self.node(parent)?;
            let lit = node.var.lit(node.high == current);
            debug!("model: {} <- {} via {}", current, parent, lit);
            path.insert(node.var, lit);
            current = parent;
        }

        Some(
            self.order()
                .iter()
                .map(|&var| path.get(&var).copied().unwrap_or_else(|| var.neg()))
                .collect(),
        )
    }

    /// Number of assignments to the variables of the order that satisfy `f`.
    pub fn sat_count(&self, f: Handle) -> BigUint {
        let mut memo: HashMap<Handle, BigUint> = HashMap::new();
        let mut stack = vec![Frame::Visit(f)];
        let mut results = Vec::new();

        // Counts are over the variables from the level of the node down.
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(g) => {
                    if g.is_zero() {
                        results.push(BigUint::ZERO);
                    } else if g.is_one() {
                        results.push(BigUint::from(1u32));
                    } else if let Some(count) = memo.get(&g) {
                        results.push(count.clone());
                    } else if let Some(node) = self.node(g) {
                        stack.push(Frame::Build(g, node.var));
                        stack.push(Frame::Visit(node.high));
                        stack.push(Frame::Visit(node.low));
                    }
                }
                Frame::Build(g, _) => {
                    let (low, high) = pop_pair(&mut results);
                    let Some(node) = self.node(g) else {
                        unreachable!("only decision nodes are expanded")
                    };
                    let level = self.handle_level(g);
                    // Variables skipped by an edge are free.
                    let low = low << (self.handle_level(node.low) - level - 1);
                    let high = high << (self.handle_level(node.high) - level - 1);
                    let count = low + high;
                    memo.insert(g, count.clone());
                    results.push(count);
                }
            }
        }

        pop_result(&mut results) << self.handle_level(f)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::cnf::is_model;
    use crate::types::Var;

    fn cnf(clauses: Vec<Vec<i32>>) -> Cnf {
        Cnf::from_dimacs_clauses(clauses).unwrap()
    }

    fn lits(values: &[i32]) -> Vec<Lit> {
        values.iter().map(|&v| Lit::from_dimacs(v)).collect()
    }

    #[test]
    fn test_simple_sat() {
        let f = cnf(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]);
        let bdd = Robdd::for_cnf(&f);
        let model = bdd.solve(&f).unwrap().unwrap();
        assert_eq!(model, lits(&[1, 2, 3]));
        assert!(is_model(&model, &f));
        assert!(bdd.satisfiable(&f).unwrap());
    }

    #[test]
    fn test_contradiction() {
        let f = cnf(vec![vec![1], vec![-1]]);
        let bdd = Robdd::new([Var::new(1)]).unwrap();
        assert_eq!(bdd.cnf(&f).unwrap(), Handle::ZERO);
        assert_eq!(bdd.solve(&f).unwrap(), None);
        assert!(!crate::robdd::satisfiable(&f).unwrap());
    }

    #[test]
    fn test_tautological_clause() {
        let f = cnf(vec![vec![1, -1]]);
        let bdd = Robdd::for_cnf(&f);
        assert_eq!(bdd.cnf(&f).unwrap(), Handle::ONE);
        // The model is completed with false.
        assert_eq!(bdd.solve(&f).unwrap(), Some(lits(&[-1])));
    }

    #[test]
    fn test_empty_formula() {
        let f = Cnf::new();
        assert_eq!(crate::robdd::solve(&f).unwrap(), Some(vec![]));
        assert!(crate::robdd::satisfiable(&f).unwrap());
    }

    #[test]
    fn test_empty_clause() {
        let f = cnf(vec![vec![1], vec![]]);
        assert_eq!(crate::robdd::solve(&f).unwrap(), None);
    }

    #[test]
    fn test_unknown_variable() {
        let f = cnf(vec![vec![1, 5]]);
        let bdd = Robdd::new([Var::new(1)]).unwrap();
        assert!(bdd.cnf(&f).is_err());
    }

    #[test]
    fn test_ten_variables() {
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
        let model = crate::robdd::solve(&f).unwrap().unwrap();
        assert_eq!(model, lits(&[-1, -2, 3, 4, -5, 6, -7, -8, -9, -10]));
        assert!(is_model(&model, &f));
    }

    #[test]
    fn test_long_chain_of_unit_clauses() {
        let n = 20_000;
        let f = cnf((1..=n).rev().map(|i| vec![i]).collect());
        let model = crate::robdd::solve(&f).unwrap().unwrap();
        assert_eq!(model, (1..=n).map(Lit::from_dimacs).collect::<Vec<_>>());

        let bdd = Robdd::for_cnf(&f);
        assert_eq!(bdd.order(), f.sorted_variables().as_slice());
        let root = bdd.cnf(&f).unwrap();
        assert_eq!(bdd.size(), 2 * n as usize - 1);
        assert_eq!(bdd.sat_count(root), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(bdd.not(root)), (BigUint::from(1u32) << n as usize) - 1u32);
    }

    #[test]
    fn test_model_of_equal_pairs() {
        let bdd = Robdd::new((1..=4).map(Var::new)).unwrap();
        let x: Vec<Handle> = (1..=4).map(|i| bdd.var(Var::new(i)).unwrap()).collect();
        let f = bdd.and(bdd.eq(x[0], x[2]), bdd.eq(x[1], x[3]));
        assert_eq!(bdd.model(f), Some(lits(&[-1, 2, -3, 4])));
    }

    #[test]
    fn test_model_ignores_nodes_outside_the_diagram() {
        let bdd = Robdd::new((1..=2).map(Var::new)).unwrap();
        let x = bdd.var(Var::new(1)).unwrap();
        let y = bdd.var(Var::new(2)).unwrap();
        // Plenty of other nodes point to the terminals, none of them under `f`.
        let _ = bdd.or(x, y);
        let _ = bdd.xor(x, y);
        let f = bdd.and(bdd.not(x), y);
        assert_eq!(bdd.model(f), Some(lits(&[-1, 2])));
        assert_eq!(bdd.model(Handle::ONE), Some(lits(&[-1, -2])));
        assert_eq!(bdd.model(Handle::ZERO), None);
    }

    #[test]
    fn test_sat_count() {
        let bdd = Robdd::new((1..=3).map(Var::new)).unwrap();
        let x1 = bdd.var(Var::new(1)).unwrap();
        let x2 = bdd.var(Var::new(2)).unwrap();
        let x3 = bdd.var(Var::new(3)).unwrap();

        assert_eq!(bdd.sat_count(Handle::ZERO), BigUint::from(0u32));
        assert_eq!(bdd.sat_count(Handle::ONE), BigUint::from(8u32));
        assert_eq!(bdd.sat_count(x1), BigUint::from(4u32));
        assert_eq!(bdd.sat_count(x3), BigUint::from(4u32));
        assert_eq!(bdd.sat_count(bdd.and(x1, x3)), BigUint::from(2u32));
        assert_eq!(bdd.sat_count(bdd.or(x1, x3)), BigUint::from(6u32));
        assert_eq!(bdd.sat_count(bdd.xor(x2, x3)), BigUint::from(4u32));
        let all = bdd.apply_many(BinOp::And, [x1, x2, x3]);
        assert_eq!(bdd.sat_count(all), BigUint::from(1u32));
    }

    #[test]
    fn test_sat_count_large() {
        let n = 100;
        let bdd = Robdd::new((1..=n).map(Var::new)).unwrap();
        let x = bdd.var(Var::new(50)).unwrap();
        assert_eq!(bdd.sat_count(x), BigUint::from(1u32) << (n as usize - 1));
    }
}
