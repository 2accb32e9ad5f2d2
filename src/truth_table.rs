//! Exhaustive truth tables.
//!
//! Every combination of values of the variables is tried, in binary counting order with the
//! first variable as the most significant bit. This is exponential and only meant as ground
//! truth for small formulas.

use std::collections::HashMap;

use crate::cnf::{Cnf, Model};
use crate::types::{Lit, Var};

/// Truth tables are enumerated with a `u64` counter.
pub const MAX_VARIABLES: usize = 63;

/// One line of a truth table: a value per variable, and the value of the formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<bool>,
    pub value: bool,
}

impl Row {
    /// The row as a model over `vars`.
    pub fn to_model(&self, vars: &[Var]) -> Model {
        vars.iter()
            .zip(&self.values)
            .map(|(&var, &value)| var.lit(value))
            .collect()
    }
}

/// Sorted, deduplicated variables of `cnf`.
pub fn collect_variables(cnf: &Cnf) -> Vec<Var> {
    cnf.sorted_variables()
}

/// Value of `cnf` when `vars[i]` takes `values[i]`. Variables missing from `vars` are false.
pub fn evaluate(cnf: &Cnf, vars: &[Var], values: &[bool]) -> bool {
    let index: HashMap<Var, bool> = vars.iter().copied().zip(values.iter().copied()).collect();
    let is_true = |lit: Lit| index.get(&lit.var()).copied().unwrap_or(false) == lit.polarity();
    cnf.iter().all(|clause| clause.iter().any(is_true))
}

/// Iterates over the rows of the truth table of `cnf` over `vars`.
///
/// # Panics
///
/// Panics if there are more than [`MAX_VARIABLES`] variables.
pub fn rows<'a>(cnf: &'a Cnf, vars: &'a [Var]) -> impl Iterator<Item = Row> + 'a {
    assert!(
        vars.len() <= MAX_VARIABLES,
        "Truth table over {} variables is too large",
        vars.len()
    );
    let n = vars.len();
    (0..(1u64 << n)).map(move |i| {
        let values: Vec<bool> = (0..n).map(|j| (i >> (n - 1 - j)) & 1 == 1).collect();
        let value = evaluate(cnf, vars, &values);
        Row { values, value }
    })
}

/// The first model in table order, over all variables of `cnf`.
pub fn solve(cnf: &Cnf) -> Option<Model> {
    let vars = collect_variables(cnf);
    let model = rows(cnf, &vars)
        .find(|row| row.value)
        .map(|row| row.to_model(&vars));
    model
}

/// Every model of `cnf`, in table order.
pub fn solve_all(cnf: &Cnf) -> Vec<Model> {
    let vars = collect_variables(cnf);
    let models = rows(cnf, &vars)
        .filter(|row| row.value)
        .map(|row| row.to_model(&vars))
        .collect();
    models
}

pub fn satisfiable(cnf: &Cnf) -> bool {
    solve(cnf).is_some()
}

/// Same variables and the same value on every row.
pub fn equivalent(cnf1: &Cnf, cnf2: &Cnf) -> bool {
    let vars = collect_variables(cnf1);
    if vars != collect_variables(cnf2) {
        return false;
    }
    let same = rows(cnf1, &vars).all(|row| evaluate(cnf2, &vars, &row.values) == row.value);
    same
}

/// Both satisfiable or both unsatisfiable.
pub fn equisatisfiable(cnf1: &Cnf, cnf2: &Cnf) -> bool {
    satisfiable(cnf1) == satisfiable(cnf2)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::cnf::is_model;

    fn cnf(clauses: Vec<Vec<i32>>) -> Cnf {
        Cnf::from_dimacs_clauses(clauses).unwrap()
    }

    #[test]
    fn test_rows() {
        let f = cnf(vec![vec![1, 2]]);
        let vars = collect_variables(&f);
        let rows: Vec<(Vec<bool>, bool)> = rows(&f, &vars).map(|r| (r.values, r.value)).collect();
        assert_eq!(
            rows,
            vec![
                (vec![false, false], false),
                (vec![false, true], true),
                (vec![true, false], true),
                (vec![true, true], true),
            ]
        );
    }

    #[test]
    fn test_solve() {
        let f = cnf(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]);
        let model = solve(&f).unwrap();
        assert_eq!(model, [1, -2, -3].map(Lit::from_dimacs).to_vec());
        assert!(is_model(&model, &f));
        assert_eq!(solve_all(&f).len(), 3);
        assert!(solve_all(&f).iter().all(|m| is_model(m, &f)));
    }

    #[test]
    fn test_unsat() {
        let f = cnf(vec![vec![1], vec![-1]]);
        assert_eq!(solve(&f), None);
        assert!(solve_all(&f).is_empty());
        assert!(!satisfiable(&f));
    }

    #[test]
    fn test_empty() {
        assert_eq!(solve(&Cnf::new()), Some(vec![]));
        assert_eq!(solve(&cnf(vec![vec![]])), None);
    }

    #[test]
    fn test_equivalent() {
        let f = cnf(vec![vec![1, 2], vec![1, 3]]);
        let g = cnf(vec![vec![1, 2], vec![1, 3], vec![1, 2, 3]]);
        let h = cnf(vec![vec![1], vec![2, 3]]);
        assert!(equivalent(&f, &g));
        assert!(!equivalent(&f, &h));
        // Different variable sets are never equivalent.
        assert!(!equivalent(&f, &cnf(vec![vec![1, 2]])));
        assert!(equisatisfiable(&f, &h));
        assert!(!equisatisfiable(&f, &cnf(vec![vec![4], vec![-4]])));
    }
}
