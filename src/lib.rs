//! # logic-rs: satisfiability of CNF formulas
//!
//! **`logic-rs`** decides satisfiability of propositional formulas in Conjunctive Normal Form and
//! produces models. Two engines sit at its core:
//!
//! - **[`cdcl`]**: Conflict-Driven Clause Learning over an explicit [implication graph][crate::implication::ImplicationGraph].
//!   Conflicts are analysed down to the first unique implication point and the negated cut is
//!   learned. Every level from the highest one in the cut up is undone, and propagation resumes
//!   one level below it.
//! - **[`robdd`]**: a Reduced Ordered Binary Decision Diagram manager. Nodes are hash-consed, so every
//!   function has exactly one [`Handle`][crate::handle::Handle] for a fixed variable order, and
//!   satisfiability is a comparison with the false terminal.
//!
//! Around them live simpler reference engines ([`dpll`], [`truth_table`]) used to cross-check the
//! core ones, and formula builders ([`normal`], [`expr`]) that produce CNFs from richer syntax.
//!
//! ## Conventions
//!
//! - Variables are positive integers and literals are non-zero integers, as in DIMACS:
//!   `3` is *x3* and `-3` is *¬x3*.
//! - A [model][crate::cnf::Model] is a list of literals, one per assigned variable.
//! - Unsatisfiability is an answer, not an error: solvers return `Ok(None)`. Errors are reserved
//!   for malformed input and broken invariants, see [`error`].
//!
//! ## Basic Usage
//!
//! ```rust
//! use logic_rs::cnf::{is_model, Cnf};
//! use logic_rs::{cdcl, robdd};
//!
//! let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2, 3], vec![-2, 3], vec![1, -3]]).unwrap();
//!
//! let model = cdcl::solve(&cnf).unwrap().unwrap();
//! assert!(is_model(&model, &cnf));
//!
//! let model = robdd::solve(&cnf).unwrap().unwrap();
//! assert!(is_model(&model, &cnf));
//!
//! let contradiction = Cnf::from_dimacs_clauses(vec![vec![1], vec![-1]]).unwrap();
//! assert_eq!(cdcl::solve(&contradiction).unwrap(), None);
//! ```
//!
//! ## Core Components
//!
//! - **[`cnf`]**, **[`assignment`]**: formulas, partial assignments and clause status.
//! - **[`implication`]**: the implication graph behind CDCL.
//! - **[`robdd`]**, **[`sat`]**, **[`paths`]**, **[`dot`]**: the diagram manager, CNF solving
//!   and model counting, path enumeration, and Graphviz export.

pub mod assignment;
pub mod cache;
pub mod cdcl;
pub mod cnf;
pub mod dot;
pub mod dpll;
pub mod error;
pub mod expr;
pub mod handle;
pub mod implication;
pub mod normal;
pub mod paths;
pub mod robdd;
pub mod sat;
pub mod table;
pub mod truth_table;
pub mod types;
pub mod utils;
