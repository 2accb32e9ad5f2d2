use thiserror::Error;

use crate::types::Var;

/// Errors reported by the solving engines.
///
/// Unsatisfiability is not an error: solvers report it as `Ok(None)` or `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("clause #{clause} contains the reserved literal 0")]
    ZeroLiteral { clause: usize },

    #[error("variable {0} is not part of the variable order")]
    UnknownVariable(Var),

    #[error("variable {0} occurs more than once in the variable order")]
    DuplicateVariable(Var),

    #[error("node on {var} cannot have a child labelled {child}: the order requires the child below")]
    OrderViolation { var: Var, child: Var },

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
