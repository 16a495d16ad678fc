use std::fmt::Display;

use crate::formula::Cnf;

mod dp;
mod resolution;

pub use dp::{DpSolver, Outcome};
pub use resolution::ResolutionSolver;

/// Terminal verdict of a decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    /// The clause cap was exceeded; nothing is known about the formula.
    ClauseLimitReached,
    /// The iteration cap was exhausted; nothing is known about the formula.
    IterationLimitReached,
}

impl Verdict {
    /// Whether the verdict actually decides the formula.
    pub fn is_conclusive(&self) -> bool {
        matches!(self, Verdict::Satisfiable | Verdict::Unsatisfiable)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Verdict::Satisfiable => "SATISFIABLE",
            Verdict::Unsatisfiable => "UNSATISFIABLE",
            Verdict::ClauseLimitReached => "DP_CLAUSE_LIMIT_REACHED",
            Verdict::IterationLimitReached => "DP_MAX_ITERATIONS_REACHED",
        };
        write!(f, "{}", label)
    }
}

/// Resource caps that bound a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_iterations: usize,
    pub max_clauses: usize,
}

impl Limits {
    pub const DEFAULT_MAX_ITERATIONS: usize = 2000;
    pub const DEFAULT_MAX_CLAUSES: usize = 5000;

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Limits {
            max_iterations,
            ..self
        }
    }

    pub fn with_max_clauses(self, max_clauses: usize) -> Self {
        Limits {
            max_clauses,
            ..self
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_iterations: Limits::DEFAULT_MAX_ITERATIONS,
            max_clauses: Limits::DEFAULT_MAX_CLAUSES,
        }
    }
}

pub trait Solver {
    /// Creates a new solver instance.
    fn new(formula: Cnf, limits: Limits) -> Self;

    /// Decides a CNF SAT problem with the solver.
    fn solve(self) -> Verdict;
}
