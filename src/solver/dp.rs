/*!
The Davis-Putnam procedure.

Each iteration simplifies the formula with unit propagation and pure literal
elimination until neither rule applies, then eliminates the smallest remaining
variable by resolution. The loop is bounded by [`Limits`].
*/

use crate::formula::{Cnf, Signature};

use self::resolution::{eliminate, Elimination};
use self::simplify::{eliminate_pure_literals, propagate_units, Simplified};

use super::{Limits, Solver, Verdict};

mod resolution;
mod simplify;

/// Verdict of a DP run together with how it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    /// Number of driver iterations started.
    pub iterations: usize,
    /// Formula signature at the start of each iteration, if tracing was requested.
    pub trace: Option<Vec<Signature>>,
}

/// State of the formula after the simplification phase.
enum Phase {
    Running(Cnf),
    Finished(Verdict),
}

/// Alternates unit propagation and pure literal elimination until a full pass changes nothing.
fn simplify_to_fixpoint(formula: Cnf) -> Phase {
    let mut formula = formula;

    loop {
        if formula.is_empty() {
            return Phase::Finished(Verdict::Satisfiable);
        }
        if formula.has_empty_clause() {
            return Phase::Finished(Verdict::Unsatisfiable);
        }

        let (result, changed) = propagate_units(formula);
        formula = match result {
            Simplified::Formula(formula) => formula,
            Simplified::Conflict => return Phase::Finished(Verdict::Unsatisfiable),
        };
        if changed {
            continue;
        }

        let (result, changed) = eliminate_pure_literals(formula);
        formula = match result {
            Simplified::Formula(formula) => formula,
            Simplified::Conflict => return Phase::Finished(Verdict::Unsatisfiable),
        };
        if !changed {
            return Phase::Running(formula);
        }
    }
}

/// Remembers the last state that made no progress, or the last resolution result.
#[derive(Debug, Default)]
struct StalemateGuard {
    last: Option<Signature>,
}

impl StalemateGuard {
    /// Returns `true` if `signature` repeats the remembered state, remembers it otherwise.
    fn repeated(&mut self, signature: Signature) -> bool {
        if self.last.as_ref() == Some(&signature) {
            return true;
        }
        self.last = Some(signature);
        false
    }

    fn remember(&mut self, signature: Signature) {
        self.last = Some(signature);
    }
}

#[derive(Debug)]
pub struct DpSolver {
    formula: Cnf,
    limits: Limits,
    trace: Option<Vec<Signature>>,
}

impl DpSolver {
    /// Records the formula signature at the start of every iteration.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Runs the procedure to a terminal verdict.
    pub fn run(self) -> Outcome {
        let DpSolver {
            mut formula,
            limits,
            mut trace,
        } = self;

        let finish = |verdict: Verdict, iterations: usize, trace: Option<Vec<Signature>>| {
            info!("DP finished after {} iterations: {}", iterations, verdict);
            Outcome {
                verdict,
                iterations,
                trace,
            }
        };

        let mut stalemate = StalemateGuard::default();

        for iteration in 1..=limits.max_iterations {
            if formula.num_clauses() > limits.max_clauses {
                warn!(
                    "{} clauses exceed the limit of {}, giving up",
                    formula.num_clauses(),
                    limits.max_clauses
                );
                return finish(Verdict::ClauseLimitReached, iteration, trace);
            }

            if let Some(trace) = trace.as_mut() {
                trace.push(formula.signature());
            }
            debug!(
                "DP iteration {}: {} clauses",
                iteration,
                formula.num_clauses()
            );

            formula = match simplify_to_fixpoint(formula) {
                Phase::Running(formula) => formula,
                Phase::Finished(verdict) => return finish(verdict, iteration, trace),
            };

            let variable = match formula.min_variable() {
                Some(variable) => variable,
                // every clause is discharged
                None => return finish(Verdict::Satisfiable, iteration, trace),
            };

            match eliminate(&formula, variable) {
                Elimination::Unsatisfiable => {
                    return finish(Verdict::Unsatisfiable, iteration, trace);
                }
                Elimination::Stalemate(reason) => {
                    if stalemate.repeated(formula.signature()) {
                        debug!("Repeated stalemate on {} ({:?})", variable, reason);
                        return finish(Verdict::Satisfiable, iteration, trace);
                    }
                    debug!("Stalemate on {} ({:?}), state remembered", variable, reason);
                }
                Elimination::Resolved {
                    formula: next,
                    resolvents,
                } => {
                    trace!("{} eliminated with {} resolvents", variable, resolvents);
                    if next.is_empty() {
                        return finish(Verdict::Satisfiable, iteration, trace);
                    }
                    stalemate.remember(next.signature());
                    formula = next;
                }
            }
        }

        warn!(
            "Iteration limit of {} reached with {} clauses left",
            limits.max_iterations,
            formula.num_clauses()
        );
        finish(
            Verdict::IterationLimitReached,
            limits.max_iterations,
            trace,
        )
    }
}

impl Solver for DpSolver {
    fn new(formula: Cnf, limits: Limits) -> Self {
        DpSolver {
            formula,
            limits,
            trace: None,
        }
    }

    fn solve(self) -> Verdict {
        self.run().verdict
    }
}
