use std::collections::HashSet;

use crate::formula::{Clause, Cnf};

use super::{Limits, Solver, Verdict};

/// Saturates the formula under binary resolution.
///
/// Every round resolves all clause pairs on every complementary literal and adds the
/// resolvents never seen before. A round without a new resolvent means the formula
/// is satisfiable, an empty resolvent means it is not.
#[derive(Debug)]
pub struct ResolutionSolver {
    formula: Cnf,
    limits: Limits,
}

/// Resolvents of `first` and `second` on each literal clashing between them.
fn clashes<'a>(first: &'a Clause, second: &'a Clause) -> impl Iterator<Item = Clause> + 'a {
    first
        .iter()
        .filter(move |&literal| second.contains(!literal))
        .map(move |literal| first.resolve(second, literal.variable()))
}

impl Solver for ResolutionSolver {
    fn new(formula: Cnf, limits: Limits) -> Self {
        ResolutionSolver { formula, limits }
    }

    fn solve(self) -> Verdict {
        let ResolutionSolver { formula, limits } = self;

        let mut clauses = formula.dedup().into_clauses();
        let mut seen: HashSet<Clause> = clauses.iter().cloned().collect();

        for round in 1..=limits.max_iterations {
            if clauses.iter().any(Clause::is_empty) {
                return Verdict::Unsatisfiable;
            }
            if clauses.is_empty() {
                return Verdict::Satisfiable;
            }
            if clauses.len() > limits.max_clauses {
                warn!(
                    "{} clauses exceed the limit of {}, giving up",
                    clauses.len(),
                    limits.max_clauses
                );
                return Verdict::ClauseLimitReached;
            }

            let mut batch = Vec::new();
            for (i, first) in clauses.iter().enumerate() {
                for second in &clauses[i + 1..] {
                    for resolvent in clashes(first, second) {
                        if resolvent.is_tautology() {
                            continue;
                        }
                        if resolvent.is_empty() {
                            debug!("Empty resolvent of {} and {}", first, second);
                            return Verdict::Unsatisfiable;
                        }
                        if seen.insert(resolvent.clone()) {
                            batch.push(resolvent);
                        }
                    }
                }
            }

            if batch.is_empty() {
                debug!("Saturated after {} rounds", round);
                return Verdict::Satisfiable;
            }

            debug!(
                "Resolution round {}: {} clauses, {} new resolvents",
                round,
                clauses.len(),
                batch.len()
            );
            clauses.extend(batch);
        }

        warn!("Iteration limit of {} reached", limits.max_iterations);
        Verdict::IterationLimitReached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{blowup_cnf, clause, cnf};

    fn saturate(formula: Cnf) -> Verdict {
        ResolutionSolver::new(formula, Limits::default()).solve()
    }

    #[test]
    fn clashes_on_every_complementary_pair() {
        let a = clause(&[1, 2, 3]);
        let b = clause(&[-1, -2, 4]);
        let resolvents = clashes(&a, &b).collect::<Vec<_>>();
        assert_eq!(
            resolvents,
            vec![clause(&[2, -2, 3, 4]), clause(&[1, -1, 3, 4])]
        );
        assert!(resolvents.iter().all(Clause::is_tautology));

        assert_eq!(clashes(&a, &clause(&[2, 5])).count(), 0);
    }

    #[test]
    fn small_formulas() {
        assert_eq!(saturate(cnf(&[&[1, -2], &[-1, 2]])), Verdict::Satisfiable);
        assert_eq!(saturate(cnf(&[&[1], &[-1]])), Verdict::Unsatisfiable);
        assert_eq!(saturate(Cnf::new(3)), Verdict::Satisfiable);

        let mut f = cnf(&[&[1, 2]]);
        f.add_clause(Clause::empty());
        assert_eq!(saturate(f), Verdict::Unsatisfiable);
    }

    #[test]
    fn needs_several_rounds() {
        // (x1 ∨ x2) (¬x1 ∨ x2) (x1 ∨ ¬x2) (¬x1 ∨ ¬x2 ∨ x3) (¬x3)
        let f = cnf(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2, 3], &[-3]]);
        assert_eq!(saturate(f), Verdict::Unsatisfiable);
    }

    #[test]
    fn limits_apply() {
        let limits = Limits::default().with_max_clauses(10);
        assert_eq!(
            ResolutionSolver::new(blowup_cnf(4), limits).solve(),
            Verdict::ClauseLimitReached
        );

        let limits = Limits::default().with_max_iterations(1);
        assert_eq!(
            ResolutionSolver::new(blowup_cnf(3), limits).solve(),
            Verdict::IterationLimitReached
        );
    }
}
