use crate::formula::{Clause, Cnf, Literal, Variable};

/// Why an elimination round made no progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stalemate {
    /// One phase of the variable never occurs, so there is nothing to resolve.
    PureForResolution,
    /// Resolution produced the same clause set it started from.
    Unchanged,
}

#[derive(Debug, Clone)]
pub enum Elimination {
    Resolved {
        formula: Cnf,
        /// Distinct non-tautological resolvents added.
        resolvents: usize,
    },
    /// An empty resolvent was derived.
    Unsatisfiable,
    Stalemate(Stalemate),
}

/// Eliminates `variable` by replacing every clause mentioning it with the pairwise
/// resolvents of its positive and negative occurrences.
pub fn eliminate(formula: &Cnf, variable: Variable) -> Elimination {
    let positive = Literal::new(variable, true);
    let negative = !positive;

    let mut with_positive: Vec<&Clause> = Vec::new();
    let mut with_negative: Vec<&Clause> = Vec::new();
    let mut others: Vec<&Clause> = Vec::new();

    for clause in formula.clauses() {
        if clause.contains(positive) {
            with_positive.push(clause);
        } else if clause.contains(negative) {
            with_negative.push(clause);
        } else {
            others.push(clause);
        }
    }

    if with_positive.is_empty() || with_negative.is_empty() {
        return Elimination::Stalemate(Stalemate::PureForResolution);
    }

    let mut resolvents = Vec::with_capacity(with_positive.len() * with_negative.len());
    for p in &with_positive {
        for n in &with_negative {
            let resolvent = p.resolve(n, variable);
            if resolvent.is_tautology() {
                continue;
            }
            if resolvent.is_empty() {
                debug!("Empty resolvent while eliminating {}", variable);
                return Elimination::Unsatisfiable;
            }
            resolvents.push(resolvent);
        }
    }

    let resolvents = Cnf::from_clauses(formula.num_variables(), resolvents).dedup();
    let num_resolvents = resolvents.num_clauses();
    debug!(
        "Eliminating {}: {} x {} clauses, {} distinct resolvents, {} untouched",
        variable,
        with_positive.len(),
        with_negative.len(),
        num_resolvents,
        others.len()
    );

    let next = Cnf::from_clauses(
        formula.num_variables(),
        others
            .into_iter()
            .cloned()
            .chain(resolvents.into_clauses()),
    )
    .dedup();

    if next.same_clauses(formula) {
        return Elimination::Stalemate(Stalemate::Unchanged);
    }

    Elimination::Resolved {
        formula: next,
        resolvents: num_resolvents,
    }
}
