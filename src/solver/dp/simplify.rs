/*!
Simplification rules of the DP procedure.

Every rule rewrites a formula into a fresh one under a literal that is forced
true, or reports that an empty clause was derived.
*/

use typed_index_collections::TiVec;

use crate::formula::{Clause, Cnf, Literal, Variable};

/// Result of a rewrite that can derive the empty clause.
#[derive(Debug, Clone)]
pub enum Simplified {
    Formula(Cnf),
    Conflict,
}

impl Simplified {
    #[cfg(test)]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Simplified::Conflict)
    }
}

/// Rewrites `formula` under the assumption that `literal` is true.
///
/// Clauses containing `literal` are satisfied and dropped, `¬literal` is removed from
/// the others. Yields `Conflict` as soon as a clause loses its last literal.
pub fn assign(formula: &Cnf, literal: Literal) -> Simplified {
    let mut simplified = Cnf::new(formula.num_variables());

    for clause in formula.clauses() {
        if clause.contains(literal) {
            continue;
        }

        if clause.contains(!literal) {
            let shrunk = clause.without(!literal);
            if shrunk.is_empty() {
                return Simplified::Conflict;
            }
            simplified.add_clause(shrunk);
        } else {
            simplified.add_clause(clause.clone());
        }
    }

    Simplified::Formula(simplified)
}

/// Runs a forced-literal rule to its fixpoint.
///
/// `pick` chooses the next literal to force, `None` ends the loop.
/// Returns the rewritten formula (or conflict) and whether anything changed.
fn fixpoint<F>(formula: Cnf, rule: &str, pick: F) -> (Simplified, bool)
where
    F: Fn(&Cnf) -> Option<Literal>,
{
    let mut formula = formula;
    let mut changed = false;

    loop {
        if formula.is_empty() {
            break;
        }
        if formula.has_empty_clause() {
            return (Simplified::Conflict, true);
        }

        let literal = match pick(&formula) {
            Some(literal) => literal,
            None => break,
        };
        trace!("{}: forcing {}", rule, literal);

        let next = match assign(&formula, literal) {
            Simplified::Formula(next) => next,
            Simplified::Conflict => {
                trace!("{}: conflict on {}", rule, literal);
                return (Simplified::Conflict, true);
            }
        };

        if next.same_clauses(&formula) {
            // forcing the literal was a no-op, repeating it would never end
            break;
        }
        changed = true;
        formula = next;
    }

    (Simplified::Formula(formula), changed)
}

/// First unit clause in formula order.
fn first_unit(formula: &Cnf) -> Option<Literal> {
    formula.clauses().iter().find_map(Clause::unit)
}

/// Repeatedly forces the literal of the first unit clause.
pub fn propagate_units(formula: Cnf) -> (Simplified, bool) {
    fixpoint(formula, "unit propagation", first_unit)
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct VariableCol(usize);

impl From<usize> for VariableCol {
    fn from(index: usize) -> Self {
        VariableCol(index)
    }
}

impl From<VariableCol> for usize {
    fn from(index: VariableCol) -> Self {
        index.0
    }
}

/// Phases a variable has been seen with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Occurrence {
    positive: bool,
    negative: bool,
}

impl Occurrence {
    fn record(&mut self, positive: bool) {
        if positive {
            self.positive = true;
        } else {
            self.negative = true;
        }
    }

    /// The only phase seen, if exactly one was.
    fn pure_phase(&self) -> Option<bool> {
        match (self.positive, self.negative) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }
}

/// Polarity table over the variables occurring in a formula, in ascending order.
struct PolarityTable {
    variables: TiVec<VariableCol, Variable>,
    occurrences: TiVec<VariableCol, Occurrence>,
}

impl PolarityTable {
    fn from_cnf(formula: &Cnf) -> Self {
        let mut variables: Vec<Variable> = formula
            .clauses()
            .iter()
            .flat_map(|clause| clause.iter().map(|literal| literal.variable()))
            .collect();
        variables.sort_unstable();
        variables.dedup();

        let variables: TiVec<VariableCol, Variable> = variables.into();
        let mut occurrences: TiVec<VariableCol, Occurrence> =
            vec![Occurrence::default(); variables.len()].into();

        for clause in formula.clauses() {
            for literal in clause.iter() {
                if let Ok(index) = variables.raw.binary_search(&literal.variable()) {
                    occurrences[VariableCol::from(index)].record(literal.positive());
                }
            }
        }

        PolarityTable {
            variables,
            occurrences,
        }
    }

    /// Pure literal of the smallest pure variable.
    fn first_pure(&self) -> Option<Literal> {
        self.occurrences
            .iter_enumerated()
            .find_map(|(col, occurrence)| {
                let phase = occurrence.pure_phase()?;
                Some(Literal::new(self.variables[col], phase))
            })
    }
}

/// Repeatedly forces the pure literal of the smallest pure variable.
pub fn eliminate_pure_literals(formula: Cnf) -> (Simplified, bool) {
    fixpoint(formula, "pure literal", |formula| {
        PolarityTable::from_cnf(formula).first_pure()
    })
}
