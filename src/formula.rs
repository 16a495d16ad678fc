/*!
A module to represent conjunctive normal form formula.

A [`Clause`] keeps its literals sorted and free of duplicates, so a clause is
its own canonical key: two clauses compare equal exactly when they contain the
same set of literals. A [`Signature`] lifts that to whole formulas.
*/

use std::{collections::HashSet, convert::TryInto, fmt::Display, num::NonZeroU32, str::FromStr};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum VariableParseError {
    #[snafu(display("Failed to parse Variable ID"))]
    ParseIntError { source: std::num::ParseIntError },
    #[snafu(display("Variable ID must be non-zero"))]
    ZeroError,
    #[snafu(display(
        "Variable ID {} is out of range (must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: u64 },
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    pub const MAX_VARIABLE_ID: usize = std::u32::MAX as usize;
}

impl Variable {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Variable)
    }

    pub fn id(&self) -> u32 {
        self.0.get()
    }

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Literals order by variable first, and the negative phase sorts before the positive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    id: Variable,
    positive: bool,
}

impl Literal {
    pub fn new(id: Variable, positive: bool) -> Self {
        Literal { id, positive }
    }

    /// Converts a signed DIMACS literal, e.g. `-3` for ¬x3.
    pub fn from_dimacs(value: i64) -> Result<Self, VariableParseError> {
        ensure!(value != 0, ZeroError);

        let num = value.unsigned_abs();
        let id: u32 = num.try_into().ok().context(RangeError { num })?;

        Ok(Literal {
            id: Variable::new(id).context(ZeroError)?,
            positive: value > 0,
        })
    }

    pub fn to_dimacs(&self) -> i64 {
        let id = i64::from(self.id.id());
        if self.positive {
            id
        } else {
            -id
        }
    }

    pub fn variable(&self) -> Variable {
        self.id
    }

    pub fn positive(&self) -> bool {
        self.positive
    }
}

impl FromStr for Literal {
    type Err = VariableParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<i64>().context(ParseIntError)?;
        Literal::from_dimacs(value)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.positive { "" } else { "¬" }, self.id)
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            id: self.id,
            positive: !self.positive,
        }
    }
}

/// Disjunction of literals, stored as a sorted set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(mut literals: Vec<Literal>) -> Self {
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    pub fn empty() -> Self {
        Self {
            literals: Vec::new(),
        }
    }

    pub fn num_literals(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    /// Returns the sole literal of a unit clause.
    pub fn unit(&self) -> Option<Literal> {
        match self.literals.as_slice() {
            [literal] => Some(*literal),
            _ => None,
        }
    }

    /// Smallest variable mentioned in the clause.
    pub fn min_variable(&self) -> Option<Variable> {
        self.literals.first().map(Literal::variable)
    }

    /// Copy of the clause with `literal` removed.
    pub fn without(&self, literal: Literal) -> Clause {
        Clause {
            literals: self.iter().filter(|&l| l != literal).collect(),
        }
    }

    /// A clause holding both phases of some variable is always satisfied.
    pub fn is_tautology(&self) -> bool {
        // both phases of a variable are adjacent after sorting
        self.literals
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable())
    }

    /// Resolvent of `self` and `other` on `variable`:
    /// the union of both clauses without either phase of `variable`.
    pub fn resolve(&self, other: &Clause, variable: Variable) -> Clause {
        Clause::new(
            self.iter()
                .chain(other.iter())
                .filter(|literal| literal.variable() != variable)
                .collect(),
        )
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;

        let mut iter = self.literals.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for literal in iter {
            write!(f, " ∨ {}", literal)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Formula representation in Conjunctive Normal Form.
///
/// Clause order is meaningful: unit propagation picks the first unit clause in order.
/// Invariant: `num_variables` covers every variable used by a clause.
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Cnf {
            num_variables,
            clauses: Vec::new(),
        }
    }

    pub fn from_clauses(num_variables: usize, clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut cnf = Cnf::new(num_variables);
        for clause in clauses {
            cnf.add_clause(clause);
        }
        cnf
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn clauses(&self) -> &Vec<Clause> {
        &self.clauses
    }

    pub fn into_clauses(self) -> Vec<Clause> {
        self.clauses
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn add_clause(&mut self, clause: Clause) {
        if let Some(last) = clause.literals.last() {
            self.num_variables = self.num_variables.max(last.variable().as_index() + 1);
        }
        self.clauses.push(clause);
    }

    /// Whether the formula holds an empty, hence unsatisfiable, clause.
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Smallest variable that still occurs in the formula.
    pub fn min_variable(&self) -> Option<Variable> {
        self.clauses.iter().filter_map(Clause::min_variable).min()
    }

    pub fn signature(&self) -> Signature {
        let mut clauses = self.clauses.clone();
        clauses.sort_unstable();
        clauses.dedup();
        Signature(clauses)
    }

    /// Canonical equality: same set of clauses regardless of order and repeats.
    pub fn same_clauses(&self, other: &Cnf) -> bool {
        self.signature() == other.signature()
    }

    /// Drops repeated clauses, keeping the first occurrence of each.
    pub fn dedup(self) -> Cnf {
        let mut seen = HashSet::with_capacity(self.clauses.len());
        let clauses = self
            .clauses
            .into_iter()
            .filter(|clause| seen.insert(clause.clone()))
            .collect();

        Cnf {
            num_variables: self.num_variables,
            clauses,
        }
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CNF with {} variables (", self.num_variables)?;

        let mut iter = self.clauses.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for clause in iter {
            write!(f, " ∧ {}", clause)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Canonical key of a formula: its distinct clauses in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<Clause>);

impl Signature {
    pub fn num_clauses(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn contains(&self, clause: &Clause) -> bool {
        self.0.binary_search(clause).is_ok()
    }

    #[cfg(test)]
    pub fn is_subset(&self, other: &Signature) -> bool {
        self.0.iter().all(|clause| other.contains(clause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{clause, cnf, lit};

    #[test]
    fn literal_from_dimacs() {
        let literal = lit(-3);
        assert_eq!(literal.variable().id(), 3);
        assert!(!literal.positive());
        assert_eq!(literal.to_dimacs(), -3);
        assert_eq!(!literal, lit(3));

        assert!(matches!(
            Literal::from_dimacs(0),
            Err(VariableParseError::ZeroError)
        ));
        assert!(matches!(
            Literal::from_dimacs(1 << 40),
            Err(VariableParseError::RangeError { .. })
        ));
        assert!(matches!(
            "x1".parse::<Literal>(),
            Err(VariableParseError::ParseIntError { .. })
        ));
        assert_eq!("-12".parse::<Literal>().unwrap(), lit(-12));
    }

    #[test]
    fn clause_is_a_sorted_set() {
        let c = clause(&[3, -1, 3, 2]);
        assert_eq!(c.num_literals(), 3);
        assert_eq!(c.iter().map(|l| l.to_dimacs()).collect::<Vec<_>>(), vec![-1, 2, 3]);
        assert_eq!(c, clause(&[2, 3, -1]));
        assert_eq!(c.min_variable(), Variable::new(1));
        assert!(c.contains(lit(-1)));
        assert!(!c.contains(lit(1)));
    }

    #[test]
    fn clause_unit_and_without() {
        assert_eq!(clause(&[-4]).unit(), Some(lit(-4)));
        assert_eq!(clause(&[1, 2]).unit(), None);
        assert_eq!(Clause::empty().unit(), None);

        let c = clause(&[1, -2, 3]).without(lit(-2));
        assert_eq!(c, clause(&[1, 3]));
        assert!(clause(&[5]).without(lit(5)).is_empty());
    }

    #[test]
    fn tautology_detection() {
        assert!(clause(&[1, -2, 2]).is_tautology());
        assert!(!clause(&[1, -2, 3]).is_tautology());
        assert!(!Clause::empty().is_tautology());
    }

    #[test]
    fn resolve_drops_both_phases() {
        let v = Variable::new(1).unwrap();
        let r = clause(&[1, 2, 3]).resolve(&clause(&[-1, 3, -4]), v);
        assert_eq!(r, clause(&[2, 3, -4]));

        let r = clause(&[1]).resolve(&clause(&[-1]), v);
        assert!(r.is_empty());
    }

    #[test]
    fn signature_ignores_order_and_repeats() {
        let a = cnf(&[&[1, 2], &[-3], &[2, 1]]);
        let b = cnf(&[&[-3], &[1, 2]]);
        let c = cnf(&[&[-3], &[1, -2]]);

        assert!(a.same_clauses(&b));
        assert!(!a.same_clauses(&c));
        assert_eq!(a.signature().num_clauses(), 2);
        assert!(cnf(&[&[-3]]).signature().is_subset(&a.signature()));
        assert!(!c.signature().is_subset(&a.signature()));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let f = cnf(&[&[2, 1], &[-3], &[1, 2], &[-3], &[4]]).dedup();
        assert_eq!(f.clauses(), &vec![clause(&[1, 2]), clause(&[-3]), clause(&[4])]);
    }

    #[test]
    fn add_clause_grows_variable_count() {
        let mut f = Cnf::new(2);
        f.add_clause(clause(&[1, -7]));
        assert_eq!(f.num_variables(), 7);
        f.add_clause(Clause::empty());
        assert_eq!(f.num_variables(), 7);
        assert!(f.has_empty_clause());
        assert_eq!(f.min_variable(), Variable::new(1));
    }
}
