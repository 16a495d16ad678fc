use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Cnf, Literal, Variable};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while parsing CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading CNF input"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MissingProblemDefinition,
    #[snafu(display("Malformed problem line '{}'", line))]
    MalformedProblemDefinition { line: String },
    #[snafu(display("Unexpected line '{}' before the problem line", line))]
    UnexpectedLine { line: String },
}

/// Problem line values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    num_variables: usize,
    num_clauses: usize,
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('c') || line.starts_with('%')
}

fn parse_header(line: &str) -> Result<Header, Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    // We only support CNF DIMACS format
    ensure!(
        splitted.len() >= 4 && splitted[0] == "p" && splitted[1] == "cnf",
        MalformedProblemDefinition { line }
    );

    match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
        (Ok(num_variables), Ok(num_clauses)) => {
            ensure!(
                num_variables <= Variable::MAX_VARIABLE_ID,
                MalformedProblemDefinition { line }
            );
            Ok(Header {
                num_variables,
                num_clauses,
            })
        }
        _ => MalformedProblemDefinition { line }.fail(),
    }
}

/// Parse a line to a clause.
///
/// Returns `None` when the line holds a malformed literal; such a line is skipped as a whole.
fn parse_line(line: &str) -> Option<Clause> {
    let mut literals = Vec::new();
    let mut terminated = false;

    for token in line.split_whitespace() {
        if let Ok(0) = token.parse::<i64>() {
            terminated = true;
            break;
        }
        match token.parse::<Literal>() {
            Ok(literal) => literals.push(literal),
            Err(e) => {
                warn!("Skipping clause line '{}': invalid literal '{}' ({})", line, token, e);
                return None;
            }
        }
    }

    if !terminated {
        warn!("Clause line '{}' is not terminated by 0", line);
    }

    Some(Clause::new(literals))
}

/// Parses CNF formula from a buffered reader.
pub fn parse(reader: impl BufRead) -> Result<Cnf, Error> {
    let mut lines = reader.lines();

    // skip comments until we find the problem definition
    let header = loop {
        let line = match lines.next() {
            Some(line) => line.context(ReadError)?,
            None => return MissingProblemDefinition.fail(),
        };
        let trimmed = line.trim();
        if is_comment(trimmed) {
            continue;
        }
        ensure!(
            trimmed.starts_with('p'),
            UnexpectedLine {
                line: trimmed.to_owned(),
            }
        );
        break parse_header(trimmed)?;
    };

    debug!(
        "Problem line: {} variables, {} clauses",
        header.num_variables, header.num_clauses
    );

    let mut cnf = Cnf::new(header.num_variables);

    for line in lines {
        let line = line.context(ReadError)?;
        let trimmed = line.trim();
        if is_comment(trimmed) {
            continue;
        }
        match parse_line(trimmed) {
            Some(clause) if !clause.is_empty() => cnf.add_clause(clause),
            Some(_) => debug!("Line '{}' holds no literal, ignored", trimmed),
            None => (),
        }
    }

    if cnf.num_clauses() != header.num_clauses {
        warn!(
            "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
            cnf.num_clauses(),
            header.num_clauses
        );
    }
    if cnf.num_variables() != header.num_variables {
        warn!(
            "Variable IDs up to {} are used but the problem definition declares {}",
            cnf.num_variables(),
            header.num_variables
        );
    }

    Ok(cnf)
}

/// Parses CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(IoError {
        path: path.to_owned(),
    })?);

    parse(file)
}

/// Parses CNF formula from an in-memory string
pub fn parse_str(input: &str) -> Result<Cnf, Error> {
    parse(input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::clause;

    #[test]
    fn parse_basic() {
        let cnf = parse_str(
            "c  simple_v3_c2.cnf
c
p cnf 3 2
1 -3 0
2 3 -1 0",
        )
        .unwrap();

        assert_eq!(cnf.num_variables(), 3);
        assert_eq!(cnf.clauses(), &vec![clause(&[1, -3]), clause(&[2, 3, -1])]);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let cnf = parse_str(
            "
c leading comment

p  cnf  2  2
c inside
1 2 0

% trailer
-1 0
",
        )
        .unwrap();

        assert_eq!(cnf.clauses(), &vec![clause(&[1, 2]), clause(&[-1])]);
    }

    #[test]
    fn malformed_literal_drops_only_its_line() {
        let cnf = parse_str(
            "p cnf 3 3
1 2 0
1 x 3 0
-2 3 0",
        )
        .unwrap();

        assert_eq!(cnf.clauses(), &vec![clause(&[1, 2]), clause(&[-2, 3])]);
    }

    #[test]
    fn zero_terminates_clause() {
        let cnf = parse_str(
            "p cnf 3 2
1 -2 0 3
2 2 -3",
        )
        .unwrap();

        assert_eq!(cnf.clauses(), &vec![clause(&[1, -2]), clause(&[2, -3])]);
    }

    #[test]
    fn lone_zero_adds_no_clause() {
        let cnf = parse_str("p cnf 1 2\n0\n1 0\n").unwrap();
        assert_eq!(cnf.clauses(), &vec![clause(&[1])]);
    }

    #[test]
    fn count_mismatch_is_tolerated() {
        let cnf = parse_str("p cnf 2 5\n1 -5 0\n").unwrap();
        assert_eq!(cnf.num_clauses(), 1);
        assert_eq!(cnf.num_variables(), 5);
    }

    #[test]
    fn missing_header_fails() {
        assert!(matches!(
            parse_str("c nothing\n"),
            Err(Error::MissingProblemDefinition)
        ));
        assert!(matches!(
            parse_str("1 2 0\np cnf 2 1\n"),
            Err(Error::UnexpectedLine { .. })
        ));
    }

    #[test]
    fn variable_count_out_of_range_fails() {
        assert!(matches!(
            parse_str("p cnf 5000000000 1\n1 0\n"),
            Err(Error::MalformedProblemDefinition { .. })
        ));

        let cnf = parse_str("p cnf 4294967295 1\n1 0\n").unwrap();
        assert_eq!(cnf.num_variables(), Variable::MAX_VARIABLE_ID);
    }

    #[test]
    fn malformed_header_fails() {
        assert!(matches!(
            parse_str("p cnf 2\n1 0\n"),
            Err(Error::MalformedProblemDefinition { .. })
        ));
        assert!(matches!(
            parse_str("p cnf two 1\n1 0\n"),
            Err(Error::MalformedProblemDefinition { .. })
        ));
        assert!(matches!(
            parse_str("p sat 2 1\n1 0\n"),
            Err(Error::MalformedProblemDefinition { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            parse_file("testcases/does-not-exist.cnf"),
            Err(Error::IoError { .. })
        ));
    }
}
