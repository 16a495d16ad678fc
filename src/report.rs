/*!
Custom Snafu error printer
*/

use std::error::Error as StdError;

/// Error type returned from `main`.
/// Prints the error followed by its whole `source()` chain.
pub struct Report(Box<dyn StdError>);

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.0)?;

        if let Some(source) = self.0.source() {
            writeln!(f, "\nCaused by:")?;
            for (i, e) in std::iter::successors(Some(source), |&e| e.source()).enumerate() {
                writeln!(f, "  {}: {}", i, e)?;
            }
        }

        Ok(())
    }
}

impl<E: Into<Box<dyn StdError>>> From<E> for Report {
    fn from(e: E) -> Self {
        Report(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_file, Error};

    #[test]
    fn prints_source_chain() {
        let error: Error = parse_file("testcases/does-not-exist.cnf").unwrap_err();
        let printed = format!("{:?}", Report::from(error));

        assert!(printed.starts_with("I/O error occurred while parsing CNF file"));
        assert!(printed.contains("Caused by:"));
        assert!(printed.contains("  0: "));
    }
}
