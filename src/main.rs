use std::{env::args, path::Path};

use davis_putnam::{
    parser::{self, parse_file},
    prelude::*,
    report::Report,
    solver::{DpSolver, Limits, ResolutionSolver, Solver, Verdict},
};
use log::{debug, info};
use pretty_env_logger::formatted_builder;

fn usage_string() -> String {
    format!(
        "Usage: {} <solver_name> <command>

solver_name: dp, resolution

command:
    check <file_name> [--max-iterations <n>] [--max-clauses <n>]
        - decide satisfiability of the given DIMACS CNF file",
        args().next().unwrap_or_else(|| "davis-putnam".to_owned())
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown solver '{}'\n\n{}", name, usage_string()))]
    UnknownSolver { name: String },
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Unknown option '{}'\n\n{}", name, usage_string()))]
    UnknownOption { name: String },
    #[snafu(display("Option '{}' expects a non-negative integer, found '{}'", name, value))]
    InvalidLimit {
        name: String,
        value: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

/// Reads `--max-iterations` / `--max-clauses` pairs on top of the default limits.
fn parse_limits(options: &[String]) -> Result<Limits, Error> {
    let mut limits = Limits::default();
    let mut iter = options.iter();

    while let Some(name) = iter.next() {
        let value = iter.next().context(MissingArgument)?;
        let parsed = value.parse::<usize>().context(InvalidLimit {
            name: name.as_str(),
            value: value.as_str(),
        })?;

        limits = match name.as_str() {
            "--max-iterations" => limits.with_max_iterations(parsed),
            "--max-clauses" => limits.with_max_clauses(parsed),
            _ => {
                return UnknownOption {
                    name: name.as_str(),
                }
                .fail()
            }
        };
    }

    Ok(limits)
}

fn solve_path<T: Solver>(path: &Path, limits: Limits) -> Result<Verdict, Error> {
    let formula = parse_file(path).context(ParserError)?;
    info!(
        "Loaded {} clauses over {} variables from '{}'",
        formula.num_clauses(),
        formula.num_variables(),
        path.display()
    );
    let solver = T::new(formula, limits);
    Ok(solver.solve())
}

fn dispatch_command<T: Solver>(args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("check") => {
            let path = args.get(1).context(MissingArgument)?;
            let limits = parse_limits(&args[2..])?;
            debug!("Running with {:?}", limits);
            let verdict = solve_path::<T>(path.as_ref(), limits)?;
            println!("{}", verdict);
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => MissingArgument.fail()?,
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("davis_putnam=debug");
    } else {
        builder.parse_filters("davis_putnam=warn");
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let mut args = args();

    // drop arg[0]
    args.next();

    // solver name
    let solver_name = args.next();
    let remaining: Vec<_> = args.collect();

    match solver_name.as_deref() {
        Some("dp") => dispatch_command::<DpSolver>(remaining)?,
        Some("resolution") => dispatch_command::<ResolutionSolver>(remaining)?,
        Some(name) => UnknownSolver {
            name: name.to_owned(),
        }
        .fail()?,
        None => {
            println!("{}", usage_string());
        }
    }

    Ok(())
}
