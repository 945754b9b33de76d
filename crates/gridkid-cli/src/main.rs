//! GridKid CLI - formula evaluation tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridkid_formula::{EvaluationOptions, Interpreter, DEFAULT_MAX_DEPTH};
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "gridkid")]
#[command(author, version, about = "Evaluate formulas against a grid of cells")]
struct Cli {
    /// Increase log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Longest chain of cell dereferences to follow
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, global = true)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run formulas in order against one grid, printing each result
    Eval {
        /// Formula text, e.g. "{A,1}[4 ** 2]" or "{A,1} + 1"
        #[arg(required = true)]
        formulas: Vec<String>,
    },

    /// Read formulas from stdin, one per line, until EOF or `quit`
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut interpreter = Interpreter::new().with_options(EvaluationOptions {
        max_depth: cli.max_depth,
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Eval { formulas } => eval(&mut interpreter, &formulas, &mut out),
        Commands::Repl => {
            let stdin = io::stdin();
            repl(&mut interpreter, stdin.lock(), &mut out, &mut io::stderr())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Run each formula, stopping at the first failure
fn eval<W: Write>(interpreter: &mut Interpreter, formulas: &[String], out: &mut W) -> Result<()> {
    for formula in formulas {
        let outcome = interpreter
            .parse(formula)
            .with_context(|| format!("Failed to run '{}'", formula))?;
        writeln!(out, "{}", outcome)?;
    }
    Ok(())
}

/// Run formulas line by line
///
/// Errors are reported on `err` and do not end the session.
fn repl<R: BufRead, W: Write, E: Write>(
    interpreter: &mut Interpreter,
    input: R,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        match interpreter.parse(line) {
            Ok(outcome) => writeln!(out, "{}", outcome)?,
            Err(e) => {
                log::debug!("'{}' failed: {:?}", line, e);
                writeln!(err, "Error: {}", e)?;
            }
        }
    }

    log::debug!("session ended with {} cells", interpreter.grid().len());
    Ok(())
}
