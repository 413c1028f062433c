// oberon07: scan and parse an Oberon-07 module

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use crossterm::style::Stylize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use oberon07::outline::{Outline, OutlineError};
use oberon07::parser::lexer::Scanner;
use oberon07::parser::parse::{Parser, ParserOptions, DEFAULT_MAX_DEPTH};
use oberon07::parser::trace::{LogTrace, NoTrace, Trace};
use oberon07::parser::FrontendError;

/// Scan and parse an Oberon-07 source file.
#[derive(clap::Parser, Debug)]
#[command(name = "oberon07", version, about = "Oberon-07 scanner and parser")]
struct Args {
    /// Oberon source file to parse.
    #[arg(short, long, value_name = "PATH")]
    source: PathBuf,

    /// Print tokens and the parse tree, and narrate parser progress.
    #[arg(long)]
    debug: bool,

    /// Maximum nesting of grammar productions before giving up.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read '{path}': {source}")]
    Read { path: String, source: io::Error },
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error(transparent)]
    Outline(#[from] OutlineError),
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(outline) => {
            println!("{}", outline.to_string().green());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", format!("Error: {err}").red());
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default filter.
fn init_logging(debug: bool) {
    let default = if debug { "oberon07=debug" } else { "oberon07=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<Outline, CliError> {
    let source = fs::read(&args.source).map_err(|source| CliError::Read {
        path: args.source.display().to_string(),
        source,
    })?;
    let tracer: &dyn Trace = if args.debug { &LogTrace } else { &NoTrace };

    let tokens = Scanner::new(&source)
        .with_tracer(tracer)
        .run()
        .into_result()
        .map_err(FrontendError::from)?;

    if args.debug {
        for (index, token) in tokens.iter().enumerate() {
            println!("{index:>5}  {:>4}:{:<3}  {token}", token.line(), token.column());
        }
    }

    let tree = Parser::new(&tokens)
        .with_tracer(tracer)
        .with_options(ParserOptions {
            max_depth: args.max_depth,
        })
        .parse_program()
        .map_err(FrontendError::from)?;

    if args.debug {
        print!("{tree}");
    }

    Ok(Outline::from_tree(&tree)?)
}
