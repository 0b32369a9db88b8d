//! WhatLang - CLI
//!
//! Runs a WhatLang program from a file, an inline string or piped stdin.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wl_core::{Interpreter, SourceOrigin, Value, Variables, WlConfig};

/// Exit status for programs that fail inside the interpreter
const EXIT_ENGINE_ERROR: i32 = 126;

#[derive(Parser, Debug)]
#[command(name = "wl", version)]
#[command(about = "WhatLang, a stack-based programming language", long_about = None)]
struct Cli {
    /// File to execute (`-` reads standard input)
    file: Option<String>,

    /// Execute code directly
    #[arg(short = 'e', long = "execute", value_name = "CODE")]
    execute: Option<String>,

    /// Seed a variable before the program starts (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_define)]
    define: Vec<(String, String)>,

    /// Maximum number of values on one stack
    #[arg(long)]
    max_stack_size: Option<usize>,

    /// Maximum number of nested frames
    #[arg(long)]
    max_frame_depth: Option<usize>,

    /// Abort after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Log interpreter activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Where the program text comes from
#[derive(Debug, PartialEq, Eq)]
enum ProgramSource {
    Inline(String),
    File(String),
    Stdin,
    /// No program given on an interactive terminal
    Interactive,
}

impl ProgramSource {
    fn resolve(cli: &Cli, stdin_is_terminal: bool) -> Self {
        if let Some(code) = &cli.execute {
            return ProgramSource::Inline(code.clone());
        }
        match cli.file.as_deref() {
            Some(path) if path != "-" => ProgramSource::File(path.to_string()),
            None if stdin_is_terminal => ProgramSource::Interactive,
            _ => ProgramSource::Stdin,
        }
    }

    fn load(self) -> Result<Option<(String, SourceOrigin)>> {
        match self {
            ProgramSource::Inline(code) => Ok(Some((code, SourceOrigin::named("<execute>")))),
            ProgramSource::File(path) => {
                let code = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path))?;
                Ok(Some((code, SourceOrigin::named(path))))
            }
            ProgramSource::Stdin => {
                let mut code = String::new();
                io::stdin()
                    .read_to_string(&mut code)
                    .context("failed to read standard input")?;
                Ok(Some((code, SourceOrigin::named("<stdin>"))))
            }
            ProgramSource::Interactive => Ok(None),
        }
    }
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_lowercase(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {:?}", raw)),
    }
}

/// Numbers become Number values, anything else a String
fn define_value(raw: &str) -> Value {
    match raw.trim().parse::<f64>() {
        Ok(n) if !raw.trim().is_empty() => Value::Number(n),
        _ => Value::from(raw),
    }
}

fn seed_variables(defines: &[(String, String)]) -> Variables {
    let mut variables = Variables::new();
    for (name, raw) in defines {
        variables.store(name.clone(), define_value(raw));
    }
    variables
}

fn config_from(cli: &Cli) -> WlConfig {
    let mut config = WlConfig::new();
    if let Some(size) = cli.max_stack_size {
        config.max_stack_size = size;
    }
    if let Some(depth) = cli.max_frame_depth {
        config.max_frame_depth = depth;
    }
    config
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Run the CLI and return the process exit status
fn run(cli: &Cli) -> Result<i32> {
    let source = ProgramSource::resolve(cli, io::stdin().is_terminal());
    let Some((code, origin)) = source.load()? else {
        // interactive mode is not available
        Cli::command().print_help()?;
        return Ok(0);
    };
    debug!(origin = %origin.name, chars = code.chars().count(), "program loaded");

    let variables = seed_variables(&cli.define);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error: Option<io::Error> = None;

    let result = {
        let sink = |text: &str| {
            if write_error.is_none() {
                if let Err(e) = out.write_all(text.as_bytes()) {
                    write_error = Some(e);
                }
            }
        };
        Interpreter::new(&code, sink)
            .with_config(config_from(cli))
            .with_origin(origin)
            .with_variables(&variables)
            .and_then(|mut interpreter| match cli.max_steps {
                Some(max_steps) => interpreter.run_with_budget(max_steps),
                None => interpreter.run(),
            })
    };

    if let Some(e) = write_error {
        return Err(e).context("failed to write program output");
    }
    out.flush().context("failed to flush program output")?;

    match result {
        Ok(()) => Ok(0),
        Err(err) => {
            eprintln!("{}", err);
            Ok(EXIT_ENGINE_ERROR)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let status = match run(&cli) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    process::exit(status);
}
