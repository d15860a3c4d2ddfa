//! Tensor graph document CLI.
//!
//! Provides the `tgc` binary with subcommands for working with serialized
//! graph documents. `check` validates a document by fully loading it;
//! `canon` re-emits a document in canonical form (callee-first function
//! order, topologically ordered node lists).
//!
//! Uses the same `tensorgraph_serial` pipeline as library consumers, so
//! a document that passes `check` loads everywhere.

use std::fs;
use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use tensorgraph_serial::{deserialize, serialize};

/// Tensor graph document tools.
#[derive(Parser)]
#[command(name = "tgc", about = "Tensor graph document tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a document by fully loading it.
    Check {
        /// Path to the document file.
        file: PathBuf,
    },

    /// Re-emit a document in canonical form.
    Canon {
        /// Path to the document file.
        file: PathBuf,

        /// Output path (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the output.
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check { file } => run_check(&file),
        Commands::Canon {
            file,
            output,
            pretty,
        } => run_canon(&file, output.as_deref(), pretty),
    };
    process::exit(exit_code);
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = document loads, 1 = serializer error,
/// 3 = I/O error.
fn run_check(file: &PathBuf) -> i32 {
    let reader = match File::open(file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: cannot open '{}': {}", file.display(), e);
            return 3;
        }
    };

    match deserialize(reader) {
        Ok((program, root)) => {
            let root_name = program
                .function(root)
                .map(|def| def.name.as_str())
                .unwrap_or("?");
            println!(
                "ok: root `{}` ({} function(s), {} node(s))",
                root_name,
                program.function_count(),
                program.node_count()
            );
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

/// Execute the canon subcommand.
///
/// Returns exit code: 0 = success, 1 = serializer error, 3 = I/O error.
fn run_canon(file: &std::path::Path, output: Option<&std::path::Path>, pretty: bool) -> i32 {
    let reader = match File::open(file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: cannot open '{}': {}", file.display(), e);
            return 3;
        }
    };

    let (program, root) = match deserialize(reader) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let text = match serialize(&program, root) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let text = if pretty {
        match reformat_pretty(&text) {
            Ok(pretty_text) => pretty_text,
            Err(e) => {
                eprintln!("error: {}", e);
                return 1;
            }
        }
    } else {
        text
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, text) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                return 3;
            }
        }
        None => println!("{}", text),
    }
    0
}

/// Re-indents a compact document for human inspection.
fn reformat_pretty(text: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    serde_json::to_string_pretty(&value)
}
