//! CLI tool for docgrid - applies a JSON edit script and outputs the result
//!
//! Usage:
//!   docgrid_cli <script.json>              # Pretty JSON to stdout
//!   docgrid_cli - < script.json            # Read the script from stdin
//!   docgrid_cli <script.json> -o out.json  # Write to a file
//!   docgrid_cli <script.json> --compact    # Single-line JSON

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Read, Write};

use docgrid::{EditScript, ScriptOutcome};

const USAGE: &str = "Usage: docgrid_cli <script.json | -> [-o output.json] [--compact]";

#[derive(Debug, Default)]
struct Options {
    input: String,
    output: Option<String>,
    compact: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut input = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => options.output = Some(args.next().ok_or("-o needs a path")?),
            "--compact" => options.compact = true,
            _ if input.is_none() => input = Some(arg),
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }
    options.input = input.ok_or("missing script path")?;
    Ok(options)
}

fn read_script(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| format!("Error reading stdin: {e}"))?;
        return Ok(source);
    }
    fs::read_to_string(input).map_err(|e| format!("Error reading {input}: {e}"))
}

fn render(outcome: &ScriptOutcome, compact: bool) -> Result<String, String> {
    let json = if compact {
        serde_json::to_string(outcome)
    } else {
        serde_json::to_string_pretty(outcome)
    };
    json.map_err(|e| format!("Error serializing JSON: {e}"))
}

fn run(options: &Options) -> Result<(), String> {
    let source = read_script(&options.input)?;
    let script =
        EditScript::from_json(&source).map_err(|e| format!("Error parsing script: {e}"))?;
    let outcome = script
        .run()
        .map_err(|e| format!("Error applying script: {e}"))?;

    let skipped = outcome.applied.iter().filter(|&&done| !done).count();
    if skipped > 0 {
        eprintln!(
            "{skipped} of {} operations had no effect",
            outcome.applied.len()
        );
    }

    let json = render(&outcome, options.compact)?;
    match &options.output {
        Some(path) => {
            fs::write(path, &json).map_err(|e| format!("Error writing {path}: {e}"))?;
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|e| format!("Error writing stdout: {e}"))?;
        }
    }
    Ok(())
}

fn main() {
    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run(&options) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
