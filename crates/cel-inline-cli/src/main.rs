// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! cel-inline: apply variable substitutions to a serialized expression tree.

mod output;
mod request;

use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

use cel_ast::Expr;

use request::{CliError, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Constants and aliases, recursive walk.
    Rewrite,
    /// Constants and aliases, explicit-stack walk.
    RewriteIterative,
    /// Constants only; aliases in the request are ignored.
    Inline,
}

fn main() {
    output::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "rewrite" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: cel-inline rewrite <request.json> [--iterative]");
                process::exit(1);
            };
            let mode = match args.get(3).map(String::as_str) {
                None => Mode::Rewrite,
                Some("--iterative") => Mode::RewriteIterative,
                Some(other) => {
                    output::show_error(
                        &format!("unknown option `{}`", other),
                        Some("the only option is --iterative"),
                    );
                    process::exit(1);
                }
            };
            cmd_rewrite(path, mode);
        }
        "inline" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: cel-inline inline <request.json>");
                process::exit(1);
            };
            cmd_rewrite(path, Mode::Inline);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("cel-inline {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            output::show_error(&format!("unknown command `{}`", other), None);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("cel-inline {} - substitute variables in CEL expression trees", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: cel-inline <command> [args]");
    println!();
    println!("Commands:");
    println!("  {} <file> [--iterative]  Apply constants and aliases", output::command_name("rewrite"));
    println!("  {} <file>                 Apply constants only", output::command_name("inline"));
    println!("  {}                        Show this help", output::command_name("help"));
    println!("  {}                     Show version", output::command_name("version"));
    println!();
    println!("The request file is JSON: {{\"expr\": ..., \"constants\": {{...}}, \"aliases\": {{...}}}}");
}

fn cmd_rewrite(path: &str, mode: Mode) {
    match run(Path::new(path), mode) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            let hint = match &e {
                CliError::Rewrite(_) => Some("the tree contains a node this tool cannot interpret"),
                _ => None,
            };
            output::show_error(&e.to_string(), hint);
            process::exit(1);
        }
    }
}

fn run(path: &Path, mode: Mode) -> Result<String, CliError> {
    let request = Request::load(path)?;
    let rewritten = apply(&request, mode)?;
    serde_json::to_string_pretty(&*rewritten).map_err(CliError::Encode)
}

fn apply(request: &Request, mode: Mode) -> Result<Arc<Expr>, CliError> {
    let rewritten = match mode {
        Mode::Rewrite => cel_inline::rewrite(&request.expr, &request.constants, &request.aliases)?,
        Mode::RewriteIterative => {
            cel_inline::rewrite_iterative(&request.expr, &request.constants, &request.aliases)?
        }
        Mode::Inline => cel_inline::inline_constants(&request.expr, &request.constants)?,
    };
    Ok(rewritten)
}
