//! Tree path query tool.
//!
//! Reads a tree and a list of queries from one input file, then prints the
//! path between the two nodes of every query, one line per query.

use anyhow::Result;
use std::env;
use treepath::{run, Config, ConfigOverrides};

/// Command-line flags, applied on top of an optional config file.
#[derive(Default)]
struct Args {
    config_file: Option<String>,
    overrides: ConfigOverrides,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-format" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-format requires an argument");
                }
                parsed.overrides.format = Some(args[i].clone());
            }
            "-strategy" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-strategy requires an argument");
                }
                parsed.overrides.strategy = Some(args[i].clone());
            }
            "-out" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-out requires a file path argument");
                }
                parsed.overrides.output = Some(args[i].clone());
            }
            "-config" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-config requires a file path argument");
                }
                parsed.config_file = Some(args[i].clone());
            }
            "-strict" => {
                parsed.overrides.strict = true;
            }
            "-v" => {
                parsed.overrides.verbosity = parsed.overrides.verbosity.max(1);
            }
            "-vv" => {
                parsed.overrides.verbosity = 2;
            }
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Warning: Unknown argument: {}", arg);
            }
            arg => {
                if parsed.overrides.input.is_some() {
                    anyhow::bail!("only one input file may be given (got '{}')", arg);
                }
                parsed.overrides.input = Some(arg.to_string());
            }
        }
        i += 1;
    }

    Ok(parsed)
}

fn build_config(args: Args) -> Result<Config> {
    let config = match &args.config_file {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.with_overrides(args.overrides)
}

fn print_help() {
    println!("Tree path finder");
    println!("Usage: treepath [INPUT] [OPTIONS]");
    println!();
    println!("INPUT defaults to input2.txt. Files ending in .jsonl are read as JSON Lines,");
    println!("files ending in .br are Brotli-decompressed.");
    println!();
    println!("OPTIONS:");
    println!("  -format <F>            Input format: auto, text, jsonl (default: auto)");
    println!("  -strategy <S>          Path search: dfs, ancestor (default: dfs)");
    println!("  -out <FILE>            Write paths to FILE instead of stdout");
    println!("  -config <FILE>         Read settings from a JSON config file");
    println!("  -strict                Fail if any node record was dropped");
    println!("  -v, -vv                Log info / debug messages to stderr");
    println!("  -h, -help, --help      Show this help message");
}

fn main() -> Result<()> {
    let config = build_config(parse_args()?)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    let summary = run(&config)?;
    log::info!(
        "answered {} queries on {} nodes ({} empty, {} records dropped)",
        summary.queries,
        summary.nodes,
        summary.empty_results,
        summary.dropped.len()
    );

    Ok(())
}
