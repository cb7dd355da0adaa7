use anyhow::Result;
use std::env;
use treepath::{InputFormat, InputWriter, TreeGenerator};

struct Config {
    generator: TreeGenerator,
    output_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            generator: TreeGenerator::new(),
            output_file: None,
        }
    }
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-nodes" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-nodes requires an argument");
                }
                config.generator.nodes = args[i].parse()?;
            }
            "-queries" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-queries requires an argument");
                }
                config.generator.queries = args[i].parse()?;
            }
            "-max_children" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-max_children requires an argument");
                }
                config.generator.max_children = args[i].parse()?;
            }
            "-seed" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-seed requires an argument");
                }
                config.generator.seed = args[i].parse()?;
            }
            "-missing" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-missing requires a percentage argument");
                }
                let percent: u8 = args[i].parse()?;
                if percent > 100 {
                    anyhow::bail!("-missing must be between 0 and 100 (got {})", percent);
                }
                config.generator.missing_percent = percent;
            }
            "-out" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-out requires a file path argument");
                }
                config.output_file = Some(args[i].clone());
            }
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Warning: Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_help() {
    println!("Random tree input generator");
    println!("Usage: treepath-gen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -nodes <N>             Number of node records (default: 100)");
    println!("  -queries <K>           Number of path queries (default: 10)");
    println!("  -max_children <C>      Maximum children per node, 0 = unbounded (default: 4)");
    println!("  -seed <S>              Random seed (default: 42)");
    println!("  -missing <P>           Percentage of records whose parent comes later (default: 0)");
    println!("  -out <FILE>            Output file path (default: input2.txt)");
    println!("                         .jsonl writes JSON Lines, .br compresses with Brotli");
    println!("  -h, -help, --help      Show this help message");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = parse_args()?;

    let output_path = config.output_file.clone()
        .unwrap_or_else(|| "input2.txt".to_string());

    let input = config.generator.generate();
    let mut writer = InputWriter::new(&output_path, InputFormat::Auto)?;
    writer.write_input(&input)?;

    log::info!(
        "wrote {} records and {} queries as {}",
        input.records.len(),
        input.queries.len(),
        writer.format()
    );

    if config.output_file.is_none() {
        println!("Tree written to: {}", output_path);
    }

    Ok(())
}
