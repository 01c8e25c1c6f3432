mod debug_report;

use polofield::{RuleBlock, rules::schedule::recognizers};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let block = RuleBlock {
        text: format!("{} - {}", config.start_date, config.end_date),
        start_date: config.start_date,
        end_date: config.end_date,
        rules: config.input.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect(),
    };

    let outcome = recognizers::get()
        .iter()
        .find_map(|r| r.recognize(&block).map(|known| (r.name, known)));
    debug_report::print_run(&block, outcome.as_ref().map(|(name, known)| (*name, known)), config.color);
    if outcome.is_none() {
        std::process::exit(1);
    }
}

struct CliConfig {
    input: String,
    start_date: String,
    end_date: String,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut start_date: Option<String> = None;
    let mut end_date: Option<String> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("polofield {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--start" => {
                let value = args.next().ok_or_else(|| "error: --start expects a value".to_string())?;
                start_date = Some(parse_iso_date(&value)?);
            }
            "--end" => {
                let value = args.next().ok_or_else(|| "error: --end expects a value".to_string())?;
                end_date = Some(parse_iso_date(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join("\n");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--start=") => {
                start_date = Some(parse_iso_date(arg.trim_start_matches("--start="))?);
            }
            _ if arg.starts_with("--end=") => {
                end_date = Some(parse_iso_date(arg.trim_start_matches("--end="))?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join("\n");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    let start_date = start_date.ok_or_else(|| format!("error: --start is required\n\n{}", help_text()))?;
    let end_date = end_date.ok_or_else(|| format!("error: --end is required\n\n{}", help_text()))?;
    if end_date < start_date {
        return Err(format!("error: --end '{end_date}' precedes --start '{start_date}'"));
    }

    Ok(CliConfig { input, start_date, end_date, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_iso_date(value: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| value.to_string())
        .map_err(|_| format!("error: invalid date '{value}' (expected YYYY-MM-DD)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "polofield {version}

Cycle track schedule recognition CLI. Lines of one schedule block are read
from --input (newline-separated), remaining args (one line per arg), or stdin.

Usage:
  polofield --start <date> --end <date> [OPTIONS] [--] <line...>
  polofield --start <date> --end <date> [OPTIONS] --input <text>

Options:
  --start <date>             First date the block covers (YYYY-MM-DD). Required.
  --end <date>               Last date the block covers (YYYY-MM-DD). Required.
  -i, --input <text>         Block body text. If omitted, reads remaining args
                             or stdin when no args are provided.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  A recognizer matched and intervals were compiled.
  1  No recognizer matched the block.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
