//! equity-research CLI
//!
//! Run the convertible valuation or the FX overlay simulation from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Value the reference convertible and write charts to ./out
//! equity-research convertible --output-dir out
//!
//! # Overlay scenarios from a config file, JSON output
//! equity-research overlay --config research.json --format json
//! ```

use equity_research::config::Config;
use equity_research::pipeline::{run_convertible, run_overlay};
use equity_research::report::chart::AnimationOutcome;
use std::path::PathBuf;
use std::process;

fn print_usage() {
    eprintln!(
        r#"equity-research — convertible bond valuation and FX overlay scenarios

USAGE:
    equity-research <COMMAND> [OPTIONS]

COMMANDS:
    convertible  Value the convertible, simulate returns and chart them
    overlay      Run FX overlay scenarios and export them to XLSX
    help         Show this message

OPTIONS:
    --config <FILE>      JSON configuration (defaults reproduce the reference run)
    --output-dir <DIR>   Directory for charts and exports (default: .)
    --format <FORMAT>    Output format: text (default) or json

OPTIONS (convertible):
    --no-charts          Skip writing the chart and the animation

OPTIONS (overlay):
    --no-export          Skip writing the spreadsheet

EXAMPLES:
    equity-research convertible
    equity-research convertible --output-dir charts --format json
    equity-research overlay --config research.json
    RUST_LOG=debug equity-research overlay --no-export"#
    );
}

#[derive(Debug)]
struct Options {
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    format: String,
    no_charts: bool,
    no_export: bool,
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        config_path: None,
        output_dir: None,
        format: "text".to_string(),
        no_charts: false,
        no_export: false,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config_path = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    process::exit(1);
                }));
            }
            "--output-dir" => {
                i += 1;
                options.output_dir = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--output-dir requires a directory");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                options.format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
                if options.format != "text" && options.format != "json" {
                    eprintln!("Unknown format: {}", options.format);
                    process::exit(1);
                }
            }
            "--no-charts" => options.no_charts = true,
            "--no-export" => options.no_export = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn load_config(options: &Options) -> Config {
    let mut config = Config::load(options.config_path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    if let Some(dir) = &options.output_dir {
        config.output.output_dir = dir.clone();
    }
    config
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_convertible(args: &[String]) {
    let options = parse_options(args);
    if options.no_export {
        eprintln!("--no-export applies to the overlay command");
        process::exit(1);
    }
    let config = load_config(&options);

    let report = run_convertible(&config, !options.no_charts).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if let Some(AnimationOutcome::BackendUnavailable { format, reason }) = &report.animation {
        eprintln!("Animation not saved ({}): {}", format, reason);
    }

    if options.format == "json" {
        print_json(&report);
    } else {
        println!("{}", report);
    }
}

fn cmd_overlay(args: &[String]) {
    let options = parse_options(args);
    if options.no_charts {
        eprintln!("--no-charts applies to the convertible command");
        process::exit(1);
    }
    let config = load_config(&options);

    let (table, exported) = run_overlay(&config, !options.no_export).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if options.format == "json" {
        print_json(&table);
    } else {
        println!("{}", table);
    }
    if let Some(path) = exported {
        eprintln!("Exported {} scenarios → {}", table.len(), path.display());
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "convertible" => cmd_convertible(rest),
        "overlay" => cmd_overlay(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
