//! Bracket CLI
//!
//! Build a bracket from an Open Bracket Format file, or print the round plan
//! for an entrant count.

use bracketgen::config::{config_path, env_default, load_config, load_env_file};
use bracketgen::obf::{read_tournament, write_tournament};
use bracketgen::seeding::seed_projection;
use bracketgen::topology::{bye_count, round_sizes, total_matches};
use bracketgen::{init_tracing, Bracket, BracketConfig, Layout};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

fn print_usage() {
    println!("Bracket topology generator");
    println!();
    println!("Usage:");
    println!("  bracketgen build <tournament.json> [--layout L] [--wins N] [--no-reset] [--finalize] [--out FILE]");
    println!("  bracketgen plan <entrants> [--layout L]");
    println!("  bracketgen help");
    println!();
    println!("Layouts:");
    println!("  single-elim   - Single elimination (default)");
    println!("  double-elim   - Double elimination with grand finals");
    println!("  round-robin   - Everyone plays everyone once");
    println!();
    println!("Settings come from bracket.json (or BRACKET_CONFIG_PATH), then");
    println!("BRACKET_LAYOUT, BRACKET_GRAND_FINALS_RESET and BRACKET_NUMBER_TO_WIN.");
}

fn parse_layout(raw: Option<&String>) -> Result<Layout, String> {
    raw.ok_or_else(|| "--layout needs a value".to_string())?.parse()
}

fn run_build(args: &[String], mut config: BracketConfig) -> Result<(), String> {
    let Some(input) = args.first() else {
        return Err("build requires a tournament file".to_string());
    };
    let mut out: Option<PathBuf> = None;
    let mut finalize = false;
    let mut layout_flag = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--layout" | "-l" => {
                layout_flag = Some(parse_layout(args.get(i + 1))?);
                i += 1;
            }
            "--wins" | "-w" => {
                let raw = args.get(i + 1).ok_or("--wins needs a value")?;
                config.number_to_win = raw
                    .parse::<u32>()
                    .ok()
                    .filter(|wins| *wins > 0)
                    .ok_or_else(|| format!("--wins expects a positive number, got {raw}"))?;
                i += 1;
            }
            "--no-reset" => config.grand_finals_reset = false,
            "--finalize" => finalize = true,
            "--out" | "-o" => {
                out = Some(PathBuf::from(args.get(i + 1).ok_or("--out needs a value")?));
                i += 1;
            }
            other => return Err(format!("Unknown option {other}")),
        }
        i += 1;
    }

    let mut tournament = read_tournament(Path::new(input))?;
    if let Some(layout) = layout_flag {
        // An explicit flag beats the structure recorded in the file.
        tournament.event.tournament_structure = layout.as_str().to_string();
    }
    let mut bracket = Bracket::from_tournament(&tournament, &config);
    if finalize {
        bracket.finalize_standings();
    }
    let result = bracket.to_tournament();

    match out {
        Some(path) => {
            write_tournament(&path, &result)?;
            info!("Wrote {} sets to {}", result.sets.len(), path.display());
            println!("Wrote {} sets to {}", result.sets.len(), path.display());
        }
        None => {
            let payload = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
            println!("{payload}");
        }
    }
    Ok(())
}

/// Pairings of a round when the stronger seed always wins, byes left out.
fn favourite_pairings(seeds: &[u32], n: usize) -> String {
    seeds
        .chunks(2)
        .filter(|pair| pair.iter().all(|seed| *seed as usize <= n))
        .map(|pair| format!("{}v{}", pair[0], pair[1]))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_plan(args: &[String], config: BracketConfig) -> Result<(), String> {
    let raw = args.first().ok_or("plan requires an entrant count")?;
    let n = raw
        .parse::<usize>()
        .map_err(|_| format!("Entrant count must be a number, got {raw}"))?;
    let mut layout = config.layout;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--layout" | "-l" => {
                layout = parse_layout(args.get(i + 1))?;
                i += 1;
            }
            other => return Err(format!("Unknown option {other}")),
        }
        i += 1;
    }

    println!("=== {layout}: {n} entrants ===");
    if layout.is_elimination() {
        println!("Byes: {}", bye_count(n));
    }
    let sizes = round_sizes(n, layout);
    let projection = if layout.is_elimination() { seed_projection(sizes.len()) } else { Vec::new() };
    for (idx, size) in sizes.iter().enumerate() {
        match projection.get(idx) {
            Some(seeds) => println!("Round {}: {} matches ({})", idx + 1, size, favourite_pairings(seeds, n)),
            None => println!("Round {}: {} matches", idx + 1, size),
        }
    }
    println!("Total matches: {}", total_matches(n, layout));
    if layout == Layout::DoubleElimination && n > 2 && config.grand_finals_reset {
        println!("Plus a grand finals reset if the losers bracket side wins");
    }
    Ok(())
}

fn main() {
    load_env_file(Path::new(".env"));
    let _guard = init_tracing(env_default("BRACKET_LOG_DIR").as_deref().map(Path::new));

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let config = match load_config(&config_path()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match args[1].as_str() {
        "build" => run_build(&args[2..], config),
        "plan" => run_plan(&args[2..], config),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("Unknown command: {other}")),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
