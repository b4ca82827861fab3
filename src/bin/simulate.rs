//! Batch simulation of synthetic players.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --rounds <N>         Forward and reverse rounds per player (default: 200)
//!   --config <FILE>      Learner configuration JSON file (optional)
//!   --seed <N>           Base random seed (default: config seed, else 42)
//!   --threads <N>        Worker threads (default: auto)
//!   --output <FILE>      Write reports as JSON (optional)

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use adaptive_guess::game::{SimulationReport, SyntheticPlayer};
use adaptive_guess::game::simulate::simulate_many;
use adaptive_guess::learn::LearnerConfig;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut rounds: u32 = 200;
    let mut config_file: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut threads: usize = 0;
    let mut output_file: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rounds" | "-r" => {
                i += 1;
                if i < args.len() {
                    rounds = args[i].parse().unwrap_or(rounds);
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok().or(seed);
                }
            }
            "--threads" | "-t" => {
                i += 1;
                if i < args.len() {
                    threads = args[i].parse().unwrap_or(0);
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let config = match &config_file {
        Some(path) => match LearnerConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => LearnerConfig::default(),
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }
    let seed = resolve_seed(seed, &config);

    if threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            eprintln!("Error configuring threads: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let players = SyntheticPlayer::roster();

    println!("=== Adaptive Guess Simulation ===");
    println!();
    println!("Players: {} | Rounds per player: {} | Seed: {}", players.len(), rounds, seed);
    println!(
        "Target attempts: {} | Epsilon: {} | Rates: k={} alpha={}",
        config.target_attempts,
        config.epsilon,
        config.threshold_learning_rate,
        config.bias_learning_rate
    );
    println!();

    let progress = ProgressBar::new(players.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let start = Instant::now();
    let results = simulate_many(&players, &config, rounds, seed, |player| {
        progress.set_message(player.name.clone());
        progress.inc(1);
    });
    progress.finish_with_message("done");

    let mut reports: Vec<SimulationReport> = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => eprintln!("Simulation failed: {}", e),
        }
    }

    println!();
    println!(
        "{:<12} {:>7} {:>9} {:>7} {:>7} {:>7} {:>8} {:>13}",
        "player", "solved", "abandoned", "k", "alpha", "range", "rev avg", "best style"
    );
    for report in &reports {
        let state = &report.state;
        println!(
            "{:<12} {:>7} {:>9} {:>7.3} {:>7.3} {:>7} {:>8.2} {:>13}",
            report.player.name,
            report.solved,
            report.abandoned,
            state.threshold.k(),
            state.bias.alpha(),
            state.range_size,
            report.reverse_mean_attempts.unwrap_or(0.0),
            report
                .best_style
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!();
    println!("Total time: {:.2}s", start.elapsed().as_secs_f64());

    if let Some(path) = output_file {
        match save_reports(&reports, &path) {
            Ok(()) => println!("Saved JSON: {}", path),
            Err(e) => {
                eprintln!("Error saving reports: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Base seed when neither `--seed` nor the config file names one.
const DEFAULT_SEED: u64 = 42;

/// `--seed` wins over the config file's `seed`.
fn resolve_seed(flag: Option<u64>, config: &LearnerConfig) -> u64 {
    flag.or(config.seed).unwrap_or(DEFAULT_SEED)
}

fn save_reports(reports: &[SimulationReport], path: &str) -> io::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())
}

fn print_help() {
    println!("Adaptive Guess Simulation");
    println!();
    println!("Usage: simulate [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -r, --rounds <N>         Rounds per player (default: 200)");
    println!("  -c, --config <FILE>      Learner configuration JSON file");
    println!("  -s, --seed <N>           Base random seed (default: config seed, else 42)");
    println!("  -t, --threads <N>        Number of threads (default: auto)");
    println!("  -o, --output <FILE>      Write reports as JSON");
    println!("  -h, --help               Show this help");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_precedence() {
        let seeded = LearnerConfig::from_json_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(resolve_seed(None, &seeded), 7);
        assert_eq!(resolve_seed(Some(3), &seeded), 3);
        assert_eq!(resolve_seed(None, &LearnerConfig::default()), DEFAULT_SEED);
    }
}
