//! Interactive adaptive number-guessing game.
//!
//! Usage:
//!   cargo run --release --bin guess -- [OPTIONS]
//!
//! Options:
//!   --user <NAME>        Profile name (prompted for if omitted)
//!   --profiles <DIR>     Directory holding user_<name>.json files (default: .)
//!   --config <FILE>      Learner configuration JSON file (optional)
//!   --seed <N>           Random seed (optional)
//!   --reset-corrupt      Start fresh if the stored profile is unreadable

use std::env;
use std::io;
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use adaptive_guess::game::{prompt_username, JsonProfileStore, Session, SessionError};
use adaptive_guess::learn::LearnerConfig;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut username: Option<String> = None;
    let mut profiles_dir = ".".to_string();
    let mut config_file: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut reset_corrupt = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                i += 1;
                if i < args.len() {
                    username = Some(args[i].clone());
                }
            }
            "--profiles" | "-p" => {
                i += 1;
                if i < args.len() {
                    profiles_dir = args[i].clone();
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
                    seed = args[i].parse().ok();
                }
            }
            "--reset-corrupt" => {
                reset_corrupt = true;
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

    let mut config = match &config_file {
        Some(path) => match LearnerConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => LearnerConfig::default(),
    };
    if let Some(s) = seed {
        config = config.with_seed(s);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let username = match username {
        Some(name) => name,
        None => match prompt_username(&mut input, &mut output) {
            Ok(name) => name,
            Err(e) => {
                eprintln!("Error reading username: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let store = JsonProfileStore::new(&profiles_dir);

    let opened = if reset_corrupt {
        Session::open_or_reset(store, &username, config, rng)
    } else {
        Session::open(store, &username, config, rng)
    };
    let mut session = match opened {
        Ok(session) => session,
        Err(SessionError::Profile(e)) => {
            eprintln!("Couldn't load profile: {}", e);
            eprintln!("Run with --reset-corrupt to start over.");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match session.run(&mut input, &mut output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Adaptive Number Guessing Game");
    println!();
    println!("Usage: guess [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -u, --user <NAME>        Profile name (prompted for if omitted)");
    println!("  -p, --profiles <DIR>     Profile directory (default: .)");
    println!("  -c, --config <FILE>      Learner configuration JSON file");
    println!("  -s, --seed <N>           Random seed");
    println!("      --reset-corrupt      Start fresh if the stored profile is unreadable");
    println!("  -h, --help               Show this help");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=debug           Trace learner updates on stderr");
}
