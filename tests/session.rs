//! End-to-end console sessions against scripted input.

use std::io::Cursor;

use rand::rngs::StdRng;
use rand::SeedableRng;

use adaptive_guess::game::{GuessRound, JsonProfileStore, MemoryProfileStore, ProfileStore, Session};
use adaptive_guess::learn::{LearnerConfig, LearnerState};

const SEED: u64 = 1;

fn config() -> LearnerConfig {
    LearnerConfig::default().with_seed(SEED)
}

/// Secret and style the first forward round of a fresh session will use.
fn first_round(username: &str) -> GuessRound {
    let mut rng = StdRng::seed_from_u64(SEED);
    GuessRound::start(&LearnerState::new(username), &config(), &mut rng)
}

fn run_script<S: ProfileStore>(store: S, username: &str, script: &str) -> (S, LearnerState, String) {
    let mut session = Session::open(store, username, config(), StdRng::seed_from_u64(SEED)).unwrap();
    let mut input = Cursor::new(script.to_string());
    let mut out = Vec::new();
    session.run(&mut input, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let (store, state) = session.into_parts();
    (store, state, text)
}

#[test]
fn test_first_try_solve_is_learned_and_saved() {
    let expected = first_round("ada");
    let script = format!("1\n{}\n3\n5\n", expected.secret());

    let (store, state, text) = run_script(MemoryProfileStore::new(), "ada", &script);

    assert!(text.contains(&format!("Using hint style: {}", expected.style())));
    assert!(text.contains("Bang! You got it in 1 attempts!"));
    assert!(text.contains("Games played: 1"));
    assert!(text.contains("Thanks for playing!"));

    assert_eq!(state.games_played, 1);
    assert_eq!(state.total_attempts, 1);
    assert!(state.threshold.k() < 0.1, "fast solve should tighten k");
    assert_eq!(state.hint_stats().get(expected.style()).pulls, 1);
    assert_eq!(state.hint_stats().total_pulls(), 1);

    let saved = store.load("ada").unwrap();
    assert_eq!(saved, state);
}

#[test]
fn test_reverse_mode_learns_alpha() {
    // neutral bias over [1, 100] opens at 51
    let (_, state, text) = run_script(MemoryProfileStore::new(), "bob", "2\n\nc\n5\n");
    assert!(text.contains("My guess #1: 51"));
    assert!(text.contains("Got it in 1 attempts!"));
    assert!(state.bias.alpha() > 0.5);
    assert_eq!(state.games_played, 0);
}

#[test]
fn test_reverse_mode_follows_answers() {
    let script = "2\n\nx\nh\nl\nc\n5\n";
    let (_, state, text) = run_script(MemoryProfileStore::new(), "cy", script);
    assert!(text.contains("Please enter h, l, or c."));
    assert!(text.contains("Higher than 51. Range: [52, 100]"));
    assert!(text.contains("My guess #2: 76"));
    assert!(text.contains("Lower than 76. Range: [52, 75]"));
    assert!(text.contains("Got it in 3 attempts!"));
    assert!(state.bias.alpha() > 0.5);
}

#[test]
fn test_abandoned_round_is_not_learned() {
    let (_, state, text) = run_script(MemoryProfileStore::new(), "dee", "1\nq\n5\n");
    assert!(text.contains("The number was"));
    assert_eq!(state.games_played, 0);
    assert_eq!(state.threshold.k(), 0.1);
    assert_eq!(state.hint_stats().total_pulls(), 0);
}

#[test]
fn test_profile_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let expected = first_round("eve");
    let script = format!("1\n{}\n5\n", expected.secret());

    let (_, first, text) = run_script(JsonProfileStore::new(dir.path()), "eve", &script);
    assert!(!text.contains("Welcome back"));
    assert!(dir.path().join("user_eve.json").exists());

    let (_, second, text) = run_script(JsonProfileStore::new(dir.path()), "eve", "3\n5\n");
    assert!(text.contains("Welcome back, eve! I remember you."));
    assert_eq!(second, first);
}

#[test]
fn test_unknown_menu_choice() {
    let (_, _, text) = run_script(MemoryProfileStore::new(), "fay", "9\n4\n5\n");
    assert!(text.contains("Please enter 1-5."));
    assert!(text.contains("Profile saved for fay"));
}
