//! Match replay harness.
//!
//! Reads a match script (rules plus a point stream with undos) from JSON,
//! replays it through the kernel twice and prints the scoreline and the
//! canonical hash.
//!
//! ```text
//! { "config": { "use_advantage": true }, "points": ["P1", "P2", "undo", "P1"] }
//! ```

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tennis_engine::config::MatchConfig;
use tennis_engine::domain::{MatchState, PlayerId};
use tennis_engine::engine::ScoreKeeper;
use tennis_engine::hashing::canonical_hash;
use tennis_engine::ENGINE_VERSION;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchScript {
    #[serde(default)]
    config: MatchConfig,
    points: Vec<String>,
}

enum Step {
    Point(PlayerId),
    Undo,
}

fn parse_step(token: &str) -> Result<Step> {
    match token {
        "P1" | "p1" => Ok(Step::Point(PlayerId::P1)),
        "P2" | "p2" => Ok(Step::Point(PlayerId::P2)),
        "undo" => Ok(Step::Undo),
        other => bail!("unknown step {:?}: expected P1, P2 or undo", other),
    }
}

fn run(script: &MatchScript) -> Result<MatchState> {
    let steps = script
        .points
        .iter()
        .map(|t| parse_step(t))
        .collect::<Result<Vec<_>>>()?;

    let mut keeper = ScoreKeeper::new(script.config.clone()).context("invalid match config")?;
    for step in &steps {
        match step {
            Step::Point(winner) => keeper.add_point(*winner),
            Step::Undo => keeper.undo(),
        };
    }
    Ok(keeper.into_state())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = env::args()
        .nth(1)
        .context("usage: tennis_engine <match_script.json>")?;
    let data = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?;
    let script: MatchScript =
        serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path))?;

    info!(engine_version = ENGINE_VERSION, steps = script.points.len(), "replaying {}", path);

    let first = run(&script)?;
    let second = run(&script)?;
    let h1 = canonical_hash(&first);
    let h2 = canonical_hash(&second);
    if h1 != h2 {
        bail!("determinism failure: run 1 = {}, run 2 = {}", h1, h2);
    }

    let config = &first.config;
    println!(
        "{} vs {}",
        config.display_name(PlayerId::P1),
        config.display_name(PlayerId::P2)
    );
    println!("sets:   {}", first.score_summary());
    println!("points: {}", first.points);
    println!("server: {}", config.display_name(first.serve.server));
    match first.winner {
        Some(winner) => println!("winner: {}", config.display_name(winner)),
        None => println!("status: in progress"),
    }
    println!("events: {}", first.history.len());
    println!("hash:   {}", h1);
    Ok(())
}
