//! Headless autoplay: plays N games with the greedy move finder and reports
//! per-game outcomes plus a summary.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

use tui_match3::core::{detect, GameSession};
use tui_match3::engine::best_move;
use tui_match3::types::{Coord, GameStatus, Swap, LEVELS};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: u32,
    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
struct GameResult {
    seed: u64,
    levels_cleared: u32,
    /// 1-based level the game ended on
    final_level: u32,
    all_levels_cleared: bool,
    total_score: u64,
    swaps: u32,
    reverted: u32,
    /// Swaps spent on boards without a productive move
    forced: u32,
    max_cascade: u32,
    promotions: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    games: u32,
    first_seed: u64,
    average_score: f64,
    average_levels_cleared: f64,
    all_cleared: u32,
    anomaly_count: usize,
    /// Games by the level they ended on
    final_levels: BTreeMap<u32, u32>,
    results: Vec<GameResult>,
}

fn main() -> Result<()> {
    tui_match3::logging::init_stderr()?;
    let cli = Cli::parse();

    let mut results = Vec::with_capacity(cli.games as usize);
    for i in 0..cli.games {
        let seed = cli.seed.wrapping_add(i as u64);
        let result = play(seed)?;
        if !result.anomalies.is_empty() {
            warn!(seed, anomalies = result.anomalies.len(), "game finished with anomalies");
        }
        info!(seed, score = result.total_score, levels = result.levels_cleared, "game finished");
        results.push(result);
    }

    let summary = summarize(cli.seed, results);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for r in &summary.results {
            println!(
                "seed {:>6}  level {}  cleared {}  score {:>7}  swaps {:>3}  reverted {:>2}  cascade {:>2}{}",
                r.seed,
                r.final_level,
                r.levels_cleared,
                r.total_score,
                r.swaps,
                r.reverted,
                r.max_cascade,
                if r.all_levels_cleared { "  ALL CLEAR" } else { "" }
            );
        }
        println!(
            "{} games  avg score {:.1}  avg levels {:.2}  all clear {}  anomalies {}",
            summary.games,
            summary.average_score,
            summary.average_levels_cleared,
            summary.all_cleared,
            summary.anomaly_count
        );
    }
    Ok(())
}

/// Play one game to the end, greedily.
fn play(seed: u64) -> Result<GameResult> {
    let mut session = GameSession::new(&LEVELS, seed)?;
    let mut result = GameResult {
        seed,
        ..GameResult::default()
    };

    loop {
        match session.status() {
            GameStatus::LevelComplete => {
                result.total_score += session.score() as u64;
                result.levels_cleared += 1;
                session = session.advance_level(&LEVELS)?;
                continue;
            }
            GameStatus::GameOver => break,
            GameStatus::Playing => {}
        }

        let swap = match best_move(session.board()) {
            Some(m) => m.swap,
            None => {
                // Dead board: burn a move with a swap that will be reverted.
                result.forced += 1;
                Swap::new(Coord::new(0, 0), Coord::new(0, 1))
            }
        };
        let outcome = session.apply_swap(swap)?;
        let trace = &outcome.trace;
        result.swaps += 1;
        if trace.reverted() {
            result.reverted += 1;
        }
        result.max_cascade = result.max_cascade.max(trace.steps.len() as u32);
        result.promotions += trace.promotions().count() as u32;
        debug!(seed, ?swap, passes = trace.steps.len(), gained = trace.score_gained(), "swap");

        let next = outcome.session;
        if next.board().empty_count() != 0 {
            result
                .anomalies
                .push(format!("swap {}: empty cells after settle", result.swaps));
        }
        if next.status() == GameStatus::Playing && !detect(next.board())?.is_empty() {
            result
                .anomalies
                .push(format!("swap {}: board not settled", result.swaps));
        }
        session = next;
    }

    if !session.all_levels_cleared() {
        result.total_score += session.score() as u64;
    }
    result.all_levels_cleared = session.all_levels_cleared();
    result.final_level = session.level_index() as u32 + 1;
    Ok(result)
}

fn summarize(first_seed: u64, results: Vec<GameResult>) -> RunSummary {
    let games = results.len() as u32;
    let n = (games.max(1)) as f64;
    let mut final_levels = BTreeMap::new();
    for r in &results {
        *final_levels.entry(r.final_level).or_insert(0) += 1;
    }
    RunSummary {
        games,
        first_seed,
        average_score: results.iter().map(|r| r.total_score as f64).sum::<f64>() / n,
        average_levels_cleared: results.iter().map(|r| r.levels_cleared as f64).sum::<f64>() / n,
        all_cleared: results.iter().filter(|r| r.all_levels_cleared).count() as u32,
        anomaly_count: results.iter().map(|r| r.anomalies.len()).sum(),
        final_levels,
        results,
    }
}
