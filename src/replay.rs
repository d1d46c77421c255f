// Replay module for analyzing logged planning decisions
//
// This module provides functionality to:
// 1. Parse JSONL decision logs
// 2. Replay the planner on historical inputs
// 3. Compare logged vs replayed moves and check replayed moves for safety
// 4. Generate analysis reports

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::PlanLogEntry;
use crate::planner::Planner;
use crate::types::Direction;

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub tick: u64,
    pub original_move: Option<Direction>,
    pub replayed_move: Option<Direction>,
    pub matches: bool,
    /// Replayed primary move leaves the arena or enters an obstacle
    pub unsafe_move: bool,
    pub emergency_move: Option<Direction>,
    pub reached_target: bool,
    pub iterations: u32,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_ticks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    pub unsafe_moves: usize,
    pub no_moves: usize,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    seed: u64,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        let seed = config.search.rng_seed.unwrap_or(0);
        ReplayEngine {
            config,
            verbose,
            seed,
        }
    }

    /// Base seed; every tick replays with `seed ^ tick`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<PlanLogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: PlanLogEntry = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to parse JSON on line {}: {}", line_num + 1, e)
            })?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry through a fresh planner and compares the result
    pub fn replay_entry(&self, entry: &PlanLogEntry) -> Result<ReplayResult, String> {
        let rng = StdRng::seed_from_u64(self.seed ^ entry.tick);
        let mut planner = Planner::with_rng(&self.config, rng);

        let start_time = Instant::now();
        let outcome = planner
            .update(entry.head, entry.heading, entry.target, &entry.obstacles)
            .map_err(|e| format!("Tick {}: {}", entry.tick, e))?;
        let computation_time = start_time.elapsed().as_micros();

        let unsafe_move = outcome
            .primary
            .map(|dir| !Planner::is_safe_move(&outcome.grid, entry.head, dir))
            .unwrap_or(false);
        let matches = outcome.primary == entry.primary_move;

        let result = ReplayResult {
            tick: entry.tick,
            original_move: entry.primary_move,
            replayed_move: outcome.primary,
            matches,
            unsafe_move,
            emergency_move: outcome.emergency,
            reached_target: outcome.reached_target(),
            iterations: outcome.iterations,
            computation_time_us: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Tick {}: ✓ MATCH - {} (iterations: {}, time: {}us)",
                    entry.tick,
                    move_name(outcome.primary),
                    outcome.iterations,
                    computation_time
                );
            } else {
                warn!(
                    "Tick {}: ✗ MISMATCH - Original: {}, Replayed: {} (iterations: {}, time: {}us)",
                    entry.tick,
                    move_name(entry.primary_move),
                    move_name(outcome.primary),
                    outcome.iterations,
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in parallel; results keep the log order.
    /// Entries that cannot be replayed are logged and skipped.
    pub fn replay_all(&self, entries: &[PlanLogEntry]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", entry.tick, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific ticks from a log file
    pub fn replay_ticks(
        &self,
        entries: &[PlanLogEntry],
        ticks: &[u64],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for tick in ticks {
            let entry = entries
                .iter()
                .find(|e| e.tick == *tick)
                .ok_or_else(|| format!("Tick {} not found in log file", tick))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", tick, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_ticks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_ticks - matches;
        let match_rate = if total_ticks > 0 {
            (matches as f64 / total_ticks as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_ticks,
            matches,
            mismatches,
            match_rate,
            unsafe_moves: results.iter().filter(|r| r.unsafe_move).count(),
            no_moves: results.iter().filter(|r| r.replayed_move.is_none()).count(),
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Ticks:    {}", stats.total_ticks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("Unsafe Moves:   {}", stats.unsafe_moves);
        println!("No Move:        {}", stats.no_moves);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_us as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_iterations: f64 =
                results.iter().map(|r| r.iterations as f64).sum::<f64>() / results.len() as f64;
            let reached = results.iter().filter(|r| r.reached_target).count();

            println!("Average Iterations:         {:.1}", avg_iterations);
            println!("Average Computation Time:   {:.1}us", avg_time);
            println!("Searches Reaching Target:   {}/{}\n", reached, results.len());
        }

        // Mismatches are expected now and then: neighbor order is random
        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Tick {}: {} → {}{} (iterations: {}, time: {}us)",
                    result.tick,
                    move_name(result.original_move),
                    move_name(result.replayed_move),
                    if result.unsafe_move { " UNSAFE" } else { "" },
                    result.iterations,
                    result.computation_time_us
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were logged
    pub fn validate_expected_moves(
        &self,
        entries: &[PlanLogEntry],
        expected_moves: &[(u64, Vec<Direction>)], // (tick, acceptable_moves)
    ) -> Result<(), String> {
        for (tick, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.tick == *tick)
                .ok_or_else(|| format!("Tick {} not found in log", tick))?;

            let accepted = entry
                .primary_move
                .map(|m| acceptable.contains(&m))
                .unwrap_or(false);
            if !accepted {
                return Err(format!(
                    "Tick {}: Expected one of {:?}, but got {}",
                    tick,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    move_name(entry.primary_move)
                ));
            }
        }

        Ok(())
    }
}

fn move_name(dir: Option<Direction>) -> &'static str {
    dir.map(|d| d.as_str()).unwrap_or("none")
}
