use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::settings::RatingSettings;
use crate::database::{self, matches, players, DbPool, ReplayMatch};
use crate::rating::{Contender, EloCalculator, Outcome};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub players_reset: usize,
    pub matches_replayed: usize,
    pub matches_failed: usize,
}

/// Recomputes every rating from scratch by replaying all stored matches
/// in chronological order.
pub struct RebuildService {
    pool: DbPool,
    calculator: EloCalculator,
}

impl RebuildService {
    pub fn new(pool: DbPool, rating: &RatingSettings) -> Self {
        Self {
            pool,
            calculator: EloCalculator::from_settings(rating),
        }
    }

    pub fn run(&self) -> Result<RebuildSummary> {
        info!("=== Starting Rating Rebuild ===\n");

        let mut conn = database::get_connection(&self.pool)?;
        let mut summary = RebuildSummary {
            players_reset: self.reset(&mut conn)?,
            ..RebuildSummary::default()
        };
        info!(
            "  → Reset {} players to {}",
            summary.players_reset,
            self.calculator.initial_rating()
        );

        let history = matches::list_for_replay(&conn)?;
        info!("  → Replaying {} matches", history.len());

        for (idx, replay) in history.iter().enumerate() {
            if (idx + 1) % 1000 == 0 {
                info!("  Replayed {}/{}", idx + 1, history.len());
            }

            match self.replay_match(&mut conn, replay) {
                Ok(()) => summary.matches_replayed += 1,
                Err(e) => {
                    warn!("Skipping match {} during rebuild: {:#}", replay.id, e);
                    summary.matches_failed += 1;
                }
            }
        }

        info!(
            "  → {} matches replayed, {} failed\n",
            summary.matches_replayed, summary.matches_failed
        );
        info!("=== Rebuild Complete ===");
        Ok(summary)
    }

    fn reset(&self, conn: &mut Connection) -> Result<usize> {
        let tx = conn.transaction()?;
        let reset = players::reset_all_ratings(&tx, self.calculator.initial_rating())?;
        matches::clear_snapshots(&tx)?;
        tx.commit().context("Failed to commit rating reset")?;
        Ok(reset)
    }

    fn replay_match(&self, conn: &mut Connection, replay: &ReplayMatch) -> Result<()> {
        let tx = conn.transaction()?;

        let player1 = load_contender(&tx, replay.player1_id)?;
        let player2 = load_contender(&tx, replay.player2_id)?;

        let outcome = Outcome::from_game_wins(replay.player1_wins, replay.player2_wins);
        let change = self.calculator.calculate(player1, player2, outcome);

        players::apply_match_result(&tx, replay.player1_id, change.player1_after, outcome.player1_result())?;
        players::apply_match_result(&tx, replay.player2_id, change.player2_after, outcome.player2_result())?;
        matches::record_snapshot(&tx, &replay.id, &change)?;

        tx.commit().context("Failed to commit replayed match")?;
        Ok(())
    }
}

fn load_contender(conn: &Connection, player_id: i64) -> Result<Contender> {
    let player = players::find_by_id(conn, player_id)?
        .with_context(|| format!("Player {} does not exist", player_id))?;
    Ok(Contender::new(player.current_elo, player.matches_played))
}
