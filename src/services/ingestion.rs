use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::settings::RatingSettings;
use crate::database::{self, matches, players, tournaments, DbPool, NewMatch, Tournament};
use crate::domain::{parse_matches, CanonicalMatch};
use crate::services::dates::DateResolver;
use crate::services::inbox::Inbox;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub files_retained: usize,
    pub matches_inserted: usize,
    pub matches_duplicate: usize,
    pub matches_failed: usize,
}

impl IngestionSummary {
    pub fn has_new_matches(&self) -> bool {
        self.matches_inserted > 0
    }
}

enum StoreOutcome {
    Inserted,
    Duplicate,
}

/// Moves pending match files into the store. Never touches ratings.
pub struct IngestionService {
    pool: DbPool,
    inbox: Inbox,
    dates: DateResolver,
    initial_rating: i32,
}

impl IngestionService {
    pub fn new(pool: DbPool, inbox: Inbox, dates: DateResolver, rating: &RatingSettings) -> Self {
        Self {
            pool,
            inbox,
            dates,
            initial_rating: rating.initial_rating,
        }
    }

    pub async fn run(&self) -> Result<IngestionSummary> {
        info!("=== Starting Match Ingestion ===\n");

        let files = self.inbox.list_pending()?;
        info!("  → Found {} pending files", files.len());

        let mut summary = IngestionSummary::default();
        for path in &files {
            self.ingest_file(path, &mut summary).await;
        }

        info!(
            "  → Files: {} processed, {} failed, {} retained",
            summary.files_processed, summary.files_failed, summary.files_retained
        );
        info!(
            "  → Matches: {} new, {} duplicate, {} failed\n",
            summary.matches_inserted, summary.matches_duplicate, summary.matches_failed
        );
        info!("=== Ingestion Complete ===");
        Ok(summary)
    }

    async fn ingest_file(&self, path: &Path, summary: &mut IngestionSummary) {
        let Some(tournament_id) = self.inbox.tournament_id(path) else {
            warn!("{} is not a Matches-tournament-<id>.json file", path.display());
            self.quarantine(path, summary);
            return;
        };

        let parsed = match read_matches(path, tournament_id) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse {}: {:#}", path.display(), e);
                self.quarantine(path, summary);
                return;
            }
        };

        if parsed.is_empty() {
            info!("{} has no playable matches", path.display());
            self.mark_processed(path, summary);
            return;
        }

        let tournament = match self.prepare_tournament(tournament_id).await {
            Ok(tournament) => tournament,
            Err(e) => {
                warn!("Failed to store tournament {}: {:#}", tournament_id, e);
                summary.files_retained += 1;
                return;
            }
        };

        let mut failed = 0;
        for canonical in &parsed {
            match self.store_match(&tournament, canonical) {
                Ok(StoreOutcome::Inserted) => summary.matches_inserted += 1,
                Ok(StoreOutcome::Duplicate) => summary.matches_duplicate += 1,
                Err(e) => {
                    warn!("Failed to store match {}: {:#}", canonical.id, e);
                    summary.matches_failed += 1;
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            warn!(
                "{} of {} matches from {} failed, leaving it pending",
                failed,
                parsed.len(),
                path.display()
            );
            summary.files_retained += 1;
        } else {
            info!("Ingested {} ({} matches)", path.display(), parsed.len());
            self.mark_processed(path, summary);
        }
    }

    async fn prepare_tournament(&self, tournament_id: i64) -> Result<Tournament> {
        let stored = {
            let conn = database::get_connection(&self.pool)?;
            tournaments::find_by_melee_id(&conn, tournament_id)?
        };
        let stored_date = stored.as_ref().and_then(|t| t.date);

        let date = self.dates.resolve(tournament_id, stored_date).await;
        if date.is_none() {
            warn!("Tournament {} has no date; its matches replay first", tournament_id);
        }

        let conn = database::get_connection(&self.pool)?;
        let tournament = tournaments::upsert_tournament(&conn, tournament_id, date)?;

        if date.is_some() && tournament.date != date {
            warn!(
                "Tournament {} keeps its stored date {:?}; use set-date to change it",
                tournament_id, tournament.date
            );
        }
        Ok(tournament)
    }

    fn store_match(&self, tournament: &Tournament, canonical: &CanonicalMatch) -> Result<StoreOutcome> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction()?;

        if matches::match_exists(&tx, &canonical.id)? {
            debug!("Match {} already stored", canonical.id);
            return Ok(StoreOutcome::Duplicate);
        }

        let player1 = players::get_or_create_player(&tx, &canonical.player1().player, self.initial_rating)?;
        let player2 = players::get_or_create_player(&tx, &canonical.player2().player, self.initial_rating)?;

        let date_played = canonical
            .played_at
            .or_else(|| tournament.date.and_then(|d| d.and_hms_opt(0, 0, 0)));

        matches::insert_match(
            &tx,
            &NewMatch {
                id: &canonical.id,
                tournament_id: tournament.id,
                round: canonical.round,
                player1_id: player1.id,
                player2_id: player2.id,
                player1_wins: canonical.player1().game_wins,
                player2_wins: canonical.player2().game_wins,
                date_played,
            },
        )?;

        tx.commit().context("Failed to commit match")?;
        Ok(StoreOutcome::Inserted)
    }

    fn mark_processed(&self, path: &Path, summary: &mut IngestionSummary) {
        match self.inbox.move_to_processed(path) {
            Ok(_) => summary.files_processed += 1,
            Err(e) => {
                warn!("Failed to move {} to processed: {:#}", path.display(), e);
                summary.files_retained += 1;
            }
        }
    }

    fn quarantine(&self, path: &Path, summary: &mut IngestionSummary) {
        summary.files_failed += 1;
        if let Err(e) = self.inbox.move_to_failed(path) {
            warn!("Failed to move {} to failed: {:#}", path.display(), e);
        }
    }
}

fn read_matches(path: &Path, tournament_id: i64) -> Result<Vec<CanonicalMatch>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_matches(&raw, tournament_id)
}
