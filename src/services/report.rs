use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::settings::RatingSettings;
use crate::database::{
    self, matches, rankings, DbPool, LeaderboardRow, MatchResult, MatchupRow, Player,
    PlayerMatchRow, Tournament,
};

/// Everything a static rankings page needs, in one document
#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub generated_at: DateTime<Utc>,
    pub leaderboard: Vec<LeaderboardRow>,
    pub players: Vec<PlayerReport>,
    pub matchups: Vec<MatchupRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub player: LeaderboardRow,
    pub history: Vec<PlayerMatchRow>,
}

pub struct ReportService {
    pool: DbPool,
    min_ranked_matches: i32,
    min_matchup_matches: i32,
}

impl ReportService {
    pub fn new(pool: DbPool, rating: &RatingSettings) -> Self {
        Self {
            pool,
            min_ranked_matches: rating.min_ranked_matches,
            min_matchup_matches: rating.min_matchup_matches,
        }
    }

    pub fn build(&self) -> Result<RankingReport> {
        let conn = database::get_connection(&self.pool)?;

        let leaderboard = rankings::leaderboard(&conn, self.min_ranked_matches)?;
        let players = leaderboard
            .iter()
            .map(|row| {
                Ok(PlayerReport {
                    player: row.clone(),
                    history: matches::player_history(&conn, row.player_id)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let matchups = rankings::matchups(&conn, self.min_matchup_matches)?;

        Ok(RankingReport {
            generated_at: Utc::now(),
            leaderboard,
            players,
            matchups,
        })
    }

    /// Builds the report and writes it as pretty JSON to `path`
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<RankingReport> {
        let path = path.as_ref();
        let report = self.build()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

        info!(
            "Wrote report for {} ranked players to {}",
            report.leaderboard.len(),
            path.display()
        );
        Ok(report)
    }
}

pub fn print_leaderboard(rows: &[LeaderboardRow]) {
    if rows.is_empty() {
        println!("No ranked players yet.");
        return;
    }

    println!(
        "{}",
        format!(
            "{:>4}  {:<28} {:>6} {:>7} {:>5} {:>6} {:>7}",
            "Rank", "Player", "Elo", "Played", "Wins", "Losses", "Win %"
        )
        .bold()
    );
    for row in rows {
        let rank = format!("{:>4}", row.rank);
        let rank = if row.rank <= 3 { rank.yellow().bold() } else { rank.normal() };
        println!(
            "{}  {:<28} {:>6} {:>7} {:>5} {:>6} {:>6.1}%",
            rank,
            row.display_name,
            row.current_elo,
            row.matches_played,
            row.wins,
            row.losses,
            row.win_rate
        );
    }
}

pub fn print_history(player: &Player, rows: &[PlayerMatchRow]) {
    println!(
        "{} ({} Elo, {}-{} in {} matches)",
        player.display_name.bold(),
        player.current_elo,
        player.wins,
        player.losses,
        player.matches_played
    );

    for row in rows {
        let date = row
            .tournament_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "undated".to_string());
        let result = match row.result {
            MatchResult::Win => row.result.as_str().green(),
            MatchResult::Loss => row.result.as_str().red(),
            MatchResult::Draw => row.result.as_str().yellow(),
        };
        println!(
            "{:<10} T{:<8} R{:<3} {:<5} {}-{} vs {:<28} {}",
            date,
            row.tournament_melee_id,
            row.round,
            result,
            row.player_wins,
            row.opponent_wins,
            row.opponent_name,
            elo_change(row.player_elo_before, row.player_elo_after)
        );
    }
}

fn elo_change(before: Option<i32>, after: Option<i32>) -> String {
    match (before, after) {
        (Some(before), Some(after)) => format!("{} → {} ({:+})", before, after, after - before),
        _ => "not rated".to_string(),
    }
}

pub fn print_matchups(rows: &[MatchupRow]) {
    if rows.is_empty() {
        println!("No matchups with enough games.");
        return;
    }

    println!(
        "{}",
        format!("{:<28} {:<28} {:>7} {:>7}", "Player", "Opponent", "Record", "Win %").bold()
    );
    for row in rows {
        println!(
            "{:<28} {:<28} {:>7} {:>6.1}%",
            row.player1,
            row.player2,
            format!("{}-{}", row.player1_wins, row.player2_wins),
            row.player1_win_rate
        );
    }
}

pub fn print_missing_dates(tournaments: &[Tournament], base_url: &str) {
    if tournaments.is_empty() {
        println!("{}", "Every tournament has a date.".green());
        return;
    }

    println!("{}", format!("{} tournaments without a date:", tournaments.len()).yellow());
    for tournament in tournaments {
        println!(
            "  {:<10} {}/Tournament/View/{}",
            tournament.melee_id,
            base_url.trim_end_matches('/'),
            tournament.melee_id
        );
    }
}
