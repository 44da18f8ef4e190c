use anyhow::Result;
use rusqlite::{params, Connection};

use super::models::{win_rate, LeaderboardRow, MatchupRow};

/// Players with at least `min_matches`, best rating first.
/// Ties fall back to display name, then internal id.
pub fn leaderboard(conn: &Connection, min_matches: i32) -> Result<Vec<LeaderboardRow>> {
    let sql = "SELECT id, display_name, username, current_elo, matches_played, wins, losses
               FROM players
               WHERE matches_played >= ?1
               ORDER BY current_elo DESC, display_name ASC, id ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![min_matches], |row| {
            let matches_played: i32 = row.get(4)?;
            let wins: i32 = row.get(5)?;
            Ok(LeaderboardRow {
                rank: 0,
                player_id: row.get(0)?,
                display_name: row.get(1)?,
                username: row.get(2)?,
                current_elo: row.get(3)?,
                matches_played,
                wins,
                losses: row.get(6)?,
                win_rate: win_rate(wins, matches_played),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(assign_ranks(rows))
}

fn assign_ranks(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardRow> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| LeaderboardRow {
            rank: idx as i32 + 1,
            ..row
        })
        .collect()
}

/// Head-to-head records between display names that met at least `min_matches` times.
/// Both orientations are returned, so (A, B) and (B, A) are always answerable.
pub fn matchups(conn: &Connection, min_matches: i32) -> Result<Vec<MatchupRow>> {
    let sql = "
        WITH sides AS (
            SELECT p1.display_name AS player, p2.display_name AS opponent,
                   m.player1_wins AS player_games, m.player2_wins AS opponent_games
            FROM matches m
            JOIN players p1 ON m.player1_id = p1.id
            JOIN players p2 ON m.player2_id = p2.id
            UNION ALL
            SELECT p2.display_name, p1.display_name, m.player2_wins, m.player1_wins
            FROM matches m
            JOIN players p1 ON m.player1_id = p1.id
            JOIN players p2 ON m.player2_id = p2.id
        )
        SELECT
            player,
            opponent,
            SUM(CASE WHEN player_games > opponent_games THEN 1 ELSE 0 END),
            SUM(CASE WHEN opponent_games > player_games THEN 1 ELSE 0 END),
            COUNT(*)
        FROM sides
        WHERE player <> opponent
        GROUP BY player, opponent
        HAVING COUNT(*) >= ?1
        ORDER BY player, opponent
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![min_matches], |row| {
            let player1_wins: i32 = row.get(2)?;
            let matches_played: i32 = row.get(4)?;
            Ok(MatchupRow {
                player1: row.get(0)?,
                player2: row.get(1)?,
                player1_wins,
                player2_wins: row.get(3)?,
                matches_played,
                player1_win_rate: win_rate(player1_wins, matches_played),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
