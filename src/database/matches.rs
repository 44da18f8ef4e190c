use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{Match, MatchResult, NewMatch, PlayerMatchRow, ReplayMatch};
use crate::rating::RatingChange;

/// Undated tournaments sort as if played on this day, i.e. before everything else
pub const UNDATED_SENTINEL: &str = "1970-01-01";

const MATCH_COLUMNS: &str = "id, tournament_id, round, player1_id, player2_id, player1_wins, player2_wins, date_played, player1_elo_before, player2_elo_before, player1_elo_after, player2_elo_after";

pub fn match_exists(conn: &Connection, match_id: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM matches WHERE id = ?1",
            params![match_id],
            |row| row.get(0),
        )
        .context("Failed to check whether match exists")?;
    Ok(count > 0)
}

pub fn insert_match(conn: &Connection, new_match: &NewMatch) -> Result<()> {
    let sql = "INSERT INTO matches (id, tournament_id, round, player1_id, player2_id, player1_wins, player2_wins, date_played) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

    conn.execute(
        sql,
        params![
            new_match.id,
            new_match.tournament_id,
            new_match.round,
            new_match.player1_id,
            new_match.player2_id,
            new_match.player1_wins,
            new_match.player2_wins,
            new_match.date_played
        ],
    )
    .with_context(|| format!("Failed to insert match {}", new_match.id))?;
    Ok(())
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        round: row.get(2)?,
        player1_id: row.get(3)?,
        player2_id: row.get(4)?,
        player1_wins: row.get(5)?,
        player2_wins: row.get(6)?,
        date_played: row.get(7)?,
        player1_elo_before: row.get(8)?,
        player2_elo_before: row.get(9)?,
        player1_elo_after: row.get(10)?,
        player2_elo_after: row.get(11)?,
    })
}

pub fn list_all(conn: &Connection) -> Result<Vec<Match>> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM matches ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("Failed to count matches")
}

/// Every match in replay order: tournament date (undated first), tournament
/// id, round, then match id so the order is total.
pub fn list_for_replay(conn: &Connection) -> Result<Vec<ReplayMatch>> {
    let sql = format!(
        "SELECT m.id, t.melee_id, t.date, m.round, m.player1_id, m.player2_id, m.player1_wins, m.player2_wins
         FROM matches m
         JOIN tournaments t ON m.tournament_id = t.id
         ORDER BY COALESCE(t.date, '{UNDATED_SENTINEL}') ASC, t.melee_id ASC, m.round ASC, m.id ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ReplayMatch {
                id: row.get(0)?,
                tournament_melee_id: row.get(1)?,
                tournament_date: row.get(2)?,
                round: row.get(3)?,
                player1_id: row.get(4)?,
                player2_id: row.get(5)?,
                player1_wins: row.get(6)?,
                player2_wins: row.get(7)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn clear_snapshots(conn: &Connection) -> Result<usize> {
    conn.execute(
        "UPDATE matches SET player1_elo_before = NULL, player2_elo_before = NULL, player1_elo_after = NULL, player2_elo_after = NULL",
        [],
    )
    .context("Failed to clear rating snapshots")
}

pub fn record_snapshot(conn: &Connection, match_id: &str, change: &RatingChange) -> Result<()> {
    let sql = "UPDATE matches SET player1_elo_before = ?1, player2_elo_before = ?2, player1_elo_after = ?3, player2_elo_after = ?4 WHERE id = ?5";

    let updated = conn
        .execute(
            sql,
            params![
                change.player1_before,
                change.player2_before,
                change.player1_after,
                change.player2_after,
                match_id
            ],
        )
        .context("Failed to record rating snapshot")?;

    if updated == 0 {
        anyhow::bail!("Match {} does not exist", match_id);
    }
    Ok(())
}

/// Every match of `player_id`, oriented so "player" is always that player
pub fn player_history(conn: &Connection, player_id: i64) -> Result<Vec<PlayerMatchRow>> {
    let sql = format!(
        "SELECT
            m.id,
            t.melee_id,
            t.date,
            m.round,
            CASE WHEN m.player1_id = ?1 THEN m.player2_id ELSE m.player1_id END,
            CASE WHEN m.player1_id = ?1 THEN p2.display_name ELSE p1.display_name END,
            CASE WHEN m.player1_id = ?1 THEN m.player1_wins ELSE m.player2_wins END,
            CASE WHEN m.player1_id = ?1 THEN m.player2_wins ELSE m.player1_wins END,
            CASE WHEN m.player1_id = ?1 THEN m.player1_elo_before ELSE m.player2_elo_before END,
            CASE WHEN m.player1_id = ?1 THEN m.player1_elo_after ELSE m.player2_elo_after END
         FROM matches m
         JOIN players p1 ON m.player1_id = p1.id
         JOIN players p2 ON m.player2_id = p2.id
         JOIN tournaments t ON m.tournament_id = t.id
         WHERE m.player1_id = ?1 OR m.player2_id = ?1
         ORDER BY COALESCE(t.date, '{UNDATED_SENTINEL}') ASC, t.melee_id ASC, m.round ASC, m.id ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            let player_wins: i32 = row.get(6)?;
            let opponent_wins: i32 = row.get(7)?;
            Ok(PlayerMatchRow {
                match_id: row.get(0)?,
                tournament_melee_id: row.get(1)?,
                tournament_date: row.get(2)?,
                round: row.get(3)?,
                opponent_id: row.get(4)?,
                opponent_name: row.get(5)?,
                player_wins,
                opponent_wins,
                player_elo_before: row.get(8)?,
                player_elo_after: row.get(9)?,
                result: MatchResult::from_games(player_wins, opponent_wins),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::memory_store;
    use crate::database::{players, tournaments};
    use crate::domain::PlayerIdentity;
    use chrono::NaiveDate;

    fn player(conn: &Connection, external_id: i64, name: &str) -> i64 {
        let identity = PlayerIdentity {
            external_id,
            display_name: name.to_string(),
            username: None,
        };
        players::get_or_create_player(conn, &identity, 1500).unwrap().id
    }

    fn tournament(conn: &Connection, melee_id: i64, date: Option<&str>) -> i64 {
        let date = date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap());
        tournaments::upsert_tournament(conn, melee_id, date).unwrap().id
    }

    #[allow(clippy::too_many_arguments)]
    fn store(conn: &Connection, id: &str, tournament_id: i64, round: i32, p1: i64, p2: i64, w1: i32, w2: i32) {
        insert_match(
            conn,
            &NewMatch {
                id,
                tournament_id,
                round,
                player1_id: p1,
                player2_id: p2,
                player1_wins: w1,
                player2_wins: w2,
                date_played: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn duplicate_ids_are_rejected_and_detected() {
        let conn = memory_store();
        let t = tournament(&conn, 1, None);
        let (a, b) = (player(&conn, 1, "A"), player(&conn, 2, "B"));

        assert!(!match_exists(&conn, "m1").unwrap());
        store(&conn, "m1", t, 1, a, b, 2, 0);
        assert!(match_exists(&conn, "m1").unwrap());

        let duplicate = NewMatch {
            id: "m1",
            tournament_id: t,
            round: 1,
            player1_id: a,
            player2_id: b,
            player1_wins: 2,
            player2_wins: 0,
            date_played: None,
        };
        assert!(insert_match(&conn, &duplicate).is_err());
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn snapshots_start_blank() {
        let conn = memory_store();
        let t = tournament(&conn, 1, None);
        let (a, b) = (player(&conn, 1, "A"), player(&conn, 2, "B"));
        store(&conn, "m1", t, 1, a, b, 2, 0);

        let m = &list_all(&conn).unwrap()[0];
        assert_eq!(m.player1_elo_before, None);
        assert_eq!(m.player2_elo_after, None);
    }

    #[test]
    fn replay_order_puts_undated_first_then_date_tournament_round() {
        let conn = memory_store();
        let feb = tournament(&conn, 10, Some("2024-02-01"));
        let jan = tournament(&conn, 20, Some("2024-01-01"));
        let undated = tournament(&conn, 30, None);
        let (a, b) = (player(&conn, 1, "A"), player(&conn, 2, "B"));

        store(&conn, "feb-r1", feb, 1, a, b, 1, 0);
        store(&conn, "jan-r2", jan, 2, a, b, 1, 0);
        store(&conn, "jan-r1-b", jan, 1, a, b, 1, 0);
        store(&conn, "jan-r1-a", jan, 1, b, a, 1, 0);
        store(&conn, "undated", undated, 5, a, b, 1, 0);

        let order: Vec<String> = list_for_replay(&conn).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(order, ["undated", "jan-r1-a", "jan-r1-b", "jan-r2", "feb-r1"]);
    }

    #[test]
    fn history_is_reoriented_to_the_player() {
        let conn = memory_store();
        let t = tournament(&conn, 1, Some("2024-01-01"));
        let (a, b) = (player(&conn, 1, "Alice"), player(&conn, 2, "Bob"));
        store(&conn, "m1", t, 1, a, b, 2, 1);
        store(&conn, "m2", t, 2, b, a, 2, 0);
        store(&conn, "m3", t, 3, b, a, 1, 1);

        record_snapshot(
            &conn,
            "m2",
            &RatingChange {
                player1_before: 1480,
                player2_before: 1520,
                player1_after: 1502,
                player2_after: 1498,
            },
        )
        .unwrap();

        let history = player_history(&conn, a).unwrap();
        assert_eq!(history.len(), 3);

        assert_eq!(history[0].opponent_name, "Bob");
        assert_eq!((history[0].player_wins, history[0].opponent_wins), (2, 1));
        assert_eq!(history[0].result, MatchResult::Win);

        assert_eq!(history[1].opponent_id, b);
        assert_eq!((history[1].player_wins, history[1].opponent_wins), (0, 2));
        assert_eq!(history[1].result, MatchResult::Loss);
        assert_eq!(history[1].player_elo_before, Some(1520));
        assert_eq!(history[1].player_elo_after, Some(1498));

        assert_eq!(history[2].result, MatchResult::Draw);
    }

    #[test]
    fn snapshot_for_unknown_match_fails() {
        let conn = memory_store();
        let change = RatingChange {
            player1_before: 1500,
            player2_before: 1500,
            player1_after: 1520,
            player2_after: 1480,
        };
        assert!(record_snapshot(&conn, "ghost", &change).is_err());
    }
}
