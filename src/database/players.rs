use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Player;
use crate::domain::PlayerIdentity;
use crate::rating::SideResult;

const PLAYER_COLUMNS: &str = "id, external_id, display_name, username, current_elo, matches_played, wins, losses, created_at, updated_at";

/// Returns the player with this external id, creating it at `initial_rating` on first sighting
pub fn get_or_create_player(
    conn: &Connection,
    identity: &PlayerIdentity,
    initial_rating: i32,
) -> Result<Player> {
    if let Some(existing) = find_by_external_id(conn, identity.external_id)? {
        return Ok(existing);
    }

    insert_new_player(conn, identity, initial_rating)
}

pub fn find_by_external_id(conn: &Connection, external_id: i64) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE external_id = ?1");

    conn.query_row(&sql, params![external_id], parse_player_row)
        .optional()
        .context("Failed to query player by external_id")
}

fn insert_new_player(
    conn: &Connection,
    identity: &PlayerIdentity,
    initial_rating: i32,
) -> Result<Player> {
    let sql = format!(
        "INSERT INTO players (external_id, display_name, username, current_elo) VALUES (?1, ?2, ?3, ?4) RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            identity.external_id,
            identity.display_name,
            identity.username,
            initial_rating
        ],
        parse_player_row,
    )
    .context("Failed to insert new player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        external_id: row.get(1)?,
        display_name: row.get(2)?,
        username: row.get(3)?,
        current_elo: row.get(4)?,
        matches_played: row.get(5)?,
        wins: row.get(6)?,
        losses: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

/// First player (lowest id) with this display name
pub fn find_by_display_name(conn: &Connection, name: &str) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE display_name = ?1 ORDER BY id LIMIT 1");

    conn.query_row(&sql, params![name], parse_player_row)
        .optional()
        .context("Failed to query player by display name")
}

pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
        .context("Failed to count players")
}

/// Puts every player back at `initial_rating` with zeroed counters
pub fn reset_all_ratings(conn: &Connection, initial_rating: i32) -> Result<usize> {
    conn.execute(
        "UPDATE players SET current_elo = ?1, matches_played = 0, wins = 0, losses = 0, updated_at = CURRENT_TIMESTAMP",
        params![initial_rating],
    )
    .context("Failed to reset player ratings")
}

/// Stores a replayed match result: new rating plus one more match played
pub fn apply_match_result(
    conn: &Connection,
    player_id: i64,
    new_rating: i32,
    result: SideResult,
) -> Result<()> {
    let sql = "UPDATE players
               SET current_elo = ?1,
                   matches_played = matches_played + 1,
                   wins = wins + ?2,
                   losses = losses + ?3,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?4";

    let updated = conn
        .execute(
            sql,
            params![
                new_rating,
                result.win_increment(),
                result.loss_increment(),
                player_id
            ],
        )
        .context("Failed to update player rating")?;

    if updated == 0 {
        anyhow::bail!("Player {} does not exist", player_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::memory_store;

    fn identity(external_id: i64, name: &str) -> PlayerIdentity {
        PlayerIdentity {
            external_id,
            display_name: name.to_string(),
            username: Some(name.to_lowercase()),
        }
    }

    #[test]
    fn get_or_create_is_keyed_by_external_id() {
        let conn = memory_store();

        let first = get_or_create_player(&conn, &identity(7, "Alice"), 1500).unwrap();
        let again = get_or_create_player(&conn, &identity(7, "Renamed"), 1500).unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.display_name, "Alice");
        assert_eq!(first.current_elo, 1500);
        assert_eq!((first.matches_played, first.wins, first.losses), (0, 0, 0));
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn new_players_start_at_configured_rating() {
        let conn = memory_store();
        let player = get_or_create_player(&conn, &identity(1, "Bob"), 1200).unwrap();
        assert_eq!(player.current_elo, 1200);
    }

    #[test]
    fn apply_and_reset_counters() {
        let conn = memory_store();
        let p = get_or_create_player(&conn, &identity(1, "Bob"), 1500).unwrap();

        apply_match_result(&conn, p.id, 1520, SideResult::Won).unwrap();
        apply_match_result(&conn, p.id, 1510, SideResult::Lost).unwrap();
        apply_match_result(&conn, p.id, 1512, SideResult::Drew).unwrap();

        let p = find_by_id(&conn, p.id).unwrap().unwrap();
        assert_eq!(p.current_elo, 1512);
        assert_eq!((p.matches_played, p.wins, p.losses), (3, 1, 1));

        assert_eq!(reset_all_ratings(&conn, 1500).unwrap(), 1);
        let p = find_by_id(&conn, p.id).unwrap().unwrap();
        assert_eq!(p.current_elo, 1500);
        assert_eq!((p.matches_played, p.wins, p.losses), (0, 0, 0));
    }

    #[test]
    fn updating_a_missing_player_fails() {
        let conn = memory_store();
        assert!(apply_match_result(&conn, 99, 1500, SideResult::Won).is_err());
    }

    #[test]
    fn lookup_by_display_name() {
        let conn = memory_store();
        get_or_create_player(&conn, &identity(3, "Carol"), 1500).unwrap();
        assert!(find_by_display_name(&conn, "Carol").unwrap().is_some());
        assert!(find_by_display_name(&conn, "Nobody").unwrap().is_none());
    }
}
