use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Tournament;

/// Creates the tournament on first sighting. A known tournament keeps its
/// date; a missing date is back-filled when one is supplied.
pub fn upsert_tournament(
    conn: &Connection,
    melee_id: i64,
    date: Option<NaiveDate>,
) -> Result<Tournament> {
    match find_by_melee_id(conn, melee_id)? {
        Some(existing) if existing.date.is_none() && date.is_some() => {
            backfill_date(conn, existing.id, date)
        }
        Some(existing) => Ok(existing),
        None => insert_new_tournament(conn, melee_id, date),
    }
}

pub fn find_by_melee_id(conn: &Connection, melee_id: i64) -> Result<Option<Tournament>> {
    let sql = "SELECT id, melee_id, date FROM tournaments WHERE melee_id = ?1";

    conn.query_row(sql, params![melee_id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by melee_id")
}

fn insert_new_tournament(
    conn: &Connection,
    melee_id: i64,
    date: Option<NaiveDate>,
) -> Result<Tournament> {
    let sql = "INSERT INTO tournaments (melee_id, date) VALUES (?1, ?2) RETURNING id, melee_id, date";

    conn.query_row(sql, params![melee_id, date], parse_tournament_row)
        .context("Failed to insert new tournament")
}

fn backfill_date(conn: &Connection, id: i64, date: Option<NaiveDate>) -> Result<Tournament> {
    let sql = "UPDATE tournaments SET date = ?1 WHERE id = ?2 RETURNING id, melee_id, date";

    conn.query_row(sql, params![date, id], parse_tournament_row)
        .context("Failed to back-fill tournament date")
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        melee_id: row.get(1)?,
        date: row.get(2)?,
    })
}

pub fn list_missing_dates(conn: &Connection) -> Result<Vec<Tournament>> {
    let sql = "SELECT id, melee_id, date FROM tournaments WHERE date IS NULL ORDER BY melee_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_tournament_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Operator-entered date. Overwrites any stored date and fills in the
/// play date of the tournament's matches that have none.
pub fn set_date(conn: &Connection, melee_id: i64, date: NaiveDate) -> Result<Option<Tournament>> {
    let Some(tournament) = find_by_melee_id(conn, melee_id)? else {
        return Ok(None);
    };

    conn.execute(
        "UPDATE tournaments SET date = ?1 WHERE id = ?2",
        params![date, tournament.id],
    )
    .context("Failed to update tournament date")?;

    conn.execute(
        "UPDATE matches SET date_played = ?1 WHERE tournament_id = ?2 AND date_played IS NULL",
        params![date.and_hms_opt(0, 0, 0), tournament.id],
    )
    .context("Failed to back-fill match dates")?;

    find_by_melee_id(conn, melee_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::memory_store;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn upsert_is_idempotent_and_keeps_existing_date() {
        let conn = memory_store();

        let created = upsert_tournament(&conn, 100, Some(day("2024-01-01"))).unwrap();
        let again = upsert_tournament(&conn, 100, Some(day("2025-05-05"))).unwrap();

        assert_eq!(created.id, again.id);
        assert_eq!(again.date, Some(day("2024-01-01")));
    }

    #[test]
    fn missing_date_is_backfilled() {
        let conn = memory_store();

        let created = upsert_tournament(&conn, 100, None).unwrap();
        assert_eq!(created.date, None);
        assert_eq!(list_missing_dates(&conn).unwrap().len(), 1);

        let dated = upsert_tournament(&conn, 100, Some(day("2024-02-01"))).unwrap();
        assert_eq!(dated.id, created.id);
        assert_eq!(dated.date, Some(day("2024-02-01")));
        assert!(list_missing_dates(&conn).unwrap().is_empty());

        let unchanged = upsert_tournament(&conn, 100, None).unwrap();
        assert_eq!(unchanged.date, Some(day("2024-02-01")));
    }

    #[test]
    fn set_date_overrides_and_reports_unknown_tournaments() {
        let conn = memory_store();
        upsert_tournament(&conn, 5, Some(day("2024-01-01"))).unwrap();

        let updated = set_date(&conn, 5, day("2024-03-03")).unwrap().unwrap();
        assert_eq!(updated.date, Some(day("2024-03-03")));
        assert!(set_date(&conn, 6, day("2024-03-03")).unwrap().is_none());
    }
}
