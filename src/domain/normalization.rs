use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use log::debug;

use super::identity::name_hash;
use super::models::{
    CanonicalMatch, CompactMatchRecord, Competitor, PlayerIdentity, RichCompetitor,
    RichMatchRecord, SourceFormat,
};

/// Parses a match file into canonical matches.
///
/// The rich format is tried first; when it does not decode or decodes to no
/// records the compact format is tried. Byes and records without two usable
/// participants are dropped. `tournament_id` comes from the file name and is
/// attached to every match.
pub fn parse_matches(raw: &str, tournament_id: i64) -> Result<Vec<CanonicalMatch>> {
    let (format, matches) = decode(raw, tournament_id)?;
    debug!(
        "Tournament {}: decoded {} matches as {:?} format",
        tournament_id,
        matches.len(),
        format
    );
    Ok(matches)
}

pub fn decode(raw: &str, tournament_id: i64) -> Result<(SourceFormat, Vec<CanonicalMatch>)> {
    match serde_json::from_str::<Vec<RichMatchRecord>>(raw) {
        Ok(records) if !records.is_empty() => {
            let matches = records
                .into_iter()
                .filter_map(|r| convert_rich(r, tournament_id))
                .collect();
            return Ok((SourceFormat::Rich, matches));
        }
        Ok(_) => {}
        Err(e) => debug!("Not a rich match file: {}", e),
    }

    let records: Vec<CompactMatchRecord> = serde_json::from_str(raw)
        .context("Match file is neither in the rich nor in the compact format")?;

    let matches = records
        .into_iter()
        .filter_map(|r| convert_compact(r, tournament_id))
        .collect();
    Ok((SourceFormat::Compact, matches))
}

// --- Rich Format ---

fn convert_rich(record: RichMatchRecord, tournament_id: i64) -> Option<CanonicalMatch> {
    if record.guid.trim().is_empty() {
        return None;
    }

    if let Some(declared) = record.tournament_id {
        if declared != tournament_id {
            debug!(
                "Match {} declares tournament {} but file is for {}",
                record.guid, declared, tournament_id
            );
        }
    }

    let competitors: Vec<Competitor> = record
        .competitors
        .iter()
        .filter_map(convert_rich_competitor)
        .take(2)
        .collect();
    let competitors: [Competitor; 2] = competitors.try_into().ok()?;

    Some(CanonicalMatch {
        id: record.guid,
        tournament_id,
        round: record.round_number,
        played_at: record.date_created.as_deref().and_then(parse_timestamp),
        competitors,
    })
}

fn convert_rich_competitor(competitor: &RichCompetitor) -> Option<Competitor> {
    let player = competitor.lead_player()?;
    let username = non_empty(player.username.as_deref());
    let display_name = non_empty(player.display_name.as_deref())
        .or_else(|| username.clone())
        .unwrap_or_else(|| format!("Player {}", player.id));

    Some(Competitor {
        player: PlayerIdentity {
            external_id: player.id,
            display_name,
            username,
        },
        game_wins: competitor.game_wins.unwrap_or(0),
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

// --- Compact Format ---

fn convert_compact(record: CompactMatchRecord, tournament_id: i64) -> Option<CanonicalMatch> {
    if record.is_bye() {
        return None;
    }

    let name1 = non_empty(record.team1.as_deref())?;
    let name2 = non_empty(record.team2.as_deref())?;

    let player1 = compact_identity(name1);
    let player2 = compact_identity(name2);

    let side1 = side_id(record.team1_id, &player1);
    let side2 = side_id(record.team2_id, &player2);
    let id = format!("{}-{}-{}-{}", record.phase_id, record.round_number, side1, side2);

    Some(CanonicalMatch {
        id,
        tournament_id,
        round: record.round_number,
        played_at: None,
        competitors: [
            Competitor {
                player: player1,
                game_wins: record.team1_wins_and_byes.unwrap_or(0),
            },
            Competitor {
                player: player2,
                game_wins: record.team2_wins_and_byes.unwrap_or(0),
            },
        ],
    })
}

/// Compact files only carry a nickname, which doubles as display name and username
fn compact_identity(name: String) -> PlayerIdentity {
    PlayerIdentity {
        external_id: name_hash(&name),
        display_name: name.clone(),
        username: Some(name),
    }
}

fn side_id(team_id: Option<i64>, player: &PlayerIdentity) -> i64 {
    team_id.filter(|id| *id != 0).unwrap_or(player.external_id)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
