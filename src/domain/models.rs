use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format-independent representation of one contest between two players
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalMatch {
    pub id: String,
    pub tournament_id: i64,
    pub round: i32,
    /// Absent for the compact format; the tournament date is used instead
    pub played_at: Option<NaiveDateTime>,
    pub competitors: [Competitor; 2],
}

impl CanonicalMatch {
    pub fn player1(&self) -> &Competitor {
        &self.competitors[0]
    }

    pub fn player2(&self) -> &Competitor {
        &self.competitors[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Competitor {
    pub player: PlayerIdentity,
    pub game_wins: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlayerIdentity {
    pub external_id: i64,
    pub display_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Rich,
    Compact,
}

// --- Raw Match File Structures ---

/// Match record from the rich export (explicit ids, players and timestamps)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RichMatchRecord {
    pub guid: String,
    #[serde(default)]
    pub tournament_id: Option<i64>,
    pub round_number: i32,
    #[serde(default)]
    pub date_created: Option<String>,
    pub competitors: Vec<RichCompetitor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RichCompetitor {
    #[serde(default)]
    pub team: Option<RichTeam>,
    #[serde(default)]
    pub game_wins: Option<i32>,
}

impl RichCompetitor {
    /// Only the first listed player of a side takes part in the rating
    pub fn lead_player(&self) -> Option<&RichPlayer> {
        self.team.as_ref().and_then(|t| t.players.first())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RichTeam {
    #[serde(default)]
    pub players: Vec<RichPlayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RichPlayer {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Match record from the compact, anonymized standings export
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompactMatchRecord {
    pub round_number: i32,
    pub phase_id: i64,
    #[serde(default)]
    pub team1_id: Option<i64>,
    #[serde(default)]
    pub team1: Option<String>,
    #[serde(default)]
    pub team1_wins_and_byes: Option<i32>,
    #[serde(default)]
    pub team2_id: Option<i64>,
    #[serde(default)]
    pub team2: Option<String>,
    #[serde(default)]
    pub team2_wins_and_byes: Option<i32>,
    #[serde(default)]
    pub bye_reason: Option<i32>,
}

impl CompactMatchRecord {
    pub fn is_bye(&self) -> bool {
        self.bye_reason.is_some()
    }
}
