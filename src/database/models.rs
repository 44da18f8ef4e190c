use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: i64,
    pub external_id: i64,
    pub display_name: String,
    pub username: Option<String>,
    pub current_elo: i32,
    pub matches_played: i32,
    pub wins: i32,
    pub losses: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tournament {
    pub id: i64,
    pub melee_id: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: String,
    pub tournament_id: i64,
    pub round: i32,
    pub player1_id: i64,
    pub player2_id: i64,
    pub player1_wins: i32,
    pub player2_wins: i32,
    pub date_played: Option<NaiveDateTime>,
    pub player1_elo_before: Option<i32>,
    pub player2_elo_before: Option<i32>,
    pub player1_elo_after: Option<i32>,
    pub player2_elo_after: Option<i32>,
}

/// A match about to be stored; snapshot columns start out empty
#[derive(Debug, Clone)]
pub struct NewMatch<'a> {
    pub id: &'a str,
    pub tournament_id: i64,
    pub round: i32,
    pub player1_id: i64,
    pub player2_id: i64,
    pub player1_wins: i32,
    pub player2_wins: i32,
    pub date_played: Option<NaiveDateTime>,
}

/// A stored match in replay order, carrying its tournament's date
#[derive(Debug, Clone)]
pub struct ReplayMatch {
    pub id: String,
    pub tournament_melee_id: i64,
    pub tournament_date: Option<NaiveDate>,
    pub round: i32,
    pub player1_id: i64,
    pub player2_id: i64,
    pub player1_wins: i32,
    pub player2_wins: i32,
}

// DTOs for aggregate queries

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: i32,
    pub player_id: i64,
    pub display_name: String,
    pub username: Option<String>,
    pub current_elo: i32,
    pub matches_played: i32,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    pub fn from_games(player_wins: i32, opponent_wins: i32) -> Self {
        if player_wins > opponent_wins {
            MatchResult::Win
        } else if player_wins < opponent_wins {
            MatchResult::Loss
        } else {
            MatchResult::Draw
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MatchResult::Win => "Win",
            MatchResult::Loss => "Loss",
            MatchResult::Draw => "Draw",
        }
    }
}

/// One match seen from a single player's side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMatchRow {
    pub match_id: String,
    pub tournament_melee_id: i64,
    pub tournament_date: Option<NaiveDate>,
    pub round: i32,
    pub opponent_id: i64,
    pub opponent_name: String,
    pub player_wins: i32,
    pub opponent_wins: i32,
    pub player_elo_before: Option<i32>,
    pub player_elo_after: Option<i32>,
    pub result: MatchResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupRow {
    pub player1: String,
    pub player2: String,
    pub player1_wins: i32,
    pub player2_wins: i32,
    pub matches_played: i32,
    pub player1_win_rate: f64,
}

/// Percentage of `wins` over `played`, 0 when nothing was played
pub fn win_rate(wins: i32, played: i32) -> f64 {
    if played > 0 {
        f64::from(wins) / f64::from(played) * 100.0
    } else {
        0.0
    }
}
