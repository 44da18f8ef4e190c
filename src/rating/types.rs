use serde::{Deserialize, Serialize};

pub type RatingValue = i32;

/// Result of a single match from player 1's point of view in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Player1Win,
    Player2Win,
    Draw,
}

impl Outcome {
    /// Higher game-win count wins; equal counts are a draw
    pub fn from_game_wins(player1_wins: i32, player2_wins: i32) -> Self {
        if player1_wins > player2_wins {
            Outcome::Player1Win
        } else if player2_wins > player1_wins {
            Outcome::Player2Win
        } else {
            Outcome::Draw
        }
    }

    pub fn actual_scores(&self) -> (f64, f64) {
        match self {
            Outcome::Player1Win => (1.0, 0.0),
            Outcome::Player2Win => (0.0, 1.0),
            Outcome::Draw => (0.5, 0.5),
        }
    }

    pub fn player1_result(&self) -> SideResult {
        match self {
            Outcome::Player1Win => SideResult::Won,
            Outcome::Player2Win => SideResult::Lost,
            Outcome::Draw => SideResult::Drew,
        }
    }

    pub fn player2_result(&self) -> SideResult {
        match self {
            Outcome::Player1Win => SideResult::Lost,
            Outcome::Player2Win => SideResult::Won,
            Outcome::Draw => SideResult::Drew,
        }
    }
}

/// How a match went for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideResult {
    Won,
    Lost,
    Drew,
}

impl SideResult {
    pub fn win_increment(&self) -> i32 {
        matches!(self, SideResult::Won) as i32
    }

    pub fn loss_increment(&self) -> i32 {
        matches!(self, SideResult::Lost) as i32
    }
}

/// A participant's standing going into a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
    pub rating: RatingValue,
    pub matches_played: i32,
}

impl Contender {
    pub fn new(rating: RatingValue, matches_played: i32) -> Self {
        Self {
            rating,
            matches_played,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChange {
    pub player1_before: RatingValue,
    pub player2_before: RatingValue,
    pub player1_after: RatingValue,
    pub player2_after: RatingValue,
}
