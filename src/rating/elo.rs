use super::types::{Contender, Outcome, RatingChange, RatingValue};
use crate::config::settings::RatingSettings;

/// Logistic Elo with a per-player K-factor that drops once a player is experienced.
/// Stateless: identical inputs always produce identical ratings.
#[derive(Debug, Clone)]
pub struct EloCalculator {
    initial_rating: RatingValue,
    k_provisional: i32,
    k_established: i32,
    experience_threshold: i32,
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self::from_settings(&RatingSettings::default())
    }
}

impl EloCalculator {
    pub fn from_settings(settings: &RatingSettings) -> Self {
        Self {
            initial_rating: settings.initial_rating,
            k_provisional: settings.k_factor_provisional,
            k_established: settings.k_factor_established,
            experience_threshold: settings.experience_threshold,
        }
    }

    pub fn initial_rating(&self) -> RatingValue {
        self.initial_rating
    }

    pub fn k_factor(&self, matches_played: i32) -> i32 {
        if matches_played < self.experience_threshold {
            self.k_provisional
        } else {
            self.k_established
        }
    }

    pub fn calculate(
        &self,
        player1: Contender,
        player2: Contender,
        outcome: Outcome,
    ) -> RatingChange {
        let expected1 = expected_score(player1.rating, player2.rating);
        let expected2 = expected_score(player2.rating, player1.rating);
        let (actual1, actual2) = outcome.actual_scores();

        let k1 = self.k_factor(player1.matches_played);
        let k2 = self.k_factor(player2.matches_played);

        RatingChange {
            player1_before: player1.rating,
            player2_before: player2.rating,
            player1_after: adjust(player1.rating, k1, actual1 - expected1),
            player2_after: adjust(player2.rating, k2, actual2 - expected2),
        }
    }
}

pub fn expected_score(rating: RatingValue, opponent: RatingValue) -> f64 {
    let exponent = f64::from(opponent - rating) / 400.0;
    1.0 / (1.0 + 10f64.powf(exponent))
}

// f64::round rounds half away from zero
fn adjust(rating: RatingValue, k: i32, surprise: f64) -> RatingValue {
    (f64::from(rating) + f64::from(k) * surprise).round() as RatingValue
}
