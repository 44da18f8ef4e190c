pub mod elo;
pub mod types;

pub use elo::{expected_score, EloCalculator};
pub use types::{Contender, Outcome, RatingChange, RatingValue, SideResult};
