pub mod settings;

pub use settings::{AppConfig, PathSettings, RatingSettings, ScraperSettings};
