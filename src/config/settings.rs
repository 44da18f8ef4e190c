use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    pub initial_rating: i32,
    pub k_factor_provisional: i32,
    pub k_factor_established: i32,
    /// Matches a player needs before the established K-factor applies
    pub experience_threshold: i32,
    pub min_ranked_matches: i32,
    pub min_matchup_matches: i32,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1500,
            k_factor_provisional: 40,
            k_factor_established: 20,
            experience_threshold: 30,
            min_ranked_matches: 10,
            min_matchup_matches: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub pending_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub failed_dir: PathBuf,
    pub database: PathBuf,
    pub report: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            pending_dir: PathBuf::from("matches/pending"),
            processed_dir: PathBuf::from("matches/processed"),
            failed_dir: PathBuf::from("matches/failed"),
            database: PathBuf::from("elo_ranking.db"),
            report: PathBuf::from("docs/rankings.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 10,
            base_url: "https://melee.gg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub paths: PathSettings,
    pub scraper: ScraperSettings,
}

impl AppConfig {
    /// Loads the JSON config at `path`, falling back to defaults when the file is absent.
    /// `DATABASE_PATH` overrides the configured database location.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::read_json(path)?
        } else {
            info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            config.paths.database = PathBuf::from(db_path);
        }

        Ok(config)
    }

    fn read_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
