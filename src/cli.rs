use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Elo leaderboard for melee.gg tournament results")]
pub struct Cli {
    /// Path to the JSON config file (defaults apply when it is missing)
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Ingest pending match files, rebuild ratings and write the report
    Process {
        /// Tournament date overrides, e.g. 170676=2024-08-31,172453=2024-10-17
        #[arg(short, long)]
        dates: Option<String>,
        /// Do not look up missing dates on the tournament page
        #[arg(long)]
        no_fetch: bool,
        /// Do not ask for missing dates interactively
        #[arg(long)]
        no_prompt: bool,
    },
    /// Recompute every rating from the stored match history
    Rebuild,
    /// Print the leaderboard
    Rankings {
        /// Show only the top N players
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print one player's match history
    History {
        /// Display name of the player
        name: String,
    },
    /// Print head-to-head records
    Matchups,
    /// List tournaments that still have no date
    MissingDates,
    /// Set a tournament's date and replay ratings
    SetDate {
        /// melee.gg tournament id
        tournament_id: i64,
        /// Date in YYYY-MM-DD format
        date: NaiveDate,
    },
    /// Write the JSON rankings report
    Report {
        /// Output file (defaults to the configured report path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_process_flags() {
        let cli = Cli::parse_from([
            "melee_elo_ranking",
            "process",
            "--dates",
            "170676=2024-08-31",
            "--no-fetch",
            "--config",
            "other.json",
        ]);

        assert_eq!(cli.config, PathBuf::from("other.json"));
        assert_eq!(
            cli.command,
            Command::Process {
                dates: Some("170676=2024-08-31".to_string()),
                no_fetch: true,
                no_prompt: false,
            }
        );
    }

    #[test]
    fn parses_set_date() {
        let cli = Cli::parse_from(["melee_elo_ranking", "set-date", "170676", "2024-08-31"]);
        assert_eq!(
            cli.command,
            Command::SetDate {
                tournament_id: 170676,
                date: NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
            }
        );
        assert!(Cli::try_parse_from(["melee_elo_ranking", "set-date", "170676", "31/08/2024"]).is_err());
    }
}
