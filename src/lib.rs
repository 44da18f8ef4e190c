pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod fetchers;
pub mod http;
pub mod rating;
pub mod services;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use log::info;
use std::io::IsTerminal;
use std::path::Path;

use crate::cli::Cli;
use crate::config::settings::AppConfig;
use crate::database::{matches, players, rankings, tournaments, DbPool};
use crate::fetchers::TournamentPageScraper;
use crate::services::ingestion::IngestionService;
use crate::services::rebuild::RebuildService;
use crate::services::report::{self, ReportService};
use crate::services::{parse_date_overrides, DateResolver, Inbox};

const LEADERBOARD_PREVIEW: usize = 10;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    AppConfig::load(path)
}

fn open_store(config: &AppConfig) -> Result<DbPool> {
    database::open_store(&config.paths.database)
}

pub fn handle_process(
    config: &AppConfig,
    dates: Option<&str>,
    no_fetch: bool,
    no_prompt: bool,
) -> Result<()> {
    let overrides = dates.map(parse_date_overrides).unwrap_or_default();
    let pool = open_store(config)?;
    let inbox = Inbox::new(&config.paths)?;

    let scraper = if no_fetch {
        None
    } else {
        Some(TournamentPageScraper::new(&config.scraper)?)
    };
    let interactive = !no_prompt && std::io::stdin().is_terminal();
    let resolver = DateResolver::new(overrides, scraper, interactive);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = IngestionService::new(pool.clone(), inbox, resolver, &config.rating);
        service.run().await
    })?;

    RebuildService::new(pool.clone(), &config.rating).run()?;

    let written = ReportService::new(pool, &config.rating).write(&config.paths.report)?;
    let preview = written.leaderboard.len().min(LEADERBOARD_PREVIEW);
    report::print_leaderboard(&written.leaderboard[..preview]);
    Ok(())
}

pub fn handle_rebuild(config: &AppConfig) -> Result<()> {
    let pool = open_store(config)?;
    RebuildService::new(pool, &config.rating).run()?;
    Ok(())
}

pub fn handle_rankings(config: &AppConfig, limit: Option<usize>) -> Result<()> {
    let pool = open_store(config)?;
    let conn = database::get_connection(&pool)?;

    let mut rows = rankings::leaderboard(&conn, config.rating.min_ranked_matches)?;
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    report::print_leaderboard(&rows);
    Ok(())
}

pub fn handle_history(config: &AppConfig, name: &str) -> Result<()> {
    let pool = open_store(config)?;
    let conn = database::get_connection(&pool)?;

    let Some(player) = players::find_by_display_name(&conn, name)? else {
        bail!("No player named '{}'", name);
    };
    let rows = matches::player_history(&conn, player.id)?;
    report::print_history(&player, &rows);
    Ok(())
}

pub fn handle_matchups(config: &AppConfig) -> Result<()> {
    let pool = open_store(config)?;
    let conn = database::get_connection(&pool)?;

    let rows = rankings::matchups(&conn, config.rating.min_matchup_matches)?;
    report::print_matchups(&rows);
    Ok(())
}

pub fn handle_missing_dates(config: &AppConfig) -> Result<()> {
    let pool = open_store(config)?;
    let conn = database::get_connection(&pool)?;

    let missing = tournaments::list_missing_dates(&conn)?;
    report::print_missing_dates(&missing, &config.scraper.base_url);
    Ok(())
}

/// Overwrites a tournament's date, then replays ratings in the new order
pub fn handle_set_date(config: &AppConfig, tournament_id: i64, date: NaiveDate) -> Result<()> {
    let pool = open_store(config)?;
    {
        let conn = database::get_connection(&pool)?;
        if tournaments::set_date(&conn, tournament_id, date)?.is_none() {
            bail!("Tournament {} has not been ingested", tournament_id);
        }
    }
    info!("Tournament {} is now dated {}", tournament_id, date);

    RebuildService::new(pool, &config.rating).run()?;
    Ok(())
}

pub fn handle_report(config: &AppConfig, output: Option<&Path>) -> Result<()> {
    let pool = open_store(config)?;
    let path = output.unwrap_or(config.paths.report.as_path());
    ReportService::new(pool, &config.rating).write(path)?;
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
