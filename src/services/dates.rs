use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};

use crate::fetchers::TournamentPageScraper;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Finds a tournament's date: operator override, then the stored date, then
/// the tournament page, then an interactive prompt. `None` leaves it unknown.
pub struct DateResolver {
    overrides: HashMap<i64, NaiveDate>,
    scraper: Option<TournamentPageScraper>,
    interactive: bool,
}

impl DateResolver {
    pub fn new(
        overrides: HashMap<i64, NaiveDate>,
        scraper: Option<TournamentPageScraper>,
        interactive: bool,
    ) -> Self {
        Self {
            overrides,
            scraper,
            interactive,
        }
    }

    /// No network, no prompt: overrides and stored dates only
    pub fn offline(overrides: HashMap<i64, NaiveDate>) -> Self {
        Self::new(overrides, None, false)
    }

    pub async fn resolve(&self, tournament_id: i64, stored: Option<NaiveDate>) -> Option<NaiveDate> {
        if let Some(date) = self.overrides.get(&tournament_id) {
            return Some(*date);
        }

        if stored.is_some() {
            return stored;
        }

        if let Some(date) = self.fetch(tournament_id).await {
            return Some(date);
        }

        if self.interactive {
            return self.prompt(tournament_id).await;
        }

        None
    }

    async fn fetch(&self, tournament_id: i64) -> Option<NaiveDate> {
        let scraper = self.scraper.as_ref()?;
        match scraper.fetch_tournament_date(tournament_id).await {
            Ok(date) => {
                info!("Fetched date for tournament {}: {}", tournament_id, date);
                Some(date)
            }
            Err(e) => {
                warn!("Could not fetch date for tournament {}: {:#}", tournament_id, e);
                None
            }
        }
    }

    async fn prompt(&self, tournament_id: i64) -> Option<NaiveDate> {
        let url = self.scraper.as_ref().map(|s| s.tournament_url(tournament_id));
        let input = BufReader::new(std::io::stdin());
        prompt_off_runtime(tournament_id, url, input, std::io::stdout()).await
    }
}

/// Runs the blocking prompt on tokio's blocking pool
async fn prompt_off_runtime<R, W>(
    tournament_id: i64,
    url: Option<String>,
    mut input: R,
    mut output: W,
) -> Option<NaiveDate>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(move || {
        prompt_for_date(tournament_id, url.as_deref(), &mut input, &mut output)
    })
    .await;

    match answer {
        Ok(Ok(date)) => date,
        Ok(Err(e)) => {
            warn!("Failed to read date for tournament {}: {:#}", tournament_id, e);
            None
        }
        Err(e) => {
            warn!("Date prompt for tournament {} did not finish: {}", tournament_id, e);
            None
        }
    }
}

/// Asks until a valid `YYYY-MM-DD` is entered; an empty line skips the tournament
pub fn prompt_for_date<R: BufRead, W: Write>(
    tournament_id: i64,
    url: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<Option<NaiveDate>> {
    loop {
        writeln!(output, "========================================")?;
        writeln!(output, "Tournament ID: {}", tournament_id)?;
        if let Some(url) = url {
            writeln!(output, "URL: {}", url)?;
        }
        write!(output, "Please enter date (YYYY-MM-DD) or press Enter to skip: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        match NaiveDate::parse_from_str(line, DATE_FORMAT) {
            Ok(date) => return Ok(Some(date)),
            Err(_) => writeln!(
                output,
                "Invalid date format. Please use YYYY-MM-DD (e.g., 2024-08-31)\n"
            )?,
        }
    }
}

/// Parses `170676=2024-08-31,172453=2024-10-17`. Malformed entries are
/// logged and skipped; the remaining overrides still apply.
pub fn parse_date_overrides(list: &str) -> HashMap<i64, NaiveDate> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|part| match parse_override(part) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Ignoring date override: {:#}", e);
                None
            }
        })
        .collect()
}

fn parse_override(part: &str) -> Result<(i64, NaiveDate)> {
    let Some((id, date)) = part.split_once('=') else {
        bail!("Expected <tournament id>=<YYYY-MM-DD>, got '{}'", part);
    };

    let id: i64 = id
        .trim()
        .parse()
        .with_context(|| format!("Invalid tournament id in '{}'", part))?;
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date in '{}'", part))?;

    Ok((id, date))
}
