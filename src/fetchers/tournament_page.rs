use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use scraper::{Html, Selector};

use crate::config::settings::ScraperSettings;
use crate::http::PageClient;

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %I:%M %p", "%m/%d/%Y"];

/// Recovers a tournament's start date from its public page
pub struct TournamentPageScraper {
    client: PageClient,
    base_url: String,
}

impl TournamentPageScraper {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let client = PageClient::new(&settings.user_agent, settings.timeout_secs)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn tournament_url(&self, tournament_id: i64) -> String {
        format!("{}/Tournament/View/{}", self.base_url, tournament_id)
    }

    pub async fn fetch_tournament_date(&self, tournament_id: i64) -> Result<NaiveDate> {
        let url = self.tournament_url(tournament_id);
        info!("Fetching date for tournament {} from {}", tournament_id, url);

        let html = self.client.get_text(&url).await?;
        extract_date(&html).with_context(|| format!("No usable date on {}", url))
    }
}

/// Reads the first `data-toggle="datetime"` element's `data-value`,
/// e.g. `<span data-toggle="datetime" data-value="8/31/2024 7:00:00 AM">`
pub fn extract_date(html: &str) -> Result<NaiveDate> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"[data-toggle="datetime"][data-value]"#)
        .map_err(|e| anyhow!("Invalid datetime selector: {e}"))?;

    let raw = document
        .select(&selector)
        .find_map(|el| el.value().attr("data-value"))
        .ok_or_else(|| anyhow!("Could not find tournament date in page"))?;

    parse_page_date(raw.trim())
}

fn parse_page_date(value: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_from_str(value, fmt)
                .map(|dt| dt.date())
                .or_else(|_| NaiveDate::parse_from_str(value, fmt))
                .ok()
        })
        .ok_or_else(|| anyhow!("Could not parse date: {}", value))
}
