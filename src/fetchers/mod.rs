pub mod tournament_page;

pub use tournament_page::TournamentPageScraper;
