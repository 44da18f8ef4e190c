pub mod dates;
pub mod inbox;
pub mod ingestion;
pub mod rebuild;
pub mod report;

pub use dates::{parse_date_overrides, DateResolver};
pub use inbox::Inbox;
pub use ingestion::{IngestionService, IngestionSummary};
pub use rebuild::{RebuildService, RebuildSummary};
pub use report::ReportService;
