pub mod identity;
pub mod models;
pub mod normalization;

pub use identity::name_hash;
pub use models::{CanonicalMatch, Competitor, PlayerIdentity, SourceFormat};
pub use normalization::parse_matches;
