pub mod connection;
pub mod matches;
pub mod models;
pub mod players;
pub mod rankings;
pub mod setup;
pub mod tournaments;

pub use connection::{create_pool, get_connection, open_store, DbConn, DbPool};
pub use models::*;
