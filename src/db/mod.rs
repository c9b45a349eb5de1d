pub mod database;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod models;
pub mod postgres;

pub use database::Database;
pub use error::DatabaseError;
#[cfg(test)]
pub use fake::FakeDatabase;
pub use models::LapMetadata;
pub use postgres::PostgresDatabase;
