// PostgreSQL module - relational source connection and table reading
pub mod connection;
pub mod reader;

pub use connection::{connect, PostgresSource};
