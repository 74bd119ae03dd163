// Competitor Registry - Core Library
// Exposes the store for the CLI, the API server, and tests

pub mod config;
pub mod error;
pub mod record;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use record::{
    generate_reg_number, Competitor, NewCompetitor, Record, HEADER, REQUIRED_FIELDS_MESSAGE,
};
pub use store::{parse_records, CsvStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
