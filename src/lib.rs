pub mod config;
pub mod debounce;
pub mod error;
pub mod ingest;
pub mod models;
pub mod output;
pub mod search;
pub mod timeline;

pub use error::TimelineError;
