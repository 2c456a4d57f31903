pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{http::HttpFetcher, storage::LocalStorage};
pub use crate::config::{CalendarConfig, EndTimePolicy, ScanStrategy};
pub use crate::core::{
    etl::{EtlEngine, EtlOutcome},
    pipeline::CalendarPipeline,
};
pub use crate::domain::model::{to_google_format, Event};
pub use crate::utils::error::{EtlError, Result};
