pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_SOURCE_URL: &str =
    "https://mathematics.huji.ac.il/calendar/upcoming/eventss/events-seminars";
pub const DEFAULT_INSTITUTE: &str = "Einstein Institute of Mathematics";
pub const DEFAULT_TIME_ZONE: &str = "Asia/Jerusalem";

/// How listing containers are discovered on the index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    /// Every element with a `views-row-<n>` class, in document order.
    #[default]
    ClassPrefix,
    /// Probe `.views-row-1`, `.views-row-2`, ... until the first miss.
    Sequential,
}

/// Which hour the end timestamp is composed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum EndTimePolicy {
    #[default]
    EndHour,
    /// Reuse the start hour, matching the legacy scraper output (end == start).
    StartHour,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub source_url: String,
    pub institute: String,
    pub scan: ScanStrategy,
    pub end_time: EndTimePolicy,
    pub output_path: Option<String>,
    pub time_zone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            institute: DEFAULT_INSTITUTE.to_string(),
            scan: ScanStrategy::default(),
            end_time: EndTimePolicy::default(),
            output_path: None,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }
}

impl CalendarConfig {
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }
}

impl ConfigProvider for CalendarConfig {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn institute(&self) -> &str {
        &self.institute
    }

    fn scan_strategy(&self) -> ScanStrategy {
        self.scan
    }

    fn end_time_policy(&self) -> EndTimePolicy {
        self.end_time
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    fn time_zone(&self) -> &str {
        &self.time_zone
    }
}

impl Validate for CalendarConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source.url", &self.source_url)?;
        validate_non_empty_string("source.institute", &self.institute)?;
        validate_non_empty_string("load.time_zone", &self.time_zone)?;
        if let Some(path) = &self.output_path {
            validate_path("load.output_path", path)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "calendar-etl")]
#[command(about = "Scrape a university seminar calendar into Google Calendar import files")]
pub struct CliConfig {
    /// TOML file with [source], [extract] and [load] sections
    #[arg(long)]
    pub config: Option<String>,

    /// Calendar listing page to scrape
    #[arg(long)]
    pub url: Option<String>,

    /// Institute label attached to every event
    #[arg(long)]
    pub institute: Option<String>,

    #[arg(long, value_enum)]
    pub scan: Option<ScanStrategy>,

    #[arg(long, value_enum)]
    pub end_time: Option<EndTimePolicy>,

    /// Directory for calendar_export.zip; nothing is written when omitted
    #[arg(long)]
    pub output_path: Option<String>,

    /// Time zone stamped on exported Google Calendar events
    #[arg(long)]
    pub time_zone: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Layers command-line flags over the config file (or the built-in defaults).
    pub fn resolve(&self) -> Result<CalendarConfig> {
        let mut config = match &self.config {
            Some(path) => toml_config::TomlConfig::from_file(path)?.into_calendar_config(),
            None => CalendarConfig::default(),
        };

        if let Some(url) = &self.url {
            config.source_url = url.clone();
        }
        if let Some(institute) = &self.institute {
            config.institute = institute.clone();
        }
        if let Some(scan) = self.scan {
            config.scan = scan;
        }
        if let Some(end_time) = self.end_time {
            config.end_time = end_time;
        }
        if let Some(output_path) = &self.output_path {
            config.output_path = Some(output_path.clone());
        }
        if let Some(time_zone) = &self.time_zone {
            config.time_zone = time_zone.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
