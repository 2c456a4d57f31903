use crate::config::{CalendarConfig, EndTimePolicy, ScanStrategy};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("invalid regex: env var"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceConfig>,
    pub extract: Option<ExtractConfig>,
    pub load: Option<LoadConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub institute: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub scan: Option<ScanStrategy>,
    pub end_time: Option<EndTimePolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub time_zone: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Overlays the file on the built-in defaults. Validation is left to the
    /// caller so command-line overrides can be applied first.
    pub fn into_calendar_config(self) -> CalendarConfig {
        let mut config = CalendarConfig::default();

        if let Some(source) = self.source {
            if let Some(url) = source.url {
                config.source_url = url;
            }
            if let Some(institute) = source.institute {
                config.institute = institute;
            }
        }
        if let Some(extract) = self.extract {
            if let Some(scan) = extract.scan {
                config.scan = scan;
            }
            if let Some(end_time) = extract.end_time {
                config.end_time = end_time;
            }
        }
        if let Some(load) = self.load {
            config.output_path = load.output_path;
            if let Some(time_zone) = load.time_zone {
                config.time_zone = time_zone;
            }
        }

        config
    }
}
