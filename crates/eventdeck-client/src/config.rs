//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eventdeck/config.toml` by default. A missing file means
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eventdeck_core::{DisplayFormat, EventTimeZone};
use eventdeck_providers::{
    DEFAULT_EXTERNAL_PAGE_SIZE, DEFAULT_FREE_LABEL, DEFAULT_MANUAL_EVENT_LIMIT,
};
use eventdeck_server::{AggregatorConfig, DEFAULT_CACHE_TTL, PageSettings};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the eventdeck client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// JSON export of the manual events.
    pub manual_events_path: Option<PathBuf>,

    /// Aggregation and display settings.
    pub events: EventSettings,

    /// Page settings.
    pub page: PageSection,

    /// External event API settings.
    pub external: ExternalSettings,
}

/// Aggregation and display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// IANA name of the event time zone.
    pub time_zone: String,

    /// Listing cache lifetime in seconds.
    pub cache_ttl_secs: u64,

    pub manual_event_limit: usize,
    pub external_page_size: usize,

    pub date_format: String,
    pub time_format: String,
    pub occurrence_format: String,

    /// Shown instead of the amount for free events.
    pub free_label: String,
}

impl Default for EventSettings {
    fn default() -> Self {
        let format = DisplayFormat::default();
        Self {
            time_zone: EventTimeZone::default().tz().name().to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            manual_event_limit: DEFAULT_MANUAL_EVENT_LIMIT,
            external_page_size: DEFAULT_EXTERNAL_PAGE_SIZE,
            date_format: format.date,
            time_format: format.time,
            occurrence_format: format.occurrence,
            free_label: DEFAULT_FREE_LABEL.to_string(),
        }
    }
}

impl EventSettings {
    /// Returns the configured event time zone.
    pub fn event_time_zone(&self) -> ClientResult<EventTimeZone> {
        EventTimeZone::from_name(&self.time_zone)
            .map_err(|e| ClientError::Config(format!("events.time_zone: {e}")))
    }

    /// Converts to aggregator configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown zone or a setting the
    /// aggregator rejects.
    pub fn to_aggregator_config(&self) -> ClientResult<AggregatorConfig> {
        let config = AggregatorConfig::new(self.event_time_zone()?.tz())
            .with_cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_manual_event_limit(self.manual_event_limit)
            .with_external_page_size(self.external_page_size)
            .with_format(DisplayFormat {
                date: self.date_format.clone(),
                time: self.time_format.clone(),
                occurrence: self.occurrence_format.clone(),
            });
        config
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(config)
    }
}

/// Page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    pub posts_per_page: usize,
    pub disable_pagination: bool,
    /// External category filter.
    pub category_ids: Vec<String>,
    pub show_images: bool,
    pub description: Option<String>,
    pub no_results: String,
    pub no_search_term: String,
}

impl Default for PageSection {
    fn default() -> Self {
        let defaults = PageSettings::default();
        Self {
            posts_per_page: defaults.posts_per_page,
            disable_pagination: defaults.disable_pagination,
            category_ids: defaults.category_ids,
            show_images: defaults.show_images,
            description: defaults.description,
            no_results: defaults.no_results,
            no_search_term: defaults.no_search_term,
        }
    }
}

impl PageSection {
    /// Converts to page settings.
    pub fn to_page_settings(&self) -> PageSettings {
        PageSettings {
            posts_per_page: self.posts_per_page,
            disable_pagination: self.disable_pagination,
            category_ids: self.category_ids.clone(),
            show_images: self.show_images,
            description: self.description.clone(),
            no_results: self.no_results.clone(),
            no_search_term: self.no_search_term.clone(),
        }
    }
}

/// External event API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSettings {
    /// Search endpoint. Unset means manual events only.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ExternalSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

impl ExternalSettings {
    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Checks every section.
    pub fn validate(&self) -> ClientResult<()> {
        self.events.to_aggregator_config()?;
        if self.page.posts_per_page == 0 {
            return Err(ClientError::Config(
                "page.posts_per_page must be at least 1".to_string(),
            ));
        }
        if self.external.timeout_secs == 0 {
            return Err(ClientError::Config(
                "external.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventdeck")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.events.time_zone, "Europe/Helsinki");
        assert_eq!(config.events.cache_ttl_secs, 900);
        assert_eq!(config.page.posts_per_page, 10);
        assert_eq!(config.external.timeout_secs, 10);
        assert!(config.external.base_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let file = write_config(
            r#"
manual_events_path = "/var/lib/eventdeck/events.json"

[events]
time_zone = "Europe/Stockholm"
cache_ttl_secs = 60

[page]
posts_per_page = 12
category_ids = ["music"]
no_results = "Ei tuloksia"

[external]
base_url = "https://api.example.com/events"
"#,
        );
        let config = ClientConfig::load_from(file.path()).unwrap();

        assert_eq!(
            config.manual_events_path,
            Some(PathBuf::from("/var/lib/eventdeck/events.json"))
        );
        assert_eq!(config.events.cache_ttl_secs, 60);
        assert_eq!(config.events.manual_event_limit, 200);
        assert_eq!(config.page.no_results, "Ei tuloksia");
        assert_eq!(config.page.no_search_term, "No search term given");
        assert_eq!(config.external.timeout_secs, 10);

        let aggregator = config.events.to_aggregator_config().unwrap();
        assert_eq!(aggregator.time_zone, chrono_tz::Europe::Stockholm);
        assert_eq!(aggregator.cache_ttl, Duration::from_secs(60));

        let page = config.page.to_page_settings();
        assert_eq!(page.per_page(), 12);
        assert_eq!(page.category_ids, vec!["music".to_string()]);
    }

    #[test]
    fn empty_file_is_default() {
        let file = write_config("");
        assert_eq!(
            ClientConfig::load_from(file.path()).unwrap(),
            ClientConfig::default()
        );
    }

    #[test]
    fn unknown_time_zone_is_an_error() {
        let file = write_config("[events]\ntime_zone = \"Mars/Olympus\"\n");
        let config = ClientConfig::load_from(file.path()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ClientError::Config(ref msg) if msg.contains("Mars/Olympus")));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let file = write_config("[events]\ndate_format = \"%Q\"\n");
        let config = ClientConfig::load_from(file.path()).unwrap();
        assert!(config.events.to_aggregator_config().is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("[page\n");
        assert!(matches!(
            ClientConfig::load_from(file.path()),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn dumps_as_toml() {
        let toml_str = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, ClientConfig::default());
    }
}
