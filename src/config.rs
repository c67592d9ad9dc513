use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_vehicles")]
    pub vehicles: DatasetConfig,
    #[serde(default = "default_apartments")]
    pub apartments: DatasetConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            wiki: WikiConfig::default(),
            cache: CacheConfig::default(),
            vehicles: default_vehicles(),
            apartments: default_apartments(),
            fetch: FetchConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.wiki.origin)
            .with_context(|| format!("wiki.origin is not a valid url: {}", self.wiki.origin))?;

        if !self.cache.global_expiration_hours.is_finite()
            || self.cache.global_expiration_hours < 0.0
        {
            bail!("cache.global_expiration_hours must be a non-negative number");
        }

        for (name, dataset) in [("vehicles", &self.vehicles), ("apartments", &self.apartments)] {
            Url::parse(&dataset.page_url).with_context(|| {
                format!("{name}.page_url is not a valid url: {}", dataset.page_url)
            })?;
            if !dataset.expiration_hours.is_finite() || dataset.expiration_hours < 0.0 {
                bail!("{name}.expiration_hours must be a non-negative number");
            }
            if let Some(stop) = dataset.iteration_stop
                && stop < dataset.iteration_start
            {
                bail!("{name}.iteration_stop must not be lower than iteration_start");
            }
        }

        if self.export.excel_ready && self.export.hyperlink_format.trim().is_empty() {
            bail!("export.hyperlink_format must not be empty when excel_ready is set");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_scraped_dir")]
    pub scraped_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scraped_dir: default_scraped_dir(),
            output_dir: default_output_dir(),
            cache_path: default_cache_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_expiration_hours")]
    pub global_expiration_hours: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            global_expiration_hours: default_expiration_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub page_url: String,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: f64,
    #[serde(default)]
    pub iteration_start: usize,
    #[serde(default)]
    pub iteration_stop: Option<usize>,
}

impl DatasetConfig {
    pub fn in_window(&self, index: usize) -> bool {
        index >= self.iteration_start && self.iteration_stop.is_none_or(|stop| index < stop)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub excel_ready: bool,
    #[serde(default = "default_hyperlink_format")]
    pub hyperlink_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            excel_ready: false,
            hyperlink_format: default_hyperlink_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Loads the configuration file, or the built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AppConfig>(&text)
                .with_context(|| format!("failed to parse toml in {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    config
        .validate()
        .with_context(|| match path {
            Some(path) => format!("invalid config {}", path.display()),
            None => "invalid default config".to_string(),
        })?;
    Ok(config)
}

fn default_scraped_dir() -> PathBuf {
    PathBuf::from("data/scraped")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/cache.json")
}

fn default_origin() -> String {
    "https://gta.fandom.com".to_string()
}

fn default_expiration_hours() -> f64 {
    168.0
}

fn default_vehicles() -> DatasetConfig {
    DatasetConfig {
        page_url: "https://gta.fandom.com/wiki/Vehicles_in_GTA_Online".to_string(),
        expiration_hours: default_expiration_hours(),
        iteration_start: 0,
        iteration_stop: None,
    }
}

fn default_apartments() -> DatasetConfig {
    DatasetConfig {
        page_url: "https://gta.fandom.com/wiki/Apartments".to_string(),
        expiration_hours: default_expiration_hours(),
        iteration_start: 0,
        iteration_stop: None,
    }
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_hyperlink_format() -> String {
    "HYPERLINK".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
