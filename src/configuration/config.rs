use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration that defines all runtime parameters.
///
/// The configuration is read from a TOML file where every section is optional, then
/// selectively overridden by command-line flags through [`Config::apply_args`].
///
/// # Fields Overview
///
/// - `target`: the page to scrape once per identity
/// - `rotation`: the identity-control command (list/connect/disconnect/status) and its timings
/// - `egress`: plain-text IP echo endpoints used to record the observed egress address
/// - `session`: browser profile location and launch options
/// - `extraction`: ordered selector lists per field, popup and pricing-section selectors
/// - `run`: inter-identity pause and identity cap/filter
/// - `output`: where result files and screenshots are written
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub rotation: RotationConfig,
    pub egress: EgressConfig,
    pub session: SessionConfig,
    pub extraction: ExtractionConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

/// Command-line arguments.
///
/// Every flag is an override on top of the configuration file; with no file the
/// defaults apply and `--url` becomes mandatory.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vantage")]
#[command(version)]
#[command(about = "Collects one hotel price per VPN country and compares them")]
pub struct Args {
    /// Path to a TOML configuration file
    pub config_file: Option<PathBuf>,

    /// Hotel page to scrape
    #[arg(long, env = "VANTAGE_URL")]
    pub url: Option<String>,

    /// Comma-separated identities to restrict the run to, in order
    #[arg(long, value_delimiter = ',')]
    pub identities: Vec<String>,

    /// Only process the first N identities
    #[arg(long)]
    pub max_identities: Option<usize>,

    /// Directory receiving the CSV and JSON result files
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub headful: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Config {
    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Builds the effective configuration: file (if any), then CLI overrides, then validation.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config_file {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No configuration file given, using defaults");
                Self::default()
            }
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.url {
            self.target.url = Some(url.clone());
        }
        if !args.identities.is_empty() {
            self.run.identities = args
                .identities
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if args.max_identities.is_some() {
            self.run.max_identities = args.max_identities;
        }
        if let Some(dir) = &args.output_dir {
            self.output.dir = dir.clone();
        }
        if args.headful {
            self.session.headless = false;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.target.url.as_deref().ok_or(ConfigError::MissingTarget)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BadUrl(format!("{} is not an http(s) URL", url)));
        }

        if self.rotation.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        if self.egress.endpoints.is_empty() {
            return Err(ConfigError::EmptyEndpoints);
        }
        if self.session.window_width == 0 || self.session.window_height == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "window size must be non-zero",
            )));
        }
        if self.run.max_identities == Some(0) {
            return Err(ConfigError::NotInRange(String::from(
                "max_identities must be at least 1",
            )));
        }

        let fields = [
            ("hotel_name", &self.extraction.hotel_name),
            ("address", &self.extraction.address),
            ("rating", &self.extraction.rating),
            ("price", &self.extraction.price),
            ("checkin", &self.extraction.checkin),
            ("checkout", &self.extraction.checkout),
            ("nights", &self.extraction.nights),
        ];
        for (name, selectors) in fields {
            if selectors.is_empty() {
                return Err(ConfigError::EmptySelectors(name.to_string()));
            }
        }

        Ok(())
    }

    pub fn target_url(&self) -> &str {
        self.target.url.as_deref().unwrap_or_default()
    }
}
