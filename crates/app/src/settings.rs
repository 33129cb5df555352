//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and `SPENDBOOK__*` environment variables, e.g.
//! `SPENDBOOK__SERVER__PORT=8080`.
//!
//! See `settings.toml` for the configuration.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub data_dir: String,
    pub session_ttl_minutes: u64,
    /// Create the demo user on a fresh data directory.
    pub seed_demo: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 3000,
            data_dir: "data".to_string(),
            session_ttl_minutes: 24 * 60,
            seed_demo: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

#[derive(Debug, Parser)]
#[command(name = "spendbook", version)]
struct Args {
    /// Optional config file path (TOML, extension may be omitted).
    #[arg(long)]
    config: Option<String>,
    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(args.config.is_some()))
            .add_source(Environment::with_prefix("SPENDBOOK").separator("__"))
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        if let Some(data_dir) = args.data_dir {
            settings.server.data_dir = data_dir;
        }

        Ok(settings)
    }
}
