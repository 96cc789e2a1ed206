use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// External natural-language classifier service.
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// One entry per region; the first entry need not be the default.
    pub regions: Vec<RegionEntry>,

    pub default_region: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of the classifier service. Empty disables the chat surface's
    /// natural-language path; structured endpoints keep working.
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_classifier_timeout")]
    pub timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_classifier_timeout() -> u64 {
    10_000
}

impl Config {
    /// Loads configuration from layered files and `ILS__`-prefixed
    /// environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ILS").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.database.regions.is_empty() {
            return Err(config::ConfigError::Message(
                "at least one database region must be configured".into(),
            ));
        }
        if !self
            .database
            .regions
            .iter()
            .any(|r| r.name == self.database.default_region)
        {
            return Err(config::ConfigError::Message(format!(
                "default_region '{}' is not a configured region",
                self.database.default_region
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("invalid server host/port configuration")
    }

    /// Region configs in the persistence crate's shape.
    pub fn region_configs(&self) -> Vec<persistence::db::RegionConfig> {
        self.database
            .regions
            .iter()
            .map(|r| persistence::db::RegionConfig {
                name: r.name.clone(),
                url: r.url.clone(),
            })
            .collect()
    }

    pub fn pool_settings(&self) -> persistence::db::PoolSettings {
        persistence::db::PoolSettings {
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            connect_timeout_secs: self.database.connect_timeout_secs,
            idle_timeout_secs: self.database.idle_timeout_secs,
        }
    }
}
