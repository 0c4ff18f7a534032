use actix_web::cookie::Key;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::schedule::Minutes;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// At least 64 bytes; a random key is generated per process otherwise
    pub secret: Option<String>,
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    /// Slot snapshot imported at startup
    pub seed_csv: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub default_length: Minutes,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { default_length: 60 }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8080
static_dir = "static"

[booking]
default_length = 60
"#;

/// Load configuration.
///
/// Search order:
/// 1. Path in `COURT_SCHEDULE_CONFIG`
/// 2. `config.toml` in the working directory
/// 3. Embedded default config
///
/// `SESSION_SECRET` overrides the session secret from any source.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match std::env::var("COURT_SCHEDULE_CONFIG") {
        Ok(path) => read_config(Path::new(&path))?,
        Err(_) => {
            let local = Path::new("config.toml");
            if local.exists() {
                read_config(local)?
            } else {
                tracing::info!("Using default embedded configuration");
                toml::from_str(DEFAULT_CONFIG)?
            }
        }
    };

    if let Ok(secret) = std::env::var("SESSION_SECRET") {
        config.session.secret = Some(secret);
    }
    Ok(config)
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

impl SessionConfig {
    /// Cookie signing key from the configured secret
    pub fn key(&self) -> Key {
        match &self.secret {
            Some(secret) if secret.len() >= 64 => Key::from(secret.as_bytes()),
            Some(_) => {
                tracing::warn!("session secret shorter than 64 bytes, using a generated key");
                Key::generate()
            }
            None => {
                tracing::warn!("no session secret configured, sessions end on restart");
                Key::generate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.booking.default_length, 60);
        assert!(config.session.secret.is_none());
        assert!(config.data.seed_csv.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            static_dir = "public"

            [session]
            cookie_secure = true

            [data]
            seed_csv = "data/slots.csv"

            [booking]
            default_length = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.session.cookie_secure);
        assert_eq!(config.data.seed_csv, Some(PathBuf::from("data/slots.csv")));
        assert_eq!(config.booking.default_length, 90);
    }

    #[test]
    fn test_long_secret_is_used_as_key() {
        let secret = "k".repeat(64);
        let session = SessionConfig {
            secret: Some(secret.clone()),
            cookie_secure: false,
        };
        assert_eq!(session.key().master(), Key::from(secret.as_bytes()).master());
    }
}
