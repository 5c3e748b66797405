use std::net::SocketAddr;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3600/api";

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_non_empty(key).and_then(|v| v.trim().parse::<T>().ok())
}

/// Settings of the attempt session client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub http_timeout_secs: u64,
    pub time_limit_secs: Option<u64>,
    pub snapshot_path: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            http_timeout_secs: 30,
            time_limit_secs: None,
            snapshot_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_non_empty("QUIZ_API_BASE_URL").unwrap_or(defaults.base_url),
            auth_token: env_non_empty("QUIZ_AUTH_TOKEN"),
            http_timeout_secs: env_parsed("QUIZ_HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout_secs),
            time_limit_secs: env_parsed::<u64>("QUIZ_TIME_LIMIT_SECS").filter(|s| *s > 0),
            snapshot_path: env_non_empty("QUIZ_SNAPSHOT_PATH"),
        }
    }
}

/// Settings of the development backend binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed_path: Option<String>,
    pub required_token: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_non_empty("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parsed("BACKEND_PORT").unwrap_or(3600),
            seed_path: env_non_empty("QUIZ_SEED_PATH"),
            required_token: env_non_empty("BACKEND_REQUIRED_TOKEN"),
        }
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
