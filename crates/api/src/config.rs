use std::str::FromStr;

use attendance_core::config::EngineConfig;

/// Process-level settings. Window and dispute rules live in [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Seconds between passes that settle verdicts for closed windows.
    pub sweep_interval_secs: u64,
    /// Settled records older than this many days are evicted by the sweeper.
    /// Unset keeps every record for the life of the process.
    pub retention_days: Option<u64>,
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Read the environment, falling back to development defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SWEEP_INTERVAL_SECS`  | `60`                       |
    /// | `RECORD_RETENTION_DAYS`| unset                      |
    ///
    /// Engine variables are listed on [`EngineConfig::from_env`].
    ///
    /// # Panics
    ///
    /// On any malformed value, including an invalid engine configuration.
    pub fn from_env() -> Self {
        let sweep_interval_secs: u64 = parsed("SWEEP_INTERVAL_SECS", 60);
        assert!(sweep_interval_secs > 0, "SWEEP_INTERVAL_SECS must be positive");

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed("PORT", 3000),
            cors_origins: comma_list(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", 30),
            sweep_interval_secs,
            retention_days: std::env::var("RECORD_RETENTION_DAYS")
                .ok()
                .map(|raw| {
                    raw.trim().parse().unwrap_or_else(|e| {
                        panic!("RECORD_RETENTION_DAYS is invalid ('{raw}'): {e}")
                    })
                }),
            engine: EngineConfig::from_env()
                .unwrap_or_else(|e| panic!("Invalid engine configuration: {e}")),
        }
    }
}

fn parsed<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid ('{raw}'): {e}")),
        Err(_) => default,
    }
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
