use std::env;
use std::str::FromStr;

use anyhow::Context;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_addr: String,
    pub database_url: Option<String>,
    /// JSON fixture served from memory when no database is configured.
    pub jobs_fixture: Option<String>,
    pub table_prefix: String,
    pub site_url: String,
    pub job_permalink_base: String,
    pub log_level: Level,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            database_url: None,
            jobs_fixture: None,
            table_prefix: "wp_".to_string(),
            site_url: "http://localhost".to_string(),
            job_permalink_base: "job".to_string(),
            log_level: Level::INFO,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment. Call `dotenvy::dotenv()` first
    /// if a `.env` file should be honoured.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Settings::default();

        let log_level = match non_empty_var("LOG_LEVEL") {
            Some(level) => Level::from_str(&level)
                .with_context(|| format!("LOG_LEVEL has an unknown value: {}", level))?,
            None => defaults.log_level,
        };

        Ok(Settings {
            listen_addr: non_empty_var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            database_url: non_empty_var("DATABASE_URL"),
            jobs_fixture: non_empty_var("JOBS_FIXTURE"),
            // An empty prefix is legal in WordPress, so only an unset variable falls back.
            table_prefix: env::var("TABLE_PREFIX").unwrap_or(defaults.table_prefix),
            site_url: non_empty_var("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            job_permalink_base: env::var("JOB_PERMALINK_BASE")
                .map(|base| base.trim_matches('/').to_string())
                .unwrap_or(defaults.job_permalink_base),
            log_level,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
