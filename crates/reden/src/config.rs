use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

pub const DEFAULT_START_URL: &str = "http://www.bundesregierung.de/SiteGlobals/Forms/Webs/Breg/Suche/DE/Nachrichten/Redensuche2_formular.html?nn=8988&searchtype.HASH=e5e7611fd92022248dd0&path.HASH=631e69fa04dc338f202c&path=%2Fbpainternet%2Fcontent%2Fde%2Frede*+%2Fbpainternet%2Fcontentarchiv%2Fde%2Farchiv17%2Frede*&doctype=speech&doctype.HASH=fb7e3f87bcd598d5d3d&searchtype=news";
pub const DEFAULT_ALLOWED_DOMAIN: &str = "bundesregierung.de";

const DEFAULT_PAUSE: Duration = Duration::from_secs(2);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct CrawlConfig {
    pub start_url: Url,
    /// Fixed delay before every page fetch.
    pub pause: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    pub allowed_domains: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: Url::parse(DEFAULT_START_URL).unwrap_or_else(|_| unreachable!()),
            pause: DEFAULT_PAUSE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("Mozilla/5.0 (compatible; {})", politikdokumente_core::user_agent()),
            allowed_domains: vec![DEFAULT_ALLOWED_DOMAIN.to_string()],
        }
    }
}

impl CrawlConfig {
    /// Defaults overridden by `REDEN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("REDEN_START_URL") {
            config = config.with_start_url(&url)?;
        }
        if let Some(ms) = env_number("REDEN_PAUSE_MS") {
            config.pause = Duration::from_millis(ms);
        }
        if let Some(secs) = env_number("REDEN_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(agent) = env::var("REDEN_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(domains) = env::var("REDEN_ALLOWED_DOMAINS") {
            config.allowed_domains = split_domains(&domains);
        }

        Ok(config)
    }

    pub fn with_start_url(mut self, url: &str) -> Result<Self> {
        self.start_url = Url::parse(url).with_context(|| format!("invalid start URL {:?}", url))?;
        Ok(self)
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }
}

fn env_number(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid number, using default");
            None
        }
    }
}

fn split_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}
