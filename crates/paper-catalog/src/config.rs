//! Configuration for the paper catalog client.

use std::path::PathBuf;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Default base URL for the catalog backend.
    pub const BASE_URL: &str = "http://localhost:5000/api";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Retries for idempotent reads. Writes are never retried.
    pub const MAX_READ_RETRIES: u32 = 2;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// List view constants.
pub mod views {
    use std::time::Duration;

    /// Papers per page in the papers view.
    pub const PAPERS_PAGE_SIZE: u32 = 12;

    /// Authors per page in the authors view.
    pub const AUTHORS_PAGE_SIZE: u32 = 20;

    /// Journals per page in the journals view.
    pub const JOURNALS_PAGE_SIZE: u32 = 20;

    /// Inactivity window before a text-driven request fires.
    pub const DEBOUNCE: Duration = Duration::from_millis(500);

    /// Minimum query length for the author form's paper lookup.
    pub const MIN_LOOKUP_CHARS: usize = 2;

    /// Maximum page buttons shown in a pagination bar.
    pub const PAGE_WINDOW: u32 = 5;

    /// Keywords shown on a paper card before "+N more".
    pub const CARD_KEYWORDS: usize = 5;

    /// Characters of abstract shown on a paper card.
    pub const ABSTRACT_PREVIEW: usize = 300;

    /// Earliest accepted publication year.
    pub const MIN_YEAR: i32 = 1900;
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the catalog REST API.
    pub api_url: String,

    /// Path of the durable session file (token + user email).
    pub session_path: Option<PathBuf>,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient read failures.
    pub max_read_retries: u32,

    /// Debounce window for text-driven requests.
    pub debounce: Duration,
}

impl Config {
    /// Create a new configuration for the given API base URL.
    ///
    /// The session file defaults to `<config dir>/paper-catalog/session.json`.
    #[must_use]
    pub fn new(api_url: Option<String>) -> Self {
        Self {
            api_url: api_url.unwrap_or_else(|| api::BASE_URL.to_string()),
            session_path: default_session_path(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_read_retries: api::MAX_READ_RETRIES,
            debounce: views::DEBOUNCE,
        }
    }

    /// Create a test configuration pointed at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_url: format!("{}/api", base_url),
            session_path: None, // In-memory session in tests
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_read_retries: 0,
            debounce: views::DEBOUNCE,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let api_url = std::env::var("PAPER_CATALOG_API_URL").ok();
        let mut config = Self::new(api_url);

        if let Ok(path) = std::env::var("PAPER_CATALOG_SESSION_FILE") {
            config.session_path = Some(PathBuf::from(path));
        }

        if let Ok(ms) = std::env::var("PAPER_CATALOG_DEBOUNCE_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|e| anyhow::anyhow!("PAPER_CATALOG_DEBOUNCE_MS must be an integer: {e}"))?;
            config.debounce = Duration::from_millis(ms);
        }

        url::Url::parse(&config.api_url)?;
        Ok(config)
    }

    /// Override the session file location.
    #[must_use]
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paper-catalog").join("session.json"))
}
