//! Defaults shared by the config layer, the session and the CLI.

/// Quiet period before a typed query settles
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Maximum number of cards on the dashboard "upcoming" strip
pub const DEFAULT_UPCOMING_CAP: usize = 6;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "browse.toml";

/// Default timeout for the HTTP event source
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

// Environment overrides (applied after dotenv)
pub const ENV_DEBOUNCE_MS: &str = "EVENT_BROWSE_DEBOUNCE_MS";
pub const ENV_UPCOMING_CAP: &str = "EVENT_BROWSE_UPCOMING_CAP";
pub const ENV_SORT: &str = "EVENT_BROWSE_SORT";
pub const ENV_SOURCE_URL: &str = "EVENT_BROWSE_SOURCE_URL";

// Sort key names as they appear in config, CLI and JSON
pub const SORT_DATE_ASC: &str = "date_asc";
pub const SORT_DATE_DESC: &str = "date_desc";
pub const SORT_PRICE_ASC: &str = "price_asc";
pub const SORT_PRICE_DESC: &str = "price_desc";
pub const SORT_POPULARITY: &str = "popularity";

/// Get all supported sort key names
pub fn get_supported_sort_keys() -> Vec<&'static str> {
    vec![
        SORT_DATE_ASC,
        SORT_DATE_DESC,
        SORT_PRICE_ASC,
        SORT_PRICE_DESC,
        SORT_POPULARITY,
    ]
}
