use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Default webhook of the personal cabinet backend
pub const DEFAULT_WEBHOOK_URL: &str = "https://quumahienot.beget.app/webhook/lk-ps";

/// Webhook URL for `auth` and `qr` requests
/// Read from LKPS_WEBHOOK_URL environment variable
pub static WEBHOOK_URL: Lazy<String> =
    Lazy::new(|| env::var("LKPS_WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string()));

/// Directory backing the file key-value store (one JSON file per key)
/// Read from LKPS_STORAGE_DIR environment variable
/// Supports tilde (~) expansion through `HOME`
/// Default: ~/.lkps
pub static STORAGE_DIR: Lazy<String> =
    Lazy::new(|| env::var("LKPS_STORAGE_DIR").unwrap_or_else(|_| "~/.lkps".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: lkps.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "lkps.log".to_string()));

/// Profile cache configuration
pub mod cache {
    use super::Duration;

    /// Storage key of the profile snapshot
    pub const PROFILE_KEY: &str = "user_profile_data";

    /// Snapshot time-to-live (in milliseconds)
    pub const TTL_MS: i64 = 24 * 60 * 60 * 1000;

    /// Snapshot TTL duration
    pub fn ttl() -> Duration {
        Duration::from_millis(TTL_MS as u64)
    }
}

/// Authorization configuration
pub mod auth {
    use super::Duration;

    /// Pause before finishing the authorization sequence (in milliseconds)
    /// Applied on network success and on every failure branch, not on cache hit
    pub const PACING_DELAY_MS: u64 = 2000;

    /// Pacing delay duration
    pub fn pacing_delay() -> Duration {
        Duration::from_millis(PACING_DELAY_MS)
    }
}

/// Contact request configuration
pub mod contact {
    use super::Duration;

    /// How many times host user data is re-read after a contact was granted
    pub const POLL_ATTEMPTS: u32 = 2;

    /// Delay before the first re-read (in milliseconds), doubled afterwards
    pub const POLL_INITIAL_DELAY_MS: u64 = 500;

    /// First poll delay duration
    pub fn poll_initial_delay() -> Duration {
        Duration::from_millis(POLL_INITIAL_DELAY_MS)
    }
}

/// Requests table configuration
pub mod table {
    use super::Duration;

    /// Delay between view activation and the entrance animation (in milliseconds)
    pub const ENTRANCE_DELAY_MS: u64 = 100;

    /// Entrance animation delay duration
    pub fn entrance_delay() -> Duration {
        Duration::from_millis(ENTRANCE_DELAY_MS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for webhook calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Expands a leading `~` using the `HOME` environment variable.
pub fn expand_home(path: &str) -> String {
    match (path.strip_prefix('~'), env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}{}", home, rest),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_is_one_day() {
        assert_eq!(cache::ttl(), Duration::from_secs(86_400));
        assert_eq!(cache::TTL_MS, 86_400_000);
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/lib/lkps"), "/var/lib/lkps");
        assert_eq!(expand_home("relative/dir"), "relative/dir");
    }
}
