//! Process-wide subscriber setup

use serde::Deserialize;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output format selected by `[logging] profile` in the store config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    /// One JSON object per line
    Production,
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call installs anything. Development logs `folio=debug` as
/// text, Production logs `folio=info` as JSON, and Test installs a bare
/// registry (see `init_test_capture`). `RUST_LOG` replaces either default
/// filter.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => tracing_subscriber::fmt()
            .with_env_filter(filter_or("folio=debug"))
            .init(),
        Profile::Production => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter_or("folio=info"))
            .init(),
        Profile::Test => tracing_subscriber::registry().init(),
    });
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
