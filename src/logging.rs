use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Installs the global fmt subscriber. `RUST_LOG` wins over `fallback_filter`.
///
/// Only the first call installs anything; later calls return `false`.
pub fn init(fallback_filter: Option<&str>) -> bool {
    if INITIALIZED.set(()).is_err() {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_filter.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();
    if !installed {
        tracing::debug!("a global tracing subscriber was already installed");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init(Some("debug"));
        assert!(!init(None));
    }
}
