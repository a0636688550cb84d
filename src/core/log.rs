use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Overrides the pfdash log level (`error`..`trace`) without touching other crates.
pub const LOG_ENV: &str = "PFDASH_LOG";

/// Level for pfdash's own events: `PFDASH_LOG` wins, then `--verbose`
/// (debug), else off. Unparseable values count as unset.
fn app_level(verbose: bool, env_level: Option<&str>) -> LevelFilter {
    if let Some(level) = env_level.and_then(|l| l.trim().parse::<LevelFilter>().ok()) {
        return level;
    }
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    }
}

/// Installs the global subscriber. `RUST_LOG`, when set, still filters
/// every target including dependencies such as fjall.
pub fn init_logging(verbose: bool) {
    let env_level = std::env::var(LOG_ENV).ok();
    let level = app_level(verbose, env_level.as_deref());

    let app_filter = Targets::new().with_target("pfdash", level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_level() {
        assert_eq!(app_level(false, None), LevelFilter::OFF);
        assert_eq!(app_level(true, None), LevelFilter::DEBUG);
        assert_eq!(app_level(false, Some("info")), LevelFilter::INFO);
        assert_eq!(app_level(true, Some(" warn ")), LevelFilter::WARN);
        assert_eq!(app_level(true, Some("loud")), LevelFilter::DEBUG);
    }
}
