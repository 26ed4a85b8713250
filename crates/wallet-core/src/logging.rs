use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` selects the filter
/// (default `info`); `WEBBTC_LOG_JSON=1` switches to JSON lines on stderr.
///
/// Safe to call more than once: later calls are no-ops.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("WEBBTC_LOG_JSON")
        .map(|value| value == "1")
        .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init_logging();
        init_logging();
        tracing::info!("logging initialised");
    }
}
