use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. `RUST_LOG` takes precedence
/// over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(err) = result {
        eprintln!("Tracing already initialized: {}", err);
    }
}

/// Filter used by the server. axum logs rejections from built-in
/// extractors with the `axum::rejection` target at `TRACE` level.
pub fn server_filter() -> String {
    format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    )
}

pub fn cli_filter() -> String {
    format!("{}=debug", env!("CARGO_CRATE_NAME"))
}
