//! Shared setup for the demo binaries.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber honoring `RUST_LOG` (default `info,tempo=debug`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tempo=debug,tempo::store=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// RTE application credentials from `RTE_CLIENT_ID` / `RTE_CLIENT_SECRET`.
#[must_use]
pub fn credentials_from_env() -> Option<(String, String)> {
    let id = std::env::var("RTE_CLIENT_ID").ok()?;
    let secret = std::env::var("RTE_CLIENT_SECRET").ok()?;
    Some((id, secret))
}
