//! Process-wide tracing/logging setup for the storefront binaries.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide observability with the format chosen by
/// `STOREFRONT_LOG_FORMAT` (`json` by default, `pretty` for local runs).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("STOREFRONT_LOG_FORMAT")
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    tracing::init(format);
}
