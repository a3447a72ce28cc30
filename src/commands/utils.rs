/// Initialize logging
///
/// `RUST_LOG` wins over `--verbose`, which wins over the level in settings.
pub fn init_logging(verbose: bool, configured_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if verbose { "debug" } else { configured_level };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

pub use crate::session::budget::format_remaining;

/// Format a limit for display ("15 minutes", "90 seconds")
pub fn format_limit(seconds: u32) -> String {
    if seconds % 60 == 0 {
        let minutes = seconds / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else {
        format!("{} seconds", seconds)
    }
}
