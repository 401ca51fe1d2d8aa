use tracing_subscriber::EnvFilter;

/// Diagnostic tracing to stdout. `RUST_LOG` takes precedence; otherwise the
/// level is derived from the repeatable `-v` flag. User-facing output (the
/// `[WARN]`/`[INFO]`/action lines and the summary) goes through
/// `report::Output` instead and shares the same stream.
pub fn init(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "warn",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(true)
        .init();
}
