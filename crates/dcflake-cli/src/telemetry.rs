use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// Logs go to stderr so stdout carries nothing but IDs. The filter comes from
/// `RUST_LOG` and defaults to `info`.
pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;
    Ok(())
}
