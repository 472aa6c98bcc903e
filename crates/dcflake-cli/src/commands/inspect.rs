use std::io::Write;

use crate::config::{AppConfig, ClockKind, IdentitySource, SnowflakeId};

/// Writes the bit layout and the effective identity to `out`.
pub fn run(config: &AppConfig, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(
        out,
        "bits       reserved={} timestamp={} datacenter={} worker={} sequence={}",
        SnowflakeId::RESERVED_BITS,
        SnowflakeId::TIMESTAMP_BITS,
        SnowflakeId::DATACENTER_BITS,
        SnowflakeId::WORKER_BITS,
        SnowflakeId::SEQUENCE_BITS,
    )?;
    writeln!(
        out,
        "shifts     timestamp={} datacenter={} worker={} sequence={}",
        SnowflakeId::TIMESTAMP_SHIFT,
        SnowflakeId::DATACENTER_SHIFT,
        SnowflakeId::WORKER_SHIFT,
        SnowflakeId::SEQUENCE_SHIFT,
    )?;
    writeln!(
        out,
        "max        timestamp={} datacenter={} worker={} sequence={}",
        SnowflakeId::TIMESTAMP_MASK,
        SnowflakeId::DATACENTER_MASK,
        SnowflakeId::WORKER_MASK,
        SnowflakeId::SEQUENCE_MASK,
    )?;
    writeln!(out, "epoch_ms   {}", config.epoch_ms())?;

    let source = match config.identity_source {
        IdentitySource::Configured => "configured",
        IdentitySource::Discovered => "discovered",
        IdentitySource::Mixed => "partly discovered",
    };
    writeln!(out, "identity   {} ({source})", config.identity)?;

    let clock = match config.clock {
        ClockKind::System => "system",
        ClockKind::Monotonic => "monotonic",
    };
    writeln!(out, "clock      {clock}")?;
    if let Some(spins) = config.spin_limit {
        writeln!(out, "spin_limit {spins}")?;
    }
    out.flush()?;
    Ok(())
}
