use std::io::Write;

use tracing::warn;

use crate::{commands::Record, config::SnowflakeId};

/// Writes the components of each raw ID to `out`.
pub fn run(ids: &[u64], json: bool, epoch_ms: u64, out: &mut impl Write) -> anyhow::Result<()> {
    for &raw in ids {
        if !SnowflakeId::from_raw(raw).is_valid() {
            warn!(id = raw, "reserved bit is set, this was not minted by dcflake");
        }

        let record = Record::new(raw, epoch_ms);
        if json {
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{record}")?;
        }
    }
    out.flush()?;
    Ok(())
}
