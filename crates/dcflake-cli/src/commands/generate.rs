use std::{io::Write, thread};

use anyhow::anyhow;
use tracing::{debug, info};

use crate::{
    commands::Record,
    config::{Format, Generator, SnowflakeId},
};

/// Mints `count` IDs from one shared generator and writes them to `out`.
///
/// Each thread's IDs are printed as a contiguous block in the order that
/// thread generated them.
pub fn run(
    generator: &Generator,
    count: usize,
    threads: usize,
    format: Format,
    epoch_ms: u64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };
    let threads = threads.clamp(1, count.max(1));
    info!(count, threads, "generating ids");

    for batch in mint(generator, count, threads)? {
        for id in batch {
            write_id(out, id, format, epoch_ms)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn mint(
    generator: &Generator,
    count: usize,
    threads: usize,
) -> anyhow::Result<Vec<Vec<SnowflakeId>>> {
    if threads == 1 {
        return Ok(vec![take(generator, count)?]);
    }

    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let share = count / threads + usize::from(i < count % threads);
                s.spawn(move || take(generator, share))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| -> anyhow::Result<Vec<SnowflakeId>> {
                let batch = handle
                    .join()
                    .map_err(|_| anyhow!("generator thread panicked"))??;
                Ok(batch)
            })
            .collect()
    })
}

fn take(generator: &Generator, count: usize) -> dcflake::Result<Vec<SnowflakeId>> {
    let batch = (0..count)
        .map(|_| generator.try_next_id())
        .collect::<dcflake::Result<Vec<_>>>()?;
    debug!(count = batch.len(), "batch complete");
    Ok(batch)
}

fn write_id(
    out: &mut impl Write,
    id: SnowflakeId,
    format: Format,
    epoch_ms: u64,
) -> anyhow::Result<()> {
    match format {
        Format::Decimal => writeln!(out, "{id}")?,
        Format::Padded => writeln!(out, "{}", id.to_padded_string())?,
        Format::Json => {
            serde_json::to_writer(&mut *out, &Record::new(id.to_raw(), epoch_ms))?;
            writeln!(out)?;
        }
    }
    Ok(())
}
