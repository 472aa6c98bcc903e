mod atomic;
mod basic;
mod clock;
mod interface;
mod lock;
mod mutex;
mod status;

pub use atomic::*;
pub use basic::*;
pub(crate) use clock::*;
pub use interface::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use status::*;

use crate::{id::SnowflakeId, identity::Identity};

/// Emits the layout and identity a new generator will stamp into its IDs.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_layout<ID: SnowflakeId>(identity: &Identity<ID>, kind: &'static str) {
    #[cfg(feature = "tracing")]
    tracing::info!(
        kind,
        datacenter_id = identity.datacenter_id(),
        worker_id = identity.worker_id(),
        timestamp_bits = ID::TIMESTAMP_BITS,
        datacenter_bits = ID::DATACENTER_BITS,
        worker_bits = ID::WORKER_BITS,
        sequence_bits = ID::SEQUENCE_BITS,
        worker_shift = ID::SEQUENCE_BITS,
        datacenter_shift = ID::SEQUENCE_BITS + ID::WORKER_BITS,
        timestamp_shift = ID::SEQUENCE_BITS + ID::WORKER_BITS + ID::DATACENTER_BITS,
        max_sequence = ID::max_sequence(),
        "snowflake generator ready"
    );
}

#[cfg(test)]
mod tests;
