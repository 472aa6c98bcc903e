use core::fmt;

use crate::id::SnowflakeId;

/// The decoded fields of a Snowflake ID.
///
/// `timestamp` is relative to the epoch of the generator that produced the ID.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Components {
    pub timestamp: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl fmt::Display for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ts={} dc={} worker={} seq={}",
            self.timestamp, self.datacenter_id, self.worker_id, self.sequence
        )
    }
}

/// Packs the fields into the raw 64-bit value of layout `ID`.
///
/// Inputs are expected to already fit their fields; anything wider is masked.
/// Validation belongs to [`Identity`] and the generators.
///
/// # Example
///
/// ```
/// use dcflake::{decode, encode, ClassicSnowflakeId};
///
/// let raw = encode::<ClassicSnowflakeId>(1_000, 3, 7, 42);
/// let parts = decode::<ClassicSnowflakeId>(raw);
/// assert_eq!((parts.timestamp, parts.datacenter_id, parts.worker_id, parts.sequence), (1_000, 3, 7, 42));
/// ```
///
/// [`Identity`]: crate::Identity
#[must_use]
pub fn encode<ID: SnowflakeId>(
    timestamp: u64,
    datacenter_id: u64,
    worker_id: u64,
    sequence: u64,
) -> u64 {
    ID::from_components(
        timestamp & ID::max_timestamp(),
        datacenter_id & ID::max_datacenter_id(),
        worker_id & ID::max_worker_id(),
        sequence & ID::max_sequence(),
    )
    .to_raw()
}

/// Splits a raw 64-bit value into the fields of layout `ID`.
#[must_use]
pub fn decode<ID: SnowflakeId>(raw: u64) -> Components {
    ID::from_raw(raw).components()
}

impl Components {
    /// Re-encodes these components with layout `ID`.
    #[must_use]
    pub fn encode<ID: SnowflakeId>(&self) -> u64 {
        encode::<ID>(
            self.timestamp,
            self.datacenter_id,
            self.worker_id,
            self.sequence,
        )
    }
}
