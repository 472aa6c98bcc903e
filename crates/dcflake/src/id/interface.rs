use core::{fmt, hash::Hash};

use crate::id::Components;

/// A trait representing a 64-bit Snowflake layout with separate bit fields for
/// timestamp, datacenter ID, worker ID, and sequence.
///
/// Fields are packed from **most significant bit (MSB)** to **least
/// significant bit (LSB)** in that order, so comparing two IDs as integers
/// compares their timestamps first. Use [`define_snowflake_id!`] to declare a
/// layout with custom widths.
///
/// # Example
///
/// ```
/// use dcflake::{ClassicSnowflakeId, SnowflakeId};
///
/// let id = ClassicSnowflakeId::from_components(1000, 3, 7, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.datacenter_id(), 3);
/// assert_eq!(id.worker_id(), 7);
/// assert_eq!(id.sequence(), 1);
/// ```
///
/// [`define_snowflake_id!`]: crate::define_snowflake_id
pub trait SnowflakeId:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Width of the timestamp field.
    const TIMESTAMP_BITS: u32;
    /// Width of the datacenter ID field.
    const DATACENTER_BITS: u32;
    /// Width of the worker ID field.
    const WORKER_BITS: u32;
    /// Width of the sequence field.
    const SEQUENCE_BITS: u32;

    /// Returns the timestamp portion of the ID, in milliseconds since the
    /// generator epoch.
    fn timestamp(&self) -> u64;

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64;

    /// Returns the datacenter ID portion of the ID.
    fn datacenter_id(&self) -> u64;

    /// Returns the maximum possible value for the datacenter ID field.
    fn max_datacenter_id() -> u64;

    /// Returns the worker ID portion of the ID.
    fn worker_id(&self) -> u64;

    /// Returns the maximum possible value for the worker ID field.
    fn max_worker_id() -> u64;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Constructs a new ID from its components.
    ///
    /// Components wider than their field are masked, not validated.
    fn from_components(timestamp: u64, datacenter_id: u64, worker_id: u64, sequence: u64)
    -> Self;

    /// Converts this type into its raw `u64` representation.
    fn to_raw(&self) -> u64;

    /// Converts a raw `u64` into this type.
    fn from_raw(raw: u64) -> Self;

    /// Splits the ID into its decoded [`Components`].
    fn components(&self) -> Components {
        Components {
            timestamp: self.timestamp(),
            datacenter_id: self.datacenter_id(),
            worker_id: self.worker_id(),
            sequence: self.sequence(),
        }
    }

    /// Returns true if the current sequence value can be incremented.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns the next sequence value.
    fn next_sequence(&self) -> u64 {
        self.sequence() + 1
    }

    /// Returns a new ID with the sequence incremented.
    fn increment_sequence(&self) -> Self {
        Self::from_components(
            self.timestamp(),
            self.datacenter_id(),
            self.worker_id(),
            self.next_sequence(),
        )
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.datacenter_id(), self.worker_id(), 0)
    }
}
