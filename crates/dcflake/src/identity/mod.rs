mod discovery;

use core::{fmt, marker::PhantomData};

pub use discovery::*;

use crate::{
    error::{Error, Field, Result},
    id::SnowflakeId,
};

/// The `(datacenter, worker)` pair that partitions the ID space of layout
/// `ID` across independently running generators.
///
/// An `Identity` can only be obtained through validation against the field
/// widths of `ID`, so a generator built from it never has to re-check its
/// bounds. It is immutable and `Copy`, and may be read from any number of
/// threads.
///
/// Two live generators must never share an identity; nothing here can enforce
/// that.
///
/// # Example
///
/// ```
/// use dcflake::{ClassicSnowflakeId, Error, Identity};
///
/// let identity = Identity::<ClassicSnowflakeId>::new(3, 31).unwrap();
/// assert_eq!(identity.worker_id(), 31);
///
/// assert!(matches!(
///     Identity::<ClassicSnowflakeId>::new(3, 32),
///     Err(Error::OutOfRange { .. })
/// ));
/// ```
pub struct Identity<ID: SnowflakeId> {
    datacenter_id: u64,
    worker_id: u64,
    _id: PhantomData<fn() -> ID>,
}

impl<ID: SnowflakeId> Identity<ID> {
    /// Validates and creates a new identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either component exceeds the maximum
    /// of its bit field in `ID`.
    pub fn new(datacenter_id: u64, worker_id: u64) -> Result<Self> {
        Self::check(Field::Worker, worker_id, ID::max_worker_id())?;
        Self::check(Field::Datacenter, datacenter_id, ID::max_datacenter_id())?;
        Ok(Self::new_unchecked(datacenter_id, worker_id))
    }

    /// Derives a best-effort identity from the host's network hardware address
    /// and process ID.
    ///
    /// This never fails: any component that cannot be derived falls back to
    /// zero. See [`derive_identity`] for the exact scheme.
    #[must_use]
    pub fn discover() -> Self {
        derive_identity(&SystemHost)
    }

    pub(crate) const fn new_unchecked(datacenter_id: u64, worker_id: u64) -> Self {
        Self {
            datacenter_id,
            worker_id,
            _id: PhantomData,
        }
    }

    fn check(field: Field, value: u64, max: u64) -> Result<()> {
        if value > max {
            return Err(Error::OutOfRange { field, value, max });
        }
        Ok(())
    }

    /// Returns the datacenter ID.
    #[must_use]
    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// Returns the worker ID.
    #[must_use]
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }
}

impl<ID: SnowflakeId> Clone for Identity<ID> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<ID: SnowflakeId> Copy for Identity<ID> {}

impl<ID: SnowflakeId> PartialEq for Identity<ID> {
    fn eq(&self, other: &Self) -> bool {
        self.datacenter_id == other.datacenter_id && self.worker_id == other.worker_id
    }
}

impl<ID: SnowflakeId> Eq for Identity<ID> {}

impl<ID: SnowflakeId> fmt::Debug for Identity<ID> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("datacenter_id", &self.datacenter_id)
            .field("worker_id", &self.worker_id)
            .finish()
    }
}

impl<ID: SnowflakeId> fmt::Display for Identity<ID> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.datacenter_id, self.worker_id)
    }
}
