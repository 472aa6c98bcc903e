//! Snowflake-style 64-bit IDs partitioned by datacenter and worker.
//!
//! Every ID packs a millisecond timestamp, a datacenter ID, a worker ID and a
//! per-millisecond sequence into a single `u64`. Generators with distinct
//! `(datacenter, worker)` identities never collide, and each generator's IDs
//! strictly increase.
//!
//! ```
//! use dcflake::{ClassicSnowflakeId, Identity, LockSnowflakeGenerator, MonotonicClock, decode};
//!
//! let identity = Identity::<ClassicSnowflakeId>::new(1, 17)?;
//! let generator = LockSnowflakeGenerator::new(identity, MonotonicClock::new());
//!
//! let first = generator.try_next_id()?;
//! let second = generator.try_next_id()?;
//! assert!(second > first);
//!
//! let parts = decode::<ClassicSnowflakeId>(second.to_raw());
//! assert_eq!((parts.datacenter_id, parts.worker_id), (1, 17));
//! # Ok::<(), dcflake::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod generator;
mod id;
mod identity;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::identity::*;
pub use crate::time::*;
