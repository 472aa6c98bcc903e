/// Returns a mask covering the low `bits` bits of a `u64`.
#[doc(hidden)]
#[must_use]
pub const fn field_mask(bits: u32) -> u64 {
    if bits == 0 { 0 } else { u64::MAX >> (u64::BITS - bits) }
}

/// A macro for defining a bit layout for a custom Snowflake ID using five
/// required components: `reserved`, `timestamp`, `datacenter`, `worker`, and
/// `sequence`.
///
/// These components are always laid out from **most significant bit (MSB)** to
/// **least significant bit (LSB)** - in that exact order.
///
/// - The first field (`reserved`) occupies the highest bits and is always
///   written as zero.
/// - The last field (`sequence`) occupies the lowest bits.
/// - The total number of bits **must exactly equal** 64. If it doesn't, the
///   macro will trigger a compile-time assertion failure.
///
/// ```text
/// define_snowflake_id!(
///     <TypeName>,
///     reserved: <bits>,
///     timestamp: <bits>,
///     datacenter: <bits>,
///     worker: <bits>,
///     sequence: <bits>
/// );
/// ```
///
/// ## Example: a layout with more room per millisecond
/// ```rust
/// use dcflake::{define_snowflake_id, SnowflakeId};
///
/// define_snowflake_id!(
///     WideSequenceId,
///     reserved: 1,
///     timestamp: 41,
///     datacenter: 3,
///     worker: 3,
///     sequence: 16
/// );
///
/// assert_eq!(WideSequenceId::max_sequence(), 65_535);
/// assert_eq!(WideSequenceId::max_worker_id(), 7);
/// ```
///
/// Which expands to the following bit layout:
///
/// ```text
///  Bit Index:  63  62          22 21   19 18   16 15           0
///              +---+-------------+-------+-------+--------------+
///  Field:      | R |  time (41)  | dc(3) | wk(3) | sequence(16) |
///              +---+-------------+-------+-------+--------------+
///              |<----------- MSB -- 64 bits -- LSB ------------>|
/// ```
#[macro_export]
macro_rules! define_snowflake_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        datacenter: $datacenter_bits:expr,
        worker: $worker_bits:expr,
        sequence: $sequence_bits:expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            // Compile-time check: total bit width _must_ equal 64 so that no
            // field aliases another.
            assert!(
                $reserved_bits
                    + $timestamp_bits
                    + $datacenter_bits
                    + $worker_bits
                    + $sequence_bits
                    == u64::BITS,
                "Layout must match underlying type width"
            );
            assert!($timestamp_bits > 0, "timestamp field must not be empty");
            assert!($sequence_bits > 0, "sequence field must not be empty");
        };

        impl $name {
            pub const RESERVED_BITS: u32 = $reserved_bits;
            pub const TIMESTAMP_BITS: u32 = $timestamp_bits;
            pub const DATACENTER_BITS: u32 = $datacenter_bits;
            pub const WORKER_BITS: u32 = $worker_bits;
            pub const SEQUENCE_BITS: u32 = $sequence_bits;

            pub const SEQUENCE_SHIFT: u32 = 0;
            pub const WORKER_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
            pub const DATACENTER_SHIFT: u32 = Self::WORKER_SHIFT + Self::WORKER_BITS;
            pub const TIMESTAMP_SHIFT: u32 = Self::DATACENTER_SHIFT + Self::DATACENTER_BITS;

            pub const TIMESTAMP_MASK: u64 = $crate::field_mask(Self::TIMESTAMP_BITS);
            pub const DATACENTER_MASK: u64 = $crate::field_mask(Self::DATACENTER_BITS);
            pub const WORKER_MASK: u64 = $crate::field_mask(Self::WORKER_BITS);
            pub const SEQUENCE_MASK: u64 = $crate::field_mask(Self::SEQUENCE_BITS);

            const fn valid_mask() -> u64 {
                (Self::TIMESTAMP_MASK << Self::TIMESTAMP_SHIFT)
                    | (Self::DATACENTER_MASK << Self::DATACENTER_SHIFT)
                    | (Self::WORKER_MASK << Self::WORKER_SHIFT)
                    | (Self::SEQUENCE_MASK << Self::SEQUENCE_SHIFT)
            }

            /// Packs the components into an ID, masking each to its field.
            #[must_use]
            pub const fn from(
                timestamp: u64,
                datacenter_id: u64,
                worker_id: u64,
                sequence: u64,
            ) -> Self {
                let t = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
                let d = (datacenter_id & Self::DATACENTER_MASK) << Self::DATACENTER_SHIFT;
                let w = (worker_id & Self::WORKER_MASK) << Self::WORKER_SHIFT;
                let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                Self { id: t | d | w | s }
            }

            /// Extracts the timestamp from the packed ID.
            #[must_use]
            pub const fn timestamp(&self) -> u64 {
                (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
            }

            /// Extracts the datacenter ID from the packed ID.
            #[must_use]
            pub const fn datacenter_id(&self) -> u64 {
                (self.id >> Self::DATACENTER_SHIFT) & Self::DATACENTER_MASK
            }

            /// Extracts the worker ID from the packed ID.
            #[must_use]
            pub const fn worker_id(&self) -> u64 {
                (self.id >> Self::WORKER_SHIFT) & Self::WORKER_MASK
            }

            /// Extracts the sequence number from the packed ID.
            #[must_use]
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            /// Returns `true` if the reserved bits are all zero.
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                self.id & !Self::valid_mask() == 0
            }

            /// Returns the ID with its reserved bits cleared.
            #[must_use]
            pub const fn into_valid(self) -> Self {
                Self {
                    id: self.id & Self::valid_mask(),
                }
            }

            /// Converts this type into its raw representation.
            #[must_use]
            pub const fn to_raw(&self) -> u64 {
                self.id
            }

            /// Converts a raw value into this type.
            #[must_use]
            pub const fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }

            /// Returns the ID as a zero-padded 20-digit string.
            #[must_use]
            pub fn to_padded_string(&self) -> ::std::string::String {
                ::std::format!("{:020}", self.id)
            }
        }

        impl $crate::SnowflakeId for $name {
            const TIMESTAMP_BITS: u32 = $timestamp_bits;
            const DATACENTER_BITS: u32 = $datacenter_bits;
            const WORKER_BITS: u32 = $worker_bits;
            const SEQUENCE_BITS: u32 = $sequence_bits;

            fn timestamp(&self) -> u64 {
                self.timestamp()
            }

            fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            fn datacenter_id(&self) -> u64 {
                self.datacenter_id()
            }

            fn max_datacenter_id() -> u64 {
                Self::DATACENTER_MASK
            }

            fn worker_id(&self) -> u64 {
                self.worker_id()
            }

            fn max_worker_id() -> u64 {
                Self::WORKER_MASK
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            fn from_components(
                timestamp: u64,
                datacenter_id: u64,
                worker_id: u64,
                sequence: u64,
            ) -> Self {
                debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
                debug_assert!(datacenter_id <= Self::DATACENTER_MASK, "datacenter_id overflow");
                debug_assert!(worker_id <= Self::WORKER_MASK, "worker_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                Self::from(timestamp, datacenter_id, worker_id, sequence)
            }

            fn to_raw(&self) -> u64 {
                self.id
            }

            fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }
        }

        impl ::core::convert::From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.to_raw()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::write!(f, "{}", self.id)
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(::core::stringify!($name))
                    .field("id", &self.id)
                    .field("timestamp", &self.timestamp())
                    .field("datacenter_id", &self.datacenter_id())
                    .field("worker_id", &self.worker_id())
                    .field("sequence", &self.sequence())
                    .finish()
            }
        }
    };
}

define_snowflake_id!(
    /// A 64-bit Snowflake ID using the classic datacenter/worker layout
    ///
    /// - 1 bit reserved
    /// - 41 bits timestamp (ms since the generator epoch, ~69 years)
    /// - 5 bits datacenter ID
    /// - 5 bits worker ID
    /// - 12 bits sequence
    ///
    /// ```text
    ///  Bit Index:  63  62            22 21         17 16       12 11             0
    ///              +---+----------------+-------------+-----------+---------------+
    ///  Field:      | R | timestamp (41) | datacenter  | worker    | sequence (12) |
    ///              |   |                | (5)         | (5)       |               |
    ///              +---+----------------+-------------+-----------+---------------+
    ///              |<---------------- MSB ------ 64 bits ------ LSB ------------->|
    /// ```
    ClassicSnowflakeId,
    reserved: 1,
    timestamp: 41,
    datacenter: 5,
    worker: 5,
    sequence: 12
);
