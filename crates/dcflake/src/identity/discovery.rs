use crate::{Identity, SnowflakeId};

/// Host facts used to derive a default [`Identity`].
///
/// Implementations report `None` for anything they cannot determine; the
/// derivation then falls back to zero for the affected component instead of
/// failing.
pub trait HostInfo {
    /// Returns the hardware (MAC) address of a local network interface.
    fn hardware_address(&self) -> Option<Vec<u8>>;

    /// Returns the ID of the current process.
    fn process_id(&self) -> Option<u32>;
}

/// A [`HostInfo`] backed by the running host.
///
/// On Linux the hardware address is read from the first interface under
/// `/sys/class/net` (in name order) that is not the loopback device and does
/// not report an all-zero address. Other platforms report no address.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl HostInfo for SystemHost {
    #[cfg(target_os = "linux")]
    fn hardware_address(&self) -> Option<Vec<u8>> {
        let mut entries: Vec<_> = std::fs::read_dir("/sys/class/net")
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "lo")
            .collect();
        entries.sort_by_key(std::fs::DirEntry::file_name);

        entries.into_iter().find_map(|entry| {
            let text = std::fs::read_to_string(entry.path().join("address")).ok()?;
            parse_hardware_address(text.trim()).filter(|mac| mac.iter().any(|&b| b != 0))
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn hardware_address(&self) -> Option<Vec<u8>> {
        None
    }

    fn process_id(&self) -> Option<u32> {
        Some(std::process::id())
    }
}

/// Parses a colon separated hex address such as `02:42:ac:11:00:02`.
fn parse_hardware_address(text: &str) -> Option<Vec<u8>> {
    let bytes = text
        .split(':')
        .map(|part| u8::from_str_radix(part, 16).ok())
        .collect::<Option<Vec<_>>>()?;
    (bytes.len() >= 2).then_some(bytes)
}

/// Derives a default identity for layout `ID` from `host`.
///
/// - The datacenter ID takes the last two bytes of the hardware address,
///   drops the low 6 bits and reduces the result modulo the field size.
/// - The worker ID hashes the decimal datacenter ID followed by the decimal
///   process ID (31-multiplier string hash), keeps the low 16 bits, and
///   reduces modulo the field size.
///
/// Whenever an input is missing the affected component is zero. The result is
/// always within bounds, but two hosts or processes may still derive the same
/// identity: use explicit identities wherever uniqueness matters.
///
/// # Example
///
/// ```
/// use dcflake::{derive_identity, ClassicSnowflakeId, HostInfo};
///
/// struct Offline;
/// impl HostInfo for Offline {
///     fn hardware_address(&self) -> Option<Vec<u8>> {
///         None
///     }
///     fn process_id(&self) -> Option<u32> {
///         None
///     }
/// }
///
/// let identity = derive_identity::<ClassicSnowflakeId>(&Offline);
/// assert_eq!((identity.datacenter_id(), identity.worker_id()), (0, 0));
/// ```
pub fn derive_identity<ID: SnowflakeId>(host: &impl HostInfo) -> Identity<ID> {
    let datacenter_id = host
        .hardware_address()
        .map_or(0, |mac| datacenter_from_hardware_address::<ID>(&mac));
    let worker_id = host
        .process_id()
        .map_or(0, |pid| worker_from_process::<ID>(datacenter_id, pid));

    #[cfg(feature = "tracing")]
    tracing::debug!(datacenter_id, worker_id, "derived default identity");

    Identity::new_unchecked(datacenter_id, worker_id)
}

fn datacenter_from_hardware_address<ID: SnowflakeId>(mac: &[u8]) -> u64 {
    let [.., hi, lo] = mac else {
        return 0;
    };
    let id = ((u64::from(*hi) << 8) | u64::from(*lo)) >> 6;
    id % (ID::max_datacenter_id() + 1)
}

fn worker_from_process<ID: SnowflakeId>(datacenter_id: u64, pid: u32) -> u64 {
    let seed = format!("{datacenter_id}{pid}");
    let hash = seed
        .bytes()
        .fold(0i32, |h, b| h.wrapping_mul(31).wrapping_add(i32::from(b)));
    // Reinterpret as unsigned before masking so negative hashes keep their bits.
    let low = u64::from(hash as u32 & 0xffff);
    low % (ID::max_worker_id() + 1)
}
