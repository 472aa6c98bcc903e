use core::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use dcflake::{
    ClassicSnowflakeId, DEFAULT_EPOCH, Identity, LockSnowflakeGenerator, MonotonicClock,
    SystemClock, TimeSource,
};

/// The ID layout minted by the command-line tool.
pub type SnowflakeId = ClassicSnowflakeId;

/// Generator shared by every worker thread of `generate`.
pub type Generator = LockSnowflakeGenerator<SnowflakeId, Clock>;

/// Runtime configuration for the `dcflake` binary.
///
/// Identity and clock settings are global and may come from CLI arguments,
/// environment variables or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dcflake",
    version,
    about = "Mint, decode and inspect datacenter-partitioned Snowflake IDs"
)]
pub struct CliArgs {
    /// Datacenter ID stamped into generated IDs.
    ///
    /// When absent, derived from the host's network hardware address.
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", global = true)]
    pub datacenter_id: Option<u64>,

    /// Worker ID stamped into generated IDs.
    ///
    /// When absent, derived from the datacenter ID and the process ID. Two
    /// processes on the same host may collide, so set this explicitly for
    /// anything long-lived.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", global = true)]
    pub worker_id: Option<u64>,

    /// Epoch as Unix milliseconds. Must not be in the future.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", global = true, default_value_t = DEFAULT_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// Give up after this many clock reads when waiting for the next
    /// millisecond. Unbounded when absent.
    ///
    /// Environment variable: `SPIN_LIMIT`
    #[arg(long, env = "SPIN_LIMIT", global = true)]
    pub spin_limit: Option<u32>,

    /// Time source used by the generator.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", global = true, value_enum, default_value_t = ClockKind::Monotonic)]
    pub clock: ClockKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate new IDs.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Worker threads sharing one generator. `0` uses every core.
        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Decimal)]
        format: Format,
    },
    /// Split IDs into their components.
    Decode {
        /// Raw decimal IDs.
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Print one JSON object per line.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the bit layout and the effective identity.
    Inspect,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Plain decimal.
    Decimal,
    /// Zero-padded to 20 digits so IDs sort lexically.
    Padded,
    /// One JSON object per line with the decoded components.
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Read the wall clock on every call. Fails if it is stepped backwards.
    System,
    /// Anchor to the wall clock once and advance monotonically.
    Monotonic,
}

/// Clock implementation selected at startup.
#[derive(Debug, Clone)]
pub enum Clock {
    System(SystemClock),
    Monotonic(MonotonicClock),
}

impl TimeSource for Clock {
    fn current_millis(&self) -> u64 {
        match self {
            Self::System(clock) => clock.current_millis(),
            Self::Monotonic(clock) => clock.current_millis(),
        }
    }
}

/// Where the effective identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Configured,
    Discovered,
    Mixed,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub identity: Identity<SnowflakeId>,
    pub identity_source: IdentitySource,
    pub epoch: Duration,
    pub spin_limit: Option<u32>,
    pub clock: ClockKind,
    pub command: Command,
}

impl AppConfig {
    /// Builds the generator described by this configuration.
    pub fn generator(&self) -> Generator {
        let clock = match self.clock {
            ClockKind::System => Clock::System(SystemClock),
            ClockKind::Monotonic => Clock::Monotonic(MonotonicClock::new()),
        };
        let generator = Generator::new(self.identity, clock).with_epoch(self.epoch);
        match self.spin_limit {
            Some(spins) => generator.with_spin_limit(spins),
            None => generator,
        }
    }

    /// Milliseconds to add to a layout timestamp to get Unix time.
    pub fn epoch_ms(&self) -> u64 {
        self.epoch.as_millis() as u64
    }
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let now = SystemClock.current_millis();
        if args.epoch_ms > now {
            bail!(
                "EPOCH_MS ({}) is in the future (now = {})",
                args.epoch_ms,
                now
            );
        }

        let (identity, identity_source) = match (args.datacenter_id, args.worker_id) {
            (Some(datacenter_id), Some(worker_id)) => (
                Identity::new(datacenter_id, worker_id).context("invalid identity")?,
                IdentitySource::Configured,
            ),
            (None, None) => (Identity::discover(), IdentitySource::Discovered),
            (datacenter_id, worker_id) => {
                let discovered = Identity::<SnowflakeId>::discover();
                let identity = Identity::new(
                    datacenter_id.unwrap_or(discovered.datacenter_id()),
                    worker_id.unwrap_or(discovered.worker_id()),
                )
                .context("invalid identity")?;
                (identity, IdentitySource::Mixed)
            }
        };

        Ok(Self {
            identity,
            identity_source,
            epoch: Duration::from_millis(args.epoch_ms),
            spin_limit: args.spin_limit,
            clock: args.clock,
            command: args.command,
        })
    }
}
