pub mod decode;
pub mod generate;
pub mod inspect;

use core::fmt;

use dcflake::Components;
use serde::Serialize;

use crate::config::SnowflakeId;

/// A decoded ID as printed by `generate --format json` and `decode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: u64,
    pub unix_ms: u64,
    #[serde(flatten)]
    pub components: Components,
}

impl Record {
    pub fn new(raw: u64, epoch_ms: u64) -> Self {
        let components = dcflake::decode::<SnowflakeId>(raw);
        Self {
            id: raw,
            unix_ms: components.timestamp.saturating_add(epoch_ms),
            components,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} unix_ms={}", self.id, self.components, self.unix_ms)
    }
}
