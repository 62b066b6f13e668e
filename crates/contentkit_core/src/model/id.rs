//! Resource identifier.
//!
//! # Responsibility
//! - Generate store-native 12-byte identifiers rendered as 24 hex characters.
//! - Parse client-supplied identifier strings.
//!
//! # Invariants
//! - Layout: 4-byte big-endian unix seconds, 5 process-random bytes, 3-byte
//!   big-endian counter.
//! - Textual form is always lowercase hex; parsing accepts either case.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ID_BYTES: usize = 12;
const ID_HEX_LEN: usize = ID_BYTES * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| {
    let random = Uuid::new_v4();
    let mut bytes = [0u8; 5];
    bytes.copy_from_slice(&random.as_bytes()[..5]);
    bytes
});

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| {
    let random = Uuid::new_v4().into_bytes();
    AtomicU32::new(u32::from_be_bytes([0, random[0], random[1], random[2]]))
});

/// Stable identifier shared by every resource kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ResourceId([u8; ID_BYTES]);

impl ResourceId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or(0);
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(PROCESS_UNIQUE.as_slice());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parses a 24-character hex identifier.
    pub fn parse_str(value: &str) -> Result<Self, ParseIdError> {
        if value.len() != ID_HEX_LEN {
            return Err(ParseIdError::InvalidLength(value.len()));
        }

        let mut bytes = [0u8; ID_BYTES];
        for (index, chunk) in value.as_bytes().chunks(2).enumerate() {
            let high = hex_value(chunk[0]).ok_or(ParseIdError::InvalidCharacter)?;
            let low = hex_value(chunk[1]).ok_or(ParseIdError::InvalidCharacter)?;
            bytes[index] = (high << 4) | low;
        }
        Ok(Self(bytes))
    }

    /// Creation second embedded in the identifier.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceId({self})")
    }
}

impl FromStr for ResourceId {
    type Err = ParseIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_str(value)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_str(&value)
    }
}

/// Identifier parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    InvalidLength(usize),
    InvalidCharacter,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength(len) => {
                write!(f, "resource id must be {ID_HEX_LEN} hex characters, got {len}")
            }
            Self::InvalidCharacter => write!(f, "resource id must only contain hex characters"),
        }
    }
}

impl Error for ParseIdError {}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseIdError, ResourceId};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_render_as_lowercase_hex() {
        let id = ResourceId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 24);
        assert!(text
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(ResourceId::parse_str(&text).unwrap(), id);
    }

    #[test]
    fn generated_ids_are_unique_within_process() {
        let ids = (0..1_000).map(|_| ResourceId::new()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn parse_accepts_uppercase_and_rejects_garbage() {
        let parsed = ResourceId::parse_str("5C499A59BEFF35368C511B73").unwrap();
        assert_eq!(parsed.to_string(), "5c499a59beff35368c511b73");
        assert_eq!(parsed.timestamp_secs(), 0x5c49_9a59);

        assert_eq!(
            ResourceId::parse_str("bad-id"),
            Err(ParseIdError::InvalidLength(6))
        );
        assert_eq!(
            ResourceId::parse_str("zc499a59beff35368c511b73"),
            Err(ParseIdError::InvalidCharacter)
        );
    }

    #[test]
    fn serde_uses_hex_string_form() {
        let id = ResourceId::parse_str("5c499a59beff35368c511b73").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"5c499a59beff35368c511b73\"");
        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
