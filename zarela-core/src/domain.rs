// zarela_core/src/domain.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ZarelaError;

pub const ADDRESS_BYTES: usize = 20;

/// Account address, `0x` + 40 hex digits, held lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(s: &str) -> Result<Self, ZarelaError> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ZarelaError::Format(format!("address missing 0x prefix: {s}")))?;
        let bytes = hex::decode(digits)
            .map_err(|e| ZarelaError::Format(format!("invalid address {s}: {e}")))?;
        if bytes.len() != ADDRESS_BYTES {
            return Err(ZarelaError::Format(format!(
                "expected {ADDRESS_BYTES} address bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ZarelaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ZarelaError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content identifier on the distributed store. Alphanumeric only, so it is
/// also a safe file stem.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    pub fn parse(s: &str) -> Result<Self, ZarelaError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ZarelaError::Format("empty content hash".into()));
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ZarelaError::Format(format!("invalid content hash: {s}")));
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentHash {
    type Err = ZarelaError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ZarelaError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ContentHash> for String {
    fn from(h: ContentHash) -> Self {
        h.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix seconds. Contract reads hand these back as decimal strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn to_rfc3339(self) -> String {
        i64::try_from(self.0)
            .ok()
            .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u64),
            Text(String),
        }
        match Repr::deserialize(d)? {
            Repr::Num(n) => Ok(Timestamp(n)),
            Repr::Text(s) => s
                .trim()
                .parse()
                .map(Timestamp)
                .map_err(|e| serde::de::Error::custom(format!("timestamp {s:?}: {e}"))),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type OrderId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub content_hash: ContentHash,
    pub contributor: Address,
    pub timestamp: Timestamp,
}

/// One contribution as listed under its contributor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub content_hash: ContentHash,
    pub timestamp: Timestamp,
}
