use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Address, ContentHash, FileRecord, OrderId, Timestamp};
use crate::error::ReadError;

/// The three parallel sequences returned by the order-files contract read.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawOrderFiles {
    pub hashes: Vec<String>,
    pub addresses: Vec<String>,
    pub timestamps: Vec<Timestamp>,
}

impl RawOrderFiles {
    /// Validate and zip the sequences into records, in scan order.
    pub fn records(&self) -> Result<Vec<FileRecord>, ReadError> {
        let n = self.hashes.len();
        if self.addresses.len() != n || self.timestamps.len() != n {
            return Err(ReadError::Malformed(format!(
                "sequence lengths differ: hashes={n} addresses={} timestamps={}",
                self.addresses.len(),
                self.timestamps.len()
            )));
        }
        self.hashes
            .iter()
            .zip(&self.addresses)
            .zip(&self.timestamps)
            .enumerate()
            .map(|(i, ((h, a), t))| {
                let content_hash = ContentHash::parse(h)
                    .map_err(|e| ReadError::Malformed(format!("entry {i}: {e}")))?;
                let contributor = Address::parse(a)
                    .map_err(|e| ReadError::Malformed(format!("entry {i}: {e}")))?;
                Ok(FileRecord {
                    content_hash,
                    contributor,
                    timestamp: *t,
                })
            })
            .collect()
    }
}

#[async_trait]
pub trait OrderFilesSource: Send + Sync {
    async fn order_files(&self, order: OrderId, caller: &Address)
    -> Result<RawOrderFiles, ReadError>;
}

/// Reads exported contract results, one `<order>.json` per order.
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, order: OrderId) -> PathBuf {
        self.dir.join(format!("{order}.json"))
    }
}

#[async_trait]
impl OrderFilesSource for JsonFileSource {
    async fn order_files(
        &self,
        order: OrderId,
        _caller: &Address,
    ) -> Result<RawOrderFiles, ReadError> {
        let path = self.path_for(order);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ReadError::Unavailable(format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ReadError::Malformed(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn records_reject_unequal_lengths() {
        let raw = RawOrderFiles {
            hashes: vec!["f1".into(), "f2".into()],
            addresses: vec![A.into()],
            timestamps: vec![Timestamp(1), Timestamp(2)],
        };
        assert!(matches!(raw.records(), Err(ReadError::Malformed(_))));
    }

    #[test]
    fn records_reject_invalid_address() {
        let raw = RawOrderFiles {
            hashes: vec!["f1".into()],
            addresses: vec!["not-an-address".into()],
            timestamps: vec![Timestamp(1)],
        };
        let err = raw.records().unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }

    #[tokio::test]
    async fn json_source_reads_export() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("7.json"),
            format!(r#"{{"hashes":["f1"],"addresses":["{A}"],"timestamps":["1700000000"]}}"#),
        )
        .unwrap();
        let src = JsonFileSource::new(dir.path());
        let caller = Address::parse(A).unwrap();
        let raw = src.order_files(7, &caller).await.unwrap();
        assert_eq!(raw.timestamps, vec![Timestamp(1_700_000_000)]);

        let missing = src.order_files(8, &caller).await;
        assert!(matches!(missing, Err(ReadError::Unavailable(_))));
    }
}
