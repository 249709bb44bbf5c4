use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Address;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content gateway base, files live under `/ipfs/<hash>`.
    pub gateway_url: String,
    /// JSON-RPC signer that answers `eth_decrypt`.
    pub rpc_url: String,
    /// Viewer account used for decryption and order reads.
    pub account: Option<Address>,
    pub download_dir: PathBuf,
    /// Exported order-file reads, `<order>.json`.
    pub orders_dir: PathBuf,
    pub max_concurrent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:8080".into(),
            rpc_url: "http://127.0.0.1:8545".into(),
            account: None,
            download_dir: PathBuf::from("."),
            orders_dir: PathBuf::from("."),
            max_concurrent: 4,
        }
    }
}

impl Config {
    /// Defaults when `path` is `None`; missing keys in the file keep defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let bytes = std::fs::read(p)?;
                Ok(serde_json::from_slice(&bytes)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("zarela.json");
        std::fs::write(
            &p,
            r#"{"gateway_url":"http://gw:9000","account":"0x00000000000000000000000000000000000000AA"}"#,
        )
        .unwrap();
        let c = Config::load(Some(&p)).unwrap();
        assert_eq!(c.gateway_url, "http://gw:9000");
        assert_eq!(
            c.account.unwrap().as_str(),
            "0x00000000000000000000000000000000000000aa"
        );
        assert_eq!(c.max_concurrent, 4);
        assert_eq!(c.rpc_url, Config::default().rpc_url);
    }

    #[test]
    fn bad_account_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("zarela.json");
        std::fs::write(&p, r#"{"account":"alice"}"#).unwrap();
        assert!(Config::load(Some(&p)).is_err());
    }
}
