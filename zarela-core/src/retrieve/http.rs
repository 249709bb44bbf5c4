use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Decryptor, Gateway};
use crate::domain::{Address, ContentHash};
use crate::error::RetrievalError;

/// Content-addressed gateway reached over HTTP: `GET {base}/ipfs/{hash}`.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    base: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, hash: &ContentHash) -> String {
        format!("{}/ipfs/{hash}", self.base)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch(&self, hash: &ContentHash) -> Result<String, RetrievalError> {
        let url = self.url_for(hash);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RetrievalError::Fetch(format!("{url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Fetch(format!("{url}: status {status}")));
        }
        resp.text()
            .await
            .map_err(|e| RetrievalError::Fetch(format!("{url}: body: {e}")))
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Asks a JSON-RPC signer holding the account key to run `eth_decrypt`.
#[derive(Clone, Debug)]
pub struct RpcDecryptor {
    endpoint: String,
    client: reqwest::Client,
}

impl RpcDecryptor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Decryptor for RpcDecryptor {
    async fn decrypt(&self, ciphertext: &str, account: &Address) -> Result<String, RetrievalError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_decrypt",
            "params": [ciphertext, account.as_str()],
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Decrypt(format!("{}: {e}", self.endpoint)))?;
        if !resp.status().is_success() {
            return Err(RetrievalError::Decrypt(format!(
                "{}: status {}",
                self.endpoint,
                resp.status()
            )));
        }
        let parsed: RpcResponse = resp
            .json()
            .await
            .map_err(|e| RetrievalError::Decrypt(format!("invalid rpc response: {e}")))?;
        match (parsed.result, parsed.error) {
            (_, Some(err)) => Err(RetrievalError::Decrypt(format!(
                "{} (code {})",
                err.message, err.code
            ))),
            (Some(plaintext), None) => Ok(plaintext),
            (None, None) => Err(RetrievalError::Decrypt("empty rpc response".into())),
        }
    }
}
