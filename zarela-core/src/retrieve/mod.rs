//! Per-file retrieval: fetch ciphertext, decrypt, decode, sniff, save.
//!
//! Every external capability sits behind a trait so the pipeline can run
//! against a real gateway/signer or test doubles. Invocations share nothing
//! mutable; a failure is attributed to exactly one stage and stays local to
//! its file.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::domain::{Address, ContentHash};
use crate::error::RetrievalError;

pub mod artifact;
pub mod http;
pub mod save;
pub mod sniff;

pub use artifact::{Artifact, SaveAction, decode_plaintext};
pub use save::{DirSaveTarget, SaveReceipt};

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Ciphertext stored under `hash`.
    async fn fetch(&self, hash: &ContentHash) -> Result<String, RetrievalError>;
}

#[async_trait]
pub trait Decryptor: Send + Sync {
    /// Base64 plaintext, or a rejection.
    async fn decrypt(&self, ciphertext: &str, account: &Address) -> Result<String, RetrievalError>;
}

#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Persist the payload of `action` under its file name.
    async fn save(&self, action: &SaveAction) -> Result<SaveReceipt, RetrievalError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RetrievalStage {
    Idle,
    Fetching,
    Decrypting,
    Decoding,
    SniffingType,
    Saving,
    Done,
    Failed,
}

#[derive(Error, Debug)]
#[error("{stage:?} failed: {error}")]
pub struct RetrievalFailure {
    /// Stage that was running when the failure happened.
    pub stage: RetrievalStage,
    #[source]
    pub error: RetrievalError,
}

#[derive(Clone)]
pub struct RetrievalPipeline {
    gateway: Arc<dyn Gateway>,
    decryptor: Arc<dyn Decryptor>,
    target: Arc<dyn SaveTarget>,
}

impl RetrievalPipeline {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        decryptor: Arc<dyn Decryptor>,
        target: Arc<dyn SaveTarget>,
    ) -> Self {
        Self {
            gateway,
            decryptor,
            target,
        }
    }

    pub async fn run(
        &self,
        hash: &ContentHash,
        account: &Address,
    ) -> Result<SaveReceipt, RetrievalFailure> {
        self.run_observed(hash, account, |_| {}).await
    }

    /// Like `run`, reporting each stage entered (ending in `Done` or `Failed`).
    pub async fn run_observed<F>(
        &self,
        hash: &ContentHash,
        account: &Address,
        mut observer: F,
    ) -> Result<SaveReceipt, RetrievalFailure>
    where
        F: FnMut(RetrievalStage) + Send,
    {
        let mut reached = RetrievalStage::Idle;
        let result = {
            let mut advance = |stage: RetrievalStage| {
                tracing::debug!(hash = %hash, ?stage, "retrieval stage");
                reached = stage;
                observer(stage);
            };
            self.stages(hash, account, &mut advance).await
        };
        match result {
            Ok(receipt) => {
                observer(RetrievalStage::Done);
                tracing::info!(
                    hash = %hash,
                    path = %receipt.path.display(),
                    mime = %receipt.mime,
                    "contribution saved"
                );
                Ok(receipt)
            }
            Err(error) => {
                observer(RetrievalStage::Failed);
                tracing::warn!(hash = %hash, stage = ?reached, error = %error, "retrieval failed");
                Err(RetrievalFailure {
                    stage: reached,
                    error,
                })
            }
        }
    }

    async fn stages<F>(
        &self,
        hash: &ContentHash,
        account: &Address,
        advance: &mut F,
    ) -> Result<SaveReceipt, RetrievalError>
    where
        F: FnMut(RetrievalStage) + Send,
    {
        advance(RetrievalStage::Fetching);
        let ciphertext = self.gateway.fetch(hash).await?;

        advance(RetrievalStage::Decrypting);
        let plaintext = self.decryptor.decrypt(&ciphertext, account).await?;

        advance(RetrievalStage::Decoding);
        let bytes = decode_plaintext(&plaintext)?;

        advance(RetrievalStage::SniffingType);
        let artifact = Artifact::identify(hash.clone(), bytes)?;

        advance(RetrievalStage::Saving);
        self.target.save(&artifact.save_action()).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievalStatus {
    pub stage: RetrievalStage,
    pub error: Option<String>,
}

/// Last known stage per file. Entries are written only by their own run.
#[derive(Debug, Default)]
pub struct RetrievalBoard {
    status: DashMap<ContentHash, RetrievalStatus>,
}

impl RetrievalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, hash: &ContentHash) -> Option<RetrievalStatus> {
        self.status.get(hash).map(|s| s.value().clone())
    }

    pub fn stage(&self, hash: &ContentHash) -> RetrievalStage {
        self.status(hash).map_or(RetrievalStage::Idle, |s| s.stage)
    }

    /// Run `pipeline` for `hash`, recording its progress. Re-invoking after a
    /// failure starts over from `Fetching`.
    pub async fn track(
        &self,
        pipeline: &RetrievalPipeline,
        hash: &ContentHash,
        account: &Address,
    ) -> Result<SaveReceipt, RetrievalFailure> {
        let result = pipeline
            .run_observed(hash, account, |stage| {
                self.status
                    .insert(hash.clone(), RetrievalStatus { stage, error: None });
            })
            .await;
        if let Err(f) = &result {
            self.status.insert(
                hash.clone(),
                RetrievalStatus {
                    stage: RetrievalStage::Failed,
                    error: Some(f.to_string()),
                },
            );
        }
        result
    }
}

/// Retrieve several files concurrently, at most `limit` in flight. Outcomes
/// come back in input order.
pub async fn retrieve_many(
    board: &RetrievalBoard,
    pipeline: &RetrievalPipeline,
    hashes: &[ContentHash],
    account: &Address,
    limit: usize,
) -> Vec<(ContentHash, Result<SaveReceipt, RetrievalFailure>)> {
    stream::iter(hashes)
        .map(|hash| async move { (hash.clone(), board.track(pipeline, hash, account).await) })
        .buffered(limit.max(1))
        .collect()
        .await
}
