use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Address, OrderId};
use crate::error::Result;
use crate::selection::SelectionState;

/// Addresses handed to the payout call, one entry per selected file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payload(Vec<Address>);

impl Payload {
    pub fn addresses(&self) -> &[Address] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn build_payload(state: &SelectionState) -> Payload {
    let mut out = Vec::with_capacity(state.selected_count());
    for (address, chosen) in state.iter() {
        out.extend(std::iter::repeat_n(address.clone(), chosen.len()));
    }
    Payload(out)
}

/// External bulk token transfer (`handleConfirm`).
#[async_trait]
pub trait PayoutSink: Send + Sync {
    async fn confirm(&self, order: OrderId, payload: &Payload) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayoutOutcome {
    Submitted { entries: usize },
    /// Nothing selected; the sink was not called.
    Skipped,
}

pub async fn submit_payout(
    sink: &dyn PayoutSink,
    order: OrderId,
    state: &SelectionState,
) -> Result<PayoutOutcome> {
    let payload = build_payload(state);
    if payload.is_empty() {
        tracing::info!(order, "no files selected; payout skipped");
        return Ok(PayoutOutcome::Skipped);
    }
    sink.confirm(order, &payload).await?;
    tracing::info!(order, entries = payload.len(), "payout submitted");
    Ok(PayoutOutcome::Submitted {
        entries: payload.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::from_read;
    use crate::domain::{ContentHash, Timestamp};
    use crate::selection::{SelectionStore, Toggle};
    use crate::source::RawOrderFiles;
    use std::sync::Mutex;

    const A: &str = "0x00000000000000000000000000000000000000aa";
    const B: &str = "0x00000000000000000000000000000000000000bb";

    fn sample() -> SelectionStore {
        from_read(Ok(RawOrderFiles {
            hashes: vec!["f1".into(), "f2".into(), "f3".into()],
            addresses: vec![A.into(), B.into(), A.into()],
            timestamps: vec![Timestamp(1), Timestamp(2), Timestamp(3)],
        }))
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(OrderId, Payload)>>,
    }

    #[async_trait]
    impl PayoutSink for Recorder {
        async fn confirm(&self, order: OrderId, payload: &Payload) -> Result<()> {
            self.calls.lock().unwrap().push((order, payload.clone()));
            Ok(())
        }
    }

    #[test]
    fn repeats_address_per_selected_file() {
        let mut s = sample();
        let a = Address::parse(A).unwrap();
        s.toggle_file(&a, &ContentHash::parse("f1").unwrap(), Toggle::Select);
        s.toggle_file(&a, &ContentHash::parse("f3").unwrap(), Toggle::Select);
        let p = build_payload(s.state());
        assert_eq!(p.addresses(), &[a.clone(), a]);
    }

    #[test]
    fn follows_key_order() {
        let mut s = sample();
        s.toggle_all(Toggle::Select);
        let p = build_payload(s.state());
        let got: Vec<&str> = p.addresses().iter().map(Address::as_str).collect();
        assert_eq!(got, vec![A, A, B]);
        assert_eq!(serde_json::to_string(&p).unwrap(), format!(r#"["{A}","{A}","{B}"]"#));
    }

    #[tokio::test]
    async fn empty_selection_never_reaches_sink() {
        let s = sample();
        let sink = Recorder::default();
        let out = submit_payout(&sink, 4, s.state()).await.unwrap();
        assert_eq!(out, PayoutOutcome::Skipped);
        assert!(sink.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn selection_is_submitted() {
        let mut s = sample();
        s.toggle_group(&Address::parse(B).unwrap(), Toggle::Select);
        let sink = Recorder::default();
        let out = submit_payout(&sink, 4, s.state()).await.unwrap();
        assert_eq!(out, PayoutOutcome::Submitted { entries: 1 });
        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls[0].0, 4);
        assert_eq!(calls[0].1.len(), 1);
    }
}
