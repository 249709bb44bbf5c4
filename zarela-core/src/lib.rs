#![forbid(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod payload;
pub mod retrieve;
pub mod selection;
pub mod source;
pub mod view;

// Re-exports: stable API surface
pub use aggregate::{ContributionGroup, aggregate, from_read};
pub use config::Config;
pub use domain::{Address, ContentHash, FileEntry, FileRecord, OrderId, Timestamp};
pub use payload::{Payload, PayoutOutcome, PayoutSink, build_payload, submit_payout};
pub use retrieve::{
    RetrievalBoard, RetrievalFailure, RetrievalPipeline, RetrievalStage, retrieve_many,
};
pub use selection::{GroupState, SelectionState, SelectionStore, Toggle};
pub use source::{JsonFileSource, OrderFilesSource, RawOrderFiles};
pub use view::{OrderView, ReadApplied, ReadTicket};
