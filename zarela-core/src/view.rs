use crate::aggregate::from_read;
use crate::domain::{Address, OrderId};
use crate::error::ReadError;
use crate::selection::SelectionStore;
use crate::source::{OrderFilesSource, RawOrderFiles};

/// Handle for one outstanding order read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReadTicket {
    generation: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadApplied {
    Applied,
    /// A newer read was issued (or the view closed) before this one landed.
    Stale,
}

/// Detail view of one order: owns the contributions and their selection
/// while open. Only the latest issued read may replace the contents.
#[derive(Debug)]
pub struct OrderView {
    order: OrderId,
    generation: u64,
    store: Option<SelectionStore>,
}

impl OrderView {
    pub fn new(order: OrderId) -> Self {
        Self {
            order,
            generation: 0,
            store: None,
        }
    }

    pub fn order(&self) -> OrderId {
        self.order
    }

    pub fn begin_read(&mut self) -> ReadTicket {
        self.generation += 1;
        ReadTicket {
            generation: self.generation,
        }
    }

    pub fn complete_read(
        &mut self,
        ticket: ReadTicket,
        read: Result<RawOrderFiles, ReadError>,
    ) -> ReadApplied {
        if ticket.generation != self.generation {
            tracing::debug!(
                order = self.order,
                ticket = ticket.generation,
                latest = self.generation,
                "discarding stale order read"
            );
            return ReadApplied::Stale;
        }
        self.store = Some(from_read(read));
        ReadApplied::Applied
    }

    /// Issue a read against `source` and apply it if still current.
    ///
    /// Holds `&mut self` across the await, so two `load` calls on one view
    /// never overlap. Callers that keep several reads in flight use
    /// `begin_read` and `complete_read` directly.
    pub async fn load(
        &mut self,
        source: &dyn OrderFilesSource,
        caller: &Address,
    ) -> ReadApplied {
        let ticket = self.begin_read();
        let read = source.order_files(self.order, caller).await;
        self.complete_read(ticket, read)
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.store = None;
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&SelectionStore> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut SelectionStore> {
        self.store.as_mut()
    }
}
