//! Refresh delivery from core to the presentation layer.
//!
//! # Responsibility
//! - Define the snapshot shape (`ListView`) handed to list screens.
//! - Define the sink the UI owns (`RefreshSink`) and a channel-backed
//!   implementation so snapshots can be marshaled onto one consumer thread.
//! - Sequence search requests so stale results can be dropped on arrival.
//!
//! # Invariants
//! - Core never assumes which thread consumes a snapshot.
//! - A search ticket is current only until a newer ticket is issued.

use crate::model::list::{Category, Item, ItemPartition};
use log::warn;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Snapshot of the records currently visible on one screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ListView {
    /// Top-level category list.
    Categories { categories: Vec<Category> },
    /// Items of one category, insertion order.
    Items { category: Category, items: Vec<Item> },
    /// Pending/done split of one category.
    Split {
        category: Category,
        partition: ItemPartition,
    },
    /// Filtered items of one category, name order.
    Search {
        category: Category,
        query: String,
        items: Vec<Item>,
    },
}

impl ListView {
    /// Number of rows the view renders.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Categories { categories } => categories.len(),
            Self::Items { items, .. } | Self::Search { items, .. } => items.len(),
            Self::Split { partition, .. } => partition.len(),
        }
    }
}

/// Receiver side of refresh delivery, owned by the presentation layer.
pub trait RefreshSink {
    fn deliver(&self, view: ListView);
}

/// Sink backed by an mpsc channel; the UI drains the receiver on its own
/// thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<ListView>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the UI thread should drain.
    pub fn channel() -> (Self, Receiver<ListView>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl RefreshSink for ChannelSink {
    fn deliver(&self, view: ListView) {
        if self.sender.send(view).is_err() {
            warn!("event=refresh_deliver module=delivery status=dropped reason=receiver_closed");
        }
    }
}

/// Sink adapter for plain callbacks.
pub struct FnSink<F>(pub F);

impl<F: Fn(ListView)> RefreshSink for FnSink<F> {
    fn deliver(&self, view: ListView) {
        (self.0)(view)
    }
}

/// Monotonic search request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SearchTicket(u64);

impl SearchTicket {
    /// Rebuilds a ticket handed across a process boundary as a plain number.
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues search tickets and answers whether a ticket is still the latest.
///
/// Clones share one counter, so a sequencer can be handed to a worker thread
/// that runs the query while the UI keeps issuing newer searches.
#[derive(Debug, Clone, Default)]
pub struct SearchSequencer {
    latest: Arc<AtomicU64>,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier one.
    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Delivers `view` only when `ticket` is still current.
    ///
    /// Returns whether the view was delivered.
    pub fn deliver_if_current(
        &self,
        ticket: SearchTicket,
        sink: &impl RefreshSink,
        view: ListView,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        sink.deliver(view);
        true
    }
}
