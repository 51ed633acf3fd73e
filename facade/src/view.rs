//! Per-view state, owned by exactly one writer and published via `watch`.
//!
//! Collections are only ever replaced wholesale with a fresh snapshot. Each
//! fetch takes a ticket when it is issued; a snapshot whose ticket is older
//! than the one on display is dropped, so a slow early fetch cannot
//! overwrite a later one when fetches overlap.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Last user-visible outcome of a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

/// What a view displays. `M` carries view-specific extras.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState<R, M = ()> {
    pub rows: Vec<R>,
    /// Ticket of the snapshot on display; `None` before the first one.
    pub snapshot: Option<u64>,
    pub fetches_in_flight: usize,
    /// Set when a refresh after a successful mutation failed: `rows` may lag
    /// the ledger. Cleared by the next applied snapshot.
    pub stale: bool,
    pub notice: Option<Notice>,
    pub meta: M,
}

impl<R, M> ViewState<R, M> {
    fn new(meta: M) -> Self {
        Self {
            rows: Vec::new(),
            snapshot: None,
            fetches_in_flight: 0,
            stale: false,
            notice: None,
            meta,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.fetches_in_flight > 0
    }
}

/// The single owner of a view's state.
pub struct ViewCell<R, M = ()> {
    state: watch::Sender<ViewState<R, M>>,
    tickets: AtomicU64,
}

impl<R: Clone, M: Clone> ViewCell<R, M> {
    pub fn new(meta: M) -> Self {
        let (state, _) = watch::channel(ViewState::new(meta));
        Self {
            state,
            tickets: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<R, M>> {
        self.state.subscribe()
    }

    /// A copy of what is on display now.
    pub fn current(&self) -> ViewState<R, M> {
        self.state.borrow().clone()
    }

    /// Register a fetch about to be issued. The returned handle settles it;
    /// dropping the handle unsettled withdraws the fetch.
    pub fn begin_fetch(&self) -> Fetch<'_, R, M> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.fetches_in_flight += 1);
        Fetch {
            cell: self,
            ticket,
            settled: false,
        }
    }

    pub fn set_notice(&self, notice: Notice) {
        self.state.send_modify(|s| s.notice = Some(notice));
    }

    pub fn mark_stale(&self, notice: Notice) {
        self.state.send_modify(|s| {
            s.stale = true;
            s.notice = Some(notice);
        });
    }

    pub fn update_meta(&self, f: impl FnOnce(&mut M)) {
        self.state.send_modify(|s| f(&mut s.meta));
    }
}

/// One outstanding fetch of a [`ViewCell`].
pub struct Fetch<'a, R, M = ()> {
    cell: &'a ViewCell<R, M>,
    ticket: u64,
    settled: bool,
}

impl<R, M> Fetch<'_, R, M> {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Settle with a fresh collection. Returns whether it replaced the
    /// displayed rows.
    pub fn apply(mut self, rows: Vec<R>) -> bool {
        self.settled = true;
        let ticket = self.ticket;
        let mut applied = false;
        self.cell.state.send_modify(|s| {
            s.fetches_in_flight = s.fetches_in_flight.saturating_sub(1);
            if s.snapshot.map_or(true, |shown| ticket > shown) {
                s.rows = rows;
                s.snapshot = Some(ticket);
                s.stale = false;
                applied = true;
            }
        });
        if !applied {
            tracing::debug!(ticket, "discarded snapshot older than the one displayed");
        }
        applied
    }

    /// Settle a fetch that failed. Rows on display are kept.
    pub fn fail(mut self, notice: Notice) {
        self.settled = true;
        self.cell.state.send_modify(|s| {
            s.fetches_in_flight = s.fetches_in_flight.saturating_sub(1);
            s.notice = Some(notice);
        });
    }
}

impl<R, M> Drop for Fetch<'_, R, M> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(ticket = self.ticket, "fetch abandoned before it settled");
            self.cell
                .state
                .send_modify(|s| s.fetches_in_flight = s.fetches_in_flight.saturating_sub(1));
        }
    }
}
