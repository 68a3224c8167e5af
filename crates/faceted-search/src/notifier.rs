//! Change notification.
//!
//! A client has exactly one observer, registered at construction. After
//! every settled request the observer receives the current
//! [`SearchState`] snapshot together with the client's [`SearchHandlers`];
//! with [`NotifyMode::PendingAndSettled`] it is also called when a request is
//! issued so it can show a pending indicator.
//!
//! Every notification carries the sequence number of the request it belongs
//! to. Deliveries are serialized and a snapshot older than one already
//! delivered is skipped, so the observer never moves back to a superseded
//! state even when requests settle on different threads.

use std::cell::Cell;
use std::fmt;

use parking_lot::ReentrantMutex;

use crate::client::FetchTicket;
use crate::config::NotifyMode;
use crate::error::StateError;
use crate::store::SearchState;
use crate::types::FieldValue;

type SearchFieldFn = dyn Fn(&str, FieldValue) -> Result<FetchTicket, StateError> + Send + Sync;
type SortFieldFn = dyn Fn(&str, &str) -> Result<FetchTicket, StateError> + Send + Sync;
type PageFn = dyn Fn(i64) -> Result<FetchTicket, StateError> + Send + Sync;
type NewSearchFn = dyn Fn() -> Result<FetchTicket, StateError> + Send + Sync;

/// Intent handlers bound to a client.
///
/// A client creates its bundle once; every notification and every
/// [`get_handlers`](crate::SearchClient::get_handlers) call hands out the same
/// instance. The handlers do not keep the client alive: once it is dropped
/// they return [`StateError::ClientClosed`].
pub struct SearchHandlers {
    search_field: Box<SearchFieldFn>,
    sort_field: Box<SortFieldFn>,
    page: Box<PageFn>,
    new_search: Box<NewSearchFn>,
}

impl SearchHandlers {
    pub(crate) fn new(
        search_field: Box<SearchFieldFn>,
        sort_field: Box<SortFieldFn>,
        page: Box<PageFn>,
        new_search: Box<NewSearchFn>,
    ) -> Self {
        Self {
            search_field,
            sort_field,
            page,
            new_search,
        }
    }

    /// A search field's value changed.
    pub fn on_search_field_change(
        &self,
        field: &str,
        value: FieldValue,
    ) -> Result<FetchTicket, StateError> {
        (self.search_field)(field, value)
    }

    /// A sort was picked (`direction` is `asc` or `desc`).
    pub fn on_sort_field_change(
        &self,
        field: &str,
        direction: &str,
    ) -> Result<FetchTicket, StateError> {
        (self.sort_field)(field, direction)
    }

    /// Another page was picked.
    pub fn on_page_change(&self, page: i64) -> Result<FetchTicket, StateError> {
        (self.page)(page)
    }

    /// All filters were cleared.
    pub fn on_new_search(&self) -> Result<FetchTicket, StateError> {
        (self.new_search)()
    }
}

impl fmt::Debug for SearchHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHandlers").finish_non_exhaustive()
    }
}

type OnChangeFn = dyn Fn(&SearchState, &SearchHandlers) + Send + Sync;

/// Delivers state snapshots to the registered observer.
pub struct ChangeNotifier {
    on_change: Box<OnChangeFn>,
    mode: NotifyMode,
    // Reentrant: the observer may issue a request, which notifies again.
    delivered: ReentrantMutex<Cell<u64>>,
}

impl ChangeNotifier {
    /// Creates a notifier for one observer.
    pub fn new<F>(on_change: F, mode: NotifyMode) -> Self
    where
        F: Fn(&SearchState, &SearchHandlers) + Send + Sync + 'static,
    {
        Self {
            on_change: Box::new(on_change),
            mode,
            delivered: ReentrantMutex::new(Cell::new(0)),
        }
    }

    /// Called when request `seq` is issued. Only notifies in
    /// [`NotifyMode::PendingAndSettled`].
    pub fn fetch_started(
        &self,
        seq: u64,
        state: &SearchState,
        handlers: &SearchHandlers,
    ) -> bool {
        self.mode == NotifyMode::PendingAndSettled && self.deliver(seq, state, handlers)
    }

    /// Called once request `seq` has settled. Returns false if a newer
    /// snapshot was already delivered and this one was skipped.
    pub fn settled(&self, seq: u64, state: &SearchState, handlers: &SearchHandlers) -> bool {
        self.deliver(seq, state, handlers)
    }

    /// Sequence number of the newest delivered snapshot (0 before the first).
    pub fn last_delivered(&self) -> u64 {
        self.delivered.lock().get()
    }

    fn deliver(&self, seq: u64, state: &SearchState, handlers: &SearchHandlers) -> bool {
        let delivered = self.delivered.lock();
        if seq < delivered.get() {
            tracing::debug!(seq, delivered = delivered.get(), "skipping stale notification");
            return false;
        }
        delivered.set(seq);
        (self.on_change)(state, handlers);
        true
    }

    /// The notification mode.
    pub fn mode(&self) -> NotifyMode {
        self.mode
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
