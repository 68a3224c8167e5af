//! The search client.
//!
//! [`SearchClient`] ties the components together: it owns the
//! [`QueryStateStore`] behind a lock, sends every request the store issues
//! through the injected [`SearchTransport`] on a tokio task, routes the
//! response back into the store's sequence guard, and fires the
//! [`ChangeNotifier`] once the store has settled.
//!
//! Mutations never wait for I/O. Each returns a [`FetchTicket`] that can be
//! awaited to learn how that request ended.
//!
//! ```no_run
//! use helios_faceted_search::{SearchClient, SearchClientConfig};
//! use helios_faceted_search::config::SearchFieldConfig;
//! use helios_faceted_search::types::{FieldType, FieldValue};
//!
//! # async fn run() -> helios_faceted_search::Result<()> {
//! let config = SearchClientConfig::new("http://localhost:8983/solr/persons/select")
//!     .with_search_field(SearchFieldConfig::new("Name", "name_t", FieldType::Text));
//!
//! let client = SearchClient::with_http(config, |state, _handlers| {
//!     println!("{} results", state.results.num_found);
//! })?;
//!
//! client.initialize().settled().await;
//! client
//!     .set_search_field_value("name_t", FieldValue::text("jo*"))?
//!     .settled()
//!     .await;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::SearchClientConfig;
use crate::error::{ConfigError, StateError};
use crate::notifier::{ChangeNotifier, SearchHandlers};
use crate::registry::FieldRegistry;
use crate::store::{FetchRequest, QueryStateStore, SearchState, Settlement};
use crate::transport::SearchTransport;
use crate::types::{FieldValue, SortDirection};

/// Handle to one in-flight request.
///
/// Dropping the ticket does not cancel the request.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    handle: JoinHandle<Settlement>,
    client: Weak<ClientInner>,
}

impl FetchTicket {
    /// Sequence number of the request.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Waits until the request has settled.
    pub async fn settled(self) -> Settlement {
        self.handle.await.unwrap_or(Settlement::Cancelled)
    }

    /// Aborts the underlying request. Its response, if any, is never applied.
    ///
    /// If it was the latest request the client goes back to idle, keeps the
    /// previous results (no longer pending), and notifies the observer.
    pub fn abort(&self) {
        self.handle.abort();

        let Some(inner) = self.client.upgrade() else {
            return;
        };
        let (settlement, snapshot) = {
            let mut store = inner.store.lock();
            let settlement = store.cancel(self.seq);
            (settlement, store.snapshot())
        };
        if settlement == Settlement::Cancelled {
            inner.notifier.settled(self.seq, &snapshot, &inner.handlers);
        }
    }
}

struct ClientInner {
    url: String,
    store: Mutex<QueryStateStore>,
    transport: Arc<dyn SearchTransport>,
    notifier: ChangeNotifier,
    handlers: Arc<SearchHandlers>,
    runtime: Handle,
}

/// Faceted search client.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<ClientInner>,
}

impl SearchClient {
    /// Builds a client.
    ///
    /// Must be called from within a tokio runtime; requests are spawned on it.
    /// No request is sent until [`initialize`](Self::initialize).
    pub fn new<F>(
        config: SearchClientConfig,
        transport: Arc<dyn SearchTransport>,
        on_change: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&SearchState, &SearchHandlers) + Send + Sync + 'static,
    {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| ConfigError::NoRuntime {
            message: e.to_string(),
        })?;

        let (registry, initial) =
            FieldRegistry::build(&config.search_fields, &config.sort_fields, config.rows)?;
        let store = QueryStateStore::new(Arc::new(registry), initial, config.filters.clone());
        let notifier = ChangeNotifier::new(on_change, config.notify_mode());

        let inner = Arc::new_cyclic(|weak| ClientInner {
            url: config.url.clone(),
            store: Mutex::new(store),
            transport,
            notifier,
            handlers: Arc::new(bind_handlers(weak)),
            runtime,
        });

        Ok(Self { inner })
    }

    /// Builds a client that talks HTTP through [`HttpTransport`](crate::transport::HttpTransport).
    #[cfg(feature = "http")]
    pub fn with_http<F>(config: SearchClientConfig, on_change: F) -> crate::Result<Self>
    where
        F: Fn(&SearchState, &SearchHandlers) + Send + Sync + 'static,
    {
        let timeout = std::time::Duration::from_secs(config.request_timeout_secs);
        let transport = crate::transport::HttpTransport::new(timeout)
            .map_err(crate::error::FetchError::from)?;
        Ok(Self::new(config, Arc::new(transport), on_change)?)
    }

    /// Sends the first request for the initial query state.
    pub fn initialize(&self) -> FetchTicket {
        {
            let store = self.inner.store.lock();
            tracing::info!(
                url = %self.inner.url,
                search_fields = store.registry().fields().len(),
                sort_fields = store.registry().sort_fields().len(),
                "initializing search client"
            );
        }
        issue(&self.inner, QueryStateStore::initialize)
    }

    /// Replaces a search field's value; the page goes back to 0.
    pub fn set_search_field_value(
        &self,
        field: &str,
        value: FieldValue,
    ) -> Result<FetchTicket, StateError> {
        try_issue(&self.inner, |store| store.set_search_field_value(field, value))
    }

    /// Makes `field` the only active sort (`direction` is `asc` or `desc`);
    /// the page goes back to 0.
    pub fn set_sort_field_value(
        &self,
        field: &str,
        direction: &str,
    ) -> Result<FetchTicket, StateError> {
        try_issue(&self.inner, |store| store.set_sort_field_value(field, direction))
    }

    /// Typed form of [`set_sort_field_value`](Self::set_sort_field_value).
    pub fn set_sort(
        &self,
        field: &str,
        direction: SortDirection,
    ) -> Result<FetchTicket, StateError> {
        try_issue(&self.inner, |store| store.set_sort(field, direction))
    }

    /// Removes the active sort; the page goes back to 0.
    pub fn clear_sort(&self) -> FetchTicket {
        issue(&self.inner, QueryStateStore::clear_sort)
    }

    /// Moves to another page.
    pub fn set_current_page(&self, page: i64) -> Result<FetchTicket, StateError> {
        try_issue(&self.inner, |store| store.set_current_page(page))
    }

    /// Clears every search field; sort is kept and the page goes back to 0.
    pub fn new_search(&self) -> FetchTicket {
        issue(&self.inner, QueryStateStore::new_search)
    }

    /// The handler bundle, identical to the one passed to the observer.
    pub fn get_handlers(&self) -> Arc<SearchHandlers> {
        Arc::clone(&self.inner.handlers)
    }

    /// The current snapshot.
    pub fn state(&self) -> SearchState {
        self.inner.store.lock().snapshot()
    }

    /// The field registry.
    pub fn registry(&self) -> Arc<FieldRegistry> {
        Arc::clone(self.inner.store.lock().registry())
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("url", &self.inner.url)
            .field("notifier", &self.inner.notifier)
            .finish_non_exhaustive()
    }
}

fn bind_handlers(weak: &Weak<ClientInner>) -> SearchHandlers {
    let search_field = weak.clone();
    let sort_field = weak.clone();
    let page = weak.clone();
    let new_search = weak.clone();

    SearchHandlers::new(
        Box::new(move |field: &str, value: FieldValue| {
            let inner = search_field.upgrade().ok_or(StateError::ClientClosed)?;
            try_issue(&inner, |store| store.set_search_field_value(field, value))
        }),
        Box::new(move |field: &str, direction: &str| {
            let inner = sort_field.upgrade().ok_or(StateError::ClientClosed)?;
            try_issue(&inner, |store| store.set_sort_field_value(field, direction))
        }),
        Box::new(move |current: i64| {
            let inner = page.upgrade().ok_or(StateError::ClientClosed)?;
            try_issue(&inner, |store| store.set_current_page(current))
        }),
        Box::new(move || {
            let inner = new_search.upgrade().ok_or(StateError::ClientClosed)?;
            Ok(issue(&inner, QueryStateStore::new_search))
        }),
    )
}

fn try_issue<F>(inner: &Arc<ClientInner>, mutate: F) -> Result<FetchTicket, StateError>
where
    F: FnOnce(&mut QueryStateStore) -> Result<FetchRequest, StateError>,
{
    let (request, pending) = {
        let mut store = inner.store.lock();
        let request = mutate(&mut store)?;
        (request, store.snapshot())
    };
    Ok(launch(inner, request, pending))
}

fn issue<F>(inner: &Arc<ClientInner>, mutate: F) -> FetchTicket
where
    F: FnOnce(&mut QueryStateStore) -> FetchRequest,
{
    let (request, pending) = {
        let mut store = inner.store.lock();
        let request = mutate(&mut store);
        (request, store.snapshot())
    };
    launch(inner, request, pending)
}

/// Notifies the pending state and spawns the request. The store lock is not
/// held here, so the observer may call back into the client. Snapshots are
/// taken under the store lock and delivered in sequence order by the
/// notifier.
fn launch(inner: &Arc<ClientInner>, request: FetchRequest, pending: SearchState) -> FetchTicket {
    let seq = request.seq;
    inner.notifier.fetch_started(seq, &pending, &inner.handlers);

    let task = Arc::clone(inner);
    let handle = inner.runtime.spawn(async move {
        let outcome = task
            .transport
            .fetch(&task.url, request.query.params())
            .await;

        let (settlement, snapshot) = {
            let mut store = task.store.lock();
            let settlement = store.settle(seq, outcome);
            (settlement, store.snapshot())
        };

        if settlement != Settlement::Superseded {
            task.notifier.settled(seq, &snapshot, &task.handlers);
        }
        settlement
    });

    FetchTicket {
        seq,
        handle,
        client: Arc::downgrade(inner),
    }
}
