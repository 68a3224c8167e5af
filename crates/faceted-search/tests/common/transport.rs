//! In-memory transport.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use helios_faceted_search::SearchTransport;
use helios_faceted_search::error::TransportError;
use helios_faceted_search::store::SearchState;

type Params = Vec<(String, String)>;
type Responder = dyn Fn(&[(String, String)]) -> Result<Value, TransportError> + Send + Sync;
type Predicate = dyn Fn(&[(String, String)]) -> bool + Send + Sync;

struct Gate {
    matches: Box<Predicate>,
    release: Option<oneshot::Receiver<()>>,
}

/// Transport that answers from a closure and records every request.
///
/// Requests matching a gate registered with [`MockTransport::hold`] block
/// until the gate is released, which lets tests settle requests out of order.
pub struct MockTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<Params>>,
    gates: Mutex<Vec<Gate>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&[(String, String)]) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            gates: Mutex::new(Vec::new()),
        })
    }

    /// Answers every request with [`page_response`](super::page_response).
    pub fn paging() -> Arc<Self> {
        Self::new(|params| Ok(super::page_response(params)))
    }

    /// Holds the next request matching `matches` until the returned sender
    /// fires (or is dropped).
    pub fn hold<F>(&self, matches: F) -> oneshot::Sender<()>
    where
        F: Fn(&[(String, String)]) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push(Gate {
            matches: Box::new(matches),
            release: Some(rx),
        });
        tx
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<Params> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn take_gate(&self, params: &[(String, String)]) -> Option<oneshot::Receiver<()>> {
        let mut gates = self.gates.lock();
        gates
            .iter_mut()
            .find(|gate| gate.release.is_some() && (gate.matches)(params))
            .and_then(|gate| gate.release.take())
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn fetch(&self, _url: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        self.requests.lock().push(params.to_vec());

        if let Some(release) = self.take_gate(params) {
            let _ = release.await;
        }

        (self.responder)(params)
    }
}

/// Observer that forwards every snapshot to a channel.
pub fn recorder() -> (
    impl Fn(&SearchState, &helios_faceted_search::SearchHandlers) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<SearchState>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let observer = move |state: &SearchState, _: &helios_faceted_search::SearchHandlers| {
        let _ = tx.send(state.clone());
    };
    (observer, rx)
}
