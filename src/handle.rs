//! Single-writer actor for sharing a store across tasks and threads.
//!
//! One tokio task owns the [`Store`] and applies requests strictly one at a
//! time in arrival order. Handles are cheap to clone; every read and write
//! goes through the same queue.

use crate::protocol::{Request, Response};
use crate::store::Store;
use crate::types::Task;
use eyre::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Default request queue capacity.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

type Envelope = (Request, oneshot::Sender<Response>);

/// Cloneable handle to a store running on its own task.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Envelope>,
}

impl StoreHandle {
    /// Spawn the actor. The join handle yields the store after shutdown.
    pub fn spawn(store: Store, queue_depth: usize) -> (Self, JoinHandle<Store>) {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let task = tokio::spawn(Self::run(store, rx));
        (Self { tx }, task)
    }

    async fn run(mut store: Store, mut rx: mpsc::Receiver<Envelope>) -> Store {
        log::info!("Store actor started with {} tasks", store.len());

        while let Some((request, reply)) = rx.recv().await {
            let is_shutdown = matches!(request, Request::Shutdown);
            let response = store.apply(request);
            if reply.send(response).is_err() {
                log::warn!("Requester went away before the reply was sent");
            }
            if is_shutdown {
                break;
            }
        }

        log::info!("Store actor stopped at version {}", store.version());
        store
    }

    /// Send a request and wait for its response.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| eyre::eyre!("store actor is not running"))?;
        reply_rx.await.context("Store actor dropped the request")
    }

    /// Fetch the current derived view.
    pub async fn view(&self) -> Result<Vec<Task>> {
        match self.send(Request::View).await? {
            Response::View { tasks, .. } => Ok(tasks),
            other => Err(eyre::eyre!("unexpected response to View: {:?}", other)),
        }
    }

    /// Stop the actor. Requests queued behind this one are dropped.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Request::Shutdown).await.map(|_| ())
    }

    /// True while the actor is accepting requests.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}
