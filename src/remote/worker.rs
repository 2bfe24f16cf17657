//! Remote search worker thread.
//!
//! Requests travel to a background thread over an mpsc channel and each
//! carries a generation number; responses echo the generation so the
//! consumer can drop out-of-order deliveries. Network failures never cross
//! the channel as errors: they are logged and delivered as empty lists, so
//! "failed" and "no results" look identical to the caller.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::remote::client::{RemoteTag, TagSearchBackend};
use crate::remote::debouncer::Debouncer;

#[derive(Debug)]
pub enum RemoteRequest {
    Search { query: String, generation: u64 },
    Shutdown,
}

#[derive(Debug)]
pub struct RemoteResponse {
    pub generation: u64,
    pub query: String,
    pub tags: Vec<RemoteTag>,
}

/// Spawn the worker thread.
///
/// Listens for requests on the request channel, runs them against the
/// backend, and sends generation-tagged responses back.
pub fn spawn_worker<B: TagSearchBackend>(
    backend: B,
    request_rx: Receiver<RemoteRequest>,
    response_tx: Sender<RemoteResponse>,
) -> JoinHandle<()> {
    std::thread::spawn(move || worker_loop(backend, request_rx, response_tx))
}

/// Main worker loop - processes requests until shutdown or disconnect
fn worker_loop<B: TagSearchBackend>(
    backend: B,
    request_rx: Receiver<RemoteRequest>,
    response_tx: Sender<RemoteResponse>,
) {
    while let Ok(request) = request_rx.recv() {
        match request {
            RemoteRequest::Search { query, generation } => {
                let tags = match backend.search(&query) {
                    Ok(tags) => tags,
                    Err(e) => {
                        log::warn!("remote tag search failed: {}", e);
                        Vec::new()
                    }
                };
                let response = RemoteResponse {
                    generation,
                    query,
                    tags,
                };
                if response_tx.send(response).is_err() {
                    // Consumer disconnected, stop working
                    return;
                }
            }
            RemoteRequest::Shutdown => break,
        }
    }
    log::debug!("remote search worker shutting down");
}

/// Consumer-side handle: owns the channels, the debouncer and the
/// generation counter. Lives on the embedder's event thread.
#[derive(Debug)]
pub struct RemoteSearch {
    request_tx: Sender<RemoteRequest>,
    response_rx: Receiver<RemoteResponse>,
    debouncer: Debouncer,
    generation: u64,
    delivered: u64,
}

impl RemoteSearch {
    pub fn spawn<B: TagSearchBackend>(backend: B, debounce_window: Duration) -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        spawn_worker(backend, request_rx, response_tx);
        RemoteSearch {
            request_tx,
            response_rx,
            debouncer: Debouncer::new(debounce_window),
            generation: 0,
            delivered: 0,
        }
    }

    /// Debounced submit: dispatches on the leading edge, otherwise queues
    /// the query for the trailing fire.
    pub fn submit(&mut self, query: &str, now: Instant) {
        if let Some(query) = self.debouncer.submit(query, now) {
            self.dispatch(query);
        }
    }

    /// Drive the trailing edge. Call whenever the debounce deadline passes.
    pub fn poll_deadline(&mut self, now: Instant) {
        if let Some(query) = self.debouncer.poll(now) {
            self.dispatch(query);
        }
    }

    /// Earliest instant a trailing fire can happen, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn dispatch(&mut self, query: String) {
        self.generation += 1;
        let request = RemoteRequest::Search {
            query,
            generation: self.generation,
        };
        if self.request_tx.send(request).is_err() {
            log::warn!("remote search worker is gone");
        }
    }

    /// Newest pending response, dropping stale generations. Out-of-order
    /// deliveries never clobber a newer result.
    pub fn try_recv(&mut self) -> Option<RemoteResponse> {
        let mut newest: Option<RemoteResponse> = None;
        while let Ok(response) = self.response_rx.try_recv() {
            if response.generation <= self.delivered {
                log::debug!(
                    "dropping stale remote response generation {}",
                    response.generation
                );
                continue;
            }
            if newest
                .as_ref()
                .is_none_or(|n| response.generation > n.generation)
            {
                newest = Some(response);
            }
        }
        if let Some(response) = &newest {
            self.delivered = response.generation;
        }
        newest
    }
}

impl Drop for RemoteSearch {
    fn drop(&mut self) {
        let _ = self.request_tx.send(RemoteRequest::Shutdown);
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod worker_tests;
