//! Optimizer worker: runs the policy search off the request path, in a
//! dedicated thread behind a crossbeam-channel message protocol.
//!
//! Protocol: one [`OptimizeRequest`] in; periodic
//! [`OptimizeEvent::Progress`] messages out; one final
//! [`OptimizeEvent::Complete`] (or [`OptimizeEvent::Failed`]), after which
//! the worker terminates. Dropping the handle cancels the search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::info;

use veridict_core::{EngineConfig, MediaType, ModelRegistry, OptimizeError};

use super::{optimize, LabeledSample, OptimizeOutcome};

/// One optimization request: the media type whose policy space to search and
/// the labeled corpus to evaluate against.
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub media_type: MediaType,
    pub corpus: Vec<LabeledSample>,
}

/// Messages emitted by the worker.
#[derive(Debug, Clone)]
pub enum OptimizeEvent {
    /// Fraction of the search space covered, in [0, 1].
    Progress(f64),
    Complete(OptimizeOutcome),
    Failed(String),
}

/// Handle to a spawned optimizer worker.
pub struct OptimizerHandle {
    requests: Option<Sender<OptimizeRequest>>,
    events: Receiver<OptimizeEvent>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Spawn a worker that serves a single optimization request and then
/// terminates. The registry and config are moved in; each run gets its own
/// policy maps, so concurrent workers never share mutable state.
pub fn spawn(registry: ModelRegistry, config: EngineConfig) -> OptimizerHandle {
    let (request_tx, request_rx) = bounded::<OptimizeRequest>(1);
    let (event_tx, event_rx) = unbounded::<OptimizeEvent>();
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);

    let thread = std::thread::spawn(move || {
        // The sender side hanging up before any request is a normal
        // abandoned-handle shutdown.
        let Ok(request) = request_rx.recv() else {
            return;
        };
        info!(media_type = %request.media_type, "optimizer worker accepted request");

        let progress_tx = event_tx.clone();
        let progress = move |fraction: f64| {
            let _ = progress_tx.send(OptimizeEvent::Progress(fraction));
        };
        let event = match optimize(
            &registry,
            &config,
            request.media_type,
            &request.corpus,
            &progress,
            &cancel_flag,
        ) {
            Ok(outcome) => OptimizeEvent::Complete(outcome),
            Err(err) => OptimizeEvent::Failed(err.to_string()),
        };
        let _ = event_tx.send(event);
    });

    OptimizerHandle {
        requests: Some(request_tx),
        events: event_rx,
        cancel,
        thread: Some(thread),
    }
}

impl OptimizerHandle {
    /// Submit the request. Fails if the worker already terminated.
    pub fn submit(&self, request: OptimizeRequest) -> Result<(), OptimizeError> {
        match &self.requests {
            Some(tx) => tx
                .send(request)
                .map_err(|_| OptimizeError::WorkerDisconnected),
            None => Err(OptimizeError::WorkerDisconnected),
        }
    }

    /// Event stream: progress messages followed by one terminal event.
    pub fn events(&self) -> &Receiver<OptimizeEvent> {
        &self.events
    }

    /// Request cancellation; the search aborts at the next combination.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Block until the terminal event, discarding progress messages.
    pub fn wait(self) -> Result<OptimizeOutcome, OptimizeError> {
        loop {
            match self.events.recv() {
                Ok(OptimizeEvent::Progress(_)) => continue,
                Ok(OptimizeEvent::Complete(outcome)) => return Ok(outcome),
                Ok(OptimizeEvent::Failed(message)) => {
                    return Err(OptimizeError::Worker(message))
                }
                Err(_) => return Err(OptimizeError::WorkerDisconnected),
            }
        }
    }
}

impl Drop for OptimizerHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        // Hang up the request channel so an idle worker wakes and exits.
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
