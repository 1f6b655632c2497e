//! Per-market action dispatch.
//!
//! Every registered market gets one worker thread fed by its own channel.
//! Actions for the same market are applied one at a time, in arrival
//! order; different markets run in parallel. The worker forwards each
//! result to the [`OutcomeSink`] and, through a [`Ticket`], to whoever
//! routed the action.
//!
//! A reload of all markets is fanned out as one single-market reload per
//! enabled market, so every rebuild is queued behind that market's
//! earlier actions.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::registry::{ActionOutcome, EngineRegistry};
use crate::sink::OutcomeSink;
use crate::types::{Action, ReloadTarget};

struct Job {
    action: Action,
    reply: Sender<Result<ActionOutcome>>,
}

struct Worker {
    sender: Sender<Job>,
    handle: JoinHandle<()>,
}

// ============================================================================
// Ticket
// ============================================================================

enum Pending {
    Ready(Result<ActionOutcome>),
    Queued {
        market: String,
        receiver: Receiver<Result<ActionOutcome>>,
    },
    Fanout(Vec<Ticket>),
}

/// Handle to the result of a routed action.
///
/// Dropping a ticket does not cancel the action.
pub struct Ticket {
    pending: Pending,
}

impl Ticket {
    fn ready(result: Result<ActionOutcome>) -> Self {
        Self {
            pending: Pending::Ready(result),
        }
    }

    /// Block until the action has been applied.
    ///
    /// For a reload of all markets the receipts of every market are
    /// combined; markets whose reload failed are left out.
    pub fn wait(self) -> Result<ActionOutcome> {
        match self.pending {
            Pending::Ready(result) => result,
            Pending::Queued { market, receiver } => {
                receiver.recv().map_err(|_| Error::WorkerGone(market))?
            }
            Pending::Fanout(tickets) => {
                let mut receipts = Vec::with_capacity(tickets.len());
                for ticket in tickets {
                    match ticket.wait() {
                        Ok(ActionOutcome::Reloaded(mut done)) => receipts.append(&mut done),
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "market reload failed"),
                    }
                }
                Ok(ActionOutcome::Reloaded(receipts))
            }
        }
    }

    /// True once [`wait`](Self::wait) would not block
    pub fn is_ready(&self) -> bool {
        match &self.pending {
            Pending::Ready(_) => true,
            Pending::Queued { receiver, .. } => !receiver.is_empty(),
            Pending::Fanout(tickets) => tickets.iter().all(Ticket::is_ready),
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes actions to one serial worker per market.
pub struct Dispatcher {
    registry: Arc<EngineRegistry>,
    sink: Arc<dyn OutcomeSink>,
    workers: Mutex<HashMap<String, Worker>>,
}

impl Dispatcher {
    /// Create a dispatcher and start a worker for every registered market.
    pub fn new(registry: Arc<EngineRegistry>, sink: Arc<dyn OutcomeSink>) -> Self {
        let dispatcher = Self {
            registry,
            sink,
            workers: Mutex::new(HashMap::new()),
        };
        for market in dispatcher.registry.markets() {
            if let Err(e) = dispatcher.sender(&market) {
                error!(market = %market, error = %e, "failed to start worker");
            }
        }
        dispatcher
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// Markets with a running worker, sorted
    pub fn workers(&self) -> Vec<String> {
        let mut markets: Vec<String> = self.workers.lock().keys().cloned().collect();
        markets.sort();
        markets
    }

    /// Decode a transport payload and route it.
    ///
    /// A payload that cannot be decoded is rejected to the sink and returned
    /// as a ready ticket; nothing else is affected.
    pub fn route(&self, payload: &[u8]) -> Ticket {
        match Action::decode(payload) {
            Ok(action) => self.send(action),
            Err(e) => {
                warn!(error = %e, "dropping undecodable action");
                self.sink.reject("unknown", None, &e);
                Ticket::ready(Err(e))
            }
        }
    }

    /// Queue an action on its market's worker.
    pub fn send(&self, action: Action) -> Ticket {
        if let Action::Reload(ReloadTarget::All) = action {
            return self.fan_out_reload();
        }

        let Some(market) = action.market().map(str::to_owned) else {
            return Ticket::ready(Err(Error::InvalidOrder("action without a market".into())));
        };

        if !self.is_routable(&action, &market) {
            let e = Error::UnknownMarket(market);
            self.sink.reject(action.name(), action.market(), &e);
            return Ticket::ready(Err(e));
        }

        self.enqueue(market, action)
    }

    /// Stop accepting work, drain every queue and join the workers.
    pub fn shutdown(&self) {
        let workers: Vec<(String, Worker)> = self.workers.lock().drain().collect();
        if workers.is_empty() {
            return;
        }

        let count = workers.len();
        for (market, worker) in workers {
            drop(worker.sender);
            if worker.handle.join().is_err() {
                error!(market = %market, "worker panicked");
            }
        }
        info!(workers = count, "dispatcher stopped");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Submits and cancels need a registered engine. A single-market reload
    /// may also bring up a market that was enabled after startup.
    fn is_routable(&self, action: &Action, market: &str) -> bool {
        if self.registry.contains(market) {
            return true;
        }
        match action {
            Action::Reload(_) => self
                .registry
                .enabled_markets()
                .map(|enabled| enabled.iter().any(|m| m.symbol == market))
                .unwrap_or(false),
            _ => false,
        }
    }

    fn fan_out_reload(&self) -> Ticket {
        let enabled = match self.registry.enabled_markets() {
            Ok(enabled) => enabled,
            Err(e) => {
                self.sink.reject("reload", None, &e);
                return Ticket::ready(Err(e));
            }
        };

        self.registry.retire_disabled(&enabled);

        let tickets = enabled
            .into_iter()
            .map(|market| {
                let action = Action::Reload(ReloadTarget::Market(market.symbol.clone()));
                self.enqueue(market.symbol, action)
            })
            .collect();

        Ticket {
            pending: Pending::Fanout(tickets),
        }
    }

    fn enqueue(&self, market: String, action: Action) -> Ticket {
        let sender = match self.sender(&market) {
            Ok(sender) => sender,
            Err(e) => return Ticket::ready(Err(e)),
        };

        let (reply, receiver) = channel::bounded(1);
        if sender.send(Job { action, reply }).is_err() {
            return Ticket::ready(Err(Error::WorkerGone(market)));
        }

        Ticket {
            pending: Pending::Queued { market, receiver },
        }
    }

    /// Sender for `market`'s worker, starting the worker on first use.
    fn sender(&self, market: &str) -> Result<Sender<Job>> {
        let mut workers = self.workers.lock();
        if let Some(worker) = workers.get(market) {
            return Ok(worker.sender.clone());
        }

        let (sender, receiver) = channel::unbounded();
        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        let handle = thread::Builder::new()
            .name(format!("matcher-{market}"))
            .spawn(move || run_worker(receiver, registry, sink))
            .map_err(|e| {
                error!(market = %market, error = %e, "failed to spawn worker");
                Error::WorkerGone(market.to_string())
            })?;

        debug!(market = %market, "worker started");
        workers.insert(
            market.to_string(),
            Worker {
                sender: sender.clone(),
                handle,
            },
        );
        Ok(sender)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(jobs: Receiver<Job>, registry: Arc<EngineRegistry>, sink: Arc<dyn OutcomeSink>) {
    for Job { action, reply } in jobs {
        let name = action.name();
        let market = action.market().map(str::to_owned);

        let result = registry.execute(action);
        match &result {
            Ok(outcome) => sink.publish(outcome),
            Err(e) => {
                warn!(action = name, market = market.as_deref(), error = %e, "action rejected");
                sink.reject(name, market.as_deref(), e);
            }
        }

        // The caller may have dropped its ticket
        let _ = reply.send(result);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
