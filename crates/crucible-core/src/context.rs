//! Per-invocation search state shared by the solvers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::graph::DerivationGraph;
use crate::materialize::Materializer;
use crate::rules::RuleStore;

/// Cancellation token for cooperative task cancellation
///
/// Cloning shares the flag; cancelling any clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check if the token is cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Read-only inputs of one search invocation plus its cancellation signal
///
/// Mutable search state (queues, visited sets, memo tables) lives inside
/// each solver call, so concurrent searches over the same graph never share it.
#[derive(Debug, Clone)]
pub struct SearchContext<'a> {
    pub graph: &'a DerivationGraph,
    pub rules: &'a RuleStore,
    cancel: CancellationToken,
}

impl<'a> SearchContext<'a> {
    pub fn new(graph: &'a DerivationGraph, rules: &'a RuleStore) -> Self {
        Self {
            graph,
            rules,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Materializer bound to this context's graph, rules and cancellation
    pub fn materializer(&self) -> Materializer<'a> {
        Materializer::new(self.graph, self.rules).with_cancellation(self.cancel.clone())
    }
}
