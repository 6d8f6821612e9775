//! The page-routing collaborator seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! Real hosts adapt their routing layer behind [`Router`]; [`MemoryRouter`]
//! serves tests and headless embedding. Readiness models environments where
//! the query is unknown on first render (static generation) and resolves
//! exactly once: `NOT_READY -> READY`, terminal at `READY`.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::cell::RefCell;

use crate::params::ParamsMap;
use crate::query;

/// Error returned when a navigation request cannot be applied.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The navigation target was not an absolute path.
    #[error("navigation target must be an absolute path: {0:?}")]
    InvalidTarget(String),
}

/// One-shot callback invoked when the routing layer becomes ready.
pub type ReadyCallback = Box<dyn FnOnce()>;

/// Routing facility: current location, navigation, and a readiness flag.
pub trait Router {
    /// True once the current URL's query parameters are known.
    fn is_ready(&self) -> bool;

    /// Current pathname, without the query string.
    fn path(&self) -> String;

    /// Current query parameters, as raw strings/lists.
    fn query(&self) -> ParamsMap;

    /// Navigate to `target` (`path?query`). Successive calls are
    /// last-write-wins; the routing layer may apply them asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] when the routing layer rejects the target.
    fn push(&self, target: &str) -> Result<(), RouterError>;

    /// Register a one-shot readiness callback. Implementations must invoke
    /// it immediately if the router is already ready.
    fn on_ready(&self, callback: ReadyCallback);
}

/// In-process [`Router`] with synchronous navigation and recorded history.
pub struct MemoryRouter {
    inner: RefCell<MemoryRouterInner>,
}

struct MemoryRouterInner {
    ready: bool,
    path: String,
    query: ParamsMap,
    history: Vec<String>,
    ready_callbacks: Vec<ReadyCallback>,
}

impl MemoryRouter {
    /// Router that is not yet ready, parked at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self::at("/", "")
    }

    /// Router that is not yet ready, parked at `path` with `query` pending.
    #[must_use]
    pub fn at(path: &str, query: &str) -> Self {
        Self {
            inner: RefCell::new(MemoryRouterInner {
                ready: false,
                path: path.to_owned(),
                query: query::parse(query),
                history: Vec::new(),
                ready_callbacks: Vec::new(),
            }),
        }
    }

    /// Ready router, for hosts where the URL is known up front.
    #[must_use]
    pub fn ready_at(path: &str, query: &str) -> Self {
        let router = Self::at(path, query);
        router.inner.borrow_mut().ready = true;
        router
    }

    /// Replace the pending query before readiness, simulating the routing
    /// layer resolving the real URL.
    pub fn set_query(&self, query: &str) {
        self.inner.borrow_mut().query = query::parse(query);
    }

    /// Mark the router ready and fire queued readiness callbacks. Calling
    /// again after readiness is a no-op.
    pub fn set_ready(&self) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.ready {
                return;
            }
            inner.ready = true;
            std::mem::take(&mut inner.ready_callbacks)
        };
        tracing::debug!(callbacks = callbacks.len(), "routing layer ready");
        for callback in callbacks {
            callback();
        }
    }

    /// Every target pushed through this router, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.inner.borrow().history.clone()
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for MemoryRouter {
    fn is_ready(&self) -> bool {
        self.inner.borrow().ready
    }

    fn path(&self) -> String {
        self.inner.borrow().path.clone()
    }

    fn query(&self) -> ParamsMap {
        self.inner.borrow().query.clone()
    }

    fn push(&self, target: &str) -> Result<(), RouterError> {
        if !target.starts_with('/') {
            return Err(RouterError::InvalidTarget(target.to_owned()));
        }
        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        let mut inner = self.inner.borrow_mut();
        inner.path = path.to_owned();
        inner.query = query::parse(query);
        inner.history.push(target.to_owned());
        Ok(())
    }

    fn on_ready(&self, callback: ReadyCallback) {
        let ready = self.inner.borrow().ready;
        if ready {
            callback();
        } else {
            self.inner.borrow_mut().ready_callbacks.push(callback);
        }
    }
}
