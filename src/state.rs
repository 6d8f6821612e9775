//! The params-state binder: local view state kept in lockstep with the URL.
//!
//! DESIGN
//! ======
//! A state holder plus an explicit change-listener list stands in for a
//! reactive host's state/effect machinery: routing readiness arrives as a
//! one-shot notification, mutations flow through `set_params`/`patch_params`,
//! and every state materialization hands a snapshot to subscribers. All work
//! happens on the host event loop; the binder is neither `Send` nor `Sync`.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::params::ParamsMap;
use crate::query;
use crate::router::{Router, RouterError};

/// Handle returned by [`ParamsState::subscribe`]; pass back to
/// [`ParamsState::unsubscribe`] to stop notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener = Rc<dyn Fn(&ParamsMap)>;

/// Binder keeping a flat params map in sync with the page's query string.
///
/// Cloning is cheap and clones observe the same state.
#[derive(Clone)]
pub struct ParamsState {
    router: Rc<dyn Router>,
    inner: Rc<RefCell<BinderState>>,
}

struct BinderState {
    fallback: ParamsMap,
    params: ParamsMap,
    loaded: bool,
    next_subscription: u64,
    subscribers: Vec<(u64, Listener)>,
}

impl ParamsState {
    /// Create a binder over `router`, seeded with `fallback`.
    ///
    /// State starts as the sanitized fallback. As soon as the router reports
    /// readiness (immediately, if it already has), state becomes the fallback
    /// shallow-merged with the URL query, empties dropped — so a reloaded
    /// page shows the same filters the URL encodes.
    #[must_use]
    pub fn bind(router: Rc<impl Router + 'static>, fallback: ParamsMap) -> Self {
        let router: Rc<dyn Router> = router;
        let inner = Rc::new(RefCell::new(BinderState {
            params: fallback.sanitized(),
            fallback,
            loaded: false,
            next_subscription: 0,
            subscribers: Vec::new(),
        }));
        let binder = Self { router, inner };

        let weak_inner = Rc::downgrade(&binder.inner);
        let weak_router = Rc::downgrade(&binder.router);
        binder.router.on_ready(Box::new(move || {
            Self::hydrate(&weak_inner, &weak_router);
        }));
        binder
    }

    /// Snapshot of the current state. Never contains empty values.
    #[must_use]
    pub fn params(&self) -> ParamsMap {
        self.inner.borrow().params.clone()
    }

    /// True once the initial URL has been resolved and merged. Monotone:
    /// never reverts to false for the lifetime of the binder.
    #[must_use]
    pub fn params_loaded(&self) -> bool {
        self.inner.borrow().loaded
    }

    /// Replace the tracked state with `full`, dropping empty values, then
    /// navigate so the URL reflects the new state.
    ///
    /// Local state and listeners observe the update even when navigation
    /// fails; the router error still propagates. Successive calls are
    /// last-write-wins; there is no debouncing.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] when the routing layer rejects the push.
    pub fn set_params(&self, full: ParamsMap) -> Result<(), RouterError> {
        let sanitized = full.sanitized();
        self.inner.borrow_mut().params = sanitized.clone();
        self.notify(&sanitized);

        let url = format!("{}?{}", self.router.path(), query::encode(&sanitized));
        tracing::debug!(%url, "persisting params to route");
        self.router.push(&url)
    }

    /// Shallow-merge `partial` over the current state and persist the result
    /// through [`Self::set_params`], so the same sanitization applies.
    /// Patching a key to [`crate::ParamValue::Null`] or an empty string
    /// removes it.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] when the routing layer rejects the push.
    pub fn patch_params(&self, partial: ParamsMap) -> Result<(), RouterError> {
        let merged = self.inner.borrow().params.merged(&partial);
        self.set_params(merged)
    }

    /// Replace the fallback shape.
    ///
    /// A shallow-equal replacement is a no-op, so hosts may pass a freshly
    /// built map on every render without retriggering merges. A structurally
    /// different fallback re-merges against the live query once the route
    /// has loaded. Does not navigate.
    pub fn set_fallback(&self, fallback: ParamsMap) {
        let loaded = {
            let mut state = self.inner.borrow_mut();
            if state.fallback.shallow_eq(&fallback) {
                return;
            }
            state.fallback = fallback;
            state.loaded
        };
        if loaded {
            Self::hydrate(&Rc::downgrade(&self.inner), &Rc::downgrade(&self.router));
        }
    }

    /// Register `listener` for state snapshots, delivered after every state
    /// materialization: the initial merge, fallback re-merges, and
    /// set/patch calls.
    pub fn subscribe(&self, listener: impl Fn(&ParamsMap) + 'static) -> Subscription {
        let listener: Listener = Rc::new(listener);
        let mut state = self.inner.borrow_mut();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.subscribers.push((id, listener));
        Subscription(id)
    }

    /// Remove a previously registered listener. Unknown handles are ignored.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|(id, _)| *id != subscription.0);
    }

    /// Merge fallback with the live URL query and publish the result. Runs
    /// on readiness and on fallback change; the loaded flag only ever moves
    /// to true here.
    fn hydrate(inner: &Weak<RefCell<BinderState>>, router: &Weak<dyn Router>) {
        let (Some(inner), Some(router)) = (inner.upgrade(), router.upgrade()) else {
            return;
        };

        let snapshot = {
            let mut state = inner.borrow_mut();
            let merged = state.fallback.merged(&router.query()).sanitized();
            state.params = merged.clone();
            state.loaded = true;
            merged
        };
        tracing::debug!(params = %query::encode(&snapshot), "params hydrated from route");
        Self::notify_subscribers(&inner, &snapshot);
    }

    fn notify(&self, snapshot: &ParamsMap) {
        Self::notify_subscribers(&self.inner, snapshot);
    }

    /// Listeners run outside any interior borrow, so they may re-enter the
    /// binder's read and write APIs.
    fn notify_subscribers(inner: &Rc<RefCell<BinderState>>, snapshot: &ParamsMap) {
        let listeners: Vec<Listener> = inner
            .borrow()
            .subscribers
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}
