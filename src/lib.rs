//! Query-string state binding for shallow view state.
//!
//! Keeps a flat key-value map in sync with the page's query string so that
//! reloading or sharing a URL reproduces the same filter/sort/paging state.
//! Three collaborators compose: a routing facility behind the [`Router`]
//! trait, the [`query`] codec, and the [`ParamsState`] binder, which stands
//! in for a reactive host's state/effect machinery with explicit
//! subscriptions and a one-shot routing-readiness notification.

mod params;
pub mod query;
mod router;
mod state;
mod value;

pub use params::{ParamsError, ParamsMap};
pub use router::{MemoryRouter, ReadyCallback, Router, RouterError};
pub use state::{ParamsState, Subscription};
pub use value::ParamValue;
