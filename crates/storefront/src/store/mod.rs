//! The store: single owner of the storefront state.
//!
//! # Architecture
//!
//! - [`Action`] - closed vocabulary of transition requests
//! - [`reduce`] - pure, total transition function
//! - [`Store`] - cheaply cloneable handle that applies actions serially and
//!   broadcasts every new state before `dispatch` returns
//!
//! The store never reads the network or the durable cache. Those live in
//! [`crate::sync`] and [`crate::cache`] and feed results back via `dispatch`.

mod action;
mod reducer;
mod state;

pub use action::Action;
pub use reducer::reduce;
pub use state::StoreState;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Handle to the process-wide store.
///
/// Constructed once by the process entry point and cloned into every
/// consumer. All clones share the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<Arc<StoreState>>,
}

impl Store {
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: StoreState) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self {
            inner: Arc::new(StoreInner { state }),
        }
    }

    /// Current state snapshot. Never blocks on a pending dispatch for longer
    /// than the reducer step itself.
    #[must_use]
    pub fn get_state(&self) -> Arc<StoreState> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Apply `action` through [`reduce`] and install the result.
    ///
    /// The reducer runs under the channel's write lock, so concurrent
    /// dispatches are applied one after another. Subscribers observe the new
    /// state before this returns. A no-op action does not wake them.
    pub fn dispatch(&self, action: Action) {
        let name = action.name();
        let changed = self.inner.state.send_if_modified(|current| {
            let next = reduce(current, action);
            if next.same_as(current) {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        });
        debug!(action = name, changed, "Dispatched action");
    }

    /// Receive every state installed after this call.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreState>> {
        self.inner.state.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreState::default())
    }
}
