//! One-shot event with late-subscriber support.
//!
//! Every "fires once" concern in the bridge (engine loaded, profiles loaded,
//! system ready, capture ready) is an `OnceEvent`. Waiters registered before
//! the event fires run exactly once, in registration order, when it fires.
//! Waiters registered after it fires run immediately on the caller's thread.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

type Waiter<T> = Box<dyn FnOnce(&T) + Send + 'static>;

struct Inner<T> {
    value: Option<T>,
    waiters: VecDeque<Waiter<T>>,
    // Set while the firing thread drains `waiters`. Subscribers arriving
    // meanwhile queue up behind the pending waiters to keep order.
    dispatching: bool,
    // The event can no longer fire; new waiters are dropped on arrival.
    abandoned: bool,
}

pub struct OnceEvent<T> {
    inner: Mutex<Inner<T>>,
    fired: Condvar,
}

impl<T: Clone + Send + 'static> OnceEvent<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                value: None,
                waiters: VecDeque::new(),
                dispatching: false,
                abandoned: false,
            }),
            fired: Condvar::new(),
        }
    }

    /// Fire the event, running every queued waiter on this thread.
    ///
    /// Returns false (and drops `value`) if the event already fired.
    pub fn fire(&self, value: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.value.is_some() || inner.abandoned {
            return false;
        }
        inner.value = Some(value.clone());
        inner.dispatching = true;
        self.fired.notify_all();

        // Waiters run unlocked so they may subscribe or query this event.
        while let Some(waiter) = inner.waiters.pop_front() {
            MutexGuard::unlocked(&mut inner, || waiter(&value));
        }
        inner.dispatching = false;
        true
    }

    /// Run `waiter` once the event has fired; immediately if it already has.
    pub fn subscribe<F>(&self, waiter: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.abandoned {
            return;
        }
        if inner.dispatching || inner.value.is_none() {
            inner.waiters.push_back(Box::new(waiter));
            return;
        }
        let value = inner.value.clone();
        drop(inner);

        if let Some(value) = value {
            waiter(&value);
        }
    }

    /// Give up on the event: drop every queued waiter, and every waiter
    /// subscribed from now on, without running it. Later `fire` calls are
    /// ignored. No-op once fired.
    ///
    /// Returns the number of queued waiters dropped.
    pub fn abandon(&self) -> usize {
        let dropped = {
            let mut inner = self.inner.lock();
            if inner.value.is_some() || inner.abandoned {
                return 0;
            }
            inner.abandoned = true;
            std::mem::take(&mut inner.waiters)
        };
        // Dropped outside the lock; waiters may own arbitrary state.
        dropped.len()
    }

    pub fn is_abandoned(&self) -> bool {
        self.inner.lock().abandoned
    }

    pub fn get(&self) -> Option<T> {
        self.inner.lock().value.clone()
    }

    pub fn is_fired(&self) -> bool {
        self.inner.lock().value.is_some()
    }

    /// Number of waiters still queued.
    pub fn pending(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Block until the event fires or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let mut inner = self.inner.lock();
        if inner.value.is_none() {
            self.fired
                .wait_while_for(&mut inner, |inner| inner.value.is_none(), timeout);
        }
        inner.value.clone()
    }
}

impl<T: Clone + Send + 'static> Default for OnceEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}
