//! Lazy, exactly-once acquisition of the shared capture stream.
//!
//! Opening a microphone may raise a permission prompt, so nothing is
//! requested until the first receiver needs it. The request is made once per
//! gate; every receiver created afterwards attaches to the same stream.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::once_event::OnceEvent;
use crate::models::error::ModemError;
use crate::models::state::CaptureInputState;
use crate::traits::capture_provider::{AudioBufferCallback, CaptureProvider, CaptureRequest};

type Listener = Box<dyn FnMut(&[f32]) + Send + 'static>;

/// Fan-out point for captured audio.
///
/// The capture provider calls [`deliver`](Self::deliver) from its audio
/// thread; each attached listener sees every buffer. Attach and detach are
/// queued and applied at the start of the next delivery, so they may be
/// called from inside a listener.
pub struct CaptureHub {
    listeners: Mutex<Vec<(u64, Listener)>>,
    incoming: Mutex<Vec<(u64, Listener)>>,
    departing: Mutex<Vec<u64>>,
    next_id: AtomicU64,
    attached: AtomicUsize,
    buffers_delivered: AtomicU64,
}

/// Handle to the shared capture stream.
pub type CaptureStream = Arc<CaptureHub>;

impl CaptureHub {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            incoming: Mutex::new(Vec::new()),
            departing: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            attached: AtomicUsize::new(0),
            buffers_delivered: AtomicU64::new(0),
        }
    }

    /// Register a listener; returns its id for [`detach`](Self::detach).
    pub fn attach<F>(&self, listener: F) -> u64
    where
        F: FnMut(&[f32]) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.incoming.lock().push((id, Box::new(listener)));
        self.attached.fetch_add(1, Ordering::Relaxed);
        id
    }

    /// Remove a listener. Call at most once per id.
    pub fn detach(&self, id: u64) {
        self.departing.lock().push(id);
        self.attached.fetch_sub(1, Ordering::Relaxed);
    }

    /// Hand a captured buffer to every attached listener.
    pub fn deliver(&self, samples: &[f32]) {
        let mut listeners = self.listeners.lock();
        {
            let mut incoming = self.incoming.lock();
            if !incoming.is_empty() {
                listeners.append(&mut incoming);
            }
        }
        {
            let mut departing = self.departing.lock();
            if !departing.is_empty() {
                listeners.retain(|(id, _)| !departing.contains(id));
                departing.clear();
            }
        }

        for (_, listener) in listeners.iter_mut() {
            listener(samples);
        }
        self.buffers_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn listener_count(&self) -> usize {
        self.attached.load(Ordering::Relaxed)
    }

    pub fn buffers_delivered(&self) -> u64 {
        self.buffers_delivered.load(Ordering::Relaxed)
    }
}

impl Default for CaptureHub {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CaptureInputGate {
    provider: Mutex<Box<dyn CaptureProvider>>,
    state: Mutex<CaptureInputState>,
    settled: Condvar,
    stream: OnceEvent<CaptureStream>,
    released: AtomicBool,
}

impl CaptureInputGate {
    pub fn new(provider: Box<dyn CaptureProvider>) -> Self {
        Self {
            provider: Mutex::new(provider),
            state: Mutex::new(CaptureInputState::Unrequested),
            settled: Condvar::new(),
            stream: OnceEvent::new(),
            released: AtomicBool::new(false),
        }
    }

    /// Request the capture device on a background thread.
    ///
    /// Only the first call does anything; later calls, including ones racing
    /// with the first, are no-ops.
    pub fn acquire(self: &Arc<Self>, request: CaptureRequest) {
        {
            let mut state = self.state.lock();
            if state.is_requested() {
                return;
            }
            *state = CaptureInputState::Pending;
        }
        log::info!("Requesting capture device at {} Hz", request.sample_rate);

        let gate = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("capture-acquire".into())
            .spawn(move || gate.run_acquisition(request));

        if let Err(e) = spawned {
            self.settle(Err(ModemError::Unknown(format!(
                "failed to spawn capture thread: {}",
                e
            ))));
        }
    }

    fn run_acquisition(&self, request: CaptureRequest) {
        let hub = Arc::new(CaptureHub::new());
        let sink = Arc::clone(&hub);
        let callback: AudioBufferCallback = Arc::new(move |samples: &[f32]| sink.deliver(samples));

        let result = self.provider.lock().start(&request, callback);
        self.settle(result.map(|()| hub));
    }

    fn settle(&self, result: Result<CaptureStream, ModemError>) {
        match result {
            Ok(stream) => {
                log::info!("Capture device ready");
                // Waiters attach before the state flips, so anyone who saw
                // `Ready` also sees every queued receiver attached.
                self.stream.fire(stream);
                let mut state = self.state.lock();
                *state = CaptureInputState::Ready;
                self.settled.notify_all();
            }
            Err(e) => {
                log::error!("Failed to create an audio source: {}", e);
                // Denial is final, so queued receivers will never attach.
                let dropped = self.stream.abandon();
                if dropped > 0 {
                    log::debug!("Dropped {} receiver(s) waiting on capture", dropped);
                }
                let mut state = self.state.lock();
                *state = CaptureInputState::Denied(e);
                self.settled.notify_all();
            }
        }
    }

    /// Run `callback` with the shared stream once it is acquired;
    /// immediately if it already is. If acquisition is denied the callback is
    /// dropped without running.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&CaptureStream) + Send + 'static,
    {
        self.stream.subscribe(callback);
    }

    /// Number of callbacks still waiting for the stream.
    pub fn pending_waiters(&self) -> usize {
        self.stream.pending()
    }

    pub fn state(&self) -> CaptureInputState {
        self.state.lock().clone()
    }

    pub fn stream(&self) -> Option<CaptureStream> {
        self.stream.get()
    }

    /// Block until acquisition succeeds or fails, or `timeout` elapses.
    pub fn wait_settled(&self, timeout: Duration) -> CaptureInputState {
        let mut state = self.state.lock();
        if !state.is_settled() {
            self.settled
                .wait_while_for(&mut state, |state| !state.is_settled(), timeout);
        }
        state.clone()
    }

    /// Stop the capture device. The gate stays settled; nothing is
    /// re-requested. Idempotent.
    pub fn release(&self) -> Result<(), ModemError> {
        if *self.state.lock() != CaptureInputState::Ready || self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        log::info!("Releasing capture device");
        self.provider.lock().stop()
    }
}

impl Drop for CaptureInputGate {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Failed to stop capture device: {}", e);
        }
    }
}
