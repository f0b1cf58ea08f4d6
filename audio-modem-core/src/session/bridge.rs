use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use crate::gate::capture_input::{CaptureInputGate, CaptureStream};
use crate::gate::once_event::OnceEvent;
use crate::gate::readiness::{ModemRuntime, ReadinessGate};
use crate::models::audio_models::{SessionCounters, SessionDiagnostics};
use crate::models::config::BridgeConfiguration;
use crate::models::error::ModemError;
use crate::models::profile::Profile;
use crate::models::state::{CaptureInputState, SharedTransmitState, TransmitState};
use crate::processing::block_adapter::InputReblocker;
use crate::processing::sample_block::SAMPLE_BLOCK_LEN;
use crate::session::receive::ReceiveSession;
use crate::session::transmit::{DoneCallback, TransmitSession};
use crate::storage::profile_file::FileProfileSource;
use crate::traits::capture_provider::{CaptureProvider, CaptureRequest};
use crate::traits::codec_engine::CodecEngine;
use crate::traits::playback_provider::{OutputNode, PlaybackProvider};
use crate::traits::profile_source::ProfileSource;

/// Entry point: owns the readiness and capture gates and hands out
/// transmitters and receivers once the bridge is ready.
///
/// ```text
/// engine_loaded ──┐
///                 ├→ [ReadinessGate] → AudioDeviceContext → transmitter()/receiver()
/// profiles ───────┘
///
/// receiver() → [CaptureInputGate] (first call only) → shared CaptureStream
/// ```
pub struct ModemBridge {
    config: BridgeConfiguration,
    readiness: Arc<ReadinessGate>,
    capture: Arc<CaptureInputGate>,
    profile_source: Arc<dyn ProfileSource>,
    fetch_in_flight: Arc<AtomicBool>,
}

impl ModemBridge {
    pub fn new(
        config: BridgeConfiguration,
        playback: Arc<dyn PlaybackProvider>,
        capture: Box<dyn CaptureProvider>,
    ) -> Result<Self, ModemError> {
        config.validate().map_err(ModemError::ConfigurationFailed)?;

        Ok(Self {
            config,
            readiness: Arc::new(ReadinessGate::new(playback)),
            capture: Arc::new(CaptureInputGate::new(capture)),
            profile_source: Arc::new(FileProfileSource::new()),
            fetch_in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Replace the default filesystem profile source.
    pub fn with_profile_source(mut self, source: Arc<dyn ProfileSource>) -> Self {
        self.profile_source = source;
        self
    }

    pub fn config(&self) -> &BridgeConfiguration {
        &self.config
    }

    /// Signal that the codec engine has finished loading.
    pub fn engine_loaded(&self, engine: Arc<dyn CodecEngine>) {
        self.readiness.signal_engine_loaded(engine);
    }

    /// Fetch the profile document at `location` in the background.
    ///
    /// No-op once profiles are loaded or while a fetch is in flight. A failed
    /// fetch is logged and leaves the bridge unready; call again to retry.
    pub fn set_profiles_path(&self, location: impl Into<String>) -> Result<(), ModemError> {
        if self.readiness.is_profiles_loaded() || self.fetch_in_flight.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let location = location.into();
        let source = Arc::clone(&self.profile_source);
        let readiness = Arc::clone(&self.readiness);
        let in_flight = Arc::clone(&self.fetch_in_flight);

        thread::Builder::new()
            .name("profile-fetch".into())
            .spawn(move || {
                match source.fetch(&location) {
                    Ok(document) => {
                        if let Err(e) = readiness.signal_profiles_loaded(&document) {
                            log::debug!("Profiles at {} left the bridge unready: {}", location, e);
                        }
                    }
                    Err(e) => log::error!("Failed to fetch profiles from {}: {}", location, e),
                }
                in_flight.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                self.fetch_in_flight.store(false, Ordering::SeqCst);
                ModemError::Unknown(format!("failed to spawn profile fetch thread: {}", e))
            })?;
        Ok(())
    }

    /// Load profiles from an in-memory document.
    pub fn load_profiles(&self, document: &str) -> Result<(), ModemError> {
        self.readiness.signal_profiles_loaded(document)
    }

    /// Run `callback` once the bridge is ready; immediately if it already is.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.readiness.on_ready(callback);
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Block until the bridge is ready or `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        self.readiness.wait_ready(timeout).is_some()
    }

    /// The device sample rate, once ready.
    pub fn sample_rate(&self) -> Option<f64> {
        self.readiness.runtime().map(|r| r.device().sample_rate())
    }

    pub fn capture_state(&self) -> CaptureInputState {
        self.capture.state()
    }

    /// Block until the shared capture stream is acquired. Returns false on
    /// denial or timeout.
    pub fn wait_capture_ready(&self, timeout: Duration) -> bool {
        self.capture.wait_settled(timeout) == CaptureInputState::Ready
    }

    /// Create a transmitter for `profile_name`.
    pub fn transmitter(&self, profile_name: &str) -> Result<Transmitter, ModemError> {
        let runtime = self.readiness.runtime().ok_or(ModemError::NotReady)?;
        let profile = runtime.profiles().get(profile_name)?.clone();
        Ok(Transmitter { runtime, profile })
    }

    /// Create a receiver for `profile_name` that calls `on_receive` with each
    /// decoded chunk.
    ///
    /// The first receiver triggers acquisition of the capture device; it and
    /// every later receiver attach to the shared stream once it is ready.
    /// If capture is denied, receivers are created but never receive data.
    pub fn receiver<F>(&self, profile_name: &str, on_receive: F) -> Result<Receiver, ModemError>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let runtime = self.readiness.runtime().ok_or(ModemError::NotReady)?;
        let profile = runtime.profiles().get(profile_name)?;
        let sample_rate = runtime.device().sample_rate();

        let decoder = runtime.engine().create_decoder(profile, sample_rate)?;
        let session = ReceiveSession::new(
            decoder,
            self.config.payload_buffer_default_size,
            Box::new(on_receive),
        );
        log::info!("Receiver {} created with profile {}", session.id(), profile.name());

        let receiver = Receiver::start(session, &self.capture);
        self.capture.acquire(CaptureRequest {
            sample_rate,
            constraints: self.config.capture,
        });
        Ok(receiver)
    }
}

/// Sends payloads with one profile. Each call to
/// [`transmit`](Self::transmit) gets its own encoder and output stream.
pub struct Transmitter {
    runtime: Arc<ModemRuntime>,
    profile: Profile,
}

impl Transmitter {
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Start playing `payload`. `on_done` runs on the audio thread once the
    /// final block has been rendered.
    ///
    /// Keep the returned handle alive until the transmission finishes;
    /// dropping it tears down the output stream.
    pub fn transmit(
        &self,
        payload: &[u8],
        on_done: Option<DoneCallback>,
    ) -> Result<TransmitHandle, ModemError> {
        let device = self.runtime.device();
        let encoder = self
            .runtime
            .engine()
            .create_encoder(&self.profile, device.sample_rate())?;

        let finished = Arc::new(OnceEvent::new());
        let signal = Arc::clone(&finished);
        let done: DoneCallback = Box::new(move || {
            if let Some(on_done) = on_done {
                on_done();
            }
            signal.fire(());
        });

        let mut session = TransmitSession::new(encoder, payload, Some(done))?;
        let id = session.id();
        let state = session.shared_state();
        let counters = session.counters();

        let node = device.open_output(Box::new(move |out: &mut [f32]| session.process(out)))?;
        log::info!(
            "Transmit session {} started: {} bytes with profile {}",
            id,
            payload.len(),
            self.profile.name()
        );

        Ok(TransmitHandle {
            id,
            state,
            counters,
            finished,
            node,
        })
    }
}

/// A running transmission. Dropping it disconnects the output stream.
pub struct TransmitHandle {
    id: Uuid,
    state: Arc<SharedTransmitState>,
    counters: Arc<SessionCounters>,
    finished: Arc<OnceEvent<()>>,
    node: Box<dyn OutputNode>,
}

impl TransmitHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> TransmitState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_fired()
    }

    /// Block until the final block has been rendered or `timeout` elapses.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        self.finished.wait_timeout(timeout).is_some()
    }

    /// Stop the output stream early. Idempotent.
    pub fn disconnect(&self) {
        self.node.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.node.is_connected()
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.counters.snapshot()
    }
}

#[derive(Default)]
struct ReceiverLink {
    // Shared with the capture listener; the listener must not hold the link
    // itself or the hub would keep it alive.
    stopped: Arc<AtomicBool>,
    attachment: Mutex<Option<(CaptureStream, u64)>>,
    attached: Condvar,
}

impl ReceiverLink {
    fn attach(&self, stream: &CaptureStream, mut session: ReceiveSession) {
        let mut attachment = self.attachment.lock();
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        let stopped = Arc::clone(&self.stopped);
        let mut reblocker = InputReblocker::new(SAMPLE_BLOCK_LEN);
        let session_id = session.id();
        let id = stream.attach(move |samples: &[f32]| {
            if stopped.load(Ordering::Relaxed) {
                return;
            }
            reblocker.push(samples, |block| session.process(block));
        });

        log::debug!("Receiver {} attached to capture stream", session_id);
        *attachment = Some((Arc::clone(stream), id));
        self.attached.notify_all();
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut attachment = self.attachment.lock();
        if let Some((stream, id)) = attachment.take() {
            stream.detach(id);
        }
        self.attached.notify_all();
    }
}

/// A running receiver. Dropping it stops it.
pub struct Receiver {
    id: Uuid,
    counters: Arc<SessionCounters>,
    link: Arc<ReceiverLink>,
}

impl Receiver {
    fn start(session: ReceiveSession, capture: &CaptureInputGate) -> Self {
        let id = session.id();
        let counters = session.counters();
        let link = Arc::new(ReceiverLink::default());

        let pending = Arc::clone(&link);
        capture.on_ready(move |stream: &CaptureStream| pending.attach(stream, session));

        Self { id, counters, link }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether this receiver is attached to the capture stream.
    pub fn is_attached(&self) -> bool {
        self.link.attachment.lock().is_some()
    }

    /// Block until attached, stopped, or `timeout` elapses.
    pub fn wait_attached(&self, timeout: Duration) -> bool {
        let mut attachment = self.link.attachment.lock();
        if attachment.is_none() && !self.link.stopped.load(Ordering::SeqCst) {
            let stopped = Arc::clone(&self.link.stopped);
            self.link.attached.wait_while_for(
                &mut attachment,
                |attachment| attachment.is_none() && !stopped.load(Ordering::SeqCst),
                timeout,
            );
        }
        attachment.is_some()
    }

    /// Stop receiving and detach from the capture stream. Idempotent; may be
    /// called from inside the receive callback.
    pub fn stop(&self) {
        if !self.link.stopped.load(Ordering::SeqCst) {
            log::info!("Receiver {} stopped", self.id);
        }
        self.link.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.link.stopped.load(Ordering::SeqCst)
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.counters.snapshot()
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.stop();
    }
}
