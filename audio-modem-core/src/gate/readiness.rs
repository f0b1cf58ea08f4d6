//! Gating of bridge startup on two independent preconditions.
//!
//! The codec engine and the profile document arrive asynchronously and in
//! either order. Each is a one-shot event; once both have fired the gate opens
//! the audio device context and fires `ready` exactly once.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::once_event::OnceEvent;
use crate::models::error::ModemError;
use crate::models::profile::ProfileSet;
use crate::session::device_context::AudioDeviceContext;
use crate::traits::codec_engine::CodecEngine;
use crate::traits::playback_provider::PlaybackProvider;

/// Everything sessions need, available once the bridge is ready.
pub struct ModemRuntime {
    engine: Arc<dyn CodecEngine>,
    profiles: Arc<ProfileSet>,
    device: AudioDeviceContext,
}

impl ModemRuntime {
    pub fn engine(&self) -> &Arc<dyn CodecEngine> {
        &self.engine
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    pub fn device(&self) -> &AudioDeviceContext {
        &self.device
    }
}

pub struct ReadinessGate {
    engine: OnceEvent<Arc<dyn CodecEngine>>,
    profiles: OnceEvent<Arc<ProfileSet>>,
    // Taken by whichever `check_and_fire` call opens the device, so the
    // context is built at most once.
    playback: Mutex<Option<Arc<dyn PlaybackProvider>>>,
    ready: OnceEvent<Arc<ModemRuntime>>,
}

impl ReadinessGate {
    pub fn new(playback: Arc<dyn PlaybackProvider>) -> Self {
        Self {
            engine: OnceEvent::new(),
            profiles: OnceEvent::new(),
            playback: Mutex::new(Some(playback)),
            ready: OnceEvent::new(),
        }
    }

    /// The codec engine finished loading.
    pub fn signal_engine_loaded(&self, engine: Arc<dyn CodecEngine>) {
        if !self.engine.fire(engine) {
            log::warn!("Codec engine signalled twice; keeping the first");
            return;
        }
        log::info!("Codec engine loaded");
        self.check_and_fire();
    }

    /// The profile document arrived. A document that fails to parse leaves
    /// the gate closed.
    pub fn signal_profiles_loaded(&self, document: &str) -> Result<(), ModemError> {
        let profiles = ProfileSet::parse(document).map_err(|e| {
            log::error!("Failed to parse profile document: {}", e);
            e
        })?;
        let count = profiles.len();

        if !self.profiles.fire(Arc::new(profiles)) {
            log::warn!("Profiles signalled twice; keeping the first");
            return Ok(());
        }
        log::info!("Loaded {} profile(s)", count);
        self.check_and_fire();
        Ok(())
    }

    /// Open the device context and fire `ready` if both preconditions hold.
    ///
    /// Safe to call any number of times from any thread.
    pub fn check_and_fire(&self) {
        let (Some(engine), Some(profiles)) = (self.engine.get(), self.profiles.get()) else {
            return;
        };
        let Some(playback) = self.playback.lock().take() else {
            return;
        };

        match AudioDeviceContext::open(playback) {
            Ok(device) => {
                log::info!(
                    "Audio device context ready: {} at {} Hz",
                    device.endpoint().name,
                    device.sample_rate()
                );
                self.ready.fire(Arc::new(ModemRuntime {
                    engine,
                    profiles,
                    device,
                }));
            }
            Err(e) => {
                log::error!("Failed to open audio device context, bridge will not become ready: {}", e);
            }
        }
    }

    /// Run `callback` once the bridge is ready; immediately if it already is.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.ready.subscribe(move |_| callback());
    }

    pub fn runtime(&self) -> Option<Arc<ModemRuntime>> {
        self.ready.get()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_fired()
    }

    pub fn is_engine_loaded(&self) -> bool {
        self.engine.is_fired()
    }

    pub fn is_profiles_loaded(&self) -> bool {
        self.profiles.is_fired()
    }

    pub fn wait_ready(&self, timeout: Duration) -> Option<Arc<ModemRuntime>> {
        self.ready.wait_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::audio_models::{AudioEndpoint, EndpointDirection};
    use crate::models::profile::Profile;
    use crate::traits::codec_engine::{Decoder, Encoder};
    use crate::traits::playback_provider::{OutputNode, RenderCallback};

    const PROFILES: &str = r#"{"audible": {"mod_scheme": "gmsk"}}"#;

    struct NullEngine;

    impl CodecEngine for NullEngine {
        fn create_encoder(&self, _: &Profile, _: f64) -> Result<Box<dyn Encoder>, ModemError> {
            Err(ModemError::CodecFailed("null engine".into()))
        }

        fn create_decoder(&self, _: &Profile, _: f64) -> Result<Box<dyn Decoder>, ModemError> {
            Err(ModemError::CodecFailed("null engine".into()))
        }
    }

    #[derive(Default)]
    struct CountingPlayback {
        rate_queries: AtomicUsize,
        fail: bool,
    }

    impl PlaybackProvider for CountingPlayback {
        fn sample_rate(&self) -> Result<f64, ModemError> {
            self.rate_queries.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ModemError::DeviceNotAvailable);
            }
            Ok(44100.0)
        }

        fn open_output(&self, _: usize, _: RenderCallback) -> Result<Box<dyn OutputNode>, ModemError> {
            Err(ModemError::DeviceNotAvailable)
        }

        fn device_info(&self) -> AudioEndpoint {
            AudioEndpoint {
                id: "counting".into(),
                name: "Counting".into(),
                direction: EndpointDirection::Output,
                is_default: true,
            }
        }
    }

    fn gate() -> (ReadinessGate, Arc<CountingPlayback>) {
        let playback = Arc::new(CountingPlayback::default());
        (ReadinessGate::new(playback.clone()), playback)
    }

    fn order_log(gate: &ReadinessGate, count: usize) -> Arc<parking_lot::Mutex<Vec<usize>>> {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..count {
            let log = Arc::clone(&log);
            gate.on_ready(move || log.lock().push(i));
        }
        log
    }

    #[test]
    fn fires_after_engine_then_profiles() {
        let (gate, playback) = gate();
        let log = order_log(&gate, 3);

        gate.signal_engine_loaded(Arc::new(NullEngine));
        assert!(log.lock().is_empty());
        assert!(!gate.is_ready());

        gate.signal_profiles_loaded(PROFILES).unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
        assert_eq!(playback.rate_queries.load(Ordering::SeqCst), 1);
        assert_eq!(gate.runtime().unwrap().device().sample_rate(), 44100.0);
    }

    #[test]
    fn fires_after_profiles_then_engine() {
        let (gate, _) = gate();
        let log = order_log(&gate, 3);

        gate.signal_profiles_loaded(PROFILES).unwrap();
        assert!(log.lock().is_empty());

        gate.signal_engine_loaded(Arc::new(NullEngine));
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn late_callback_runs_synchronously_once() {
        let (gate, _) = gate();
        gate.signal_engine_loaded(Arc::new(NullEngine));
        gate.signal_profiles_loaded(PROFILES).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        gate.on_ready(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn repeated_signals_open_context_once() {
        let (gate, playback) = gate();
        let log = order_log(&gate, 1);

        gate.signal_engine_loaded(Arc::new(NullEngine));
        gate.signal_profiles_loaded(PROFILES).unwrap();
        gate.signal_engine_loaded(Arc::new(NullEngine));
        gate.signal_profiles_loaded(PROFILES).unwrap();
        gate.check_and_fire();

        assert_eq!(*log.lock(), vec![0]);
        assert_eq!(playback.rate_queries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bad_profile_document_keeps_gate_closed() {
        let (gate, _) = gate();
        gate.signal_engine_loaded(Arc::new(NullEngine));

        assert!(gate.signal_profiles_loaded("{ nope").is_err());
        assert!(!gate.is_profiles_loaded());
        assert!(!gate.is_ready());
    }

    #[test]
    fn device_failure_keeps_gate_closed() {
        let playback = Arc::new(CountingPlayback {
            fail: true,
            ..Default::default()
        });
        let gate = ReadinessGate::new(playback);
        let log = order_log(&gate, 1);

        gate.signal_engine_loaded(Arc::new(NullEngine));
        gate.signal_profiles_loaded(PROFILES).unwrap();

        assert!(!gate.is_ready());
        assert!(log.lock().is_empty());
        assert!(gate.wait_ready(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn concurrent_signals_fire_exactly_once() {
        for _ in 0..20 {
            let (gate, playback) = gate();
            let gate = Arc::new(gate);
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            gate.on_ready(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

            let engine_gate = Arc::clone(&gate);
            let engine = std::thread::spawn(move || engine_gate.signal_engine_loaded(Arc::new(NullEngine)));
            let profile_gate = Arc::clone(&gate);
            let profiles = std::thread::spawn(move || profile_gate.signal_profiles_loaded(PROFILES));
            engine.join().unwrap();
            profiles.join().unwrap().unwrap();

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(playback.rate_queries.load(Ordering::SeqCst), 1);
        }
    }
}
