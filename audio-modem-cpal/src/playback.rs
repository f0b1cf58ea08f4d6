//! Output device provider backed by a cpal output stream.
//!
//! The device asks for whatever period size it likes; an
//! [`OutputReblocker`] turns that into the fixed-size ticks the transmit
//! session expects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;

use audio_modem_core::models::audio_models::{AudioEndpoint, EndpointDirection};
use audio_modem_core::models::error::ModemError;
use audio_modem_core::processing::block_adapter::OutputReblocker;
use audio_modem_core::traits::playback_provider::{
    OutputNode, PlaybackProvider, RenderCallback, RenderOutcome,
};

use crate::channel_map;
use crate::device_enumerator::DeviceEnumerator;

/// Playback through a cpal output device at its default configuration.
pub struct CpalPlayback {
    device: cpal::Device,
    config: cpal::StreamConfig,
    device_name: String,
    is_default: bool,
}

// SAFETY: `cpal::Device` is a handle that is only used to build streams; the
// streams themselves live in `CpalOutputNode`.
unsafe impl Send for CpalPlayback {}
unsafe impl Sync for CpalPlayback {}

impl CpalPlayback {
    /// Use the system default output device.
    pub fn default_device() -> Result<Self, ModemError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(ModemError::DeviceNotAvailable)?;
        Self::from_device(device, true)
    }

    /// Use the output device called `name`.
    pub fn with_device_name(name: &str) -> Result<Self, ModemError> {
        let enumerator = DeviceEnumerator::new();
        let is_default = enumerator.default_output_name().as_deref() == Some(name);
        Self::from_device(enumerator.find_output(name)?, is_default)
    }

    fn from_device(device: cpal::Device, is_default: bool) -> Result<Self, ModemError> {
        let device_name = device.name().unwrap_or_else(|_| "unknown".into());
        let config: cpal::StreamConfig = device
            .default_output_config()
            .map_err(|e| {
                ModemError::ConfigurationFailed(format!("failed to get output config: {}", e))
            })?
            .into();

        log::debug!(
            "Output device {}: {} Hz, {} channels",
            device_name,
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            device,
            config,
            device_name,
            is_default,
        })
    }
}

impl PlaybackProvider for CpalPlayback {
    fn sample_rate(&self) -> Result<f64, ModemError> {
        Ok(f64::from(self.config.sample_rate.0))
    }

    fn open_output(
        &self,
        block_len: usize,
        mut render: RenderCallback,
    ) -> Result<Box<dyn OutputNode>, ModemError> {
        let channels = usize::from(self.config.channels);
        let connected = Arc::new(AtomicBool::new(true));
        let live = Arc::clone(&connected);
        let mut reblocker = OutputReblocker::new(block_len);
        let mut mono = channel_map::mono_scratch(block_len);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !live.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }

                    mono.resize(channel_map::frame_count(data.len(), channels), 0.0);
                    let outcome = reblocker.fill(&mut mono, |block| render(block));
                    channel_map::spread_to_first_channel(&mono, channels, data);

                    if outcome == RenderOutcome::Disconnect {
                        live.store(false, Ordering::Release);
                    }
                },
                move |err| {
                    log::error!("Audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| ModemError::StreamFailed(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ModemError::StreamFailed(format!("failed to start output stream: {}", e)))?;

        Ok(Box::new(CpalOutputNode {
            stream: Mutex::new(Some(stream)),
            connected,
        }))
    }

    fn device_info(&self) -> AudioEndpoint {
        AudioEndpoint {
            id: self.device_name.clone(),
            name: self.device_name.clone(),
            direction: EndpointDirection::Output,
            is_default: self.is_default,
        }
    }
}

/// A playing cpal output stream.
///
/// Once the session disconnects the callback renders silence; the stream
/// itself is closed on [`disconnect`](OutputNode::disconnect) or drop.
pub struct CpalOutputNode {
    stream: Mutex<Option<cpal::Stream>>,
    connected: Arc<AtomicBool>,
}

// SAFETY: the stream is only touched under the mutex, and only to drop it.
unsafe impl Send for CpalOutputNode {}
unsafe impl Sync for CpalOutputNode {}

impl OutputNode for CpalOutputNode {
    fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        if let Some(stream) = self.stream.lock().take() {
            let _ = stream.pause();
            drop(stream);
            log::debug!("Output stream closed");
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for CpalOutputNode {
    fn drop(&mut self) {
        self.disconnect();
    }
}
