use std::sync::Arc;

use crate::models::audio_models::AudioEndpoint;
use crate::models::error::ModemError;
use crate::processing::sample_block::SAMPLE_BLOCK_LEN;
use crate::traits::playback_provider::{OutputNode, PlaybackProvider, RenderCallback};

/// The single output device handle and its negotiated sample rate.
///
/// Created once, when the bridge becomes ready; shared read-only by every
/// session afterwards.
#[derive(Clone)]
pub struct AudioDeviceContext {
    playback: Arc<dyn PlaybackProvider>,
    sample_rate: f64,
    endpoint: AudioEndpoint,
}

impl AudioDeviceContext {
    /// Query the device's sample rate once and wrap the handle.
    pub fn open(playback: Arc<dyn PlaybackProvider>) -> Result<Self, ModemError> {
        let sample_rate = playback.sample_rate()?;
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ModemError::ConfigurationFailed(format!(
                "device reported invalid sample rate: {sample_rate}"
            )));
        }
        let endpoint = playback.device_info();

        Ok(Self {
            playback,
            sample_rate,
            endpoint,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn endpoint(&self) -> &AudioEndpoint {
        &self.endpoint
    }

    /// Open an output stream ticking `render` once per `SAMPLE_BLOCK_LEN` block.
    pub fn open_output(&self, render: RenderCallback) -> Result<Box<dyn OutputNode>, ModemError> {
        self.playback.open_output(SAMPLE_BLOCK_LEN, render)
    }
}

impl std::fmt::Debug for AudioDeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDeviceContext")
            .field("sample_rate", &self.sample_rate)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
