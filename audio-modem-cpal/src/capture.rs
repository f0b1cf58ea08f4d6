//! Capture device provider backed by a cpal input stream.
//!
//! The stream is opened at the rate the output device negotiated so decoders
//! see the same sample rate they were created with. Buffers are reduced to
//! channel 0 before delivery.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;

use audio_modem_core::models::audio_models::{AudioEndpoint, EndpointDirection};
use audio_modem_core::models::error::ModemError;
use audio_modem_core::traits::capture_provider::{
    AudioBufferCallback, CaptureProvider, CaptureRequest,
};

use crate::channel_map;
use crate::device_enumerator::DeviceEnumerator;

/// Microphone capture through cpal.
pub struct CpalCapture {
    device_name: Option<String>,
    stream: Mutex<Option<cpal::Stream>>,
}

// SAFETY: the stream is created on the acquiring thread and afterwards only
// touched under the mutex, to drop it.
unsafe impl Send for CpalCapture {}
unsafe impl Sync for CpalCapture {}

impl CpalCapture {
    /// Capture from the system default input device.
    pub fn default_device() -> Self {
        Self {
            device_name: None,
            stream: Mutex::new(None),
        }
    }

    /// Capture from the input device called `name`.
    pub fn with_device_name(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
            stream: Mutex::new(None),
        }
    }

    fn resolve_device(&self) -> Result<cpal::Device, ModemError> {
        match &self.device_name {
            Some(name) => DeviceEnumerator::new().find_input(name),
            None => cpal::default_host()
                .default_input_device()
                .ok_or(ModemError::DeviceNotAvailable),
        }
    }
}

impl CaptureProvider for CpalCapture {
    fn is_available(&self) -> bool {
        self.resolve_device().is_ok()
    }

    fn start(
        &mut self,
        request: &CaptureRequest,
        callback: AudioBufferCallback,
    ) -> Result<(), ModemError> {
        if self.stream.lock().is_some() {
            return Err(ModemError::ConfigurationFailed(
                "capture already running".into(),
            ));
        }

        let device = self.resolve_device()?;
        let default_config = device.default_input_config().map_err(|e| {
            ModemError::ConfigurationFailed(format!("failed to get input config: {}", e))
        })?;

        let channels = default_config.channels();
        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(request.sample_rate.round() as u32),
            buffer_size: cpal::BufferSize::Default,
        };

        let constraints = request.constraints;
        if constraints.auto_gain_control
            || constraints.echo_cancellation
            || constraints.noise_suppression
            || constraints.highpass_filter
        {
            log::warn!("cpal input streams cannot apply capture processing; capturing raw audio");
        }

        log::info!(
            "Opening input device {} at {} Hz, {} channels",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate.0,
            channels
        );

        let channels = usize::from(channels);
        let mut mono = channel_map::mono_scratch(0);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    channel_map::extract_first_channel(data, channels, &mut mono);
                    if !mono.is_empty() {
                        callback(&mono[..]);
                    }
                },
                move |err| {
                    log::error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(map_build_error)?;

        stream
            .play()
            .map_err(|e| ModemError::StreamFailed(format!("failed to start input stream: {}", e)))?;

        *self.stream.lock() = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ModemError> {
        if let Some(stream) = self.stream.lock().take() {
            drop(stream);
            log::info!("Input stream closed");
        }
        Ok(())
    }

    fn device_info(&self) -> AudioEndpoint {
        let name = self
            .device_name
            .clone()
            .or_else(|| DeviceEnumerator::new().default_input_name())
            .unwrap_or_else(|| "Default Microphone".into());
        AudioEndpoint {
            id: name.clone(),
            name,
            direction: EndpointDirection::Input,
            is_default: self.device_name.is_none(),
        }
    }
}

/// Backends report refused microphone access as a backend-specific error.
fn map_build_error(err: cpal::BuildStreamError) -> ModemError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => ModemError::DeviceNotAvailable,
        cpal::BuildStreamError::StreamConfigNotSupported => ModemError::ConfigurationFailed(
            "input device does not support the requested sample rate".into(),
        ),
        cpal::BuildStreamError::BackendSpecific { err } => {
            let description = err.description.to_lowercase();
            if description.contains("permission") || description.contains("denied") {
                ModemError::PermissionDenied
            } else {
                ModemError::StreamFailed(err.description)
            }
        }
        other => ModemError::StreamFailed(format!("failed to build input stream: {}", other)),
    }
}
