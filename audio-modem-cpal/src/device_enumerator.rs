//! Audio device enumeration through the cpal default host.

use cpal::traits::{DeviceTrait, HostTrait};

use audio_modem_core::models::audio_models::{AudioEndpoint, EndpointDirection};
use audio_modem_core::models::error::ModemError;

/// Lists input and output devices of the default cpal host.
///
/// cpal exposes no stable device ids, so endpoint ids are device names.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List input (microphone) devices.
    pub fn list_input_devices(&self) -> Result<Vec<AudioEndpoint>, ModemError> {
        let default_name = self.default_input_name();
        let devices = self
            .host
            .input_devices()
            .map_err(|e| ModemError::Unknown(format!("failed to enumerate input devices: {}", e)))?;
        Ok(collect_endpoints(devices, EndpointDirection::Input, default_name))
    }

    /// List output (speaker/headphone) devices.
    pub fn list_output_devices(&self) -> Result<Vec<AudioEndpoint>, ModemError> {
        let default_name = self.default_output_name();
        let devices = self
            .host
            .output_devices()
            .map_err(|e| ModemError::Unknown(format!("failed to enumerate output devices: {}", e)))?;
        Ok(collect_endpoints(devices, EndpointDirection::Output, default_name))
    }

    pub fn default_input_name(&self) -> Option<String> {
        self.host.default_input_device().and_then(|d| d.name().ok())
    }

    pub fn default_output_name(&self) -> Option<String> {
        self.host.default_output_device().and_then(|d| d.name().ok())
    }

    /// Find an input device by name.
    pub fn find_input(&self, name: &str) -> Result<cpal::Device, ModemError> {
        self.host
            .input_devices()
            .map_err(|e| ModemError::Unknown(format!("failed to enumerate input devices: {}", e)))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or(ModemError::DeviceNotAvailable)
    }

    /// Find an output device by name.
    pub fn find_output(&self, name: &str) -> Result<cpal::Device, ModemError> {
        self.host
            .output_devices()
            .map_err(|e| ModemError::Unknown(format!("failed to enumerate output devices: {}", e)))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or(ModemError::DeviceNotAvailable)
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_endpoints(
    devices: impl Iterator<Item = cpal::Device>,
    direction: EndpointDirection,
    default_name: Option<String>,
) -> Vec<AudioEndpoint> {
    devices
        .filter_map(|d| d.name().ok())
        .map(|name| AudioEndpoint {
            id: name.clone(),
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
            direction,
        })
        .collect()
}
