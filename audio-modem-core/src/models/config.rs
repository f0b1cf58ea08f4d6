use serde::{Deserialize, Serialize};

/// Capture-side signal processing requested from the input device.
///
/// Everything defaults to off: the demodulator wants the raw waveform, and
/// gain control or echo cancellation will smear symbols. Backends honor what
/// their platform exposes and ignore the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    pub auto_gain_control: bool,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub highpass_filter: bool,
}

/// Configuration for a [`ModemBridge`](crate::ModemBridge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfiguration {
    /// Initial receive payload buffer size in bytes (default: 65536).
    /// The buffer grows past this on demand.
    pub payload_buffer_default_size: usize,

    /// Processing constraints for the shared capture stream.
    pub capture: CaptureConstraints,
}

impl BridgeConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.payload_buffer_default_size == 0 {
            return Err("payload buffer default size must be positive".into());
        }
        Ok(())
    }
}

impl Default for BridgeConfiguration {
    fn default() -> Self {
        Self {
            payload_buffer_default_size: 1 << 16,
            capture: CaptureConstraints::default(),
        }
    }
}
