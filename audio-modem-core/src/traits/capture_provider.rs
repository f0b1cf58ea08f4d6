use std::sync::Arc;

use crate::models::audio_models::AudioEndpoint;
use crate::models::config::CaptureConstraints;
use crate::models::error::ModemError;

/// Callback invoked when a buffer of captured mono samples is available.
///
/// Buffer sizes are whatever the device delivers; the receive path reblocks.
pub type AudioBufferCallback = Arc<dyn Fn(&[f32]) + Send + Sync + 'static>;

/// Parameters of the one capture request a bridge makes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    /// Sample rate negotiated by the output device context. Capture must run
    /// at the same rate the decoders were created with.
    pub sample_rate: f64,
    pub constraints: CaptureConstraints,
}

/// Interface for platform-specific capture devices (microphones).
///
/// `start` may block on a permission prompt; it is only ever called from a
/// background thread, and at most once per bridge.
pub trait CaptureProvider: Send + Sync {
    /// Whether a capture device is present at all.
    fn is_available(&self) -> bool;

    /// Open the device and start delivering buffers via `callback`.
    ///
    /// Returns `PermissionDenied` when the user or OS refuses access.
    fn start(
        &mut self,
        request: &CaptureRequest,
        callback: AudioBufferCallback,
    ) -> Result<(), ModemError>;

    /// Stop capturing and release the device.
    fn stop(&mut self) -> Result<(), ModemError>;

    /// Information about the device backing this provider.
    fn device_info(&self) -> AudioEndpoint;
}
