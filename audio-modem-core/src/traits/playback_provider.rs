use crate::models::audio_models::AudioEndpoint;
use crate::models::error::ModemError;

/// What the output stream should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Keep ticking.
    Continue,
    /// The session is done; play this block and never tick again.
    Disconnect,
}

/// Renders exactly one block of mono samples per call.
///
/// Runs on the real-time audio thread.
pub type RenderCallback = Box<dyn FnMut(&mut [f32]) -> RenderOutcome + Send + 'static>;

/// Interface for the platform output device.
pub trait PlaybackProvider: Send + Sync {
    /// The device's native sample rate. Queried once per bridge.
    fn sample_rate(&self) -> Result<f64, ModemError>;

    /// Open an output stream that calls `render` with blocks of `block_len`
    /// samples at the device's cadence, back to back.
    fn open_output(
        &self,
        block_len: usize,
        render: RenderCallback,
    ) -> Result<Box<dyn OutputNode>, ModemError>;

    /// Information about the device backing this provider.
    fn device_info(&self) -> AudioEndpoint;
}

/// A live output stream. Dropping it tears the stream down.
pub trait OutputNode: Send + Sync {
    /// Stop the stream. Idempotent.
    fn disconnect(&self);

    fn is_connected(&self) -> bool;
}
