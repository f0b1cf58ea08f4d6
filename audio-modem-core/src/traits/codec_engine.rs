use crate::models::error::ModemError;
use crate::models::profile::Profile;

/// Factory for stateful encoder/decoder instances bound to a profile.
///
/// The engine owns everything acoustic: waveform synthesis, detection,
/// framing and error correction. The bridge only pushes sample blocks through
/// it. Engines resample internally, so every instance is told the device
/// sample rate at creation.
pub trait CodecEngine: Send + Sync {
    fn create_encoder(
        &self,
        profile: &Profile,
        sample_rate: f64,
    ) -> Result<Box<dyn Encoder>, ModemError>;

    fn create_decoder(
        &self,
        profile: &Profile,
        sample_rate: f64,
    ) -> Result<Box<dyn Decoder>, ModemError>;
}

/// Payload → samples.
pub trait Encoder: Send {
    /// Load the payload to transmit. Called once, before the first `encode`.
    fn set_payload(&mut self, payload: &[u8]) -> Result<(), ModemError>;

    /// Fill `block` with the next samples.
    ///
    /// Returns the number of samples written, at most `block.len()`. A return
    /// value below `block.len()` means the payload is exhausted.
    fn encode(&mut self, block: &mut [f32]) -> usize;

    /// Shorten protocol frames so none spans two blocks of `block_len`
    /// samples. Engines without frame closing ignore this.
    fn clamp_frame_len(&mut self, _block_len: usize) {}
}

/// Samples → payload.
pub trait Decoder: Send {
    /// Consume one block of captured samples.
    ///
    /// Returns the number of payload bytes currently buffered inside the
    /// decoder. The count is the decoder's buffer level at the time of the
    /// call; reading drains it.
    fn decode(&mut self, block: &[f32]) -> usize;

    /// Drain up to `out.len()` buffered payload bytes into `out`.
    ///
    /// Returns the number of bytes written.
    fn read_payload(&mut self, out: &mut [u8]) -> usize;
}
