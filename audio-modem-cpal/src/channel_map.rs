//! Mono ⇄ interleaved conversion for device buffers.
//!
//! The modem runs on a single channel. Capture reads channel 0 of whatever
//! the device delivers; playback writes channel 0 and silences the rest.

use audio_modem_core::processing::sample_block::SAMPLE_BLOCK_LEN;

/// Frames of mono scratch reserved per stream. Device periods are far
/// shorter, so the callbacks never grow their scratch buffer.
pub const SCRATCH_FRAMES: usize = SAMPLE_BLOCK_LEN;

/// A mono scratch buffer for use inside a device callback, reserved up front
/// for at least `frames` frames.
pub fn mono_scratch(frames: usize) -> Vec<f32> {
    Vec::with_capacity(frames.max(SCRATCH_FRAMES))
}

/// Copy channel 0 of `interleaved` into `mono`, replacing its contents.
pub fn extract_first_channel(interleaved: &[f32], channels: usize, mono: &mut Vec<f32>) {
    mono.clear();
    if channels <= 1 {
        mono.extend_from_slice(interleaved);
        return;
    }
    mono.extend(interleaved.chunks_exact(channels).map(|frame| frame[0]));
}

/// Write `mono` to channel 0 of `interleaved` and zero every other channel.
///
/// Frames past the end of `mono` are silenced.
pub fn spread_to_first_channel(mono: &[f32], channels: usize, interleaved: &mut [f32]) {
    let channels = channels.max(1);
    for (i, frame) in interleaved.chunks_mut(channels).enumerate() {
        frame.fill(0.0);
        if let Some(&sample) = mono.get(i) {
            frame[0] = sample;
        }
    }
}

/// Number of whole frames in an interleaved buffer of `len` samples.
pub fn frame_count(len: usize, channels: usize) -> usize {
    len / channels.max(1)
}
