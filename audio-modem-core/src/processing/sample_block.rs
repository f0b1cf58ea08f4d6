/// Number of samples processed per real-time tick.
///
/// Roughly a third of a second at 48 kHz. The
/// bridge assumes the device plays consecutive blocks with no gaps.
pub const SAMPLE_BLOCK_LEN: usize = 16384;

const _: () = assert!(SAMPLE_BLOCK_LEN.is_power_of_two());

/// Fixed-length block of f32 samples, allocated once per session and reused
/// on every tick.
#[derive(Debug, Clone)]
pub struct SampleBlock {
    samples: Box<[f32]>,
}

impl SampleBlock {
    pub fn new() -> Self {
        Self::with_len(SAMPLE_BLOCK_LEN)
    }

    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            samples: vec![0.0; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Copy `input` into the block; any tail past `input.len()` is zeroed.
    pub fn load(&mut self, input: &[f32]) {
        let n = input.len().min(self.samples.len());
        self.samples[..n].copy_from_slice(&input[..n]);
        self.samples[n..].fill(0.0);
    }

    /// Copy the first `written` samples to `out` and silence the rest of it.
    pub fn copy_to(&self, out: &mut [f32], written: usize) {
        let n = written.min(self.samples.len()).min(out.len());
        out[..n].copy_from_slice(&self.samples[..n]);
        out[n..].fill(0.0);
    }
}

impl Default for SampleBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_block_has_constant_len() {
        let block = SampleBlock::new();
        assert_eq!(block.len(), SAMPLE_BLOCK_LEN);
        assert!(block.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn load_short_input_zero_pads() {
        let mut block = SampleBlock::with_len(4);
        block.as_mut_slice().fill(9.0);
        block.load(&[1.0, 2.0]);
        assert_eq!(block.as_slice(), &[1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn load_long_input_truncates() {
        let mut block = SampleBlock::with_len(2);
        block.load(&[1.0, 2.0, 3.0]);
        assert_eq!(block.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn copy_to_silences_tail() {
        let mut block = SampleBlock::with_len(4);
        block.as_mut_slice().copy_from_slice(&[0.5, -0.5, 0.9, 0.9]);

        let mut out = [7.0; 4];
        block.copy_to(&mut out, 2);
        assert_eq!(out, [0.5, -0.5, 0.0, 0.0]);
    }
}
