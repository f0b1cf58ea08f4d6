//! Adapters between device-sized periods and fixed session blocks.
//!
//! Devices call back with whatever period they negotiated (often a few
//! hundred frames). Sessions must see exactly one full block per tick, so the
//! backend runs these adapters inside its stream callback. Both allocate only
//! at construction.

use crate::traits::playback_provider::RenderOutcome;

/// Accumulates captured samples and emits full blocks.
#[derive(Debug)]
pub struct InputReblocker {
    block: Box<[f32]>,
    filled: usize,
}

impl InputReblocker {
    /// # Panics
    /// Panics if `block_len` is zero.
    pub fn new(block_len: usize) -> Self {
        assert!(block_len > 0, "block length must be positive");
        Self {
            block: vec![0.0; block_len].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Append `samples`, calling `on_block` once per completed block.
    ///
    /// Returns the number of blocks emitted.
    pub fn push<F: FnMut(&[f32])>(&mut self, mut samples: &[f32], mut on_block: F) -> usize {
        let mut emitted = 0;
        while !samples.is_empty() {
            let n = (self.block.len() - self.filled).min(samples.len());
            self.block[self.filled..self.filled + n].copy_from_slice(&samples[..n]);
            self.filled += n;
            samples = &samples[n..];

            if self.filled == self.block.len() {
                on_block(&self.block[..]);
                self.filled = 0;
                emitted += 1;
            }
        }
        emitted
    }

    /// Samples waiting for the current block to complete.
    pub fn pending(&self) -> usize {
        self.filled
    }
}

/// Renders full blocks on demand and drains them across device periods.
#[derive(Debug)]
pub struct OutputReblocker {
    block: Box<[f32]>,
    cursor: usize,
    disconnected: bool,
}

impl OutputReblocker {
    /// # Panics
    /// Panics if `block_len` is zero.
    pub fn new(block_len: usize) -> Self {
        assert!(block_len > 0, "block length must be positive");
        Self {
            block: vec![0.0; block_len].into_boxed_slice(),
            cursor: block_len,
            disconnected: false,
        }
    }

    /// Fill `out` with rendered samples, ticking `render` whenever the
    /// current block runs dry.
    ///
    /// After `render` returns `Disconnect`, the rest of that block still
    /// plays; from then on `out` is filled with silence and `render` is never
    /// called again. Returns `Disconnect` once the final block has drained.
    pub fn fill<F>(&mut self, out: &mut [f32], mut render: F) -> RenderOutcome
    where
        F: FnMut(&mut [f32]) -> RenderOutcome,
    {
        let mut written = 0;
        while written < out.len() {
            if self.cursor == self.block.len() {
                if self.disconnected {
                    out[written..].fill(0.0);
                    break;
                }
                if render(&mut self.block[..]) == RenderOutcome::Disconnect {
                    self.disconnected = true;
                }
                self.cursor = 0;
            }

            let n = (self.block.len() - self.cursor).min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.block[self.cursor..self.cursor + n]);
            self.cursor += n;
            written += n;
        }

        if self.is_drained() {
            RenderOutcome::Disconnect
        } else {
            RenderOutcome::Continue
        }
    }

    /// True once the session disconnected and its last block has played.
    pub fn is_drained(&self) -> bool {
        self.disconnected && self.cursor == self.block.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_emits_only_full_blocks() {
        let mut reblocker = InputReblocker::new(4);
        let mut blocks: Vec<Vec<f32>> = Vec::new();

        let emitted = reblocker.push(&[1.0, 2.0, 3.0], |b| blocks.push(b.to_vec()));
        assert_eq!(emitted, 0);
        assert_eq!(reblocker.pending(), 3);

        let emitted = reblocker.push(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0], |b| blocks.push(b.to_vec()));
        assert_eq!(emitted, 2);
        assert_eq!(blocks, vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]);
        assert_eq!(reblocker.pending(), 1);
    }

    #[test]
    fn input_empty_push_is_noop() {
        let mut reblocker = InputReblocker::new(4);
        assert_eq!(reblocker.push(&[], |_| panic!("no block expected")), 0);
    }

    #[test]
    fn output_spreads_block_over_small_periods() {
        let mut reblocker = OutputReblocker::new(4);
        let mut ticks = 0;
        let mut render = |block: &mut [f32]| {
            ticks += 1;
            for (i, s) in block.iter_mut().enumerate() {
                *s = (ticks * 10 + i) as f32;
            }
            RenderOutcome::Continue
        };

        let mut out = [0.0; 3];
        reblocker.fill(&mut out, &mut render);
        assert_eq!(out, [10.0, 11.0, 12.0]);
        reblocker.fill(&mut out, &mut render);
        assert_eq!(out, [13.0, 20.0, 21.0]);
        assert_eq!(ticks, 2);
    }

    #[test]
    fn output_plays_final_block_then_silence() {
        let mut reblocker = OutputReblocker::new(2);
        let mut ticks = 0;
        let mut render = |block: &mut [f32]| {
            ticks += 1;
            block.fill(1.0);
            RenderOutcome::Disconnect
        };

        let mut out = [9.0; 5];
        let outcome = reblocker.fill(&mut out, &mut render);
        assert_eq!(out, [1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(outcome, RenderOutcome::Disconnect);

        let outcome = reblocker.fill(&mut out, &mut render);
        assert_eq!(out, [0.0; 5]);
        assert_eq!(outcome, RenderOutcome::Disconnect);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn output_reports_continue_until_final_block_drains() {
        let mut reblocker = OutputReblocker::new(4);
        let mut render = |block: &mut [f32]| {
            block.fill(0.5);
            RenderOutcome::Disconnect
        };

        let mut out = [0.0; 2];
        assert_eq!(reblocker.fill(&mut out, &mut render), RenderOutcome::Continue);
        assert!(!reblocker.is_drained());
        assert_eq!(reblocker.fill(&mut out, &mut render), RenderOutcome::Disconnect);
        assert!(reblocker.is_drained());
    }
}
