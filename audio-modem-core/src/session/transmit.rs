use std::sync::Arc;

use uuid::Uuid;

use crate::models::audio_models::SessionCounters;
use crate::models::error::ModemError;
use crate::models::state::{SharedTransmitState, TransmitState};
use crate::processing::sample_block::{SampleBlock, SAMPLE_BLOCK_LEN};
use crate::traits::codec_engine::Encoder;
use crate::traits::playback_provider::RenderOutcome;

/// Called once, from the audio thread, after the final block is rendered.
pub type DoneCallback = Box<dyn FnOnce() + Send + 'static>;

/// One payload being played out, one block per tick.
///
/// Owned by the output stream's render callback. State and counters are
/// shared through atomics so handles can observe progress without locking
/// the tick.
pub struct TransmitSession {
    id: Uuid,
    encoder: Box<dyn Encoder>,
    block: SampleBlock,
    state: Arc<SharedTransmitState>,
    counters: Arc<SessionCounters>,
    on_done: Option<DoneCallback>,
}

impl TransmitSession {
    /// Clamp frames to the block length, load `payload` and arm the session.
    pub fn new(
        mut encoder: Box<dyn Encoder>,
        payload: &[u8],
        on_done: Option<DoneCallback>,
    ) -> Result<Self, ModemError> {
        encoder.clamp_frame_len(SAMPLE_BLOCK_LEN);
        encoder.set_payload(payload)?;

        Ok(Self {
            id: Uuid::new_v4(),
            encoder,
            block: SampleBlock::new(),
            state: Arc::new(SharedTransmitState::new(TransmitState::Armed)),
            counters: Arc::new(SessionCounters::default()),
            on_done,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> TransmitState {
        self.state.get()
    }

    pub fn shared_state(&self) -> Arc<SharedTransmitState> {
        Arc::clone(&self.state)
    }

    pub fn counters(&self) -> Arc<SessionCounters> {
        Arc::clone(&self.counters)
    }

    /// Render one block into `output`.
    ///
    /// A short encode marks the end of the payload: the unwritten tail is
    /// silenced, the done callback fires and the session finishes. Every tick
    /// after that renders silence and asks the stream to disconnect.
    pub fn process(&mut self, output: &mut [f32]) -> RenderOutcome {
        match self.state.get() {
            TransmitState::Finished => {
                output.fill(0.0);
                return RenderOutcome::Disconnect;
            }
            TransmitState::Armed => self.state.set(TransmitState::Streaming),
            TransmitState::Streaming => {}
        }

        let len = self.block.len();
        let written = self.encoder.encode(self.block.as_mut_slice()).min(len);
        self.block.copy_to(output, written);
        self.counters.record_tick();
        self.counters.record_samples(written);

        if written < len {
            self.state.set(TransmitState::Finished);
            log::debug!("Transmit session {} rendered its final block", self.id);
            if let Some(done) = self.on_done.take() {
                done();
            }
        }
        RenderOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Emits `remaining` samples of 0.5 and scribbles garbage past them.
    struct CountdownEncoder {
        remaining: usize,
        clamped_to: Arc<AtomicUsize>,
    }

    impl CountdownEncoder {
        fn boxed(remaining: usize) -> (Box<dyn Encoder>, Arc<AtomicUsize>) {
            let clamped_to = Arc::new(AtomicUsize::new(0));
            let encoder = Self {
                remaining,
                clamped_to: Arc::clone(&clamped_to),
            };
            (Box::new(encoder), clamped_to)
        }
    }

    impl Encoder for CountdownEncoder {
        fn set_payload(&mut self, payload: &[u8]) -> Result<(), ModemError> {
            if payload == b"reject" {
                return Err(ModemError::CodecFailed("payload rejected".into()));
            }
            Ok(())
        }

        fn encode(&mut self, block: &mut [f32]) -> usize {
            let n = self.remaining.min(block.len());
            block[..n].fill(0.5);
            block[n..].fill(9.9);
            self.remaining -= n;
            n
        }

        fn clamp_frame_len(&mut self, block_len: usize) {
            self.clamped_to.store(block_len, Ordering::SeqCst);
        }
    }

    fn done_counter() -> (Arc<AtomicUsize>, Option<DoneCallback>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let done: DoneCallback = Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (count, Some(done))
    }

    #[test]
    fn full_blocks_then_zero_padded_final_block() {
        const TAIL: usize = 100;
        let (encoder, clamped_to) = CountdownEncoder::boxed(2 * SAMPLE_BLOCK_LEN + TAIL);
        let (done, on_done) = done_counter();
        let mut session = TransmitSession::new(encoder, b"payload", on_done).unwrap();
        assert_eq!(clamped_to.load(Ordering::SeqCst), SAMPLE_BLOCK_LEN);
        assert_eq!(session.state(), TransmitState::Armed);

        let mut out = vec![1.0; SAMPLE_BLOCK_LEN];
        for _ in 0..2 {
            assert_eq!(session.process(&mut out), RenderOutcome::Continue);
            assert!(out.iter().all(|&s| s == 0.5));
            assert_eq!(session.state(), TransmitState::Streaming);
            assert_eq!(done.load(Ordering::SeqCst), 0);
        }

        assert_eq!(session.process(&mut out), RenderOutcome::Continue);
        assert!(out[..TAIL].iter().all(|&s| s == 0.5));
        assert!(out[TAIL..].iter().all(|&s| s == 0.0));
        assert_eq!(session.state(), TransmitState::Finished);
        assert_eq!(done.load(Ordering::SeqCst), 1);

        let diagnostics = session.counters().snapshot();
        assert_eq!(diagnostics.ticks, 3);
        assert_eq!(diagnostics.samples_written as usize, 2 * SAMPLE_BLOCK_LEN + TAIL);
    }

    #[test]
    fn finished_session_renders_silence_and_disconnects() {
        let (encoder, _) = CountdownEncoder::boxed(10);
        let (done, on_done) = done_counter();
        let mut session = TransmitSession::new(encoder, b"x", on_done).unwrap();

        let mut out = vec![0.0; SAMPLE_BLOCK_LEN];
        session.process(&mut out);

        for _ in 0..3 {
            out.fill(0.7);
            assert_eq!(session.process(&mut out), RenderOutcome::Disconnect);
            assert!(out.iter().all(|&s| s == 0.0));
        }
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(session.counters().snapshot().ticks, 1);
    }

    #[test]
    fn empty_payload_emits_one_silent_block() {
        let (encoder, _) = CountdownEncoder::boxed(0);
        let (done, on_done) = done_counter();
        let mut session = TransmitSession::new(encoder, b"", on_done).unwrap();

        let mut out = vec![0.3; SAMPLE_BLOCK_LEN];
        assert_eq!(session.process(&mut out), RenderOutcome::Continue);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(session.state().is_terminal());
    }

    #[test]
    fn exact_multiple_finishes_on_following_silent_block() {
        let (encoder, _) = CountdownEncoder::boxed(SAMPLE_BLOCK_LEN);
        let (done, on_done) = done_counter();
        let mut session = TransmitSession::new(encoder, b"x", on_done).unwrap();

        let mut out = vec![0.0; SAMPLE_BLOCK_LEN];
        session.process(&mut out);
        assert_eq!(done.load(Ordering::SeqCst), 0);

        session.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_done_callback_is_fine() {
        let (encoder, _) = CountdownEncoder::boxed(5);
        let mut session = TransmitSession::new(encoder, b"x", None).unwrap();
        let mut out = vec![0.0; SAMPLE_BLOCK_LEN];
        session.process(&mut out);
        assert_eq!(session.state(), TransmitState::Finished);
    }

    #[test]
    fn rejected_payload_fails_construction() {
        let (encoder, _) = CountdownEncoder::boxed(5);
        assert!(matches!(
            TransmitSession::new(encoder, b"reject", None),
            Err(ModemError::CodecFailed(_))
        ));
    }
}
