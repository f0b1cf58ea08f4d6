use std::sync::Arc;

use uuid::Uuid;

use crate::models::audio_models::SessionCounters;
use crate::processing::payload_buffer::PayloadBuffer;
use crate::processing::sample_block::SampleBlock;
use crate::traits::codec_engine::Decoder;

/// Called from the audio thread with each chunk of received payload.
///
/// Chunk boundaries are whatever the decoder hands back; they do not line
/// up with the sender's messages.
pub type ReceiveCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Continuous decode of captured audio. Runs until its listener is detached.
pub struct ReceiveSession {
    id: Uuid,
    decoder: Box<dyn Decoder>,
    block: SampleBlock,
    payload: PayloadBuffer,
    on_receive: ReceiveCallback,
    counters: Arc<SessionCounters>,
}

impl ReceiveSession {
    pub fn new(
        decoder: Box<dyn Decoder>,
        payload_capacity: usize,
        on_receive: ReceiveCallback,
    ) -> Self {
        let counters = Arc::new(SessionCounters::default());
        counters.record_capacity(payload_capacity, false);

        Self {
            id: Uuid::new_v4(),
            decoder,
            block: SampleBlock::new(),
            payload: PayloadBuffer::new(payload_capacity),
            on_receive,
            counters,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn counters(&self) -> Arc<SessionCounters> {
        Arc::clone(&self.counters)
    }

    pub fn payload_capacity(&self) -> usize {
        self.payload.capacity()
    }

    pub fn payload_buffer(&self) -> &PayloadBuffer {
        &self.payload
    }

    /// Decode one captured block and forward whatever payload is ready.
    pub fn process(&mut self, input: &[f32]) {
        self.counters.record_tick();
        self.block.load(input);

        let ready = self.decoder.decode(self.block.as_slice());
        if ready == 0 {
            return;
        }

        if self.payload.grow_to_fit(ready) {
            log::debug!(
                "Receive session {} grew payload buffer to {} bytes",
                self.id,
                ready
            );
            self.counters.record_capacity(ready, true);
        }

        let read = self
            .decoder
            .read_payload(&mut self.payload.as_mut_slice()[..ready])
            .min(ready);
        if read == 0 {
            return;
        }

        self.counters.record_chunk(read);
        (self.on_receive)(&self.payload.as_slice()[..read]);
    }
}
