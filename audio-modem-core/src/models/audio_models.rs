use std::sync::atomic::{AtomicU64, Ordering};

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointDirection {
    Input,
    Output,
}

/// An audio device available for capture or playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEndpoint {
    pub id: String,
    pub name: String,
    pub direction: EndpointDirection,
    pub is_default: bool,
}

/// Snapshot of a session's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionDiagnostics {
    /// Real-time ticks processed.
    pub ticks: u64,
    /// Samples produced by the encoder (transmit only).
    pub samples_written: u64,
    /// Payload bytes handed to the application (receive only).
    pub bytes_received: u64,
    /// Receive callback invocations (receive only).
    pub chunks_delivered: u64,
    /// Current receive payload buffer capacity in bytes (receive only).
    pub payload_capacity: u64,
    /// Times the receive payload buffer had to grow (receive only).
    pub buffer_growths: u64,
}

/// Live counters updated from the audio thread.
///
/// Plain relaxed atomics: readers get a consistent-enough snapshot for
/// diagnostics without ever taking a lock inside the tick.
#[derive(Debug, Default)]
pub struct SessionCounters {
    ticks: AtomicU64,
    samples_written: AtomicU64,
    bytes_received: AtomicU64,
    chunks_delivered: AtomicU64,
    payload_capacity: AtomicU64,
    buffer_growths: AtomicU64,
}

impl SessionCounters {
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_samples(&self, samples: usize) {
        self.samples_written.fetch_add(samples as u64, Ordering::Relaxed);
    }

    pub fn record_chunk(&self, bytes: usize) {
        self.chunks_delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_capacity(&self, capacity: usize, grew: bool) {
        self.payload_capacity.store(capacity as u64, Ordering::Relaxed);
        if grew {
            self.buffer_growths.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> SessionDiagnostics {
        SessionDiagnostics {
            ticks: self.ticks.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            chunks_delivered: self.chunks_delivered.load(Ordering::Relaxed),
            payload_capacity: self.payload_capacity.load(Ordering::Relaxed),
            buffer_growths: self.buffer_growths.load(Ordering::Relaxed),
        }
    }
}
