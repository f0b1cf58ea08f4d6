use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use super::error::ModemError;

/// Transmit session state machine.
///
/// ```text
/// armed → streaming → finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransmitState {
    /// Payload loaded into the encoder, no block rendered yet.
    Armed = 0,
    /// Rendering one full block per tick.
    Streaming = 1,
    /// Final (partial, zero-padded) block has been rendered.
    Finished = 2,
}

impl TransmitState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Streaming,
            2 => Self::Finished,
            _ => Self::Armed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for TransmitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Armed => write!(f, "armed"),
            Self::Streaming => write!(f, "streaming"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Transmit state readable outside the audio thread.
#[derive(Debug)]
pub struct SharedTransmitState(AtomicU8);

impl SharedTransmitState {
    pub fn new(state: TransmitState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> TransmitState {
        TransmitState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: TransmitState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Acquisition state of the shared capture stream.
///
/// ```text
/// unrequested → pending → ready
///                  ↓
///               denied
/// ```
/// `ready` and `denied` are both terminal for the lifetime of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureInputState {
    Unrequested,
    Pending,
    Ready,
    Denied(ModemError),
}

impl CaptureInputState {
    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::Unrequested)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Denied(_))
    }
}
