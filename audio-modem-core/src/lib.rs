//! # audio-modem-core
//!
//! Platform-agnostic core of the audio modem bridge.
//!
//! Sends and receives byte payloads as audio through a pluggable codec
//! engine. Platform backends implement `PlaybackProvider` and
//! `CaptureProvider`; codec engines implement `CodecEngine`. The
//! `ModemBridge` wires them together once the engine and the profile set
//! have both loaded.
//!
//! ## Architecture
//!
//! ```text
//! audio-modem-core (this crate)
//! ├── traits/       ← CodecEngine, PlaybackProvider, CaptureProvider, ProfileSource
//! ├── models/       ← ModemError, TransmitState, CaptureInputState, BridgeConfiguration, ProfileSet
//! ├── gate/         ← OnceEvent, ReadinessGate, CaptureInputGate
//! ├── processing/   ← SampleBlock, PayloadBuffer, block reblockers
//! ├── session/      ← ModemBridge, TransmitSession, ReceiveSession, AudioDeviceContext
//! └── storage/      ← FileProfileSource
//! ```

pub mod gate;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use gate::capture_input::{CaptureHub, CaptureInputGate, CaptureStream};
pub use gate::once_event::OnceEvent;
pub use gate::readiness::{ModemRuntime, ReadinessGate};
pub use models::audio_models::{AudioEndpoint, EndpointDirection, SessionDiagnostics};
pub use models::config::{BridgeConfiguration, CaptureConstraints};
pub use models::error::ModemError;
pub use models::profile::{Profile, ProfileSet};
pub use models::state::{CaptureInputState, TransmitState};
pub use processing::block_adapter::{InputReblocker, OutputReblocker};
pub use processing::payload_buffer::PayloadBuffer;
pub use processing::sample_block::{SampleBlock, SAMPLE_BLOCK_LEN};
pub use session::bridge::{ModemBridge, Receiver, TransmitHandle, Transmitter};
pub use session::device_context::AudioDeviceContext;
pub use session::receive::{ReceiveCallback, ReceiveSession};
pub use session::transmit::{DoneCallback, TransmitSession};
pub use storage::profile_file::FileProfileSource;
pub use traits::capture_provider::{AudioBufferCallback, CaptureProvider, CaptureRequest};
pub use traits::codec_engine::{CodecEngine, Decoder, Encoder};
pub use traits::playback_provider::{OutputNode, PlaybackProvider, RenderCallback, RenderOutcome};
pub use traits::profile_source::ProfileSource;
