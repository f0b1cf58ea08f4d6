//! # audio-modem-cpal
//!
//! cpal device backend for audio-modem.
//!
//! Provides:
//! - `CpalPlayback` — output device context via a cpal output stream
//! - `CpalCapture` — microphone capture via a cpal input stream
//! - `DeviceEnumerator` — input/output device listing
//! - `channel_map` — mono ⇄ interleaved conversion (always built)
//!
//! ## Platform Requirements
//! - The `cpal` feature links the platform audio stack (ALSA headers on Linux)
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_modem_core::{BridgeConfiguration, ModemBridge};
//! use audio_modem_cpal::{CpalCapture, CpalPlayback};
//!
//! let playback = Arc::new(CpalPlayback::default_device()?);
//! let capture = Box::new(CpalCapture::default_device());
//! let bridge = ModemBridge::new(BridgeConfiguration::default(), playback, capture)?;
//! ```

pub mod channel_map;

#[cfg(feature = "cpal")]
pub mod capture;
#[cfg(feature = "cpal")]
pub mod device_enumerator;
#[cfg(feature = "cpal")]
pub mod playback;

#[cfg(feature = "cpal")]
pub use capture::CpalCapture;
#[cfg(feature = "cpal")]
pub use device_enumerator::DeviceEnumerator;
#[cfg(feature = "cpal")]
pub use playback::{CpalOutputNode, CpalPlayback};
