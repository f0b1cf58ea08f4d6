pub mod capture_provider;
pub mod codec_engine;
pub mod playback_provider;
pub mod profile_source;
