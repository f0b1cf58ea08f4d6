pub mod audio_models;
pub mod config;
pub mod error;
pub mod profile;
pub mod state;
