//! Audio clip loading
//!
//! Uploaded recordings are decoded here before being handed to the speech
//! provider. Only WAV input is supported; anything else is rejected by the
//! decoder.

mod clip;

pub use clip::AudioClip;
