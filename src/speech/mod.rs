//! Speech recognition adapter
//!
//! This module wraps the external speech-to-text provider behind a uniform
//! interface:
//! - one-shot recognition of a complete audio clip
//! - continuous recognition of live audio, delivered as finalized segments
//!   over a channel until the provider acknowledges a stop request
//!
//! The concrete provider is a speech daemon reached over NATS; tests swap in
//! an in-process mock via the `SpeechBackend` trait.

mod backend;
pub mod messages;
mod nats;

pub use backend::{
    ContinuousControl, ContinuousSession, RecognitionError, SegmentEvent, SpeechBackend,
    NO_SPEECH_MESSAGE,
};
pub use nats::NatsSpeechBackend;
