//! Bridge remote voice audio out of a real-time streaming subsystem
//! and into your own audio pipeline.
//!
//! A [`VoiceBridge`] locates the audio sink of one remote peer inside
//! a streaming subsystem, registers itself as a PCM consumer, and from
//! then on receives every block the producer pushes: interleaved
//! signed 16-bit samples, converted here to `f32`, scaled by a
//! thread-safe volume control, and written synchronously to a
//! downstream [`VoiceSink`]. Mid-stream sample-rate or channel-count
//! changes re-initialize the downstream sink before any sample of the
//! new shape is forwarded.
//!
//! # Overview
//!
//! - [`streaming`] defines the seam to the streaming subsystem
//!   ([`StreamingService`], [`Streamer`], [`PeerAudioSink`],
//!   [`PcmConsumer`]) plus in-memory mocks for tests.
//! - [`VoiceBridge`] is the adapter itself, with lifecycle
//!   ([`start`](VoiceBridge::start) / [`stop`](VoiceBridge::stop)),
//!   gain control ([`AudioControl`]), events, and counters.
//! - [`sink`] holds the downstream side: [`ChannelSink`] for async
//!   consumers, [`RingSink`] for audio callbacks, or any [`VoiceSink`]
//!   of your own.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use voice_bridge::streaming::{MockPeerSink, MockStreamer, MockStreaming};
//! use voice_bridge::{ChannelSink, StaticVoiceConfig, StreamFormat, VoiceBridge};
//!
//! // A scriptable stand-in for the real streaming subsystem.
//! let peer_sink = Arc::new(MockPeerSink::new());
//! let streamer = MockStreamer::new("living-room");
//! streamer.set_unassigned_sink(peer_sink.clone());
//! let streaming = Arc::new(MockStreaming::new());
//! streaming.add_streamer(Arc::new(streamer));
//!
//! // Converted audio arrives as blocks on a bounded channel.
//! let (sink, mut rx) = ChannelSink::new(32);
//!
//! let bridge = VoiceBridge::builder()
//!     .streaming(streaming)
//!     .voice_config(Arc::new(StaticVoiceConfig::new(StreamFormat::new(48000, 2))))
//!     .sink(Arc::new(sink))
//!     .build()?;
//! bridge.start()?;
//!
//! // The producer pushes i16 PCM; the bridge forwards f32.
//! peer_sink.push_pcm(&[-32768, 32767], 48000, 2, 1);
//! assert_eq!(rx.try_recv()?.samples[0], -1.0);
//!
//! bridge.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Thread model
//!
//! PCM blocks arrive on the producer's audio thread and are forwarded
//! on that same thread. Volume and mute are atomics, adjustable from
//! anywhere without touching the audio path. Lifecycle calls
//! ([`start`](VoiceBridge::start), [`stop`](VoiceBridge::stop)) may
//! race the producer; an internal lock decides whether an in-flight
//! block is forwarded before a detach takes effect.

#![warn(missing_docs)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

mod binding;
mod block;
mod bridge;
mod builder;
mod config;
mod control;
mod error;
mod event;
pub mod format;
mod ids;
pub mod sink;
pub mod streaming;

pub use binding::{ParticipantSelector, StreamerSelector};
pub use block::VoiceBlock;
pub use bridge::{BridgeStats, VoiceBridge};
pub use builder::VoiceBridgeBuilder;
pub use config::{StaticVoiceConfig, VoiceConfig};
pub use control::AudioControl;
pub use error::{BuildError, StartError};
pub use event::{event_callback, BridgeEvent, DetachReason, EventCallback};
pub use format::{pcm16_to_f32, StreamFormat};
pub use ids::{ParticipantId, StreamerId};
pub use sink::{ChannelSink, RingSink, VoiceSink};
pub use streaming::{
    MockPeerSink, MockStreamer, MockStreaming, PcmConsumer, PeerAudioSink, SinkRequest, Streamer,
    StreamingService,
};
