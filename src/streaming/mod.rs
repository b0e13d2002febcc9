//! Abstraction over the real-time streaming subsystem.
//!
//! The bridge never talks to a concrete streaming implementation.
//! Instead, these traits carve out the small surface it needs: discover
//! streamers through a [`StreamingService`], ask a [`Streamer`] for the
//! audio sink of one remote peer, and hang a [`PcmConsumer`] off that
//! [`PeerAudioSink`] to receive pushed PCM.
//!
//! The [`mock`] module provides in-memory implementations of all four
//! traits, so the whole pipeline runs in plain tests with no streaming
//! backend present.

use std::sync::{Arc, Weak};

use crate::ids::{ParticipantId, StreamerId};

pub mod mock;

pub use mock::{MockPeerSink, MockStreamer, MockStreaming, SinkRequest};

/// Entry point into the streaming subsystem.
///
/// Availability is split in two: [`is_available`](Self::is_available)
/// says the subsystem exists at all, [`is_ready`](Self::is_ready) says
/// it has finished initializing. The bridge refuses to start unless
/// both hold, and reports a distinct error for each.
pub trait StreamingService: Send + Sync {
    /// Returns `true` when the streaming subsystem is present.
    fn is_available(&self) -> bool;

    /// Returns `true` when the subsystem is initialized and serving.
    fn is_ready(&self) -> bool;

    /// Returns the ids of all currently registered streamers.
    fn streamer_ids(&self) -> Vec<StreamerId>;

    /// Returns the id the subsystem considers its default streamer.
    ///
    /// Used as a fallback when no streamer is registered yet.
    fn default_streamer_id(&self) -> StreamerId;

    /// Looks up a streamer by id.
    fn find_streamer(&self, id: &StreamerId) -> Option<Arc<dyn Streamer>>;
}

/// One streamer inside the subsystem, owning per-peer audio sinks.
pub trait Streamer: Send + Sync {
    /// Returns an audio sink not yet assigned to any consumer, if one
    /// exists.
    fn unassigned_audio_sink(&self) -> Option<Arc<dyn PeerAudioSink>>;

    /// Returns the audio sink carrying `participant`'s voice, if that
    /// peer is connected and audible.
    fn participant_audio_sink(&self, participant: &ParticipantId) -> Option<Arc<dyn PeerAudioSink>>;
}

/// A live audio sink for one remote peer.
///
/// Consumers are tracked by [`Weak`] identity
/// ([`Weak::ptr_eq`]), which stays valid even after the consumer's
/// strong count reaches zero: a consumer may deregister itself from
/// its own `Drop`.
pub trait PeerAudioSink: Send + Sync {
    /// Attaches a consumer. The sink starts pushing PCM blocks to it
    /// from the next produced block onward.
    ///
    /// Implementations should invoke
    /// [`PcmConsumer::on_consumer_added`] once the attachment is live.
    fn register_consumer(&self, consumer: Weak<dyn PcmConsumer>);

    /// Detaches a previously registered consumer, matched by
    /// [`Weak::ptr_eq`]. Unknown consumers are ignored.
    ///
    /// This is the consumer-initiated path: implementations must *not*
    /// call [`PcmConsumer::on_consumer_removed`] here. That callback is
    /// reserved for sink-initiated removal (peer teardown, sink
    /// reassignment), where the consumer is not the party driving the
    /// detach.
    fn unregister_consumer(&self, consumer: &Weak<dyn PcmConsumer>);
}

/// Receiver of raw PCM pushed by a [`PeerAudioSink`].
pub trait PcmConsumer: Send + Sync {
    /// Delivers one block of interleaved signed 16-bit PCM.
    ///
    /// `frames` counts sample groups, one per channel: a well-formed
    /// block has `samples.len() == channels as usize * frames`.
    ///
    /// Called from the producer's audio thread. Implementations must
    /// stay realtime-conscious: no unbounded blocking, no heavy
    /// allocation per block.
    fn consume_raw_pcm(&self, samples: &[i16], sample_rate: u32, channels: u16, frames: usize);

    /// Notifies the consumer that a sink accepted its registration.
    fn on_consumer_added(&self) {}

    /// Notifies the consumer that its sink went away on the producer
    /// side.
    ///
    /// After this call, the sink holds no reference to the consumer;
    /// deregistering again is unnecessary.
    fn on_consumer_removed(&self);
}
