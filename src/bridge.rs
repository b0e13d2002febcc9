//! The adapter core: attaches to one peer's audio sink, converts its
//! pushed PCM, and forwards the result downstream.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, error, info, trace};

use crate::binding::{Binding, ParticipantSelector, StreamerSelector};
use crate::builder::VoiceBridgeBuilder;
use crate::config::VoiceConfig;
use crate::control::{AudioControl, GainState};
use crate::error::StartError;
use crate::event::{BridgeEvent, DetachReason, EventCallback};
use crate::format::{self, StreamFormat};
use crate::ids::StreamerId;
use crate::sink::VoiceSink;
use crate::streaming::{PcmConsumer, PeerAudioSink, StreamingService};

/// Producer-side state, guarded by one lock so a block in flight and a
/// concurrent detach cannot interleave.
#[derive(Default)]
struct PipelineState {
    /// Sink the bridge is registered with. Weak so a sink torn down by
    /// the producer is not kept alive from our side.
    peer_sink: Option<Weak<dyn PeerAudioSink>>,
    /// Format the downstream sink was last initialized with.
    format: Option<StreamFormat>,
    /// Conversion scratch buffer, reused across blocks.
    buffer: Vec<f32>,
}

/// Point-in-time activity counters for one bridge.
///
/// Taken with [`VoiceBridge::stats`]; all counters start at zero when
/// the bridge is built and are never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Blocks converted and written downstream.
    pub blocks_forwarded: u64,
    /// Samples contained in those blocks.
    pub samples_forwarded: u64,
    /// Blocks discarded because the bridge was muted, stopped, or the
    /// block was empty.
    pub blocks_dropped: u64,
    /// Blocks whose length did not match their declared channel layout.
    pub malformed_blocks: u64,
    /// Mid-stream format changes observed.
    pub format_changes: u64,
}

/// Bridges one remote peer's voice audio into a downstream sink.
///
/// On [`start`](Self::start) the bridge locates the peer's audio sink
/// inside the streaming subsystem and registers itself as a PCM
/// consumer. From then on the producer pushes i16 blocks on its audio
/// thread; each block is converted to f32, scaled by the current
/// volume, and written synchronously to the downstream
/// [`VoiceSink`]. [`stop`](Self::stop) deregisters and resets gain.
///
/// The bridge is always held in an [`Arc`] (construction goes through
/// [`builder`](Self::builder)) because the streaming subsystem tracks
/// consumers by [`Weak`] reference. Dropping the last `Arc` detaches
/// cleanly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use voice_bridge::streaming::{MockPeerSink, MockStreamer, MockStreaming};
/// use voice_bridge::{ChannelSink, StaticVoiceConfig, StreamFormat, VoiceBridge};
///
/// let peer_sink = Arc::new(MockPeerSink::new());
/// let streamer = MockStreamer::new("demo");
/// streamer.set_unassigned_sink(peer_sink.clone());
/// let streaming = Arc::new(MockStreaming::new());
/// streaming.add_streamer(Arc::new(streamer));
///
/// let (channel, mut rx) = ChannelSink::new(8);
/// let bridge = VoiceBridge::builder()
///     .streaming(streaming)
///     .voice_config(Arc::new(StaticVoiceConfig::new(StreamFormat::new(48000, 2))))
///     .sink(Arc::new(channel))
///     .build()?;
///
/// bridge.start()?;
/// peer_sink.push_pcm(&[16384, -16384], 48000, 2, 1);
///
/// let block = rx.try_recv()?;
/// assert_eq!(block.samples.as_slice(), &[0.5, -0.5]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct VoiceBridge {
    streaming: Arc<dyn StreamingService>,
    voice_config: Arc<dyn VoiceConfig>,
    voice_sink: Arc<dyn VoiceSink>,
    events: Option<EventCallback>,
    /// Weak self-handle registered with peer sinks; consumers are
    /// identified by this pointer.
    self_weak: Weak<VoiceBridge>,
    generating: AtomicBool,
    gain: GainState,
    pipeline: Mutex<PipelineState>,
    binding: Mutex<Binding>,
    blocks_forwarded: AtomicU64,
    samples_forwarded: AtomicU64,
    blocks_dropped: AtomicU64,
    malformed_blocks: AtomicU64,
    format_changes: AtomicU64,
}

impl VoiceBridge {
    /// Returns a builder for assembling a bridge.
    #[must_use]
    pub fn builder() -> VoiceBridgeBuilder {
        VoiceBridgeBuilder::new()
    }

    pub(crate) fn from_parts(
        streaming: Arc<dyn StreamingService>,
        voice_config: Arc<dyn VoiceConfig>,
        voice_sink: Arc<dyn VoiceSink>,
        events: Option<EventCallback>,
        self_weak: Weak<VoiceBridge>,
    ) -> Self {
        Self {
            streaming,
            voice_config,
            voice_sink,
            events,
            self_weak,
            generating: AtomicBool::new(false),
            gain: GainState::new(),
            pipeline: Mutex::new(PipelineState::default()),
            binding: Mutex::new(Binding::default()),
            blocks_forwarded: AtomicU64::new(0),
            samples_forwarded: AtomicU64::new(0),
            blocks_dropped: AtomicU64::new(0),
            malformed_blocks: AtomicU64::new(0),
            format_changes: AtomicU64::new(0),
        }
    }

    /// Attaches to the first available streamer's unassigned audio sink
    /// and begins generating.
    ///
    /// Shorthand for [`start_with`](Self::start_with) with default
    /// selectors.
    ///
    /// # Errors
    ///
    /// See [`StartError`]; transient failures
    /// ([`StartError::is_transient`]) are worth retrying once the
    /// subsystem has caught up.
    pub fn start(&self) -> Result<(), StartError> {
        self.start_with(StreamerSelector::default(), ParticipantSelector::default())
    }

    /// Attaches to the selected streamer and participant sink and
    /// begins generating.
    ///
    /// If the bridge is already attached, the current sink is released
    /// first; volume and mute settings survive a restart. On success
    /// the downstream sink is initialized with the voice subsystem's
    /// configured capture format and a
    /// [`BridgeEvent::Attached`] is emitted.
    ///
    /// # Errors
    ///
    /// Fails without side effects when the subsystem is missing or not
    /// ready, the streamer cannot be found, or the selected sink does
    /// not exist (yet). [`StartError::FormatUnavailable`] is the one
    /// exception: the consumer registration made during the attempt
    /// stays in place (arriving blocks are dropped, not forwarded)
    /// until [`stop`](Self::stop) or a later start cleans it up.
    pub fn start_with(
        &self,
        streamer: StreamerSelector,
        participant: ParticipantSelector,
    ) -> Result<(), StartError> {
        if !self.streaming.is_available() {
            debug!("streaming subsystem unavailable");
            return Err(StartError::ServiceUnavailable);
        }
        if !self.streaming.is_ready() {
            debug!("streaming subsystem not ready");
            return Err(StartError::ServiceNotReady);
        }

        // Restart releases the current sink; gain survives, only
        // stop() resets it.
        if self.detach(true) {
            debug!("released previous sink before restart");
        }

        let streamer_id = match streamer {
            StreamerSelector::ById(id) => id,
            StreamerSelector::FirstAvailable => self
                .streaming
                .streamer_ids()
                .into_iter()
                .next()
                .unwrap_or_else(|| self.streaming.default_streamer_id()),
        };

        let Some(streamer) = self.streaming.find_streamer(&streamer_id) else {
            error!(%streamer_id, "streamer not found");
            return Err(StartError::StreamerNotFound { id: streamer_id });
        };

        let peer_sink = match &participant {
            ParticipantSelector::Unassigned => streamer.unassigned_audio_sink(),
            ParticipantSelector::ById(id) => streamer.participant_audio_sink(id),
        };
        let Some(peer_sink) = peer_sink else {
            // The peer may simply not have joined yet.
            debug!(%streamer_id, %participant, "no audio sink for selector");
            return Err(StartError::NoAudioSink {
                selector: participant,
            });
        };

        {
            let mut binding = self.binding.lock();
            binding.streamer_id = Some(streamer_id.clone());
            binding.participant = Some(participant);
        }
        self.pipeline.lock().peer_sink = Some(Arc::downgrade(&peer_sink));

        let consumer: Weak<dyn PcmConsumer> = self.self_weak.clone();
        peer_sink.register_consumer(consumer);

        let Some(capture_format) = self.voice_config.capture_format() else {
            // Registration stays in place; arriving blocks are dropped
            // while the generating flag is false. stop() or a later
            // start releases or replaces it.
            error!("voice capture format unavailable");
            return Err(StartError::FormatUnavailable);
        };

        self.voice_sink.init(capture_format);
        self.pipeline.lock().format = Some(capture_format);
        self.generating.store(true, Ordering::SeqCst);

        info!(
            %streamer_id,
            sink = self.voice_sink.name(),
            %capture_format,
            "voice bridge started"
        );
        self.emit(BridgeEvent::Attached { streamer_id });
        Ok(())
    }

    /// Stops generating, deregisters from the peer sink, and resets
    /// volume and mute to their defaults.
    ///
    /// Idempotent: stopping a bridge that is not generating only
    /// re-applies the gain reset. [`BridgeEvent::Detached`] fires once
    /// per actual stop.
    pub fn stop(&self) {
        let was_generating = self.detach(true);
        self.gain.reset();
        if was_generating {
            info!("voice bridge stopped");
            self.emit(BridgeEvent::Detached {
                reason: DetachReason::Requested,
            });
        }
    }

    /// Returns `true` while the bridge is attached and forwarding.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Returns the format the downstream sink currently expects, or
    /// `None` when the bridge is not generating.
    #[must_use]
    pub fn current_format(&self) -> Option<StreamFormat> {
        self.pipeline.lock().format
    }

    /// Returns the streamer the bridge last attached to.
    ///
    /// Retained after [`stop`](Self::stop) for diagnostics.
    #[must_use]
    pub fn bound_streamer(&self) -> Option<StreamerId> {
        self.binding.lock().streamer_id.clone()
    }

    /// Returns the participant selector the bridge last attached with.
    ///
    /// Retained after [`stop`](Self::stop) for diagnostics.
    #[must_use]
    pub fn bound_participant(&self) -> Option<ParticipantSelector> {
        self.binding.lock().participant.clone()
    }

    /// Takes a snapshot of the bridge's activity counters.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            blocks_forwarded: self.blocks_forwarded.load(Ordering::SeqCst),
            samples_forwarded: self.samples_forwarded.load(Ordering::SeqCst),
            blocks_dropped: self.blocks_dropped.load(Ordering::SeqCst),
            malformed_blocks: self.malformed_blocks.load(Ordering::SeqCst),
            format_changes: self.format_changes.load(Ordering::SeqCst),
        }
    }

    /// Clears producer-side state and optionally deregisters from the
    /// sink. Returns whether the bridge was generating.
    ///
    /// Deregistration happens after the pipeline lock is released: the
    /// sink's own registry lock may be held by a producer mid-push, and
    /// that push path takes our pipeline lock next.
    fn detach(&self, deregister: bool) -> bool {
        let was_generating = self.generating.swap(false, Ordering::SeqCst);
        let peer_sink = {
            let mut pipeline = self.pipeline.lock();
            pipeline.format = None;
            pipeline.buffer = Vec::new();
            pipeline.peer_sink.take()
        };
        if deregister {
            if let Some(sink) = peer_sink.and_then(|weak| weak.upgrade()) {
                let consumer: Weak<dyn PcmConsumer> = self.self_weak.clone();
                sink.unregister_consumer(&consumer);
                debug!("deregistered from peer sink");
            }
        }
        was_generating
    }

    fn emit(&self, event: BridgeEvent) {
        if let Some(callback) = &self.events {
            callback(event);
        }
    }
}

impl PcmConsumer for VoiceBridge {
    fn consume_raw_pcm(&self, samples: &[i16], sample_rate: u32, channels: u16, frames: usize) {
        if !self.generating.load(Ordering::SeqCst) || self.gain.is_muted() {
            self.blocks_dropped.fetch_add(1, Ordering::SeqCst);
            return;
        }
        let incoming = StreamFormat::new(sample_rate, channels);
        // An overflowing declared layout compares as None, never a panic.
        if incoming.samples_for_frames(frames) != Some(samples.len()) {
            self.malformed_blocks.fetch_add(1, Ordering::SeqCst);
            error!(
                samples = samples.len(),
                channels,
                frames,
                "malformed PCM block, length does not match declared layout"
            );
            return;
        }
        if samples.is_empty() {
            self.blocks_dropped.fetch_add(1, Ordering::SeqCst);
            return;
        }

        let mut format_change = None;
        {
            let mut pipeline = self.pipeline.lock();
            // A concurrent stop() may have won the lock first.
            if !self.generating.load(Ordering::SeqCst) {
                self.blocks_dropped.fetch_add(1, Ordering::SeqCst);
                return;
            }

            if pipeline.format != Some(incoming) {
                let previous = pipeline.format;
                self.voice_sink.init(incoming);
                pipeline.format = Some(incoming);
                if let Some(previous) = previous {
                    self.format_changes.fetch_add(1, Ordering::SeqCst);
                    info!(%previous, current = %incoming, "stream format changed");
                    format_change = Some((previous, incoming));
                }
            }

            let volume = self.gain.volume();
            format::pcm16_to_f32_buf(samples, &mut pipeline.buffer);
            format::apply_gain(&mut pipeline.buffer, volume);
            self.voice_sink.write(pipeline.buffer.as_slice());
        }

        self.blocks_forwarded.fetch_add(1, Ordering::SeqCst);
        self.samples_forwarded
            .fetch_add(samples.len() as u64, Ordering::SeqCst);
        if let Some((previous, current)) = format_change {
            self.emit(BridgeEvent::FormatChanged { previous, current });
        }
        trace!(samples = samples.len(), frames, "block forwarded");
    }

    fn on_consumer_added(&self) {
        debug!("acknowledged as audio consumer");
        self.emit(BridgeEvent::ConsumerAdded);
    }

    fn on_consumer_removed(&self) {
        // Sink-initiated removal: the producer already dropped its
        // reference to us, so there is nothing to deregister from.
        let was_generating = self.detach(false);
        self.gain.reset();
        if was_generating {
            info!("peer sink removed by producer");
            self.emit(BridgeEvent::Detached {
                reason: DetachReason::SinkRemoved,
            });
        }
    }
}

impl AudioControl for VoiceBridge {
    fn volume(&self) -> f32 {
        self.gain.volume()
    }

    fn set_volume(&self, volume: f32) {
        trace!(volume, "volume changed");
        self.gain.set_volume(volume);
    }

    fn is_muted(&self) -> bool {
        self.gain.is_muted()
    }

    fn set_muted(&self, muted: bool) {
        debug!(muted, "mute changed");
        self.gain.set_muted(muted);
    }
}

impl Drop for VoiceBridge {
    fn drop(&mut self) {
        // The sink must not keep a registry entry for a dead consumer.
        self.detach(true);
        debug!("voice bridge dropped");
    }
}

impl std::fmt::Debug for VoiceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceBridge")
            .field("generating", &self.is_generating())
            .field("format", &self.current_format())
            .field("streamer", &self.bound_streamer())
            .field("sink", &self.voice_sink.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticVoiceConfig;
    use crate::sink::ChannelSink;
    use crate::streaming::{MockPeerSink, MockStreamer, MockStreaming};

    fn bridge_with_mocks() -> (Arc<VoiceBridge>, Arc<MockPeerSink>) {
        let peer_sink = Arc::new(MockPeerSink::new());
        let streamer = Arc::new(MockStreamer::new("unit"));
        streamer.set_unassigned_sink(peer_sink.clone());
        let streaming = Arc::new(MockStreaming::new());
        streaming.add_streamer(streamer);

        let (sink, _rx) = ChannelSink::new(4);
        let bridge = VoiceBridge::builder()
            .streaming(streaming)
            .voice_config(Arc::new(StaticVoiceConfig::new(StreamFormat::new(48000, 1))))
            .sink(Arc::new(sink))
            .build()
            .unwrap();
        (bridge, peer_sink)
    }

    #[test]
    fn test_new_bridge_is_inert() {
        let (bridge, peer_sink) = bridge_with_mocks();

        assert!(!bridge.is_generating());
        assert_eq!(bridge.current_format(), None);
        assert_eq!(bridge.bound_streamer(), None);
        assert_eq!(peer_sink.consumer_count(), 0);
        assert_eq!(bridge.stats(), BridgeStats::default());
    }

    #[test]
    fn test_start_populates_status_surface() {
        let (bridge, peer_sink) = bridge_with_mocks();
        bridge.start().unwrap();

        assert!(bridge.is_generating());
        assert_eq!(bridge.current_format(), Some(StreamFormat::new(48000, 1)));
        assert_eq!(bridge.bound_streamer(), Some(StreamerId::from("unit")));
        assert_eq!(peer_sink.consumer_count(), 1);
    }

    #[test]
    fn test_debug_reports_sink_and_state() {
        let (bridge, _peer_sink) = bridge_with_mocks();
        let debug = format!("{bridge:?}");

        assert!(debug.contains("generating"));
        assert!(debug.contains("channel"));
    }
}
