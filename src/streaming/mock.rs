//! In-memory streaming subsystem for tests and demos.
//!
//! [`MockStreaming`], [`MockStreamer`], and [`MockPeerSink`] implement
//! the full streaming seam without any real backend: tests script
//! availability, wire up sinks, push PCM blocks by hand, and inspect
//! what the bridge asked for afterwards.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::ids::{ParticipantId, StreamerId};
use crate::streaming::{PcmConsumer, PeerAudioSink, Streamer, StreamingService};

/// A sink lookup observed by a [`MockStreamer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkRequest {
    /// [`Streamer::unassigned_audio_sink`] was called.
    Unassigned,
    /// [`Streamer::participant_audio_sink`] was called for this peer.
    Participant(ParticipantId),
}

/// Scriptable [`StreamingService`] implementation.
///
/// Starts out available and ready with no streamers registered; tests
/// flip availability and add streamers as the scenario requires.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use voice_bridge::streaming::{MockStreamer, MockStreaming, StreamingService};
///
/// let streaming = MockStreaming::new();
/// streaming.add_streamer(Arc::new(MockStreamer::new("living-room")));
///
/// assert!(streaming.is_ready());
/// assert_eq!(streaming.streamer_ids().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockStreaming {
    available: AtomicBool,
    ready: AtomicBool,
    default_id: Mutex<StreamerId>,
    streamers: Mutex<Vec<Arc<MockStreamer>>>,
}

impl MockStreaming {
    /// Creates a subsystem that reports available and ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            ready: AtomicBool::new(true),
            default_id: Mutex::new(StreamerId::from("default-streamer")),
            streamers: Mutex::new(Vec::new()),
        }
    }

    /// Scripts whether the subsystem reports as present.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Scripts whether the subsystem reports as initialized.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Overrides the id returned by
    /// [`default_streamer_id`](StreamingService::default_streamer_id).
    pub fn set_default_streamer_id(&self, id: impl Into<StreamerId>) {
        *self.default_id.lock() = id.into();
    }

    /// Registers a streamer. Ids are listed in registration order.
    pub fn add_streamer(&self, streamer: Arc<MockStreamer>) {
        self.streamers.lock().push(streamer);
    }
}

impl Default for MockStreaming {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingService for MockStreaming {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn streamer_ids(&self) -> Vec<StreamerId> {
        self.streamers
            .lock()
            .iter()
            .map(|streamer| streamer.id().clone())
            .collect()
    }

    fn default_streamer_id(&self) -> StreamerId {
        self.default_id.lock().clone()
    }

    fn find_streamer(&self, id: &StreamerId) -> Option<Arc<dyn Streamer>> {
        self.streamers
            .lock()
            .iter()
            .find(|streamer| streamer.id() == id)
            .map(|streamer| streamer.clone() as Arc<dyn Streamer>)
    }
}

/// Scriptable [`Streamer`] that records every sink lookup.
///
/// Tests assert on [`sink_requests`](Self::sink_requests) to check
/// which lookup path the bridge took.
#[derive(Debug)]
pub struct MockStreamer {
    id: StreamerId,
    unassigned: Mutex<Option<Arc<MockPeerSink>>>,
    participants: Mutex<Vec<(ParticipantId, Arc<MockPeerSink>)>>,
    requests: Mutex<Vec<SinkRequest>>,
}

impl MockStreamer {
    /// Creates a streamer with no sinks wired up.
    #[must_use]
    pub fn new(id: impl Into<StreamerId>) -> Self {
        Self {
            id: id.into(),
            unassigned: Mutex::new(None),
            participants: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns this streamer's id.
    #[must_use]
    pub fn id(&self) -> &StreamerId {
        &self.id
    }

    /// Provides the sink returned for unassigned lookups.
    pub fn set_unassigned_sink(&self, sink: Arc<MockPeerSink>) {
        *self.unassigned.lock() = Some(sink);
    }

    /// Provides the sink returned for `participant` lookups.
    pub fn add_participant_sink(
        &self,
        participant: impl Into<ParticipantId>,
        sink: Arc<MockPeerSink>,
    ) {
        self.participants.lock().push((participant.into(), sink));
    }

    /// Returns every sink lookup made so far, in call order.
    #[must_use]
    pub fn sink_requests(&self) -> Vec<SinkRequest> {
        self.requests.lock().clone()
    }
}

impl Streamer for MockStreamer {
    fn unassigned_audio_sink(&self) -> Option<Arc<dyn PeerAudioSink>> {
        self.requests.lock().push(SinkRequest::Unassigned);
        self.unassigned
            .lock()
            .as_ref()
            .map(|sink| sink.clone() as Arc<dyn PeerAudioSink>)
    }

    fn participant_audio_sink(
        &self,
        participant: &ParticipantId,
    ) -> Option<Arc<dyn PeerAudioSink>> {
        self.requests
            .lock()
            .push(SinkRequest::Participant(participant.clone()));
        self.participants
            .lock()
            .iter()
            .find(|(id, _)| id == participant)
            .map(|(_, sink)| sink.clone() as Arc<dyn PeerAudioSink>)
    }
}

/// In-memory [`PeerAudioSink`] that tests drive by hand.
///
/// [`push_pcm`](Self::push_pcm) plays the producer's role and delivers
/// one block to every live consumer; [`close`](Self::close) plays peer
/// teardown and fires [`PcmConsumer::on_consumer_removed`].
///
/// # Example
///
/// ```
/// use voice_bridge::streaming::MockPeerSink;
///
/// let sink = MockPeerSink::new();
/// sink.push_pcm(&[0, 0, 0, 0], 48000, 2, 2);
/// assert_eq!(sink.consumer_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockPeerSink {
    consumers: Mutex<Vec<Weak<dyn PcmConsumer>>>,
    unregister_calls: AtomicUsize,
}

impl MockPeerSink {
    /// Creates a sink with no consumers attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            consumers: Mutex::new(Vec::new()),
            unregister_calls: AtomicUsize::new(0),
        }
    }

    /// Pushes one PCM block to every live consumer, as the producer's
    /// audio thread would.
    ///
    /// Consumers are snapshotted before delivery, so a consumer that
    /// deregisters mid-call still receives this block.
    pub fn push_pcm(&self, samples: &[i16], sample_rate: u32, channels: u16, frames: usize) {
        let live: Vec<Arc<dyn PcmConsumer>> = {
            let mut consumers = self.consumers.lock();
            consumers.retain(|consumer| consumer.strong_count() > 0);
            consumers.iter().filter_map(Weak::upgrade).collect()
        };
        for consumer in live {
            consumer.consume_raw_pcm(samples, sample_rate, channels, frames);
        }
    }

    /// Tears the sink down as the producer side would: every consumer
    /// gets [`PcmConsumer::on_consumer_removed`] and the consumer list
    /// is cleared.
    pub fn close(&self) {
        let consumers = std::mem::take(&mut *self.consumers.lock());
        debug!(consumers = consumers.len(), "mock sink closing");
        for consumer in consumers.iter().filter_map(Weak::upgrade) {
            consumer.on_consumer_removed();
        }
    }

    /// Returns how many consumers are currently registered.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.consumers.lock().len()
    }

    /// Returns how many times
    /// [`unregister_consumer`](PeerAudioSink::unregister_consumer) was
    /// called, whether or not it matched anything.
    #[must_use]
    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }
}

impl PeerAudioSink for MockPeerSink {
    fn register_consumer(&self, consumer: Weak<dyn PcmConsumer>) {
        let registered = consumer.upgrade();
        self.consumers.lock().push(consumer);
        debug!("mock sink registered consumer");
        if let Some(consumer) = registered {
            consumer.on_consumer_added();
        }
    }

    fn unregister_consumer(&self, consumer: &Weak<dyn PcmConsumer>) {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.consumers
            .lock()
            .retain(|existing| !existing.ptr_eq(consumer));
        debug!("mock sink unregistered consumer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every callback a sink makes into it.
    #[derive(Default)]
    struct RecordingConsumer {
        blocks: Mutex<Vec<Vec<i16>>>,
        added: AtomicUsize,
        removed: AtomicUsize,
    }

    impl PcmConsumer for RecordingConsumer {
        fn consume_raw_pcm(
            &self,
            samples: &[i16],
            _sample_rate: u32,
            _channels: u16,
            _frames: usize,
        ) {
            self.blocks.lock().push(samples.to_vec());
        }

        fn on_consumer_added(&self) {
            self.added.fetch_add(1, Ordering::SeqCst);
        }

        fn on_consumer_removed(&self) {
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn weak_consumer(consumer: &Arc<RecordingConsumer>) -> Weak<dyn PcmConsumer> {
        let weak: Weak<RecordingConsumer> = Arc::downgrade(consumer);
        weak
    }

    #[test]
    fn test_register_notifies_and_delivers() {
        let sink = MockPeerSink::new();
        let consumer = Arc::new(RecordingConsumer::default());

        sink.register_consumer(weak_consumer(&consumer));
        assert_eq!(consumer.added.load(Ordering::SeqCst), 1);
        assert_eq!(sink.consumer_count(), 1);

        sink.push_pcm(&[1, -2, 3, -4], 48000, 2, 2);
        let blocks = consumer.blocks.lock();
        assert_eq!(blocks.as_slice(), &[vec![1, -2, 3, -4]]);
    }

    #[test]
    fn test_unregister_matches_by_identity_without_callback() {
        let sink = MockPeerSink::new();
        let first = Arc::new(RecordingConsumer::default());
        let second = Arc::new(RecordingConsumer::default());

        sink.register_consumer(weak_consumer(&first));
        sink.register_consumer(weak_consumer(&second));

        sink.unregister_consumer(&weak_consumer(&first));

        assert_eq!(sink.consumer_count(), 1);
        assert_eq!(sink.unregister_calls(), 1);
        // Consumer-initiated removal must not fire the removal callback.
        assert_eq!(first.removed.load(Ordering::SeqCst), 0);

        sink.push_pcm(&[7], 48000, 1, 1);
        assert!(first.blocks.lock().is_empty());
        assert_eq!(second.blocks.lock().len(), 1);
    }

    #[test]
    fn test_close_fires_removal_and_clears() {
        let sink = MockPeerSink::new();
        let consumer = Arc::new(RecordingConsumer::default());
        sink.register_consumer(weak_consumer(&consumer));

        sink.close();

        assert_eq!(consumer.removed.load(Ordering::SeqCst), 1);
        assert_eq!(sink.consumer_count(), 0);
    }

    #[test]
    fn test_dropped_consumer_is_pruned_on_push() {
        let sink = MockPeerSink::new();
        let consumer = Arc::new(RecordingConsumer::default());
        sink.register_consumer(weak_consumer(&consumer));
        drop(consumer);

        sink.push_pcm(&[0], 48000, 1, 1);
        assert_eq!(sink.consumer_count(), 0);
    }

    #[test]
    fn test_streamer_records_lookup_order() {
        let streamer = MockStreamer::new("alpha");
        streamer.set_unassigned_sink(Arc::new(MockPeerSink::new()));

        assert!(streamer.unassigned_audio_sink().is_some());
        assert!(streamer
            .participant_audio_sink(&ParticipantId::from("peer-1"))
            .is_none());

        assert_eq!(
            streamer.sink_requests(),
            vec![
                SinkRequest::Unassigned,
                SinkRequest::Participant(ParticipantId::from("peer-1")),
            ]
        );
    }

    #[test]
    fn test_streaming_lookup_and_toggles() {
        let streaming = MockStreaming::new();
        streaming.add_streamer(Arc::new(MockStreamer::new("alpha")));
        streaming.add_streamer(Arc::new(MockStreamer::new("beta")));

        let ids = streaming.streamer_ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "alpha");

        assert!(streaming.find_streamer(&StreamerId::from("beta")).is_some());
        assert!(streaming.find_streamer(&StreamerId::from("gamma")).is_none());

        streaming.set_available(false);
        assert!(!streaming.is_available());
        streaming.set_ready(false);
        assert!(!streaming.is_ready());
    }
}
