//! Bounded-channel sink for async consumers.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};

use crate::block::VoiceBlock;
use crate::format::StreamFormat;
use crate::sink::VoiceSink;

/// A [`VoiceSink`] that forwards each block over a bounded
/// [`tokio::sync::mpsc`] channel.
///
/// Writes never block: when the channel is full or the receiver is
/// gone, the block is dropped and counted. This keeps the producer's
/// audio thread independent of how fast the async side drains.
///
/// # Example
///
/// ```
/// use voice_bridge::{ChannelSink, StreamFormat, VoiceSink};
///
/// let (sink, mut rx) = ChannelSink::new(16);
/// sink.init(StreamFormat::new(48000, 2));
/// sink.write(&[0.0, 0.5, -0.5, 1.0]);
///
/// let block = rx.try_recv().unwrap();
/// assert_eq!(block.frame_count(), 2);
/// ```
#[derive(Debug)]
pub struct ChannelSink {
    sender: mpsc::Sender<VoiceBlock>,
    format: Mutex<Option<StreamFormat>>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Creates a sink and the receiving half of its channel.
    ///
    /// `capacity` bounds how many blocks may sit unread before further
    /// writes are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<VoiceBlock>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let sink = Self {
            sender,
            format: Mutex::new(None),
            dropped: AtomicU64::new(0),
        };
        (sink, receiver)
    }

    /// Returns how many blocks were dropped because the channel was
    /// full, closed, or the sink was written before initialization.
    #[must_use]
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl VoiceSink for ChannelSink {
    fn name(&self) -> &str {
        "channel"
    }

    fn init(&self, format: StreamFormat) {
        debug!(%format, "channel sink initialized");
        *self.format.lock() = Some(format);
    }

    fn write(&self, samples: &[f32]) {
        let Some(format) = *self.format.lock() else {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            trace!("channel sink written before init, block dropped");
            return;
        };

        let block = VoiceBlock::new(samples.to_vec(), format);
        match self.sender.try_send(block) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::SeqCst);
                trace!("channel full, block dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::SeqCst);
                trace!("receiver closed, block dropped");
            }
        }
    }
}
