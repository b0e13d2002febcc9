//! Lock-free ring buffer sink for audio-thread consumers.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, trace};

use crate::format::StreamFormat;
use crate::sink::VoiceSink;

/// A [`VoiceSink`] that writes samples into a heap-allocated SPSC ring
/// buffer.
///
/// The consuming half is handed out at construction, typically to an
/// audio callback that drains samples at its own cadence. When the ring
/// is full, the samples that do not fit are dropped and counted; older
/// audio already buffered is never overwritten.
///
/// # Example
///
/// ```
/// use ringbuf::traits::Consumer;
/// use voice_bridge::{RingSink, StreamFormat, VoiceSink};
///
/// let (sink, mut consumer) = RingSink::with_capacity(1024);
/// sink.init(StreamFormat::new(48000, 2));
/// sink.write(&[0.1, -0.1, 0.2, -0.2]);
///
/// let mut out = [0.0f32; 4];
/// assert_eq!(consumer.pop_slice(&mut out), 4);
/// ```
pub struct RingSink {
    producer: Mutex<HeapProd<f32>>,
    format: Mutex<Option<StreamFormat>>,
    dropped_samples: AtomicU64,
}

impl std::fmt::Debug for RingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingSink")
            .field("format", &self.format())
            .field("dropped_samples", &self.dropped_samples())
            .finish_non_exhaustive()
    }
}

impl RingSink {
    /// Creates a sink over a ring holding up to `capacity` samples,
    /// returning the consuming half alongside it.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, HeapCons<f32>) {
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();
        let sink = Self {
            producer: Mutex::new(producer),
            format: Mutex::new(None),
            dropped_samples: AtomicU64::new(0),
        };
        (sink, consumer)
    }

    /// Returns the format from the most recent
    /// [`init`](VoiceSink::init), if any.
    ///
    /// Ring consumers poll this to learn what the buffered samples
    /// mean; the ring itself carries no framing.
    #[must_use]
    pub fn format(&self) -> Option<StreamFormat> {
        *self.format.lock()
    }

    /// Returns how many samples were dropped because the ring was full.
    #[must_use]
    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples.load(Ordering::SeqCst)
    }
}

impl VoiceSink for RingSink {
    fn name(&self) -> &str {
        "ring"
    }

    fn init(&self, format: StreamFormat) {
        debug!(%format, "ring sink initialized");
        *self.format.lock() = Some(format);
    }

    fn write(&self, samples: &[f32]) {
        let written = self.producer.lock().push_slice(samples);
        let dropped = samples.len() - written;
        if dropped > 0 {
            self.dropped_samples.fetch_add(dropped as u64, Ordering::SeqCst);
            trace!(dropped, "ring full, samples dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::{Consumer, Observer};

    #[test]
    fn test_write_reaches_consumer_in_order() {
        let (sink, mut consumer) = RingSink::with_capacity(8);
        sink.init(StreamFormat::new(48000, 1));
        sink.write(&[0.1, 0.2, 0.3]);

        let mut out = [0.0f32; 3];
        assert_eq!(consumer.pop_slice(&mut out), 3);
        assert_eq!(out, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_overflow_drops_newest_samples() {
        let (sink, consumer) = RingSink::with_capacity(4);
        sink.init(StreamFormat::new(48000, 1));
        sink.write(&[1.0, 2.0, 3.0]);
        sink.write(&[4.0, 5.0, 6.0]);

        assert_eq!(consumer.occupied_len(), 4);
        assert_eq!(sink.dropped_samples(), 2);
    }

    #[test]
    fn test_format_tracks_reinit() {
        let (sink, _consumer) = RingSink::with_capacity(4);
        assert_eq!(sink.format(), None);

        sink.init(StreamFormat::new(48000, 2));
        sink.init(StreamFormat::new(24000, 1));
        assert_eq!(sink.format(), Some(StreamFormat::new(24000, 1)));
    }
}
