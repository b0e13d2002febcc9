//! Downstream destinations for converted voice audio.
//!
//! A [`VoiceSink`] receives the f32 samples the bridge produces. Two
//! implementations ship with the crate: [`ChannelSink`] hands blocks to
//! an async consumer over a bounded channel, [`RingSink`] feeds a
//! lock-free ring buffer for audio-thread consumers.

mod channel;
mod ring;

pub use channel::ChannelSink;
pub use ring::RingSink;

use crate::format::StreamFormat;

/// Destination for the f32 audio a bridge generates.
///
/// The bridge calls [`init`](Self::init) with the stream format before
/// the first [`write`](Self::write), and again whenever the producer
/// changes format mid-stream. Writes happen synchronously on the
/// producer's audio thread while the bridge holds its pipeline lock,
/// which puts two obligations on implementations:
///
/// - stay realtime-conscious: no unbounded blocking, no per-write
///   allocation beyond what the destination itself requires;
/// - never call back into the bridge; the pipeline lock is held.
///
/// Delivery is fire-and-forget. A sink that cannot accept samples
/// (full buffer, closed receiver) drops them and accounts for the loss
/// itself rather than reporting an error upstream.
pub trait VoiceSink: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Describes the stream about to be written.
    ///
    /// Called before the first write and on every mid-stream format
    /// change. Samples written after this call are in `format`.
    fn init(&self, format: StreamFormat);

    /// Writes one block of interleaved f32 samples in the format from
    /// the most recent [`init`](Self::init).
    fn write(&self, samples: &[f32]);
}
