//! Processed audio block with format metadata.

use std::sync::Arc;
use std::time::Duration;

use crate::format::StreamFormat;

/// One processed block of float samples with its stream format.
///
/// `VoiceBlock` is what sinks that hand audio to another thread (such as
/// [`ChannelSink`](crate::sink::ChannelSink)) produce per forwarded block.
/// Samples are interleaved `f32` in `[-1.0, 1.0]` (gain already applied)
/// and are wrapped in `Arc` so cloning a block never copies audio data.
///
/// # Example
///
/// ```
/// use voice_bridge::{StreamFormat, VoiceBlock};
/// use std::time::Duration;
///
/// let block = VoiceBlock::new(vec![0.0; 960], StreamFormat::new(48000, 2));
/// assert_eq!(block.frame_count(), 480);
/// assert_eq!(block.duration(), Duration::from_millis(10));
///
/// let shared = block.clone(); // cheap, shares the sample data
/// assert_eq!(shared.samples.len(), 960);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceBlock {
    /// Interleaved float samples, gain already applied.
    pub samples: Arc<Vec<f32>>,

    /// Format the samples were produced in.
    pub format: StreamFormat,
}

impl VoiceBlock {
    /// Creates a new block from a sample vector.
    pub fn new(samples: Vec<f32>, format: StreamFormat) -> Self {
        Self {
            samples: Arc::new(samples),
            format,
        }
    }

    /// Returns the number of frames in this block.
    ///
    /// A frame contains one sample per channel.
    pub fn frame_count(&self) -> usize {
        if self.format.channels == 0 {
            return 0;
        }
        self.samples.len() / self.format.samples_per_frame()
    }

    /// Returns the playback duration of this block.
    pub fn duration(&self) -> Duration {
        if self.format.sample_rate == 0 || self.format.channels == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / f64::from(self.format.sample_rate))
    }

    /// Returns `true` if this block contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_stereo() {
        let block = VoiceBlock::new(vec![0.0; 960], StreamFormat::new(48000, 2));
        assert_eq!(block.frame_count(), 480);
    }

    #[test]
    fn test_duration_mono_16khz() {
        let block = VoiceBlock::new(vec![0.0; 1600], StreamFormat::new(16000, 1));
        assert_eq!(block.duration(), Duration::from_millis(100));
    }

    #[test]
    fn test_empty_block() {
        let block = VoiceBlock::new(vec![], StreamFormat::new(48000, 2));
        assert!(block.is_empty());
        assert_eq!(block.frame_count(), 0);
        assert_eq!(block.duration(), Duration::ZERO);
    }

    #[test]
    fn test_degenerate_format() {
        let block = VoiceBlock::new(vec![0.0; 100], StreamFormat::new(0, 0));
        assert_eq!(block.frame_count(), 0);
        assert_eq!(block.duration(), Duration::ZERO);
    }

    #[test]
    fn test_clone_shares_samples() {
        let block = VoiceBlock::new(vec![0.25; 32], StreamFormat::new(48000, 1));
        let clone = block.clone();
        assert!(Arc::ptr_eq(&block.samples, &clone.samples));
    }
}
