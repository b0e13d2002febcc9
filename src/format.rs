//! Stream format description and PCM sample conversion.
//!
//! The producer pushes interleaved signed 16-bit PCM; the voice pipeline
//! consumes interleaved `f32` in `[-1.0, 1.0]`. Conversion divides by
//! 32768, so `i16::MIN` maps to exactly -1.0 and `i16::MAX` to slightly
//! under 1.0 (32767/32768).

use std::fmt;

/// Scale divisor for 16-bit PCM to float conversion.
const PCM16_SCALE: f32 = 32768.0;

/// Sample rate and channel count of an audio stream.
///
/// Describes both the format the producer is currently pushing and the
/// format the downstream sink was last initialized with. The producer may
/// change format between any two blocks; the bridge re-initializes its
/// downstream sink whenever the incoming format differs from this.
///
/// # Example
///
/// ```
/// use voice_bridge::StreamFormat;
///
/// let format = StreamFormat::new(48000, 2);
/// assert_eq!(format.sample_rate, 48000);
/// assert_eq!(format.channels, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Sample rate in Hz (e.g. 16000, 24000, 48000).
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo).
    pub channels: u16,
}

impl StreamFormat {
    /// Creates a new stream format.
    #[must_use]
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Returns the number of samples that make up one frame.
    ///
    /// A frame holds one sample per channel at a single time instant.
    #[must_use]
    pub fn samples_per_frame(&self) -> usize {
        usize::from(self.channels)
    }

    /// Returns the total sample count for a block of `frames` frames,
    /// or `None` when that count does not fit in `usize`.
    ///
    /// Producers declare frame counts independently of the slices they
    /// hand over, so an absurd value must compare as a mismatch rather
    /// than overflow.
    #[must_use]
    pub fn samples_for_frames(&self, frames: usize) -> Option<usize> {
        usize::from(self.channels).checked_mul(frames)
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz/{}ch", self.sample_rate, self.channels)
    }
}

/// Converts a single i16 PCM sample to f32.
///
/// Output is in `[-1.0, 1.0]`. The divisor is 32768, so the positive
/// extreme 32767 maps to just under 1.0 while -32768 maps to -1.0 exactly.
#[inline]
#[must_use]
pub fn pcm16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / PCM16_SCALE
}

/// Converts a block of i16 PCM samples into a reusable f32 buffer.
///
/// The destination is truncated and refilled so its length equals the
/// source length exactly; its capacity is retained across calls, so a
/// buffer reused block-after-block stops allocating once it has seen the
/// largest block size. Sample order and channel interleaving are
/// preserved.
pub fn pcm16_to_f32_buf(src: &[i16], dst: &mut Vec<f32>) {
    dst.clear();
    dst.extend(src.iter().map(|&s| pcm16_to_f32(s)));
}

/// Multiplies every sample in place by `gain`.
///
/// No range validation: negative gains and gains above 1.0 are applied
/// verbatim.
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for sample in samples {
        *sample *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm16_to_f32_zero() {
        assert_eq!(pcm16_to_f32(0), 0.0);
    }

    #[test]
    fn test_pcm16_to_f32_negative_extreme_exact() {
        // -32768 / 32768 is exactly representable
        assert_eq!(pcm16_to_f32(i16::MIN), -1.0);
    }

    #[test]
    fn test_pcm16_to_f32_positive_extreme_below_one() {
        let max = pcm16_to_f32(i16::MAX);
        assert!(max < 1.0);
        assert!((max - 0.999_969_5).abs() < 1e-6);
    }

    #[test]
    fn test_pcm16_to_f32_buf_preserves_order() {
        let src = vec![0i16, 16384, -16384, 32767];
        let mut dst = Vec::new();
        pcm16_to_f32_buf(&src, &mut dst);

        assert_eq!(dst.len(), 4);
        assert_eq!(dst[0], 0.0);
        assert_eq!(dst[1], 0.5);
        assert_eq!(dst[2], -0.5);
        assert!((dst[3] - 32767.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_pcm16_to_f32_buf_retains_capacity() {
        let mut dst = Vec::new();
        pcm16_to_f32_buf(&vec![0i16; 1024], &mut dst);
        let capacity = dst.capacity();
        assert!(capacity >= 1024);

        // A smaller block shrinks the length but not the capacity
        pcm16_to_f32_buf(&vec![0i16; 16], &mut dst);
        assert_eq!(dst.len(), 16);
        assert_eq!(dst.capacity(), capacity);
    }

    #[test]
    fn test_apply_gain_half() {
        let mut samples = vec![1.0f32, -1.0, 0.5];
        apply_gain(&mut samples, 0.5);
        assert_eq!(samples, vec![0.5, -0.5, 0.25]);
    }

    #[test]
    fn test_apply_gain_verbatim_out_of_range() {
        // Negative and > 1.0 multipliers are not clamped
        let mut samples = vec![0.5f32];
        apply_gain(&mut samples, -2.0);
        assert_eq!(samples, vec![-1.0]);
    }

    #[test]
    fn test_stream_format_display() {
        let format = StreamFormat::new(48000, 2);
        assert_eq!(format.to_string(), "48000Hz/2ch");
    }

    #[test]
    fn test_stream_format_samples_for_frames() {
        let format = StreamFormat::new(24000, 2);
        assert_eq!(format.samples_for_frames(480), Some(960));
        assert_eq!(StreamFormat::new(16000, 1).samples_for_frames(480), Some(480));
    }

    #[test]
    fn test_samples_for_frames_rejects_overflowing_count() {
        let format = StreamFormat::new(48000, 2);
        assert_eq!(format.samples_for_frames(usize::MAX / 2 + 1), None);
    }
}
