//! Volume and mute control for generated audio.
//!
//! Gain settings are plain atomics: any thread may adjust them while the
//! producer is mid-block, and the new values take effect on the next
//! pushed block. No lock is shared with the audio path.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Volume and mute control over a bridge's generated audio.
///
/// All methods are safe to call from any thread, including concurrently
/// with the producer pushing audio. A setting applies from the next
/// block onward; the block currently being converted keeps the values it
/// read at its start.
///
/// # Example
///
/// ```
/// use voice_bridge::AudioControl;
///
/// fn halve_volume(control: &dyn AudioControl) {
///     control.set_volume(control.volume() * 0.5);
/// }
/// ```
pub trait AudioControl: Send + Sync {
    /// Returns the current volume multiplier.
    fn volume(&self) -> f32;

    /// Sets the volume multiplier applied to every sample.
    ///
    /// The value is stored verbatim: nothing clamps it to `0.0..=1.0`,
    /// so amplification (`> 1.0`) and inversion (`< 0.0`) are possible.
    fn set_volume(&self, volume: f32);

    /// Returns whether generated audio is muted.
    fn is_muted(&self) -> bool;

    /// Mutes or unmutes generated audio.
    ///
    /// While muted, pushed blocks are dropped before conversion; the
    /// downstream sink sees no audio at all rather than zeroed samples.
    fn set_muted(&self, muted: bool);
}

/// Lock-free gain settings shared between control threads and the
/// producer's audio thread.
///
/// The volume multiplier is stored as `f32` bits in an [`AtomicU32`];
/// all accesses are `SeqCst`.
#[derive(Debug)]
pub(crate) struct GainState {
    muted: AtomicBool,
    volume: AtomicU32,
}

impl GainState {
    const DEFAULT_VOLUME: f32 = 1.0;

    pub(crate) fn new() -> Self {
        Self {
            muted: AtomicBool::new(false),
            volume: AtomicU32::new(Self::DEFAULT_VOLUME.to_bits()),
        }
    }

    pub(crate) fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::SeqCst))
    }

    pub(crate) fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::SeqCst);
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub(crate) fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    /// Restores unmuted playback at unity volume.
    pub(crate) fn reset(&self) {
        self.set_volume(Self::DEFAULT_VOLUME);
        self.set_muted(false);
    }
}

impl Default for GainState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_unity_unmuted() {
        let gain = GainState::new();
        assert_eq!(gain.volume(), 1.0);
        assert!(!gain.is_muted());
    }

    #[test]
    fn test_volume_round_trips_through_bits() {
        let gain = GainState::new();
        gain.set_volume(0.25);
        assert_eq!(gain.volume(), 0.25);
    }

    #[test]
    fn test_out_of_range_volume_stored_verbatim() {
        let gain = GainState::new();

        gain.set_volume(2.5);
        assert_eq!(gain.volume(), 2.5);

        gain.set_volume(-1.0);
        assert_eq!(gain.volume(), -1.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let gain = GainState::new();
        gain.set_volume(0.1);
        gain.set_muted(true);

        gain.reset();

        assert_eq!(gain.volume(), 1.0);
        assert!(!gain.is_muted());
    }
}
