//! Voice subsystem configuration access.
//!
//! The bridge describes generated audio to its downstream sink using the
//! voice subsystem's configured capture format, not the per-block format
//! pushed by the producer. [`VoiceConfig`] abstracts where that format
//! comes from; [`StaticVoiceConfig`] is the fixed-value implementation
//! used in tests and simple deployments.

use crate::format::StreamFormat;

/// Access to the voice subsystem's configured capture format.
///
/// Queried once per [`start`](crate::VoiceBridge::start): the format is
/// handed to the downstream sink as the initial stream description.
/// Returning `None` fails the start with
/// [`StartError::FormatUnavailable`](crate::StartError::FormatUnavailable).
pub trait VoiceConfig: Send + Sync {
    /// Returns the configured capture format, or `None` when the voice
    /// subsystem has not been configured yet.
    fn capture_format(&self) -> Option<StreamFormat>;
}

/// A [`VoiceConfig`] that always reports one fixed format.
///
/// # Example
///
/// ```
/// use voice_bridge::{StaticVoiceConfig, StreamFormat, VoiceConfig};
///
/// let config = StaticVoiceConfig::new(StreamFormat::new(48000, 2));
/// assert_eq!(config.capture_format(), Some(StreamFormat::new(48000, 2)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StaticVoiceConfig {
    format: StreamFormat,
}

impl StaticVoiceConfig {
    /// Creates a configuration that reports `format` unconditionally.
    #[must_use]
    pub fn new(format: StreamFormat) -> Self {
        Self { format }
    }
}

impl VoiceConfig for StaticVoiceConfig {
    fn capture_format(&self) -> Option<StreamFormat> {
        Some(self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_config_reports_format() {
        let config = StaticVoiceConfig::new(StreamFormat::new(24000, 1));
        assert_eq!(config.capture_format(), Some(StreamFormat::new(24000, 1)));
    }

    #[test]
    fn test_static_config_is_copy() {
        let config = StaticVoiceConfig::new(StreamFormat::new(48000, 2));
        let copy = config;
        assert_eq!(copy.capture_format(), config.capture_format());
    }
}
