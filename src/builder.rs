//! Builder for assembling a [`VoiceBridge`].

use std::sync::Arc;

use tracing::debug;

use crate::bridge::VoiceBridge;
use crate::config::VoiceConfig;
use crate::error::BuildError;
use crate::event::EventCallback;
use crate::sink::VoiceSink;
use crate::streaming::StreamingService;

/// Assembles a [`VoiceBridge`] from its three collaborators and an
/// optional event callback.
///
/// The streaming service, voice configuration, and downstream sink are
/// all required; [`build`](Self::build) reports the first missing one.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use voice_bridge::streaming::MockStreaming;
/// use voice_bridge::{event_callback, ChannelSink, StaticVoiceConfig, StreamFormat, VoiceBridge};
///
/// let (sink, _rx) = ChannelSink::new(8);
/// let bridge = VoiceBridge::builder()
///     .streaming(Arc::new(MockStreaming::new()))
///     .voice_config(Arc::new(StaticVoiceConfig::new(StreamFormat::new(48000, 2))))
///     .sink(Arc::new(sink))
///     .on_event(event_callback(|event| tracing::debug!(?event, "bridge event")))
///     .build()?;
/// # Ok::<(), voice_bridge::BuildError>(())
/// ```
#[must_use = "the builder does nothing until build() is called"]
#[derive(Default)]
pub struct VoiceBridgeBuilder {
    streaming: Option<Arc<dyn StreamingService>>,
    voice_config: Option<Arc<dyn VoiceConfig>>,
    sink: Option<Arc<dyn VoiceSink>>,
    events: Option<EventCallback>,
}

impl VoiceBridgeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the streaming subsystem the bridge attaches through.
    pub fn streaming(mut self, streaming: Arc<dyn StreamingService>) -> Self {
        self.streaming = Some(streaming);
        self
    }

    /// Sets where the bridge reads the voice capture format from.
    pub fn voice_config(mut self, voice_config: Arc<dyn VoiceConfig>) -> Self {
        self.voice_config = Some(voice_config);
        self
    }

    /// Sets the downstream sink that receives converted audio.
    pub fn sink(mut self, sink: Arc<dyn VoiceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Registers a callback for [`BridgeEvent`](crate::BridgeEvent)s.
    ///
    /// Use [`event_callback`](crate::event_callback) to wrap a closure.
    pub fn on_event(mut self, callback: EventCallback) -> Self {
        self.events = Some(callback);
        self
    }

    /// Builds the bridge.
    ///
    /// The bridge comes back in an [`Arc`]: peer sinks track consumers
    /// by weak reference, and the bridge hands out a weak self-handle
    /// when it registers.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the first missing collaborator.
    pub fn build(self) -> Result<Arc<VoiceBridge>, BuildError> {
        let streaming = self.streaming.ok_or(BuildError::MissingStreamingService)?;
        let voice_config = self.voice_config.ok_or(BuildError::MissingVoiceConfig)?;
        let sink = self.sink.ok_or(BuildError::MissingSink)?;
        debug!(sink = sink.name(), "voice bridge built");

        Ok(Arc::new_cyclic(|self_weak| {
            VoiceBridge::from_parts(streaming, voice_config, sink, self.events, self_weak.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticVoiceConfig;
    use crate::format::StreamFormat;
    use crate::sink::ChannelSink;
    use crate::streaming::MockStreaming;

    fn config() -> Arc<StaticVoiceConfig> {
        Arc::new(StaticVoiceConfig::new(StreamFormat::new(48000, 2)))
    }

    #[test]
    fn test_build_requires_streaming() {
        let (sink, _rx) = ChannelSink::new(1);
        let err = VoiceBridge::builder()
            .voice_config(config())
            .sink(Arc::new(sink))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingStreamingService));
    }

    #[test]
    fn test_build_requires_voice_config() {
        let (sink, _rx) = ChannelSink::new(1);
        let err = VoiceBridge::builder()
            .streaming(Arc::new(MockStreaming::new()))
            .sink(Arc::new(sink))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingVoiceConfig));
    }

    #[test]
    fn test_build_requires_sink() {
        let err = VoiceBridge::builder()
            .streaming(Arc::new(MockStreaming::new()))
            .voice_config(config())
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingSink));
    }

    #[test]
    fn test_build_with_all_parts() {
        let (sink, _rx) = ChannelSink::new(1);
        let bridge = VoiceBridge::builder()
            .streaming(Arc::new(MockStreaming::new()))
            .voice_config(config())
            .sink(Arc::new(sink))
            .build()
            .unwrap();

        assert!(!bridge.is_generating());
        assert_eq!(bridge.stats(), crate::BridgeStats::default());
    }
}
