//! Error types for voice-bridge.
//!
//! Errors are split by concern:
//! - [`BuildError`]: the bridge was assembled without a required collaborator
//! - [`StartError`]: an attach attempt failed, with one variant per
//!   distinguishable reason so callers can tell a normal race from a
//!   missing subsystem

use crate::binding::ParticipantSelector;
use crate::ids::StreamerId;

/// Errors raised by [`VoiceBridgeBuilder::build`](crate::VoiceBridgeBuilder::build).
///
/// Every collaborator is injected up front; a bridge with a missing
/// collaborator could never attach, so construction fails instead.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No streaming service was provided.
    #[error("no streaming service configured - call streaming() before build()")]
    MissingStreamingService,

    /// No voice configuration authority was provided.
    #[error("no voice config configured - call voice_config() before build()")]
    MissingVoiceConfig,

    /// No downstream sink was provided.
    #[error("no downstream sink configured - call sink() before build()")]
    MissingSink,
}

/// Errors raised by [`VoiceBridge::start`](crate::VoiceBridge::start) and
/// [`start_with`](crate::VoiceBridge::start_with).
///
/// Transient variants ([`is_transient`](Self::is_transient)) describe
/// expected unavailability: the caller is free to retry once the
/// subsystem or participant audio comes up. The remaining variants point
/// at a missing or misconfigured collaborator. All failures leave the
/// bridge inert and safely re-startable.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// The streaming service is not loaded at all.
    ///
    /// Expected on headless hosts (e.g. dedicated servers) where the
    /// streaming subsystem never starts.
    #[error("streaming service not loaded")]
    ServiceUnavailable,

    /// The streaming service is loaded but not yet ready to serve sinks.
    #[error("streaming service not ready")]
    ServiceNotReady,

    /// No streamer is registered under the requested id.
    #[error("no streamer registered for id: {id}")]
    StreamerNotFound {
        /// The id that could not be resolved.
        id: StreamerId,
    },

    /// The streamer has no audio sink for the requested participant yet.
    ///
    /// A normal race: participant audio may simply not be flowing yet.
    #[error("no audio sink available for participant: {selector}")]
    NoAudioSink {
        /// Which participant's sink was requested.
        selector: ParticipantSelector,
    },

    /// The voice configuration authority could not supply a capture format.
    ///
    /// Unlike the transient variants this indicates a required subsystem
    /// is missing. The consumer registration made earlier in the attempt
    /// is left in place; arriving blocks are dropped until a later
    /// `start` succeeds.
    #[error("voice capture format unavailable (voice subsystem not initialized)")]
    FormatUnavailable,
}

impl StartError {
    /// Returns `true` for expected-unavailability failures worth retrying.
    ///
    /// `ServiceUnavailable`, `ServiceNotReady` and `NoAudioSink` resolve
    /// themselves once the subsystem or the participant's audio comes up;
    /// `StreamerNotFound` and `FormatUnavailable` point at configuration
    /// problems that retrying alone will not fix.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable | Self::ServiceNotReady | Self::NoAudioSink { .. }
        )
    }
}
