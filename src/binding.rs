//! Streamer/participant selection and the resolved binding.

use std::fmt;

use crate::ids::{ParticipantId, StreamerId};

/// Specifies which streamer to attach to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamerSelector {
    /// Use the first streamer the subsystem currently knows about, falling
    /// back to the subsystem-default streamer id if none are registered.
    #[default]
    FirstAvailable,
    /// Use a specific streamer by id.
    ById(StreamerId),
}

impl StreamerSelector {
    /// Convenience constructor for [`StreamerSelector::ById`].
    pub fn id(id: impl Into<StreamerId>) -> Self {
        Self::ById(id.into())
    }
}

impl fmt::Display for StreamerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstAvailable => write!(f, "first-available"),
            Self::ById(id) => write!(f, "{id}"),
        }
    }
}

/// Specifies which participant's audio to attach to.
///
/// The wildcard [`Unassigned`](Self::Unassigned) binds to the sink that
/// carries audio no other consumer has claimed, typically the first
/// participant whose audio starts flowing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParticipantSelector {
    /// Bind to the sink carrying unassigned participant audio.
    #[default]
    Unassigned,
    /// Bind to the sink for a specific participant.
    ById(ParticipantId),
}

impl ParticipantSelector {
    /// Convenience constructor for [`ParticipantSelector::ById`].
    pub fn id(id: impl Into<ParticipantId>) -> Self {
        Self::ById(id.into())
    }

    /// Returns `true` when this selector is the wildcard.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned)
    }
}

impl fmt::Display for ParticipantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "unassigned"),
            Self::ById(id) => write!(f, "{id}"),
        }
    }
}

/// The (streamer, participant) pair the bridge last attached to.
///
/// Set once a start attempt has resolved a live sink, and deliberately
/// retained after stop so callers can observe the last-known binding
/// for diagnostics.
#[derive(Debug, Clone, Default)]
pub(crate) struct Binding {
    pub(crate) streamer_id: Option<StreamerId>,
    pub(crate) participant: Option<ParticipantSelector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_defaults() {
        assert_eq!(StreamerSelector::default(), StreamerSelector::FirstAvailable);
        assert_eq!(
            ParticipantSelector::default(),
            ParticipantSelector::Unassigned
        );
    }

    #[test]
    fn test_participant_selector_wildcard() {
        assert!(ParticipantSelector::Unassigned.is_unassigned());
        assert!(!ParticipantSelector::id("player-1").is_unassigned());
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(ParticipantSelector::Unassigned.to_string(), "unassigned");
        assert_eq!(ParticipantSelector::id("p7").to_string(), "p7");
        assert_eq!(
            StreamerSelector::FirstAvailable.to_string(),
            "first-available"
        );
        assert_eq!(StreamerSelector::id("main").to_string(), "main");
    }

    #[test]
    fn test_binding_default_is_empty() {
        let binding = Binding::default();
        assert!(binding.streamer_id.is_none());
        assert!(binding.participant.is_none());
    }
}
