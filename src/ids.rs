//! Identifier types for streamers and remote participants.

use std::fmt;
use std::sync::Arc;

/// Identifier for a streamer instance within the streaming subsystem.
///
/// A host process can run several streamers; each owns its own set of
/// participant audio sinks. `StreamerId` is a lightweight, cloneable
/// identifier backed by `Arc<str>`, so cloning is a pointer copy.
///
/// # Example
///
/// ```
/// use voice_bridge::StreamerId;
///
/// let main = StreamerId::new("main");
/// assert_eq!(main, StreamerId::new("main"));
/// assert_ne!(main, StreamerId::new("editor"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamerId(Arc<str>);

impl StreamerId {
    /// Creates a new streamer ID from a string.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StreamerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StreamerId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for StreamerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier for a remote participant whose audio is carried by a sink.
///
/// Same representation as [`StreamerId`]; the two are distinct types so a
/// participant id cannot be passed where a streamer id is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(Arc<str>);

impl ParticipantId {
    /// Creates a new participant ID from a string.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streamer_id_equality() {
        let a = StreamerId::new("main");
        let b = StreamerId::new("main");
        let c = StreamerId::new("other");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_streamer_id_display() {
        let id = StreamerId::new("editor-preview");
        assert_eq!(format!("{id}"), "editor-preview");
    }

    #[test]
    fn test_participant_id_from_str() {
        let id: ParticipantId = "player-1".into();
        assert_eq!(id.as_str(), "player-1");
    }

    #[test]
    fn test_participant_id_from_string() {
        let id: ParticipantId = String::from("player-2").into();
        assert_eq!(id.as_str(), "player-2");
    }

    #[test]
    fn test_ids_usable_as_map_keys() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ParticipantId::new("a"));
        set.insert(ParticipantId::new("b"));
        set.insert(ParticipantId::new("a"));

        assert_eq!(set.len(), 2);
    }
}
