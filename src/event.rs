//! Runtime events for observing bridge lifecycle and format changes.
//!
//! Events are informational, not errors; the bridge keeps running after
//! any of them. Register a callback via
//! [`VoiceBridgeBuilder::on_event`](crate::VoiceBridgeBuilder::on_event)
//! to log them or drive UI state.

use std::fmt;
use std::sync::Arc;

use crate::format::StreamFormat;
use crate::ids::StreamerId;

/// Why the bridge detached from its audio sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachReason {
    /// `stop()` was called on the bridge.
    Requested,
    /// The producer removed this consumer while tearing down or
    /// reassigning the sink.
    SinkRemoved,
}

impl fmt::Display for DetachReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "requested"),
            Self::SinkRemoved => write!(f, "sink removed"),
        }
    }
}

/// Events emitted while the bridge is attached to a streaming sink.
///
/// # Example
///
/// ```
/// use voice_bridge::BridgeEvent;
///
/// fn handle_event(event: BridgeEvent) {
///     match event {
///         BridgeEvent::Attached { streamer_id } => {
///             println!("attached to {streamer_id}");
///         }
///         BridgeEvent::Detached { reason } => {
///             println!("detached: {reason}");
///         }
///         BridgeEvent::FormatChanged { previous, current } => {
///             println!("format changed: {previous} -> {current}");
///         }
///         BridgeEvent::ConsumerAdded => {}
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// The bridge attached to a sink and began generating.
    Attached {
        /// Streamer whose sink the bridge attached to.
        streamer_id: StreamerId,
    },

    /// The bridge released its sink and stopped generating.
    ///
    /// Emitted only when the bridge was actually attached; a redundant
    /// `stop()` emits nothing.
    Detached {
        /// What triggered the detach.
        reason: DetachReason,
    },

    /// The producer changed the pushed PCM format between two blocks.
    ///
    /// The downstream sink has already been re-initialized with the new
    /// format when this fires.
    FormatChanged {
        /// Format the stream carried before this block.
        previous: StreamFormat,
        /// Format of this block onward.
        current: StreamFormat,
    },

    /// The producer acknowledged this bridge as a consumer.
    ConsumerAdded,
}

/// Callback type for receiving [`BridgeEvent`]s.
///
/// Callbacks run synchronously on whatever thread emits the event,
/// including the producer's audio thread for
/// [`FormatChanged`](BridgeEvent::FormatChanged), so they must be
/// realtime-safe: no blocking, no heavy work.
pub type EventCallback = Arc<dyn Fn(BridgeEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use voice_bridge::{event_callback, BridgeEvent};
///
/// let callback = event_callback(|event| {
///     tracing::debug!(?event, "bridge event");
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(BridgeEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_debug_format() {
        let event = BridgeEvent::FormatChanged {
            previous: StreamFormat::new(48000, 2),
            current: StreamFormat::new(24000, 1),
        };
        let debug = format!("{event:?}");
        assert!(debug.contains("FormatChanged"));
        assert!(debug.contains("24000"));
    }

    #[test]
    fn test_detach_reason_display() {
        assert_eq!(DetachReason::Requested.to_string(), "requested");
        assert_eq!(DetachReason::SinkRemoved.to_string(), "sink removed");
    }

    #[test]
    fn test_event_callback_helper() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let callback = event_callback(move |_| {
            called_clone.store(true, Ordering::SeqCst);
        });

        callback(BridgeEvent::ConsumerAdded);
        assert!(called.load(Ordering::SeqCst));
    }
}
