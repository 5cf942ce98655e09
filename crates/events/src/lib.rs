#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in devboot
//!
//! All output of the installation layer goes through events: library crates
//! never print or write log files themselves. The CLI (or any other front end)
//! owns the receiving end of the channel and decides how to persist and
//! display what it receives.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: `AppEvent` groups events by functional domain
//! - **Unified `EventEmitter` trait**: one API for all emissions, whether the
//!   caller holds a raw `EventSender` or a struct that contains one
//! - **`LogSink`**: the narrow `write(channel, text, significant, severity)`
//!   interface managers use for subprocess output and lifecycle messages

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, FailureContext, GeneralEvent, LogEvent, LogSeverity, PackageEvent,
    PackageOperation, PlatformEvent, PlatformOperationContext, PlatformOperationKind,
    PlatformOperationMetrics, ProcessCommandDescriptor,
};

use tokio::sync::mpsc::UnboundedSender;

/// An event together with its emission metadata
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from the event itself.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }
}

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout devboot
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        self.emit_with_meta(meta, event);
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Destination for channel-scoped log lines.
///
/// Called once per received output chunk and once per lifecycle message. No
/// persistence or formatting is implied; that is up to whoever drains the
/// events.
pub trait LogSink {
    fn write(&self, channel: &str, text: &str, significant: bool, severity: LogSeverity);
}

impl<T: EventEmitter + ?Sized> LogSink for T {
    fn write(&self, channel: &str, text: &str, significant: bool, severity: LogSeverity) {
        self.emit(AppEvent::Log(LogEvent::new(
            channel,
            text,
            significant,
            severity,
        )));
    }
}
