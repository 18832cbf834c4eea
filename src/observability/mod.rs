//! Observability for the enumerator
//!
//! Structured JSON logging with typed events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on enumeration
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use planenum::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::MemoBuilt, &[("nodes", "7")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
