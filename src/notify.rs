//! Debounced status notifications.
//!
//! Each tick the notifier may emit a keep-alive (at most once per
//! `KEEP_ALIVE_INTERVAL`) followed by one status message per active class
//! whose debounce window has elapsed. Classes that are not active emit
//! nothing; there is no "absence" message.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::classify::Detections;
use crate::color::{ColorClass, KEEP_ALIVE_INTERVAL};

pub const KEEP_ALIVE_PAYLOAD: &str = "KeepAlive";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    KeepAlive,
    Status(ColorClass),
}

impl OutboundMessage {
    /// UTF-8 payload as published on the wire.
    pub fn payload(&self) -> String {
        match self {
            OutboundMessage::KeepAlive => KEEP_ALIVE_PAYLOAD.to_string(),
            OutboundMessage::Status(class) => class.spec().status_code.to_string(),
        }
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::KeepAlive => f.write_str("keep-alive"),
            OutboundMessage::Status(class) => write!(f, "status {} ({})", class, self.payload()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyPhase {
    Idle,
    RecentlyNotified,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ClassTimer {
    last_sent_at: Option<Instant>,
}

impl ClassTimer {
    fn is_due(&self, now: Instant, debounce: Duration) -> bool {
        match self.last_sent_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= debounce,
        }
    }
}

/// Timers owned by the notifier for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifierState {
    keep_alive_last_sent_at: Instant,
    keep_alive_interval: Duration,
    classes: BTreeMap<ColorClass, ClassTimer>,
}

impl NotifierState {
    /// The keep-alive clock starts at `started_at`; class timers start as
    /// never notified so the first detection is reported immediately.
    pub fn new(started_at: Instant) -> Self {
        Self::with_keep_alive(started_at, KEEP_ALIVE_INTERVAL)
    }

    pub fn with_keep_alive(started_at: Instant, keep_alive_interval: Duration) -> Self {
        Self {
            keep_alive_last_sent_at: started_at,
            keep_alive_interval,
            classes: ColorClass::all()
                .map(|class| (class, ClassTimer::default()))
                .collect(),
        }
    }

    pub fn keep_alive_last_sent_at(&self) -> Instant {
        self.keep_alive_last_sent_at
    }

    pub fn last_sent_at(&self, class: ColorClass) -> Option<Instant> {
        self.classes.get(&class).and_then(|t| t.last_sent_at)
    }

    pub fn phase(&self, class: ColorClass, now: Instant) -> NotifyPhase {
        let timer = self.classes.get(&class).copied().unwrap_or_default();
        if timer.last_sent_at.is_some() && !timer.is_due(now, class.spec().debounce) {
            NotifyPhase::RecentlyNotified
        } else {
            NotifyPhase::Idle
        }
    }
}

/// Decide which messages to emit for this tick and advance the timers.
pub fn tick(
    now: Instant,
    detections: &Detections,
    state: &mut NotifierState,
) -> Vec<OutboundMessage> {
    let mut out = Vec::new();

    let since_keep_alive = now.saturating_duration_since(state.keep_alive_last_sent_at);
    if since_keep_alive >= state.keep_alive_interval {
        out.push(OutboundMessage::KeepAlive);
        state.keep_alive_last_sent_at = now;
    }

    for class in detections.active_classes() {
        let timer = state.classes.entry(class).or_default();
        if timer.is_due(now, class.spec().debounce) {
            out.push(OutboundMessage::Status(class));
            timer.last_sent_at = Some(now);
        }
    }

    out
}
